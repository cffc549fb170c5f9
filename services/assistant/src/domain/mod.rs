pub mod collaborators;
pub mod repository;
pub mod types;
