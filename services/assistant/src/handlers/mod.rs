pub mod assistant;
pub mod auth;
pub mod history;
pub mod info;
pub mod recovery;
pub mod session;
