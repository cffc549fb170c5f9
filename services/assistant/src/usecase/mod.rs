pub mod auth;
pub mod command;
pub mod history;
pub mod recovery;
pub mod report;
pub mod transcribe;
