pub mod db;
pub mod desktop;
pub mod mail;
pub mod transcription;
pub mod wikipedia;
