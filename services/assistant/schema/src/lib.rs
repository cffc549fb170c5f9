//! sea-orm entities for the assistant service.

pub mod history_records;
pub mod recovery_codes;
pub mod users;
