//! Domain types shared across Vox crates.
//!
//! Pure types only, with no framework dependencies.

pub mod command;
pub mod id;
