//! Service plumbing shared by Vox binaries: configuration loading, error
//! responses, health probes, request-id/trace layers and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod tracing;
