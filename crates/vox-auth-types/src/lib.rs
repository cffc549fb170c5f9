//! Session and credential primitives shared by Vox services.
//!
//! Provides the session cookie builders, session JWT issue/validation,
//! cookie-based session identity resolution and Argon2 password hashing.

pub mod cookie;
pub mod identity;
pub mod password;
pub mod token;
