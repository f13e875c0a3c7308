//! Expense Auth - bearer-token authentication for a per-user expense API
//!
//! This library issues signed tokens on login, turns a bearer token into
//! a request-scoped identity, and guards per-user resources so that only
//! their owner can change them.

pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;
pub mod security_logger;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
