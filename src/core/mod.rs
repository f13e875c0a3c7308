//! Application services built on top of the auth layer

pub mod expenses;
pub mod server;

// Re-export main components for convenience
pub use expenses::ExpenseService;
pub use server::{AppState, SharedState};
