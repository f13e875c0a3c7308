//! Storage interfaces and the in-memory backend

pub mod memory;
pub mod traits;

pub use memory::{MemoryCredentialStore, MemoryExpenseStore};
pub use traits::{CredentialStore, Expense, ExpenseDraft, ExpenseStore};
