//! Abstract storage interfaces for pluggable backends
//!
//! The authentication core only needs lookup-by-name and an atomic
//! insert-if-absent from the credential store. Expense storage backs the
//! per-user resource endpoints.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::guard::Owned;
use crate::auth::user::UserRecord;
use crate::error::Result;

/// A single expense entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: Option<NaiveDate>,
    /// Name of the owning user, set by the server and never by the client
    pub owner: String,
}

impl Owned for Expense {
    fn owner(&self) -> &str {
        &self.owner
    }
}

/// Client-editable fields of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// User credential storage interface
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get user by name
    async fn find_by_identity(&self, name: &str) -> Result<Option<UserRecord>>;

    /// Insert or replace a user record
    async fn save(&self, record: UserRecord) -> Result<UserRecord>;

    /// Insert the record only if no user with the same name exists.
    ///
    /// Returns `false` when the name is taken. The check and the insert
    /// happen as one atomic step.
    async fn insert_if_absent(&self, record: UserRecord) -> Result<bool>;
}

/// Expense storage interface
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Store a new expense for `owner` and return it with its assigned id
    async fn insert(&self, draft: ExpenseDraft, owner: &str) -> Result<Expense>;

    /// Get expense by ID
    async fn get(&self, id: u64) -> Result<Option<Expense>>;

    /// Get all expenses owned by a user
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Expense>>;

    /// Replace the editable fields of an expense
    async fn update(&self, id: u64, draft: ExpenseDraft) -> Result<Expense>;

    /// Delete an expense
    async fn delete(&self, id: u64) -> Result<()>;
}
