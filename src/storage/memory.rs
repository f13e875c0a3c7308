//! In-memory storage implementation for development and testing
//!
//! Keeps all data in memory. Suitable for development, testing, or small
//! deployments; everything is lost on restart.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::*;
use crate::auth::user::UserRecord;
use crate::error::{ExpenseAuthError, Result};

/// In-memory credential storage
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_identity(&self, name: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(name).cloned())
    }

    async fn save(&self, record: UserRecord) -> Result<UserRecord> {
        self.users
            .write()
            .await
            .insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn insert_if_absent(&self, record: UserRecord) -> Result<bool> {
        // Single write guard covers both the check and the insert
        let mut users = self.users.write().await;
        match users.entry(record.name.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }
}

/// In-memory expense storage
pub struct MemoryExpenseStore {
    expenses: Arc<RwLock<HashMap<u64, Expense>>>,
    next_id: Arc<RwLock<u64>>,
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self {
            expenses: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    async fn generate_id(&self) -> u64 {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }
}

impl Default for MemoryExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseStore for MemoryExpenseStore {
    async fn insert(&self, draft: ExpenseDraft, owner: &str) -> Result<Expense> {
        let id = self.generate_id().await;
        let expense = Expense {
            id,
            title: draft.title,
            amount: draft.amount,
            category: draft.category,
            date: draft.date,
            owner: owner.to_string(),
        };

        self.expenses.write().await.insert(id, expense.clone());
        Ok(expense)
    }

    async fn get(&self, id: u64) -> Result<Option<Expense>> {
        Ok(self.expenses.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        let mut owned: Vec<Expense> = expenses
            .values()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();

        owned.sort_by_key(|e| e.id);
        Ok(owned)
    }

    async fn update(&self, id: u64, draft: ExpenseDraft) -> Result<Expense> {
        let mut expenses = self.expenses.write().await;

        if let Some(expense) = expenses.get_mut(&id) {
            expense.title = draft.title;
            expense.amount = draft.amount;
            expense.category = draft.category;
            expense.date = draft.date;
            Ok(expense.clone())
        } else {
            Err(ExpenseAuthError::NotFound(format!("expense {}", id)))
        }
    }

    async fn delete(&self, id: u64) -> Result<()> {
        if self.expenses.write().await.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ExpenseAuthError::NotFound(format!("expense {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, amount: f64) -> ExpenseDraft {
        ExpenseDraft {
            title: title.to_string(),
            amount,
            category: "food".to_string(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_rejects_second_insert() {
        let store = MemoryCredentialStore::new();
        let first = UserRecord::new("alice".to_string(), "h1".to_string());
        let second = UserRecord::new("alice".to_string(), "h2".to_string());

        assert!(store.insert_if_absent(first).await.unwrap());
        assert!(!store.insert_if_absent(second).await.unwrap());

        let stored = store.find_by_identity("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "h1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_produce_one_record() {
        let store = MemoryCredentialStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let record = UserRecord::new("carol".to_string(), format!("h{}", i));
                store.insert_if_absent(record).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty().await);
        store
            .save(UserRecord::new("dave".to_string(), "old".to_string()))
            .await
            .unwrap();
        store
            .save(UserRecord::new("dave".to_string(), "new".to_string()))
            .await
            .unwrap();

        let stored = store.find_by_identity("dave").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new");
        assert!(store.find_by_identity("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expenses_scoped_by_owner() {
        let store = MemoryExpenseStore::new();
        let a = store.insert(draft("lunch", 12.5), "alice").await.unwrap();
        store.insert(draft("taxi", 30.0), "bob").await.unwrap();
        let b = store.insert(draft("coffee", 3.0), "alice").await.unwrap();

        let mine = store.list_by_owner("alice").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, a.id);
        assert_eq!(mine[1].id, b.id);
        assert!(mine.iter().all(|e| e.owner == "alice"));
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_id() {
        let store = MemoryExpenseStore::new();
        let created = store.insert(draft("lunch", 12.5), "alice").await.unwrap();

        let updated = store.update(created.id, draft("dinner", 40.0)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.owner, "alice");
        assert_eq!(updated.title, "dinner");
    }

    #[tokio::test]
    async fn test_missing_expense_is_not_found() {
        let store = MemoryExpenseStore::new();
        assert!(store.get(99).await.unwrap().is_none());
        assert!(matches!(
            store.update(99, draft("x", 1.0)).await,
            Err(ExpenseAuthError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(99).await,
            Err(ExpenseAuthError::NotFound(_))
        ));
    }
}
