//! Expense operations scoped to the caller's identity
//!
//! Every operation needs an authenticated request. Reads are scoped by
//! querying with the caller's name; updates and deletes go through the
//! ownership guard first.

use std::sync::Arc;

use crate::auth::authorizer::RequestContext;
use crate::auth::guard::assert_owned;
use crate::auth::user::AuthenticatedContext;
use crate::error::{ExpenseAuthError, Result};
use crate::security_logger::{SecurityEvent, SecurityLogger};
use crate::storage::{Expense, ExpenseDraft, ExpenseStore};

pub struct ExpenseService {
    store: Arc<dyn ExpenseStore>,
    audit: Arc<SecurityLogger>,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn ExpenseStore>, audit: Arc<SecurityLogger>) -> Self {
        Self { store, audit }
    }

    pub async fn create(&self, ctx: &RequestContext, draft: ExpenseDraft) -> Result<Expense> {
        let auth = self.require(ctx, "create expense").await?;
        validate_draft(&draft)?;
        self.store.insert(draft, auth.identity()).await
    }

    pub async fn list_own(&self, ctx: &RequestContext) -> Result<Vec<Expense>> {
        let auth = self.require(ctx, "list expenses").await?;
        self.store.list_by_owner(auth.identity()).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: u64,
        draft: ExpenseDraft,
    ) -> Result<Expense> {
        self.require(ctx, "update expense").await?;
        validate_draft(&draft)?;
        self.fetch_owned(ctx, id).await?;
        self.store.update(id, draft).await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<()> {
        self.require(ctx, "delete expense").await?;
        self.fetch_owned(ctx, id).await?;
        self.store.delete(id).await
    }

    async fn fetch_owned(&self, ctx: &RequestContext, id: u64) -> Result<Expense> {
        let expense = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ExpenseAuthError::NotFound(format!("expense {}", id)))?;

        if let Err(e) = assert_owned(&expense, ctx) {
            self.audit
                .log_event(SecurityEvent::OwnershipDenied {
                    user: ctx.identity().unwrap_or_default().to_string(),
                    resource: format!("expense {}", id),
                })
                .await;
            return Err(e.into());
        }
        Ok(expense)
    }

    async fn require<'a>(
        &self,
        ctx: &'a RequestContext,
        action: &str,
    ) -> Result<&'a AuthenticatedContext> {
        match ctx.require() {
            Ok(auth) => Ok(auth),
            Err(e) => {
                self.audit
                    .log_event(SecurityEvent::UnauthenticatedAccess {
                        resource: action.to_string(),
                    })
                    .await;
                Err(e.into())
            }
        }
    }

    /// Number of expenses owned by the caller
    pub async fn count_own(&self, ctx: &RequestContext) -> Result<usize> {
        Ok(self.list_own(ctx).await?.len())
    }
}

fn validate_draft(draft: &ExpenseDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(ExpenseAuthError::ValidationError(
            "Title must not be empty".to_string(),
        ));
    }
    if !draft.amount.is_finite() {
        return Err(ExpenseAuthError::ValidationError(
            "Amount must be a finite number".to_string(),
        ));
    }
    Ok(())
}
