//! Shared application state wiring the auth components to their stores

use std::sync::Arc;

use crate::auth::{RequestAuthorizer, SessionAuthenticator, TokenCodec};
use crate::config::AuthConfig;
use crate::core::expenses::ExpenseService;
use crate::security_logger::SecurityLogger;
use crate::storage::{CredentialStore, ExpenseStore, MemoryCredentialStore, MemoryExpenseStore};

/// Everything a request handler needs, shared read-only across requests
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub authenticator: SessionAuthenticator,
    pub authorizer: Arc<RequestAuthorizer>,
    pub expenses: ExpenseService,
    pub audit: Arc<SecurityLogger>,
}

impl AppState {
    /// Create state backed by in-memory stores
    pub fn in_memory(config: &AuthConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryExpenseStore::new()),
        )
    }

    pub fn with_stores(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        expenses: Arc<dyn ExpenseStore>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(config));
        let audit = Arc::new(SecurityLogger::new());

        Self {
            authenticator: SessionAuthenticator::new(
                credentials.clone(),
                codec.clone(),
                audit.clone(),
            ),
            authorizer: Arc::new(RequestAuthorizer::new(
                codec.clone(),
                credentials.clone(),
                audit.clone(),
            )),
            expenses: ExpenseService::new(expenses, audit.clone()),
            credentials,
            audit,
        }
    }
}

pub type SharedState = Arc<AppState>;
