use serde::{Deserialize, Serialize};

/// A registered user as held by the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique, immutable login name
    pub name: String,
    /// PHC-formatted credential hash, never the raw credential
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional contact address given at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UserRecord {
    pub fn new(name: String, password_hash: String) -> Self {
        Self {
            name,
            password_hash,
            email: None,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }
}

/// Identity resolved for a single request
///
/// Built by the request authorizer from a verified token and the stored
/// user record. Lives only as long as the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedContext {
    identity: String,
    authorities: Vec<String>,
}

impl AuthenticatedContext {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            identity: record.name.clone(),
            // No roles exist yet; every authenticated user carries an empty set
            authorities: Vec::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}
