//! Registration and login
//!
//! Verifies submitted credentials against the credential store and hands out
//! freshly issued tokens. Nothing here persists tokens.
//!
//! A login for an unknown name still runs a full hash verification, against
//! a throwaway hash, and every failed login is held to a minimum duration.
//! Response time therefore does not reveal which names are registered.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::timing::AuthTimer;
use crate::auth::token::{Token, TokenCodec};
use crate::auth::user::UserRecord;
use crate::constants::MIN_FAILED_LOGIN_MILLIS;
use crate::error::{AuthError, ExpenseAuthError, Result};
use crate::security_logger::{SecurityEvent, SecurityLogger};
use crate::storage::CredentialStore;

// Credential behind the throwaway hash used for unknown names
const DECOY_CREDENTIAL: &str = "decoy-credential-never-assigned";

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Token,
    /// Name echoed back to the client
    pub username: String,
}

pub struct SessionAuthenticator {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    audit: Arc<SecurityLogger>,
    decoy_hash: OnceCell<String>,
    min_failure_time: Duration,
}

impl SessionAuthenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        audit: Arc<SecurityLogger>,
    ) -> Self {
        Self {
            store,
            codec,
            audit,
            decoy_hash: OnceCell::new(),
            min_failure_time: Duration::from_millis(MIN_FAILED_LOGIN_MILLIS),
        }
    }

    /// Override the minimum time a failed login takes
    pub fn with_min_failure_time(mut self, min_failure_time: Duration) -> Self {
        self.min_failure_time = min_failure_time;
        self
    }

    /// Create a new user. Fails with `DuplicateIdentity` if the name is taken.
    pub async fn register(&self, identity: &str, credential: &str) -> Result<()> {
        self.register_with_email(identity, credential, None).await
    }

    /// Create a new user with an optional contact address
    pub async fn register_with_email(
        &self,
        identity: &str,
        credential: &str,
        email: Option<&str>,
    ) -> Result<()> {
        validate_input(identity, credential)?;
        let email = normalize_email(email)?;

        let hash = hash_password_blocking(credential.to_string()).await?;
        let record = UserRecord::new(identity.to_string(), hash).with_email(email);
        if !self.store.insert_if_absent(record).await? {
            self.audit
                .log_event(SecurityEvent::RegistrationRejected {
                    user: identity.to_string(),
                    reason: "identity already registered".to_string(),
                })
                .await;
            return Err(AuthError::DuplicateIdentity.into());
        }

        self.audit
            .log_event(SecurityEvent::UserRegistered {
                user: identity.to_string(),
            })
            .await;
        Ok(())
    }

    /// Verify the credential and issue a token for `identity`
    pub async fn login(&self, identity: &str, credential: &str) -> Result<Session> {
        let timer = AuthTimer::start(self.min_failure_time);

        let record = self.store.find_by_identity(identity).await?;
        let stored_hash = match record {
            Some(ref record) => record.password_hash.clone(),
            None => self.decoy_hash().await?,
        };
        let matches = verify_password_blocking(credential.to_string(), stored_hash).await?;

        let record = match record {
            Some(record) if matches => record,
            Some(_) => return Err(self.fail(identity, AuthError::BadCredential, timer).await),
            None => return Err(self.fail(identity, AuthError::UnknownIdentity, timer).await),
        };

        let token = self.codec.issue(&record.name)?;
        self.audit
            .log_event(SecurityEvent::LoginSucceeded {
                user: record.name.clone(),
            })
            .await;

        Ok(Session {
            token,
            username: record.name,
        })
    }

    async fn decoy_hash(&self) -> Result<String> {
        self.decoy_hash
            .get_or_try_init(|| hash_password_blocking(DECOY_CREDENTIAL.to_string()))
            .await
            .cloned()
    }

    async fn fail(
        &self,
        identity: &str,
        reason: AuthError,
        timer: AuthTimer,
    ) -> ExpenseAuthError {
        self.audit
            .log_event(SecurityEvent::LoginFailed {
                user: identity.to_string(),
                reason: reason.to_string(),
            })
            .await;
        timer.wait().await;
        reason.into()
    }
}

fn validate_input(identity: &str, credential: &str) -> Result<()> {
    if identity.trim().is_empty() {
        return Err(ExpenseAuthError::ValidationError(
            "Name must not be empty".to_string(),
        ));
    }
    if identity.trim() != identity {
        return Err(ExpenseAuthError::ValidationError(
            "Name must not start or end with whitespace".to_string(),
        ));
    }
    if credential.is_empty() {
        return Err(ExpenseAuthError::ValidationError(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn normalize_email(email: Option<&str>) -> Result<Option<String>> {
    let email = match email.map(str::trim) {
        Some(email) if !email.is_empty() => email,
        _ => return Ok(None),
    };
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(Some(email.to_string()))
        }
        _ => Err(ExpenseAuthError::ValidationError(
            "Email address is not valid".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::config::AuthConfig;
    use crate::storage::MemoryCredentialStore;

    fn authenticator() -> (SessionAuthenticator, MemoryCredentialStore, Arc<TokenCodec>) {
        let store = MemoryCredentialStore::new();
        let codec = Arc::new(TokenCodec::new(&AuthConfig::for_testing()));
        let auth = SessionAuthenticator::new(
            Arc::new(store.clone()),
            codec.clone(),
            Arc::new(SecurityLogger::new()),
        )
        .with_min_failure_time(Duration::from_millis(0));
        (auth, store, codec)
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_credential() {
        let (auth, store, _) = authenticator();
        auth.register("alice", "pw1").await.unwrap();

        let record = store.find_by_identity("alice").await.unwrap().unwrap();
        assert_ne!(record.password_hash, "pw1");
        assert!(verify_password("pw1", &record.password_hash));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_subject() {
        let (auth, _, codec) = authenticator();
        auth.register("bob", "pw").await.unwrap();

        let session = auth.login("bob", "pw").await.unwrap();
        assert_eq!(session.username, "bob");
        assert_eq!(session.token.subject(), "bob");
        assert!(codec.is_valid(session.token.as_str(), "bob"));
    }

    #[tokio::test]
    async fn test_login_distinguishes_failures_internally() {
        let (auth, _, _) = authenticator();
        auth.register("bob", "pw").await.unwrap();

        assert!(matches!(
            auth.login("bob", "wrong").await,
            Err(ExpenseAuthError::Auth(AuthError::BadCredential))
        ));
        assert!(matches!(
            auth.login("nobody", "pw").await,
            Err(ExpenseAuthError::Auth(AuthError::UnknownIdentity))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let (auth, _, _) = authenticator();
        assert!(matches!(
            auth.register("", "pw").await,
            Err(ExpenseAuthError::ValidationError(_))
        ));
        assert!(matches!(
            auth.register("erin", "").await,
            Err(ExpenseAuthError::ValidationError(_))
        ));
        assert!(matches!(
            auth.register(" erin", "pw").await,
            Err(ExpenseAuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_email_stored_when_given() {
        let (auth, store, _) = authenticator();
        auth.register_with_email("alice", "pw", Some(" alice@example.com "))
            .await
            .unwrap();
        auth.register_with_email("bob", "pw", Some("")).await.unwrap();

        let alice = store.find_by_identity("alice").await.unwrap().unwrap();
        assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
        let bob = store.find_by_identity("bob").await.unwrap().unwrap();
        assert_eq!(bob.email, None);
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let (auth, store, _) = authenticator();
        for email in ["alice", "@example.com", "alice@", "a@b@c"] {
            assert!(
                matches!(
                    auth.register_with_email("alice", "pw", Some(email)).await,
                    Err(ExpenseAuthError::ValidationError(_))
                ),
                "email {:?}",
                email
            );
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_decoy_hash_reused() {
        let (auth, _, _) = authenticator();
        let first = auth.decoy_hash().await.unwrap();
        let second = auth.decoy_hash().await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }
}
