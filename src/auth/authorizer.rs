//! Per-request authentication gate
//!
//! Attaches an identity to a request when it carries a valid bearer token
//! and otherwise lets it through anonymously. Rejecting anonymous requests
//! is left to the handlers that need an identity.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::token::{extract_bearer_token, TokenCodec};
use crate::auth::user::AuthenticatedContext;
use crate::constants::PUBLIC_PATH_PREFIX;
use crate::error::AuthError;
use crate::security_logger::{token_fingerprint, SecurityEvent, SecurityLogger};
use crate::storage::CredentialStore;

/// Processing context of a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    auth: Option<AuthenticatedContext>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(auth: AuthenticatedContext) -> Self {
        Self { auth: Some(auth) }
    }

    pub fn auth(&self) -> Option<&AuthenticatedContext> {
        self.auth.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.identity())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// Attach an identity unless one is already present
    pub fn attach(&mut self, auth: AuthenticatedContext) -> bool {
        if self.auth.is_some() {
            return false;
        }
        self.auth = Some(auth);
        true
    }

    /// The authenticated identity, or `Unauthenticated` for anonymous requests
    pub fn require(&self) -> Result<&AuthenticatedContext, AuthError> {
        self.auth.as_ref().ok_or(AuthError::Unauthenticated)
    }
}

pub struct RequestAuthorizer {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
    audit: Arc<SecurityLogger>,
    public_prefixes: Vec<String>,
}

impl RequestAuthorizer {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn CredentialStore>,
        audit: Arc<SecurityLogger>,
    ) -> Self {
        Self {
            codec,
            store,
            audit,
            public_prefixes: vec![PUBLIC_PATH_PREFIX.to_string()],
        }
    }

    /// Mark every path under `prefix` as public
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Build the context for a fresh request
    pub async fn authenticate(&self, path: &str, auth_header: Option<&str>) -> RequestContext {
        let mut ctx = RequestContext::anonymous();
        self.authorize_at(path, auth_header, &mut ctx, Utc::now()).await;
        ctx
    }

    pub async fn authorize(&self, path: &str, auth_header: Option<&str>, ctx: &mut RequestContext) {
        self.authorize_at(path, auth_header, ctx, Utc::now()).await
    }

    /// Try to attach an identity to `ctx`, judging expiry at `now`.
    ///
    /// Never fails: every problem with the header, the token or the lookup
    /// leaves the context as it was.
    pub async fn authorize_at(
        &self,
        path: &str,
        auth_header: Option<&str>,
        ctx: &mut RequestContext,
        now: DateTime<Utc>,
    ) {
        if self.is_public(path) {
            log::debug!("Public endpoint {} - skipping token validation", path);
            return;
        }

        let token_text = match auth_header.and_then(extract_bearer_token) {
            Some(token) => token,
            None => {
                log::debug!(
                    "No bearer token on {} (header {})",
                    path,
                    if auth_header.is_some() { "malformed" } else { "missing" }
                );
                return;
            }
        };

        let token = match self.codec.parse(token_text) {
            Ok(token) => token,
            Err(e) => {
                self.reject(token_text, e.to_string()).await;
                return;
            }
        };

        let subject = token.subject();
        let record = match self.store.find_by_identity(subject).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.reject(token_text, format!("unknown subject '{}'", subject))
                    .await;
                return;
            }
            Err(e) => {
                log::error!("Identity lookup failed for '{}': {}", subject, e);
                return;
            }
        };

        if !self.codec.is_valid_at(token_text, subject, now) {
            self.reject(token_text, "token expired or invalid".to_string())
                .await;
            return;
        }

        if ctx.attach(AuthenticatedContext::from_record(&record)) {
            log::debug!("Authenticated '{}' for {}", record.name, path);
        }
    }

    async fn reject(&self, token_text: &str, reason: String) {
        self.audit
            .log_event(SecurityEvent::TokenRejected {
                fingerprint: Some(token_fingerprint(token_text)),
                reason,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user::UserRecord;
    use crate::config::AuthConfig;
    use crate::storage::MemoryCredentialStore;
    use chrono::Duration;

    async fn setup() -> (RequestAuthorizer, Arc<TokenCodec>, MemoryCredentialStore) {
        let store = MemoryCredentialStore::new();
        store
            .save(UserRecord::new("bob".to_string(), "unused".to_string()))
            .await
            .unwrap();
        let codec = Arc::new(TokenCodec::new(&AuthConfig::for_testing()));
        let authorizer = RequestAuthorizer::new(
            codec.clone(),
            Arc::new(store.clone()),
            Arc::new(SecurityLogger::new()),
        );
        (authorizer, codec, store)
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let (authorizer, codec, _) = setup().await;
        let token = codec.issue("bob").unwrap();
        let header = format!("Bearer {}", token.as_str());

        let ctx = authorizer.authenticate("/api/expenses", Some(&header)).await;
        assert_eq!(ctx.identity(), Some("bob"));
    }

    #[tokio::test]
    async fn test_public_path_skips_validation() {
        let (authorizer, codec, _) = setup().await;
        let token = codec.issue("bob").unwrap();
        let header = format!("Bearer {}", token.as_str());

        let ctx = authorizer.authenticate("/api/auth/login", Some(&header)).await;
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_is_anonymous() {
        let (authorizer, codec, _) = setup().await;
        let t0 = Utc::now();
        let token = codec.issue_at("bob", t0).unwrap();
        let header = format!("Bearer {}", token.as_str());

        let mut ctx = RequestContext::anonymous();
        authorizer
            .authorize_at("/api/expenses", Some(&header), &mut ctx, t0 + Duration::hours(2))
            .await;
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_deleted_user_is_anonymous() {
        let (authorizer, codec, _) = setup().await;
        let token = codec.issue("ghost").unwrap();
        let header = format!("Bearer {}", token.as_str());

        let ctx = authorizer.authenticate("/api/expenses", Some(&header)).await;
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_existing_identity_not_replaced() {
        let (authorizer, codec, store) = setup().await;
        store
            .save(UserRecord::new("carol".to_string(), "unused".to_string()))
            .await
            .unwrap();
        let token = codec.issue("carol").unwrap();
        let header = format!("Bearer {}", token.as_str());

        let bob = store.find_by_identity("bob").await.unwrap().unwrap();
        let mut ctx = RequestContext::authenticated(AuthenticatedContext::from_record(&bob));
        authorizer.authorize("/api/expenses", Some(&header), &mut ctx).await;
        assert_eq!(ctx.identity(), Some("bob"));
    }

    #[tokio::test]
    async fn test_malformed_headers_never_fail() {
        let (authorizer, _, _) = setup().await;
        let headers = [
            "",
            "Bearer",
            "Bearer ",
            "Token abc",
            "bearer abc.def.ghi",
            "Bearer not.a.jwt",
            "Bearer \u{0}\u{1}\u{2}",
            "Bearer ey.ey.ey.ey",
        ];

        for header in headers {
            let ctx = authorizer.authenticate("/api/expenses", Some(header)).await;
            assert!(!ctx.is_authenticated(), "header {:?}", header);
        }
        assert!(!authorizer
            .authenticate("/api/expenses", None)
            .await
            .is_authenticated());
    }

    #[test]
    fn test_require_on_anonymous() {
        assert_eq!(
            RequestContext::anonymous().require(),
            Err(AuthError::Unauthenticated)
        );
    }
}
