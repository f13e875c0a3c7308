use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::constants::BEARER_PREFIX;
use crate::error::TokenError;

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issuer, present only when one is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// A signed token together with the claims it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    claims: Claims,
    encoded: String,
}

impl Token {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.exp, 0)
    }

    /// A token is live strictly before its expiry second
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.claims.exp
    }

    /// The compact serialized form handed to clients
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

/// Issues and verifies HS256 tokens.
///
/// Holds no mutable state: the keys and TTL come from an [`AuthConfig`]
/// at construction and never change, so one codec can be shared freely
/// across concurrent requests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    issuer: Option<String>,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against a caller-supplied clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(ref iss) = config.issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a token for `subject` valid from now for the configured TTL
    pub fn issue(&self, subject: &str) -> Result<Token, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            iss: self.issuer.clone(),
        };

        let encoded = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(Token { claims, encoded })
    }

    /// Check signature and structure. Expiry is deliberately not checked here.
    pub fn parse(&self, text: &str) -> Result<Token, TokenError> {
        let data = decode::<Claims>(text, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        Ok(Token {
            claims: data.claims,
            encoded: text.to_string(),
        })
    }

    /// Parse and additionally reject tokens that have expired at `now`
    pub fn verify_at(&self, text: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let token = self.parse(text)?;
        if token.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(token)
    }

    pub fn is_valid(&self, text: &str, expected_subject: &str) -> bool {
        self.is_valid_at(text, expected_subject, Utc::now())
    }

    /// True iff the signature verifies, the subject matches and the token is
    /// unexpired at `now`. Every failure collapses to `false`.
    pub fn is_valid_at(&self, text: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.verify_at(text, now) {
            Ok(token) => token.subject() == expected_subject,
            Err(e) => {
                log::debug!("Token rejected: {}", e);
                false
            }
        }
    }
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let token = auth_header.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
