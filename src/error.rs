use std::error::Error;
use std::fmt;

/// Failures raised by the session authenticator and the ownership guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    DuplicateIdentity,
    UnknownIdentity,
    BadCredential,
    Unauthenticated,
    Unauthorized,
}

impl AuthError {
    /// Message safe to show to a client.
    ///
    /// Unknown identities and bad credentials share one message so a caller
    /// cannot probe which names are registered.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity => "Username already exists",
            Self::UnknownIdentity | Self::BadCredential => "Invalid credentials",
            Self::Unauthenticated => "Authentication required",
            Self::Unauthorized => "Unauthorized",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentity => write!(f, "Identity already registered"),
            Self::UnknownIdentity => write!(f, "Unknown identity"),
            Self::BadCredential => write!(f, "Credential does not match"),
            Self::Unauthenticated => write!(f, "No authenticated identity"),
            Self::Unauthorized => write!(f, "Identity does not own this resource"),
        }
    }
}

impl Error for AuthError {}

/// Failures raised while encoding or decoding a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Malformed(String),
    BadSignature,
    Expired,
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "Malformed token: {}", msg),
            Self::BadSignature => write!(f, "Token signature does not verify"),
            Self::Expired => write!(f, "Token expired"),
            Self::Signing(msg) => write!(f, "Failed to sign token: {}", msg),
        }
    }
}

impl Error for TokenError {}

#[derive(Debug)]
pub enum ExpenseAuthError {
    // Domain errors
    Auth(AuthError),
    Token(TokenError),

    // Storage errors
    StorageError(String),
    NotFound(String),

    // Validation errors
    ValidationError(String),

    // Configuration errors
    ConfigError(String),

    // System errors
    Internal(String),
}

impl fmt::Display for ExpenseAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(err) => write!(f, "Authentication error: {}", err),
            Self::Token(err) => write!(f, "Token error: {}", err),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for ExpenseAuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Auth(err) => Some(err),
            Self::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthError> for ExpenseAuthError {
    fn from(err: AuthError) -> Self {
        ExpenseAuthError::Auth(err)
    }
}

impl From<TokenError> for ExpenseAuthError {
    fn from(err: TokenError) -> Self {
        ExpenseAuthError::Token(err)
    }
}

// Generic result type for the crate
pub type Result<T> = std::result::Result<T, ExpenseAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_share_public_message() {
        assert_eq!(
            AuthError::UnknownIdentity.public_message(),
            AuthError::BadCredential.public_message()
        );
        assert_ne!(
            AuthError::UnknownIdentity.to_string(),
            AuthError::BadCredential.to_string()
        );
    }

    #[test]
    fn test_domain_errors_convert() {
        let err: ExpenseAuthError = AuthError::Unauthorized.into();
        assert!(matches!(err, ExpenseAuthError::Auth(AuthError::Unauthorized)));
        assert!(err.source().is_some());

        let err: ExpenseAuthError = TokenError::Expired.into();
        assert!(err.to_string().contains("expired"));
    }
}
