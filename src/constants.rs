// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Authentication constants
pub const PUBLIC_PATH_PREFIX: &str = "/api/auth/";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86400; // 24 hours

// Minimum length for the signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

// Number of token characters kept when a token fingerprint is logged
pub const TOKEN_FINGERPRINT_LEN: usize = 8;

// Floor on how long a failed login takes to answer
pub const MIN_FAILED_LOGIN_MILLIS: u64 = 100;
