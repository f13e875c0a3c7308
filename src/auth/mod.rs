//! Authentication and authorization module

pub mod authorizer;
pub mod guard;
pub mod password;
pub mod session;
pub mod timing;
pub mod token;
pub mod user;

// Re-export main components
pub use authorizer::{RequestAuthorizer, RequestContext};
pub use guard::{assert_owned, Owned};
pub use session::{Session, SessionAuthenticator};
pub use token::{Claims, Token, TokenCodec};
pub use user::{AuthenticatedContext, UserRecord};
