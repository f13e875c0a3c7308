//! Ownership checks for per-user resources

use crate::auth::authorizer::RequestContext;
use crate::error::AuthError;

/// A resource that belongs to exactly one identity
pub trait Owned {
    fn owner(&self) -> &str;
}

/// Allow the operation only if `ctx` is authenticated as the resource owner
pub fn assert_owned<R: Owned + ?Sized>(
    resource: &R,
    ctx: &RequestContext,
) -> Result<(), AuthError> {
    let auth = ctx.require()?;
    if resource.owner() != auth.identity() {
        return Err(AuthError::Unauthorized);
    }
    Ok(())
}
