mod token;

pub use token::{TokenAuthenticator, TokenOptions, TOKEN_AUTHENTICATOR_NAME};

use crate::error::Result;
use crate::models::{Authentication, Credentials, SessionData};
use async_trait::async_trait;

/// Backend credential scheme driven by a `Session`.
///
/// Implementations hold no session state of their own; everything they need
/// comes in through the arguments.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identifier recorded alongside persisted session data.
    fn name(&self) -> &str;

    /// Decide whether a persisted record still counts as authenticated.
    async fn restore(&self, data: &SessionData) -> Result<SessionData>;

    /// Exchange credentials with the backend for session data.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Authentication>;

    /// Tear down the backend side of a session.
    async fn invalidate(&self, data: &SessionData) -> Result<()>;
}
