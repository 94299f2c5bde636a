mod bearer;
mod token;

pub use bearer::BearerAuthorizer;
pub use token::TokenAuthorizer;

use crate::models::SessionState;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::warn;

/// Decorates outgoing requests with credentials taken from session data.
///
/// Implementations must leave the request untouched when the session is not
/// authenticated.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, request: &mut reqwest::Request, state: &SessionState);
}

/// Set a sensitive `Authorization` header, skipping values that are not valid header text.
pub(crate) fn set_authorization(request: &mut reqwest::Request, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut header) => {
            header.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, header);
        }
        Err(e) => warn!(error = %e, "session data cannot be encoded as an authorization header"),
    }
}
