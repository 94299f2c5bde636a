use super::{set_authorization, Authorizer};
use crate::models::{field_as_string, SessionState};

pub const DEFAULT_ACCESS_TOKEN_KEY: &str = "access_token";

/// Sends `Authorization: Bearer <token>` for OAuth2-style session data.
#[derive(Debug, Clone)]
pub struct BearerAuthorizer {
    token_key: String,
}

impl BearerAuthorizer {
    pub fn new(token_key: impl Into<String>) -> Self {
        Self {
            token_key: token_key.into(),
        }
    }
}

impl Default for BearerAuthorizer {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_TOKEN_KEY)
    }
}

impl Authorizer for BearerAuthorizer {
    fn authorize(&self, request: &mut reqwest::Request, state: &SessionState) {
        if !state.is_authenticated {
            return;
        }
        if let Some(token) = field_as_string(&state.data, &self.token_key) {
            set_authorization(request, &format!("Bearer {}", token));
        }
    }
}
