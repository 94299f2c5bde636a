use super::{set_authorization, Authorizer};
use crate::authenticator::TokenOptions;
use crate::models::{field_as_string, SessionState};

/// Sends `Authorization: Token token="...", email="..."`, the counterpart of
/// `TokenAuthenticator`.
#[derive(Debug, Clone)]
pub struct TokenAuthorizer {
    token_attribute_name: String,
    identification_attribute_name: String,
}

impl TokenAuthorizer {
    pub fn new(
        token_attribute_name: impl Into<String>,
        identification_attribute_name: impl Into<String>,
    ) -> Self {
        Self {
            token_attribute_name: token_attribute_name.into(),
            identification_attribute_name: identification_attribute_name.into(),
        }
    }

    pub fn from_options(options: &TokenOptions) -> Self {
        Self::new(
            options.token_attribute_name.clone(),
            options.identification_attribute_name.clone(),
        )
    }
}

impl Default for TokenAuthorizer {
    fn default() -> Self {
        Self::from_options(&TokenOptions::default())
    }
}

impl Authorizer for TokenAuthorizer {
    fn authorize(&self, request: &mut reqwest::Request, state: &SessionState) {
        if !state.is_authenticated {
            return;
        }
        let token = field_as_string(&state.data, &self.token_attribute_name);
        let identification = field_as_string(&state.data, &self.identification_attribute_name);
        if let (Some(token), Some(identification)) = (token, identification) {
            let value = format!(
                "Token token=\"{}\", {}=\"{}\"",
                token, self.identification_attribute_name, identification
            );
            set_authorization(request, &value);
        }
    }
}
