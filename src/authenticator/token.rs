use super::Authenticator;
use crate::api::{Transport, TransportRequest};
use crate::error::{AuthError, Result};
use crate::models::{is_blank, Authentication, Credentials, SessionData};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const TOKEN_AUTHENTICATOR_NAME: &str = "authenticator:token";

#[derive(Debug, Clone, PartialEq)]
pub struct TokenOptions {
    /// Key the backend nests the user record under.
    pub resource_name: String,
    pub token_attribute_name: String,
    pub identification_attribute_name: String,
    /// Absolute URL credentials are posted to.
    pub server_endpoint: String,
    /// Surface the whole response on rejection instead of its decoded body.
    pub reject_with_full_response: bool,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            resource_name: "user".to_string(),
            token_attribute_name: "token".to_string(),
            identification_attribute_name: "email".to_string(),
            server_endpoint: "http://localhost:3000/users/sign_in".to_string(),
            reject_with_full_response: false,
        }
    }
}

/// Token + identification scheme: the backend answers a sign-in POST with a
/// record holding both, and the pair is sent back on every request.
pub struct TokenAuthenticator {
    options: TokenOptions,
    transport: Arc<dyn Transport>,
}

impl TokenAuthenticator {
    pub fn new(options: TokenOptions, transport: Arc<dyn Transport>) -> Self {
        Self { options, transport }
    }

    pub fn options(&self) -> &TokenOptions {
        &self.options
    }

    /// Validate a record, looking inside the resource key when it holds an object.
    ///
    /// Returns the object that was validated.
    pub fn validate(&self, record: &SessionData) -> Result<SessionData> {
        let candidate = match record.get(&self.options.resource_name) {
            Some(Value::Object(nested)) => nested,
            _ => record,
        };

        if is_blank(candidate.get(&self.options.token_attribute_name))
            || is_blank(candidate.get(&self.options.identification_attribute_name))
        {
            return Err(AuthError::missing_required_fields());
        }
        Ok(candidate.clone())
    }

    fn request_body(&self, credentials: &Credentials) -> Value {
        let mut resource = Map::new();
        resource.insert(
            self.options.identification_attribute_name.clone(),
            Value::String(credentials.identification.clone()),
        );
        resource.insert(
            "password".to_string(),
            Value::String(credentials.password.clone()),
        );

        let mut body = Map::new();
        body.insert(self.options.resource_name.clone(), Value::Object(resource));
        Value::Object(body)
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    fn name(&self) -> &str {
        TOKEN_AUTHENTICATOR_NAME
    }

    async fn restore(&self, data: &SessionData) -> Result<SessionData> {
        self.validate(data)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Authentication> {
        let request =
            TransportRequest::post_json(&self.options.server_endpoint, self.request_body(credentials));
        let response = self.transport.send(request).await?;

        if !response.is_ok() {
            info!(status = response.status().as_u16(), "backend rejected credentials");
            if self.options.reject_with_full_response {
                return Err(AuthError::RejectedResponse(response));
            }
            return Err(AuthError::Rejected {
                status: response.status().as_u16(),
                body: response.json_or_text(),
            });
        }

        let body = match response.json::<Value>() {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                debug!("backend success body is not a JSON object");
                return Err(AuthError::missing_required_fields());
            }
        };
        let data = self.validate(&body)?;
        Ok(Authentication {
            response: Value::Object(body),
            data,
        })
    }

    async fn invalidate(&self, _data: &SessionData) -> Result<()> {
        // No revocation endpoint: the token simply stops being sent.
        Ok(())
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

