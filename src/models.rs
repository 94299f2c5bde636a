use serde_json::{Map, Value};
use std::fmt;

/// Opaque record of everything needed to authenticate future requests.
pub type SessionData = Map<String, Value>;

/// Snapshot of a session, read atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub data: SessionData,
}

impl SessionState {
    pub fn authenticated(data: SessionData) -> Self {
        Self {
            is_authenticated: true,
            data,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::default()
    }
}

/// Outcome of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Authentication {
    /// Success body exactly as the backend sent it.
    pub response: Value,
    /// Validated record the session keeps.
    pub data: SessionData,
}

#[derive(Clone)]
pub struct Credentials {
    pub identification: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identification: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identification: identification.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identification", &self.identification)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Missing, null, empty strings and empty arrays all count as blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Render a field for use inside a header; strings are taken verbatim.
pub fn field_as_string(data: &SessionData, key: &str) -> Option<String> {
    let value = data.get(key);
    if is_blank(value) {
        return None;
    }
    value.map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
