use crate::models::SessionData;

/// Notifications published by a `Session`.
///
/// `Authenticated` and `Invalidated` fire only when the authentication state
/// flips; the failure variants fire for failed explicit operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Authenticated(SessionData),
    Invalidated,
    AuthenticationFailed(String),
    InvalidationFailed(String),
}
