mod events;

pub use events::SessionEvent;

use crate::authenticator::Authenticator;
use crate::error::{AuthError, Result};
use crate::models::{Authentication, Credentials, SessionData, SessionState};
use crate::store::Store;
use serde_json::Value;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Key naming the authenticator inside a persisted record.
pub const AUTHENTICATOR_KEY: &str = "authenticator";

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Authentication state machine coordinating one authenticator and one store.
///
/// State only changes when an `authenticate`, `invalidate` or
/// `restore_from_store` call settles. The `(is_authenticated, data)` pair is
/// swapped as a whole under a single lock.
pub struct Session {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn Store>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(authenticator: Arc<dyn Authenticator>, store: Arc<dyn Store>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            authenticator,
            store,
            state: RwLock::new(SessionState::unauthenticated()),
            events,
        }
    }

    /// Build a session, restore it from the store and start following store changes.
    pub async fn start(
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn Store>,
    ) -> SessionHandle {
        let session = Arc::new(Self::new(authenticator, store));
        session.restore_from_store().await;
        let listener = session.listen_to_store();
        SessionHandle { session, listener }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn data(&self) -> SessionData {
        self.state.read().await.data.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Converge on whatever the store currently holds. Never fails.
    pub async fn restore_from_store(&self) {
        let record = match self.store.restore().await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to read session store; treating it as empty");
                SessionData::new()
            }
        };

        match self.restore_record(record).await {
            Ok(data) => self.settle(SessionState::authenticated(data)).await,
            Err(e) => {
                debug!(reason = %e, "stored session not restorable");
                self.settle(SessionState::unauthenticated()).await;
            }
        }
    }

    /// Sign in and resolve with the backend's success body.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Value> {
        match self.authenticator.authenticate(credentials).await {
            Ok(Authentication { response, data }) => {
                self.settle(SessionState::authenticated(data)).await;
                info!(authenticator = self.authenticator.name(), "session authenticated");
                Ok(response)
            }
            Err(e) => {
                info!(error = %e, "authentication failed");
                self.settle(SessionState::unauthenticated()).await;
                let _ = self.events.send(SessionEvent::AuthenticationFailed(e.reason()));
                Err(e)
            }
        }
    }

    pub async fn invalidate(&self) -> Result<()> {
        let current = self.state().await;
        if !current.is_authenticated {
            return Err(AuthError::NotAuthenticated);
        }

        match self.authenticator.invalidate(&current.data).await {
            Ok(()) => {
                self.settle(SessionState::unauthenticated()).await;
                info!("session invalidated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "invalidation failed; session stays authenticated");
                let _ = self.events.send(SessionEvent::InvalidationFailed(e.reason()));
                Err(e)
            }
        }
    }

    /// Re-run `restore_from_store` on every store change notification.
    fn listen_to_store(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.store.subscribe();
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "store notifications lagged; restoring latest state");
                    }
                    Err(RecvError::Closed) => break,
                }
                let Some(session) = weak.upgrade() else {
                    break;
                };
                session.restore_from_store().await;
            }
        })
    }

    async fn restore_record(&self, mut record: SessionData) -> Result<SessionData> {
        if let Some(owner) = record.remove(AUTHENTICATOR_KEY) {
            if owner.as_str() != Some(self.authenticator.name()) {
                return Err(AuthError::Validation(format!(
                    "stored session belongs to authenticator {}",
                    owner
                )));
            }
        }
        self.authenticator.restore(&record).await
    }

    /// Write `next` through to the store and swap it in.
    ///
    /// The state lock is held across the store write: whichever operation
    /// settles last owns both the stored record and the in-memory state.
    async fn settle(&self, next: SessionState) {
        let mut state = self.state.write().await;
        if next.is_authenticated {
            self.persist(&next.data).await;
        } else {
            self.clear_store().await;
        }

        let flipped = state.is_authenticated != next.is_authenticated;
        *state = next;

        if flipped {
            let event = if state.is_authenticated {
                SessionEvent::Authenticated(state.data.clone())
            } else {
                SessionEvent::Invalidated
            };
            debug!(authenticated = state.is_authenticated, "session state changed");
            let _ = self.events.send(event);
        }
    }

    async fn persist(&self, data: &SessionData) {
        let mut record = data.clone();
        record.insert(
            AUTHENTICATOR_KEY.to_string(),
            Value::String(self.authenticator.name().to_string()),
        );
        if let Err(e) = self.store.persist(&record).await {
            warn!(error = %e, "failed to persist session");
        }
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear session store");
        }
    }
}

/// A started session. Dropping it stops the store listener.
pub struct SessionHandle {
    session: Arc<Session>,
    listener: JoinHandle<()>,
}

impl SessionHandle {
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl Deref for SessionHandle {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
