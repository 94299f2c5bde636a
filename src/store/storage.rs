use crate::error::Result;
use crate::models::SessionData;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Trait for session persistence backends.
///
/// A store holds exactly one record at a time. `subscribe` yields the new
/// record whenever the underlying medium is changed by someone other than this
/// store's own `persist`/`clear` calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Replace the persisted record.
    async fn persist(&self, data: &SessionData) -> Result<()>;

    /// Read the persisted record; empty when nothing is stored.
    async fn restore(&self) -> Result<SessionData>;

    /// Remove the persisted record.
    async fn clear(&self) -> Result<()>;

    /// Receive external change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionData>;
}
