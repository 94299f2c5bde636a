use super::storage::Store;
use crate::error::Result;
use crate::models::SessionData;
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// In-memory store. Nothing survives the process.
pub struct EphemeralStore {
    data: RwLock<SessionData>,
    changes: broadcast::Sender<SessionData>,
}

impl EphemeralStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            data: RwLock::new(SessionData::new()),
            changes,
        }
    }

    /// Overwrite the record as another writer would, notifying subscribers.
    pub async fn replace_externally(&self, data: SessionData) {
        *self.data.write().await = data.clone();
        // No subscribers is fine.
        let _ = self.changes.send(data);
    }
}

impl Default for EphemeralStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for EphemeralStore {
    async fn persist(&self, data: &SessionData) -> Result<()> {
        *self.data.write().await = data.clone();
        Ok(())
    }

    async fn restore(&self) -> Result<SessionData> {
        Ok(self.data.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.data.write().await.clear();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionData> {
        self.changes.subscribe()
    }
}
