use super::storage::Store;
use crate::error::{AuthError, Result};
use crate::models::SessionData;
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Stores the session record as a JSON file.
///
/// Other processes may rewrite or delete the file. `watch` polls it and
/// notifies subscribers when the content differs from what this store last
/// read or wrote.
#[derive(Clone)]
pub struct FilesystemStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    // Raw file content as last observed by this store; None when absent.
    last_seen: Mutex<Option<String>>,
    changes: broadcast::Sender<SessionData>,
}

impl FilesystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                last_seen: Mutex::new(None),
                changes,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Check the file once; returns true when an external change was published.
    pub async fn poll_changes(&self) -> Result<bool> {
        let mut last_seen = self.inner.last_seen.lock().await;
        let current = read_optional(&self.inner.path).await?;
        if current == *last_seen {
            return Ok(false);
        }

        let data = match current.as_deref() {
            Some(content) => parse_record(content).unwrap_or_else(|e| {
                warn!(path = %self.inner.path.display(), error = %e, "ignoring unreadable session file");
                SessionData::new()
            }),
            None => SessionData::new(),
        };
        *last_seen = current;
        drop(last_seen);

        debug!(path = %self.inner.path.display(), "session file changed externally");
        let _ = self.inner.changes.send(data);
        Ok(true)
    }

    /// Spawn the polling task. Call once per store.
    pub fn watch(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = store.poll_changes().await {
                    warn!(error = %e, "failed to poll session file");
                }
            }
        })
    }
}

#[async_trait]
impl Store for FilesystemStore {
    async fn persist(&self, data: &SessionData) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        let mut last_seen = self.inner.last_seen.lock().await;
        write_restricted(&self.inner.path, &content).await?;
        *last_seen = Some(content);
        Ok(())
    }

    async fn restore(&self) -> Result<SessionData> {
        let mut last_seen = self.inner.last_seen.lock().await;
        let current = read_optional(&self.inner.path).await?;
        *last_seen = current.clone();
        match current {
            Some(content) => parse_record(&content),
            None => Ok(SessionData::new()),
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut last_seen = self.inner.last_seen.lock().await;
        match tokio::fs::remove_file(&self.inner.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *last_seen = None;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionData> {
        self.inner.changes.subscribe()
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_record(content: &str) -> Result<SessionData> {
    if content.trim().is_empty() {
        return Ok(SessionData::new());
    }
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        other => Err(AuthError::Store(format!(
            "expected a JSON object in session file, found {}",
            other
        ))),
    }
}

async fn write_restricted(path: &Path, content: &str) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
