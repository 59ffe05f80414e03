//! Persistence for the todo collection.
//!
//! The service only sees [`TodoStore`]; the JSON file backend is what the
//! binary runs with, the memory backend is what tests swap in.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::models::TodoCollection;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn load(&self) -> Result<TodoCollection, StoreError>;
    async fn save(&self, collection: &TodoCollection) -> Result<(), StoreError>;
}

/// Whole collection kept as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store at `path`, seeding an empty document if the file does
    /// not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        if !fs::try_exists(&store.path).await? {
            info!(path = %store.path.display(), "creating empty todo file");
            store.save(&TodoCollection::default()).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "todos.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TodoStore for JsonFileStore {
    async fn load(&self) -> Result<TodoCollection, StoreError> {
        let bytes = fs::read(&self.path).await?;
        let collection: TodoCollection = serde_json::from_slice(&bytes)?;
        debug!(count = collection.todos.len(), "loaded todos");
        Ok(collection)
    }

    async fn save(&self, collection: &TodoCollection) -> Result<(), StoreError> {
        // serde_json's pretty printer indents with two spaces
        let mut data = serde_json::to_vec_pretty(collection)?;
        data.push(b'\n');

        // write beside the target then swap, so a failed write keeps the old file
        let staging = self.staging_path();
        if let Err(err) = fs::write(&staging, &data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(err.into());
        }
        debug!(count = collection.todos.len(), "saved todos");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<TodoCollection>,
    failing: AtomicBool,
    failing_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new(collection: TodoCollection) -> Self {
        Self {
            inner: RwLock::new(collection),
            failing: AtomicBool::new(false),
            failing_saves: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent load and save fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Lets loads through but fails every save.
    pub fn set_failing_saves(&self, failing: bool) {
        self.failing_saves.store(failing, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> TodoCollection {
        self.inner.read().await.clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn load(&self) -> Result<TodoCollection, StoreError> {
        self.check()?;
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, collection: &TodoCollection) -> Result<(), StoreError> {
        self.check()?;
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("saves switched off".into()));
        }
        *self.inner.write().await = collection.clone();
        Ok(())
    }
}
