use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::search::VectorIndex;
use crate::workspace::Workspace;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workspace: Workspace,
    pub http_client: reqwest::Client,
    /// Last index loaded from or written to disk.
    index: Arc<RwLock<Option<Arc<VectorIndex>>>>,
    /// Serializes every request that reads or rewrites the workspace.
    pub workspace_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let workspace = Workspace::new(config.repo_dir(), config.index_dir());
        workspace.ensure_dirs()?;

        Ok(Self {
            config: Arc::new(config),
            workspace,
            http_client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            index: Arc::new(RwLock::new(None)),
            workspace_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// The current index, loading it from disk on first use.
    pub async fn index(&self) -> anyhow::Result<Arc<VectorIndex>> {
        let cached = self.index.read().clone();
        if let Some(index) = cached {
            return Ok(index);
        }

        let dir = self.workspace.index_dir().to_path_buf();
        let loaded = Arc::new(tokio::task::spawn_blocking(move || VectorIndex::load(&dir)).await??);
        *self.index.write() = Some(loaded.clone());
        Ok(loaded)
    }

    pub fn set_index(&self, index: VectorIndex) {
        *self.index.write() = Some(Arc::new(index));
    }

    /// Forget the in-memory index so the next question reloads from disk.
    pub fn invalidate_index(&self) {
        self.index.write().take();
    }

    pub fn has_cached_index(&self) -> bool {
        self.index.read().is_some()
    }
}
