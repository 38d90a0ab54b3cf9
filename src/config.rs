use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the working repo and its index are stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Chunking and retrieval settings
    pub index: IndexConfig,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Remote context compression
    pub compression: CompressionConfig,
    /// Clone timeout in seconds
    pub clone_timeout_secs: u64,
    /// Maximum accepted upload size in MB
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    /// File name suffixes considered indexable
    pub extensions: Vec<String>,
    /// Files larger than this are skipped
    pub max_file_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for answering questions
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Context window passed to the model
    pub num_ctx: u32,
    /// Maximum tokens generated per answer
    pub num_predict: u32,
}

/// Settings for the ScaleDown compression API. Without an API key the
/// context is sent to the LLM uncompressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:8000".to_string(),
            index: IndexConfig::default(),
            llm: LlmConfig::default(),
            compression: CompressionConfig::default(),
            clone_timeout_secs: 300,
            max_upload_mb: 200,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            top_k: 3,
            extensions: [".py", ".js", ".ts", ".java", ".go", ".rs", ".md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: 1_048_576,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "qwen2.5:3b-instruct".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            num_ctx: 4096,
            num_predict: 2048,
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            url: "https://api.scaledown.xyz/compress/raw/".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Build the config from defaults overridden by environment variables.
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("CODEBASE_QA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("CODEBASE_QA_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = parse_env("CODEBASE_QA_CHUNK_SIZE") {
            config.index.chunk_size = v;
        }
        if let Some(v) = parse_env("CODEBASE_QA_CHUNK_OVERLAP") {
            config.index.chunk_overlap = v;
        }
        if let Some(v) = parse_env("CODEBASE_QA_TOP_K") {
            config.index.top_k = v;
        }
        if let Ok(exts) = std::env::var("CODEBASE_QA_EXTENSIONS") {
            config.index.extensions = parse_extensions(&exts);
        }
        if let Some(v) = parse_env("CODEBASE_QA_MAX_FILE_BYTES") {
            config.index.max_file_bytes = v;
        }
        if let Some(v) = parse_env("CODEBASE_QA_CLONE_TIMEOUT_SECS") {
            config.clone_timeout_secs = v;
        }
        if let Some(v) = parse_env("CODEBASE_QA_MAX_UPLOAD_MB") {
            config.max_upload_mb = v;
        }

        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(v) = parse_env("LLM_NUM_CTX") {
            config.llm.num_ctx = v;
        }
        if let Some(v) = parse_env("LLM_NUM_PREDICT") {
            config.llm.num_predict = v;
        }

        if let Ok(url) = std::env::var("SCALEDOWN_URL") {
            config.compression.url = url;
        }
        if let Ok(key) = std::env::var("SCALEDOWN_API_KEY") {
            if !key.trim().is_empty() {
                config.compression.api_key = Some(key);
            }
        }
        if let Some(v) = parse_env("SCALEDOWN_TIMEOUT_SECS") {
            config.compression.timeout_secs = v;
        }

        config
    }

    /// Reject settings that would make chunking or retrieval meaningless.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.index.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        if self.index.chunk_overlap >= self.index.chunk_size {
            anyhow::bail!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.index.chunk_overlap,
                self.index.chunk_size
            );
        }
        if self.index.top_k == 0 {
            anyhow::bail!("top_k must be greater than zero");
        }
        Ok(())
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.data_dir.join("repo")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('.') {
                s.to_string()
            } else {
                format!(".{s}")
            }
        })
        .collect()
}
