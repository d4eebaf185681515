use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// `"sqlite"` (persistent) or `"memory"` (per-process, mostly for tests).
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

fn default_store_backend() -> String {
    "sqlite".to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./data/handbook.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Window size in words.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in words. Must be < chunk_size.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Context entries retrieved for handbook generation.
    #[serde(default = "default_handbook_k")]
    pub handbook_k: usize,
    /// Context entries retrieved for question answering.
    #[serde(default = "default_answer_k")]
    pub answer_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            handbook_k: default_handbook_k(),
            answer_k: default_answer_k(),
        }
    }
}

fn default_handbook_k() -> usize {
    10
}
fn default_answer_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `"hashing"` (local, deterministic) or `"openai"`.
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            dims: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

fn default_embedding_provider() -> String {
    "hashing".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// `"gemini"` is the only wired provider.
    #[serde(default = "default_backend_provider")]
    pub provider: String,
    #[serde(default = "default_backend_model")]
    pub model: String,
    #[serde(default = "default_backend_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_backend_provider(),
            model: default_backend_model(),
            max_retries: default_backend_retries(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

fn default_backend_provider() -> String {
    "gemini".to_string()
}
fn default_backend_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}
fn default_backend_retries() -> u32 {
    3
}
fn default_backend_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory where assembled handbooks are written.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("handbooks")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load the config file when present, otherwise fall back to defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        let config = Config::default();
        validate(&config)?;
        Ok(config)
    }
}

/// Reject invalid configuration before any indexing work begins.
fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.chunk_size {
        anyhow::bail!(
            "chunking.overlap ({}) must be < chunking.chunk_size ({})",
            config.chunking.overlap,
            config.chunking.chunk_size
        );
    }
    if config.retrieval.handbook_k == 0 || config.retrieval.answer_k == 0 {
        anyhow::bail!("retrieval.handbook_k and retrieval.answer_k must be >= 1");
    }
    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be >= 1");
    }

    match config.store.backend.as_str() {
        "sqlite" | "memory" => {}
        other => anyhow::bail!("Unknown store backend: '{}'. Must be sqlite or memory.", other),
    }

    match config.embedding.provider.as_str() {
        "hashing" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be hashing or openai.",
            other
        ),
    }

    if config.embedding.provider == "openai" {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!("embedding.dims must be > 0 when provider is 'openai'");
        }
        if config.embedding.model.is_none() {
            anyhow::bail!("embedding.model must be specified when provider is 'openai'");
        }
    }

    match config.backend.provider.as_str() {
        "gemini" => {}
        other => anyhow::bail!("Unknown model backend: '{}'. Must be gemini.", other),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn overlap_ge_chunk_size_rejected() {
        let mut config = Config::default();
        config.chunking.chunk_size = 100;
        config.chunking.overlap = 100;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_batch_size_rejected() {
        let mut config = Config::default();
        config.embedding.batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_store_backend_rejected() {
        let mut config = Config::default();
        config.store.backend = "postgres".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn openai_provider_requires_model_and_dims() {
        let mut config = Config::default();
        config.embedding.provider = "openai".to_string();
        assert!(validate(&config).is_err());
        config.embedding.model = Some("text-embedding-3-small".to_string());
        config.embedding.dims = Some(1536);
        validate(&config).unwrap();
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.retrieval.handbook_k, 10);
        assert_eq!(config.embedding.provider, "hashing");
    }
}
