/// Configuration module for cpprag.
///
/// Holds chunking parameters, the vector store location, and the embedding
/// model settings. The OpenAI credential is resolved here, once, into an
/// explicit value that gets passed into the provider constructor; it is
/// never read from the environment deep inside a request path.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Fatal configuration problems, reported before any work begins.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set; export your OpenAI API key before embedding or querying")]
    MissingApiKey(&'static str),

    #[error("chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidChunking {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}

// ── Default value functions ──────────────────────────────────────────

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_db_dir() -> String {
    "code_chunks_db".to_string()
}

fn default_model_name() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_db_dir")]
    pub db_dir: String,

    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            db_dir: default_db_dir(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            dimensions: default_dimensions(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }

    /// Resolve the OpenAI API key from the environment.
    ///
    /// Called once at startup by commands that talk to the provider;
    /// absence aborts before any network call or file-system mutation.
    pub fn api_key_from_env() -> Result<String, ConfigError> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
