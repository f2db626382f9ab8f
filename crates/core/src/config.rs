//! Configuration management for the ragpilot CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - A `.env` file in the current directory
//! - Config file (`.ragpilot/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. All persisted state lives under `<workspace>/.ragpilot/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the Gemini credential by default.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default generation model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "gemini-embedding-001";

/// Generation providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 1] = ["gemini"];

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["gemini", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .ragpilot/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider (e.g., "gemini")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Embedding provider ("gemini" or "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Optional custom API endpoint
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// API key, if one was found
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Chunking and retrieval settings
    pub knowledge: KnowledgeSettings,
}

/// Chunking and retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSettings {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive windows in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved from the best-practices corpus
    #[serde(default = "default_top_k")]
    pub top_k_best: usize,

    /// Chunks retrieved from the code corpus
    #[serde(default = "default_top_k")]
    pub top_k_code: usize,

    /// Extensions accepted by `ingest-code` when `--ext` is not given
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,

    /// Texts per embedding request
    #[serde(default = "default_batch_size")]
    pub embed_batch_size: usize,
}

fn default_chunk_size() -> usize {
    1200
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

fn default_code_extensions() -> Vec<String> {
    vec![".py".to_string(), ".md".to_string()]
}

fn default_batch_size() -> usize {
    100
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k_best: default_top_k(),
            top_k_code: default_top_k(),
            code_extensions: default_code_extensions(),
            embed_batch_size: default_batch_size(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    knowledge: Option<KnowledgeSettings>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    embedding_provider: Option<String>,
    embedding_model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_provider: "gemini".to_string(),
            embedding_model: DEFAULT_EMBED_MODEL.to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            knowledge: KnowledgeSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `RAGPILOT_WORKSPACE`: Override workspace path
    /// - `RAGPILOT_CONFIG`: Path to config file
    /// - `GEMINI_API_KEY` (or the variable named by `llm.apiKeyEnv`): API key
    /// - `GEMINI_CHAT_MODEL`: Generation model
    /// - `GEMINI_EMBED_MODEL`: Embedding model
    /// - `GEMINI_ENDPOINT`: Custom API endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ragpilot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with workspace and config file given on the
    /// command line. These win over `RAGPILOT_WORKSPACE` / `RAGPILOT_CONFIG`
    /// and decide which config file is read.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is fine; a malformed one is not silently ignored.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("Failed to read .env file: {}", e)));
            }
        }

        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("RAGPILOT_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("RAGPILOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            config.config_file = Some(config_file);
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("GEMINI_CHAT_MODEL") {
            config.model = model;
        }

        if let Ok(model) = std::env::var("GEMINI_EMBED_MODEL") {
            config.embedding_model = model;
        }

        if let Ok(endpoint) = std::env::var("GEMINI_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        config.api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Path of the YAML config file (explicit or workspace default).
    pub fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.ragpilot_dir().join("config.yaml"),
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(provider) = llm.embedding_provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = llm.embedding_model {
                result.embedding_model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env) = llm.api_key_env {
                result.api_key_env = env;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        model: Option<String>,
        embedding_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(embedding_model) = embedding_model {
            self.embedding_model = embedding_model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .ragpilot directory.
    pub fn ragpilot_dir(&self) -> PathBuf {
        self.workspace.join(".ragpilot")
    }

    /// Validate provider names and knowledge settings.
    pub fn validate(&self) -> AppResult<()> {
        if !self.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                self.workspace
            )));
        }

        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let k = &self.knowledge;
        if k.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
        }
        if k.chunk_overlap >= k.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                k.chunk_overlap, k.chunk_size
            )));
        }
        if k.embed_batch_size == 0 {
            return Err(AppError::Config(
                "embedBatchSize must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.embedding_model, DEFAULT_EMBED_MODEL);
        assert_eq!(config.knowledge.chunk_size, 1200);
        assert_eq!(config.knowledge.chunk_overlap, 200);
        assert_eq!(config.knowledge.top_k_best, 4);
        assert!(!config.verbose);
    }

    #[test]
    fn test_ragpilot_dir() {
        let config = AppConfig::default();
        assert!(config.ragpilot_dir().ends_with(".ragpilot"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("gemini-2.5-pro".to_string()),
            None,
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "gemini-2.5-pro");
        assert_eq!(overridden.embedding_model, DEFAULT_EMBED_MODEL);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_not_smaller_than_size() {
        let mut config = AppConfig::default();
        config.knowledge.chunk_overlap = config.knowledge.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: gemini-2.5-pro
  embeddingProvider: mock
  apiKeyEnv: MY_KEY
knowledge:
  chunkSize: 800
  chunkOverlap: 100
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "gemini-2.5-pro");
        assert_eq!(merged.provider, "gemini");
        assert_eq!(merged.embedding_provider, "mock");
        assert_eq!(merged.api_key_env, "MY_KEY");
        assert_eq!(merged.knowledge.chunk_size, 800);
        assert_eq!(merged.knowledge.chunk_overlap, 100);
        assert_eq!(merged.knowledge.top_k_code, 4);
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_with_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "knowledge:\n  chunkSize: 640\n  chunkOverlap: 64\n").unwrap();

        let config =
            AppConfig::load_with(Some(temp.path().to_path_buf()), Some(path.clone())).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.config_path(), path);
        assert_eq!(config.knowledge.chunk_size, 640);
        assert_eq!(config.knowledge.chunk_overlap, 64);
    }
}
