use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ChecklistError, Result};
use crate::util::SecretString;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_keys: ApiKeysConfig,

    /// Where exported markdown/json files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Where the project database lives
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_max_results")]
    pub max_results_per_source: usize,

    /// Upper bound for a single provider call; a slower provider contributes nothing
    #[serde(default = "default_timeout")]
    pub provider_timeout_secs: u64,

    #[serde(default)]
    pub web: WebSearchConfig,
    #[serde(default)]
    pub papers: PaperSearchConfig,
    #[serde(default)]
    pub tech: TechSearchConfig,
    #[serde(default)]
    pub apis: ApiSearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Names of the environment variables holding API keys. The keys themselves
/// never live in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    #[serde(default = "default_github_env")]
    pub github_env: Option<String>,
    #[serde(default = "default_public_data_env")]
    pub public_data_env: Option<String>,
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            github_env: default_github_env(),
            public_data_env: default_public_data_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_semantic_scholar_url")]
    pub semantic_scholar_url: String,
    #[serde(default = "default_crossref_url")]
    pub crossref_url: String,
    #[serde(default = "default_arxiv_url")]
    pub arxiv_url: String,
}

impl Default for PaperSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            semantic_scholar_url: default_semantic_scholar_url(),
            crossref_url: default_crossref_url(),
            arxiv_url: default_arxiv_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_github_url")]
    pub github_url: String,
    #[serde(default = "default_npm_url")]
    pub npm_url: String,
    #[serde(default = "default_min_stars")]
    pub github_min_stars: u64,
}

impl Default for TechSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            github_url: default_github_url(),
            npm_url: default_npm_url(),
            github_min_stars: default_min_stars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ApiSearchConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_github_env() -> Option<String> {
    Some("GITHUB_TOKEN".to_string())
}

fn default_public_data_env() -> Option<String> {
    Some("PUBLIC_DATA_API_KEY".to_string())
}

fn default_semantic_scholar_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_crossref_url() -> String {
    "https://api.crossref.org".to_string()
}

fn default_arxiv_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_npm_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_min_stars() -> u64 {
    10
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Load config from the working directory or user config directory
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // An explicit path must exist and parse
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path);
        }

        if let Ok(config) = Self::load_from_path("safecheck.toml") {
            debug!("Loaded config from ./safecheck.toml");
            return Ok(config);
        }

        if let Some(config_path) = Self::user_config_path() {
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    /// `<config_dir>/safecheck/config.toml`, if the platform has a config dir
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("safecheck").join("config.toml"))
    }

    /// Where `config set` writes: the explicit path, else whichever search
    /// location already exists, else `./safecheck.toml`.
    pub fn write_path(path: Option<&str>) -> PathBuf {
        if let Some(p) = path {
            return PathBuf::from(p);
        }
        let local = PathBuf::from("safecheck.toml");
        if local.exists() {
            return local;
        }
        match Self::user_config_path() {
            Some(user) if user.exists() => user,
            _ => local,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Set a scalar value by dotted key (e.g. `tech.github_min_stars`).
    /// The value is parsed as TOML when possible, otherwise taken as a string.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut doc = toml::Value::try_from(&*self)?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| ChecklistError::config("empty config key"))?;

        let mut current = &mut doc;
        for part in parents {
            current = current
                .as_table_mut()
                .and_then(|t| t.get_mut(*part))
                .ok_or_else(|| ChecklistError::config(format!("unknown config key: {}", key)))?;
        }
        let table = current
            .as_table_mut()
            .ok_or_else(|| ChecklistError::config(format!("not a table: {}", key)))?;
        if !table.contains_key(*last) {
            return Err(ChecklistError::config(format!("unknown config key: {}", key)));
        }

        let parsed = parse_scalar(value);
        table.insert(last.to_string(), parsed);

        *self = doc
            .try_into()
            .map_err(|e: toml::de::Error| ChecklistError::config(e.to_string()))?;
        Ok(())
    }

    pub fn github_token(&self) -> Option<SecretString> {
        read_key(self.api_keys.github_env.as_deref())
    }

    pub fn public_data_key(&self) -> Option<SecretString> {
        read_key(self.api_keys.public_data_env.as_deref())
    }

    pub fn db_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join("projects.db")
    }
}

/// Missing or empty variables mean "no key"; providers degrade instead of failing.
fn read_key(env_var: Option<&str>) -> Option<SecretString> {
    let name = env_var?;
    if name.eq_ignore_ascii_case("none") {
        return None;
    }
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn parse_scalar(value: &str) -> toml::Value {
    if let Ok(b) = value.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = value.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(value.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeysConfig::default(),
            output_dir: default_output_dir(),
            data_dir: default_data_dir(),
            max_results_per_source: default_max_results(),
            provider_timeout_secs: default_timeout(),
            web: WebSearchConfig::default(),
            papers: PaperSearchConfig::default(),
            tech: TechSearchConfig::default(),
            apis: ApiSearchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
