//! Runtime configuration: defaults, then an optional YAML file named by `DPSCALC_CONFIG`,
//! then individual `DPSCALC_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calc::service::{CalculationServiceError, Calculator, HttpCalculator};
use crate::data::loader::DEFAULT_DATA_DIR;
use crate::reference::source::{FileSource, HttpSource, ReferenceSource, SourceError};
use crate::seed::codec::{Alphabet, Base64Codec, TextCodec};

pub const CONFIG_PATH_VAR: &str = "DPSCALC_CONFIG";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Calculator(#[from] CalculationServiceError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    /// HTTP base for reference data; takes precedence over `data_dir` when set.
    pub data_url: Option<String>,
    pub calculator_url: Option<String>,
    pub seed_alphabet: Alphabet,
    pub http_timeout_secs: u64,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            data_url: None,
            calculator_url: None,
            seed_alphabet: Alphabet::Standard,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    /// Resolve the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env(CONFIG_PATH_VAR).filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(bind) = var("DPSCALC_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = var("DPSCALC_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = var("DPSCALC_DATA_URL") {
            self.data_url = Some(url);
        }
        if let Some(url) = var("DPSCALC_CALCULATOR_URL") {
            self.calculator_url = Some(url);
        }
        if let Some(raw) = var("DPSCALC_SEED_ALPHABET") {
            self.seed_alphabet = raw.parse().map_err(|message| ConfigError::Env {
                var: "DPSCALC_SEED_ALPHABET",
                message,
            })?;
        }
        if let Some(raw) = var("DPSCALC_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = raw.parse().map_err(|_| ConfigError::Env {
                var: "DPSCALC_HTTP_TIMEOUT_SECS",
                message: format!("expected a whole number of seconds, got '{raw}'"),
            })?;
        }
        if let Some(dir) = var("DPSCALC_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn text_codec(&self) -> Arc<dyn TextCodec> {
        Arc::new(Base64Codec::new(self.seed_alphabet))
    }

    pub fn reference_source(&self) -> Result<Arc<dyn ReferenceSource>, ConfigError> {
        Ok(match &self.data_url {
            Some(url) => Arc::new(HttpSource::new(url.as_str(), self.http_timeout())?),
            None => Arc::new(FileSource::new(&self.data_dir)),
        })
    }

    /// The calculator service client, if one is configured.
    pub fn calculator(&self) -> Result<Option<Arc<dyn Calculator>>, ConfigError> {
        match &self.calculator_url {
            Some(url) => {
                let calculator = HttpCalculator::new(url.as_str(), self.http_timeout())?;
                Ok(Some(Arc::new(calculator)))
            }
            None => Ok(None),
        }
    }
}
