use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::builder::LabelStyle;
use crate::consts::ID_PREFIX;
use crate::epl::EplSettings;
use crate::print::RawTarget;

pub const CONFIG_ENV: &str = "KITCHEN_LABEL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub id_prefix: String,
    pub style: LabelStyle,
    /// Where print documents are written.
    pub output_dir: PathBuf,
    pub printer: PrinterConfig,
    pub catalog: Catalog,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            id_prefix: ID_PREFIX.to_string(),
            style: LabelStyle::default(),
            output_dir: std::env::temp_dir().join("kitchen-labels"),
            printer: PrinterConfig::default(),
            catalog: Catalog::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Spooler queue name (Windows).
    pub name: Option<String>,
    /// Device node or file; wins over `name`.
    pub device: Option<PathBuf>,
    #[serde(flatten)]
    pub epl: EplSettings,
}

impl PrinterConfig {
    pub fn raw_target(&self) -> Option<RawTarget> {
        match (&self.device, &self.name) {
            (Some(device), _) => Some(RawTarget::Device(device.clone())),
            (None, Some(name)) => Some(RawTarget::Spooler(name.clone())),
            (None, None) => None,
        }
    }
}

/// Form fallbacks shown when the backend has nothing to offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub products: Vec<String>,
    pub staff: Vec<String>,
    pub container_types: Vec<String>,
}

impl LabelConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Explicit path, else `$KITCHEN_LABEL_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_file(path)
            }
            None => {
                warn!("{CONFIG_ENV} not set, using default config");
                Ok(Self::default())
            }
        }
    }
}
