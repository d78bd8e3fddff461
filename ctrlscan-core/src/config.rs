// On-disk configuration (config.toml in the config directory)

use crate::catalog::{DEFAULT_FILE_SUFFIX, PersistMode, RedirectPolicy, ScanOptions};
use crate::error::{CatalogError, Result};
use ctrlscan_scanner::CaseMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "ctrlscan.db";
pub const DEFAULT_CONFIG_DIR: &str = "~/.config/ctrlscan/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Default root for `scan` when none is given
    pub root: Option<PathBuf>,
    pub directive_root: Option<PathBuf>,
    pub file_suffix: String,
    pub lowercase_directives: bool,
    pub redirect_policy: RedirectPolicy,
    pub batched: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: None,
            directive_root: None,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            lowercase_directives: false,
            redirect_policy: RedirectPolicy::default(),
            batched: false,
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CatalogError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CatalogError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            file_suffix: self.scan.file_suffix.clone(),
            directive_root: self.scan.directive_root.clone(),
            directive_case: if self.scan.lowercase_directives {
                CaseMode::Lowercase
            } else {
                CaseMode::Preserve
            },
            redirect_policy: self.scan.redirect_policy,
            persist_mode: if self.scan.batched {
                PersistMode::Batched
            } else {
                PersistMode::Incremental
            },
        }
    }
}
