use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings read from `lal.toml`. Command-line flags take precedence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON snapshot file backing the ledger.
    pub ledger_path: PathBuf,
    /// Caller token used when `--identity` is not given.
    pub identity: Option<String>,
    /// Write the demonstration assets when the ledger is opened empty.
    pub seed_on_open: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("lal-ledger.json"),
            identity: None,
            seed_on_open: false,
        }
    }
}

impl CliConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
