use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};

use crate::amount::AmountRange;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisburseConfig {
    pub rpc_url: String,
    pub private_keys: Vec<String>,
    #[serde(default = "default_min_amount")]
    pub min_amount: String,
    #[serde(default = "default_max_amount")]
    pub max_amount: String,
    /// Pause between the end of one sweep and the start of the next
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_recipients_path")]
    pub recipients_path: PathBuf,
    #[serde(default = "default_done_path")]
    pub done_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: Option<PathBuf>,
    #[serde(default = "default_confirmations")]
    pub confirmations: usize,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Base url transaction hashes are appended to, e.g. `https://sepolia.tea.xyz/tx/`
    pub explorer_url: Option<String>,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl DisburseConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = std::fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: DisburseConfig =
            serde_json::from_slice(&config).context("failed to parse config file")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.private_keys.iter().all(|k| k.trim().is_empty()) {
            bail!("privateKeys must contain at least one key");
        }
        if self.confirmations == 0 {
            bail!("confirmations must be at least 1");
        }
        if self.interval_seconds == 0 {
            bail!("intervalSeconds must be at least 1");
        }
        self.amount_range()?;
        Ok(())
    }

    pub fn amount_range(&self) -> Result<AmountRange> {
        AmountRange::parse(&self.min_amount, &self.max_amount)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Private keys with surrounding whitespace and empty entries removed
    pub fn keys(&self) -> Vec<String> {
        self.private_keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            gas_limit: self.gas_limit,
            confirmations: self.confirmations,
            explorer_url: self.explorer_url.clone(),
            symbol: self.symbol.clone(),
        }
    }
}

/// Per-transfer knobs handed to the disburser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub gas_limit: u64,
    pub confirmations: usize,
    pub explorer_url: Option<String>,
    pub symbol: String,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            gas_limit: default_gas_limit(),
            confirmations: default_confirmations(),
            explorer_url: None,
            symbol: default_symbol(),
        }
    }
}

impl TransferSettings {
    pub fn tx_link(&self, tx_hash: &str) -> String {
        match &self.explorer_url {
            Some(base) => format!("{}{tx_hash}", base_normalized(base)),
            None => tx_hash.to_string(),
        }
    }
}

fn base_normalized(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

pub(crate) fn default_min_amount() -> String {
    "0.001".to_string()
}

pub(crate) fn default_max_amount() -> String {
    "0.002".to_string()
}

pub(crate) fn default_interval_seconds() -> u64 {
    5
}

pub(crate) fn default_recipients_path() -> PathBuf {
    PathBuf::from("address.txt")
}

pub(crate) fn default_done_path() -> PathBuf {
    PathBuf::from("done.txt")
}

pub(crate) fn default_log_path() -> Option<PathBuf> {
    Some(PathBuf::from("logs/autosender.log"))
}

pub(crate) fn default_confirmations() -> usize {
    1
}

pub(crate) fn default_gas_limit() -> u64 {
    21_000
}

pub(crate) fn default_symbol() -> String {
    "TEA".to_string()
}
