use crate::types::{SlotKey, TierId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "savingsGroupStudentsV1";
pub const DEFAULT_AMOUNT_TOLERANCE: f64 = 0.001;
pub const CONFIG_FILE_NAME: &str = "ledger.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierConfig {
    pub tier:   TierId,
    pub amount: f64,
    pub rate:   f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    /// Durable slot the member list is written to.
    #[serde(default = "default_storage_key")]
    pub storage_key: SlotKey,
    /// Max absolute difference accepted between the offered and required
    /// contribution at enrollment.
    #[serde(default = "default_amount_tolerance")]
    pub amount_tolerance: f64,
    pub tiers: Vec<TierConfig>,
}

fn default_storage_key() -> SlotKey {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_amount_tolerance() -> f64 {
    DEFAULT_AMOUNT_TOLERANCE
}

impl LedgerConfig {
    /// Load `ledger.json` from `data_dir`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(data_dir).join(CONFIG_FILE_NAME);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        let config: LedgerConfig = serde_json::from_str(&content)?;
        if config.tiers.is_empty() {
            anyhow::bail!("{} defines no tiers", path.display());
        }
        log::debug!(
            "Loaded ledger config from {}: {} tiers, slot '{}'",
            path.display(),
            config.tiers.len(),
            config.storage_key
        );
        Ok(config)
    }

    /// Reference catalog with hardcoded values, for tests and as a fallback
    /// when no config file is present.
    pub fn default_test() -> Self {
        Self {
            storage_key: default_storage_key(),
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
            tiers: vec![
                TierConfig { tier: 1, amount: 10_000.0, rate: 0.05 },
                TierConfig { tier: 2, amount: 20_000.0, rate: 0.10 },
                TierConfig { tier: 3, amount: 30_000.0, rate: 0.20 },
            ],
        }
    }
}
