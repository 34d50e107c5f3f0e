use amazon_ynab::reconcile::{AmbiguityPolicy, DEFAULT_WINDOW_DAYS, MatchConfig, PurchaseSign};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigYnab {
    pub api_token: String,
    /// Defaults to the first budget on the account.
    #[serde(default)]
    pub budget_id: Option<String>,
    pub cache_file: PathBuf,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigAmazon {
    pub transactions_file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigMatching {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,
    #[serde(default)]
    pub purchase_sign: PurchaseSign,
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl Default for ConfigMatching {
    fn default() -> Self {
        ConfigMatching {
            window_days: DEFAULT_WINDOW_DAYS,
            ambiguity: AmbiguityPolicy::default(),
            purchase_sign: PurchaseSign::default(),
        }
    }
}

impl From<&ConfigMatching> for MatchConfig {
    fn from(config: &ConfigMatching) -> Self {
        MatchConfig {
            window_days: config.window_days,
            ambiguity: config.ambiguity,
            purchase_sign: config.purchase_sign,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Report matches without updating any transaction.
    pub dry_run: bool,
    pub ynab: ConfigYnab,
    pub amazon: ConfigAmazon,
    #[serde(default)]
    pub matching: ConfigMatching,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.resolve_paths(&base_dir);

        Ok(config)
    }

    pub fn find_and_load() -> Result<Option<Self>> {
        let config_locations = [
            Path::new("amazon-ynab.toml"),
            Path::new(".amazon-ynab.toml"),
        ];

        for location in &config_locations {
            if location.exists() {
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }

    /// Paths in the config file are relative to the file itself.
    pub(crate) fn resolve_paths(&mut self, base_dir: &Path) {
        self.ynab.cache_file = base_dir.join(&self.ynab.cache_file);
        self.amazon.transactions_file = base_dir.join(&self.amazon.transactions_file);
    }
}
