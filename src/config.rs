//! Configuration management.
//!
//! Loads agent configuration from a TOML file, including the solver
//! bus connection, signing parameters and the asset table. The asset
//! table is extensible through `[[asset]]` entries without code
//! changes; when no config file is present the built-in defaults
//! reproduce the reference NEAR / ZEC / USDC setup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::{default_assets, Asset};

/// Default solver bus RPC endpoint.
pub const SOLVER_BUS_URL: &str = "https://solver-relay-v2.chaindefuser.com/rpc";

/// Contract that verifies published commitments.
pub const VERIFYING_CONTRACT: &str = "intents.near";

/// Default signing deadline window in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 120_000;

/// Main configuration structure for the intents agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Solver bus connection settings
    #[serde(default)]
    pub solver_bus: SolverBusConfig,
    /// Commitment signing settings
    #[serde(default)]
    pub signing: SigningConfig,
    /// Agent account settings
    #[serde(default)]
    pub agent: AgentSettings,
    /// Asset table (use [[asset]] in TOML to extend or replace)
    #[serde(rename = "asset", default = "default_assets")]
    pub assets: Vec<Asset>,
}

/// Solver bus connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverBusConfig {
    /// Solver bus RPC URL
    #[serde(default = "default_solver_bus_url")]
    pub url: String,
    /// Request timeout in seconds for quote and publish calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Commitment signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Contract that verifies published commitments
    #[serde(default = "default_verifying_contract")]
    pub verifying_contract: String,
    /// Deadline window applied to every signed commitment, in
    /// milliseconds from signing time
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

/// Agent account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Path to the NEAR account credentials file
    #[serde(default)]
    pub account_file: Option<String>,
    /// Minimum native balance required at agent startup
    #[serde(default = "default_min_native_balance")]
    pub min_native_balance: Decimal,
}

fn default_solver_bus_url() -> String {
    SOLVER_BUS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verifying_contract() -> String {
    VERIFYING_CONTRACT.to_string()
}

fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE_MS
}

fn default_min_native_balance() -> Decimal {
    Decimal::new(1, 1)
}

impl Default for SolverBusConfig {
    fn default() -> Self {
        Self {
            url: default_solver_bus_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            verifying_contract: default_verifying_contract(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            account_file: None,
            min_native_balance: default_min_native_balance(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            solver_bus: SolverBusConfig::default(),
            signing: SigningConfig::default(),
            agent: AgentSettings::default(),
            assets: default_assets(),
        }
    }
}

impl AgentConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order: explicit `path` argument, then the
    /// `ZEC_INTENTS_CONFIG` environment variable, then
    /// `config/agent.toml`. An explicitly named file must exist; when
    /// only the default location is probed and absent, the built-in
    /// defaults are used.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file
    ///
    /// # Returns
    ///
    /// * `Ok(AgentConfig)` - Loaded (or default) and validated configuration
    /// * `Err(anyhow::Error)` - Missing explicit file, parse failure, or validation failure
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let explicit = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("ZEC_INTENTS_CONFIG").ok());

        let config_path = explicit
            .clone()
            .unwrap_or_else(|| "config/agent.toml".to_string());

        let config = if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if explicit.is_some() {
            return Err(anyhow::anyhow!(
                "Configuration file '{}' not found",
                config_path
            ));
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// This is equivalent to calling `load_from_path(None)`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency.
    ///
    /// Checks:
    /// - Solver bus URL is non-empty
    /// - Timeout and deadline window are positive
    /// - At least one asset with unique symbols and supported precision
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Configuration is valid
    /// * `Err(anyhow::Error)` - Validation failed with error message
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.solver_bus.url.is_empty() {
            return Err(anyhow::anyhow!(
                "Configuration error: solver_bus.url must not be empty"
            ));
        }
        if self.solver_bus.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: solver_bus.timeout_secs must be positive"
            ));
        }
        if self.signing.deadline_ms == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: signing.deadline_ms must be positive"
            ));
        }
        if self.signing.verifying_contract.is_empty() {
            return Err(anyhow::anyhow!(
                "Configuration error: signing.verifying_contract must not be empty"
            ));
        }
        if self.assets.is_empty() {
            return Err(anyhow::anyhow!(
                "Configuration error: at least one [[asset]] must be configured"
            ));
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if asset.symbol.is_empty() {
                return Err(anyhow::anyhow!(
                    "Configuration error: asset {} has an empty symbol",
                    i
                ));
            }
            if asset.decimals > 28 {
                return Err(anyhow::anyhow!(
                    "Configuration error: asset {} has unsupported precision {}",
                    asset.symbol,
                    asset.decimals
                ));
            }
        }
        let mut symbols: Vec<&str> = self.assets.iter().map(|a| a.symbol.as_str()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        if symbols.len() != self.assets.len() {
            return Err(anyhow::anyhow!(
                "Configuration error: duplicate asset symbols configured"
            ));
        }
        if self.assets.iter().filter(|a| a.native).count() > 1 {
            return Err(anyhow::anyhow!(
                "Configuration error: more than one native asset configured"
            ));
        }
        Ok(())
    }
}
