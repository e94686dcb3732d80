//! ZEC agent: the typed operation surface.
//!
//! Owns the account, the asset registry, the solver bus client and the
//! agent-scoped privacy preferences, and exposes the typed operations
//! (`swap`, portfolio reads, preference updates) that any caller - a
//! natural-language layer included - goes through. Startup validates
//! the account and registers its public key with the intents contract,
//! treating an already-registered conflict as success.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::account::{encode_public_key, IntentAccount, IntentSigner};
use crate::assets::{from_on_chain, AssetRegistry};
use crate::chain::{is_already_registered_conflict, BalanceSource, IntentsRegistrar};
use crate::config::AgentConfig;
use crate::error::IntentError;
use crate::portfolio::{FixedRates, PortfolioAnalysis, PortfolioView};
use crate::solver_bus::SolverBusClient;
use crate::swap::{resolve_shielding, PrivacyLevel, SwapEngine, SwapOutcome};

/// Agent-scoped privacy preferences.
///
/// Created at agent initialization and mutated only through
/// [`PrivacyPreferences::apply`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyPreferences {
    /// Privacy level applied when a swap does not pass one explicitly
    pub default_level: PrivacyLevel,
    /// Automatically shield incoming shielded-capable funds
    pub auto_shield: bool,
    /// Include transaction memos in shielded swaps
    pub memos_enabled: bool,
    /// Viewing key references per asset symbol
    pub viewing_keys: HashMap<String, String>,
}

impl Default for PrivacyPreferences {
    fn default() -> Self {
        Self {
            default_level: PrivacyLevel::Shielded,
            auto_shield: true,
            memos_enabled: true,
            viewing_keys: HashMap::new(),
        }
    }
}

/// A partial preferences update.
///
/// Recognized fields replace the current values; anything else in the
/// inbound payload lands in `unknown` and is reported, never silently
/// accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrivacyPreferencesUpdate {
    pub default_level: Option<PrivacyLevel>,
    pub auto_shield: Option<bool>,
    pub memos_enabled: Option<bool>,
    pub viewing_keys: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub unknown: serde_json::Map<String, Value>,
}

impl PrivacyPreferences {
    /// Merge an update into the preferences.
    ///
    /// Returns the names of unrecognized inbound fields; each is also
    /// logged as a warning.
    pub fn apply(&mut self, update: PrivacyPreferencesUpdate) -> Vec<String> {
        for key in update.unknown.keys() {
            warn!("Unknown privacy preference: {}", key);
        }
        if let Some(level) = update.default_level {
            self.default_level = level;
        }
        if let Some(auto_shield) = update.auto_shield {
            self.auto_shield = auto_shield;
        }
        if let Some(memos_enabled) = update.memos_enabled {
            self.memos_enabled = memos_enabled;
        }
        if let Some(viewing_keys) = update.viewing_keys {
            self.viewing_keys = viewing_keys;
        }
        update.unknown.keys().cloned().collect()
    }
}

/// Agent for privacy-preserving swaps and portfolio management over
/// the intents protocol.
pub struct ZecAgent<'r> {
    account: IntentAccount,
    registry: AssetRegistry,
    solver_bus: SolverBusClient,
    balances: Box<dyn BalanceSource>,
    registrar: &'r dyn IntentsRegistrar,
    config: AgentConfig,
    preferences: RwLock<PrivacyPreferences>,
}

impl std::fmt::Debug for ZecAgent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZecAgent").finish_non_exhaustive()
    }
}

impl<'r> ZecAgent<'r> {
    /// Initialize the agent.
    ///
    /// Validates that the account is reachable and carries at least
    /// the configured minimum native balance, then registers the
    /// account's public key with the intents contract. A registration
    /// error reporting an existing registration is success.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated agent configuration
    /// * `account` - Signing account
    /// * `balances` - Chain read collaborator
    /// * `registrar` - Intents registration collaborator
    ///
    /// # Returns
    ///
    /// * `Ok(ZecAgent)` - Initialized agent
    /// * `Err(anyhow::Error)` - Unreachable account, insufficient balance, or registration failure
    pub fn new(
        config: AgentConfig,
        account: IntentAccount,
        balances: Box<dyn BalanceSource>,
        registrar: &'r dyn IntentsRegistrar,
    ) -> Result<Self> {
        let registry = AssetRegistry::from_assets(config.assets.clone())?;
        let solver_bus = SolverBusClient::with_timeout(
            config.solver_bus.url.clone(),
            std::time::Duration::from_secs(config.solver_bus.timeout_secs),
        );

        let agent = Self {
            account,
            registry,
            solver_bus,
            balances,
            registrar,
            config,
            preferences: RwLock::new(PrivacyPreferences::default()),
        };

        agent.validate_account()?;
        agent.register_with_intents()?;
        info!("ZEC agent initialized for account {}", agent.account.account_id());
        Ok(agent)
    }

    /// The agent's account identifier.
    pub fn account_id(&self) -> &str {
        self.account.account_id()
    }

    /// Swap `amount_in` of `token_in` for `token_out`.
    ///
    /// An explicit privacy level overrides the preferences' default
    /// level; only `shielded` with a privacy-capable asset on either
    /// side attaches shielding metadata.
    pub fn swap(
        &self,
        token_in: &str,
        amount_in: Decimal,
        token_out: &str,
        level: Option<PrivacyLevel>,
    ) -> Result<SwapOutcome, IntentError> {
        let asset_in = self.registry.resolve(token_in)?;
        let asset_out = self.registry.resolve(token_out)?;
        if amount_in <= Decimal::ZERO {
            return Err(IntentError::InvalidAmount(amount_in.to_string()));
        }

        let shield_options = {
            let preferences = self.preferences.read().expect("preferences lock poisoned");
            info!(
                "Executing swap: {} {} -> {} with privacy level: {}",
                amount_in,
                token_in,
                token_out,
                level.unwrap_or(preferences.default_level)
            );
            resolve_shielding(level, &preferences, asset_in, asset_out)
        };

        let engine = SwapEngine::new(&self.registry, &self.solver_bus, &self.config.signing);
        engine.swap(&self.account, token_in, amount_in, token_out, shield_options)
    }

    /// Swap a token to ZEC.
    pub fn swap_to_zec(
        &self,
        token_in: &str,
        amount_in: Decimal,
        level: Option<PrivacyLevel>,
    ) -> Result<SwapOutcome, IntentError> {
        self.swap(token_in, amount_in, "ZEC", level)
    }

    /// Swap ZEC to another token.
    pub fn swap_from_zec(
        &self,
        token_out: &str,
        amount_in: Decimal,
        level: Option<PrivacyLevel>,
    ) -> Result<SwapOutcome, IntentError> {
        self.swap("ZEC", amount_in, token_out, level)
    }

    /// Balance of one registered asset.
    pub fn get_balance(&self, symbol: &str) -> Result<Decimal, IntentError> {
        self.portfolio_view().get_balance(symbol)
    }

    /// Balances for every registered asset.
    pub fn get_portfolio(&self) -> BTreeMap<String, Decimal> {
        self.portfolio_view().get_portfolio()
    }

    /// Analyze the current portfolio.
    pub fn analyze_portfolio(&self) -> PortfolioAnalysis {
        self.portfolio_view().analyze()
    }

    /// Update privacy preferences.
    ///
    /// Returns the names of unrecognized fields in the update.
    pub fn set_privacy_preferences(&self, update: PrivacyPreferencesUpdate) -> Vec<String> {
        let mut preferences = self.preferences.write().expect("preferences lock poisoned");
        let unknown = preferences.apply(update);
        info!("Updated privacy preferences: {:?}", *preferences);
        unknown
    }

    /// A snapshot of the current privacy preferences.
    pub fn privacy_preferences(&self) -> PrivacyPreferences {
        self.preferences
            .read()
            .expect("preferences lock poisoned")
            .clone()
    }

    fn portfolio_view(&self) -> PortfolioView<'_> {
        static RATES: FixedRates = FixedRates;
        PortfolioView::new(
            &self.registry,
            self.balances.as_ref(),
            &RATES,
            self.account.account_id(),
        )
    }

    fn validate_account(&self) -> Result<()> {
        let state = self
            .balances
            .account_state(self.account.account_id())
            .with_context(|| {
                format!(
                    "Account {} not found or not accessible",
                    self.account.account_id()
                )
            })?;

        let native = self
            .registry
            .iter()
            .find(|asset| asset.native)
            .context("No native asset configured")?;
        let balance = from_on_chain(&state.native_balance_raw, native)?;
        info!("Account state: balance {} {}", balance, native.symbol);

        if balance < self.config.agent.min_native_balance {
            anyhow::bail!(
                "Insufficient balance ({} {}). Minimum required: {}",
                balance,
                native.symbol,
                self.config.agent.min_native_balance
            );
        }
        Ok(())
    }

    /// Ensure token storage is registered for an asset.
    ///
    /// An upstream error reporting an existing registration is success.
    pub fn ensure_token_storage(&self, symbol: &str) -> Result<()> {
        let asset = self.registry.resolve(symbol)?;
        match self
            .registrar
            .register_token_storage(&asset.token_id, self.account.account_id())
        {
            Ok(()) => {
                info!("Storage registered for {} token", symbol);
                Ok(())
            }
            Err(e) if is_already_registered_conflict(&e) => {
                info!("Storage already registered for {} token", symbol);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to register storage for {}", symbol)),
        }
    }

    fn register_with_intents(&self) -> Result<()> {
        let public_key = encode_public_key(&self.account.public_key());
        match self
            .registrar
            .register_public_key(self.account.account_id(), &public_key)
        {
            Ok(()) => {
                info!(
                    "Public key registered with {}",
                    self.config.signing.verifying_contract
                );
                Ok(())
            }
            Err(e) if is_already_registered_conflict(&e) => {
                info!(
                    "Public key already registered with {}",
                    self.config.signing.verifying_contract
                );
                Ok(())
            }
            Err(e) => Err(e).context("Failed to register public key"),
        }
    }
}
