//! Portfolio reads and analysis.
//!
//! Per-asset balance queries degrade to zero with a logged warning so
//! a single failing asset never aborts a full portfolio read. The
//! analysis values use fixed placeholder exchange rates behind the
//! `RateSource` seam; a real price oracle plugs in there.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::assets::{from_on_chain, Asset, AssetRegistry};
use crate::chain::BalanceSource;
use crate::error::IntentError;

/// Exchange rate lookup in the reference unit (NEAR).
pub trait RateSource {
    /// How many reference units one token of the asset is worth.
    fn rate_in_reference(&self, asset: &Asset) -> Decimal;
}

/// Hard-coded placeholder rates, not a live price feed.
pub struct FixedRates;

impl RateSource for FixedRates {
    fn rate_in_reference(&self, asset: &Asset) -> Decimal {
        match asset.symbol.as_str() {
            "NEAR" => Decimal::ONE,
            "ZEC" => Decimal::from(10),
            "USDC" => Decimal::new(25, 2),
            _ => Decimal::ZERO,
        }
    }
}

/// Portfolio analysis results.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAnalysis {
    /// Balance per symbol
    pub portfolio: BTreeMap<String, Decimal>,
    /// Total value in the reference unit
    pub total_value: Decimal,
    /// Percentage of total value per symbol
    pub distributions: BTreeMap<String, Decimal>,
    /// Percentage of total value held in privacy-capable assets
    pub privacy_ratio: Decimal,
}

/// Read-only portfolio view over a balance source.
pub struct PortfolioView<'a> {
    registry: &'a AssetRegistry,
    balances: &'a dyn BalanceSource,
    rates: &'a dyn RateSource,
    account_id: &'a str,
}

impl<'a> PortfolioView<'a> {
    /// Create a view for one account.
    pub fn new(
        registry: &'a AssetRegistry,
        balances: &'a dyn BalanceSource,
        rates: &'a dyn RateSource,
        account_id: &'a str,
    ) -> Self {
        Self {
            registry,
            balances,
            rates,
            account_id,
        }
    }

    /// Get the balance of one registered asset.
    ///
    /// An unregistered symbol is an error; a failing balance query is
    /// not - it degrades to zero with a logged warning.
    pub fn get_balance(&self, symbol: &str) -> Result<Decimal, IntentError> {
        let asset = self.registry.resolve(symbol)?;
        Ok(self.balance_of(asset))
    }

    /// Balances for every registered asset, in symbol order.
    pub fn get_portfolio(&self) -> BTreeMap<String, Decimal> {
        debug!("Reading portfolio for {}", self.account_id);
        self.registry
            .iter()
            .map(|asset| (asset.symbol.clone(), self.balance_of(asset)))
            .collect()
    }

    /// Analyze the current portfolio: total value, distribution and
    /// privacy ratio, all in the placeholder reference rates.
    pub fn analyze(&self) -> PortfolioAnalysis {
        let portfolio = self.get_portfolio();

        let mut total_value = Decimal::ZERO;
        let mut privacy_value = Decimal::ZERO;
        let mut values = BTreeMap::new();
        for asset in self.registry.iter() {
            let balance = portfolio
                .get(&asset.symbol)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let value = balance * self.rates.rate_in_reference(asset);
            total_value += value;
            if asset.shielded {
                privacy_value += value;
            }
            values.insert(asset.symbol.clone(), value);
        }

        let hundred = Decimal::from(100);
        let mut distributions = BTreeMap::new();
        if total_value > Decimal::ZERO {
            for (symbol, value) in &values {
                distributions.insert(symbol.clone(), value / total_value * hundred);
            }
        }
        let privacy_ratio = if total_value > Decimal::ZERO {
            privacy_value / total_value * hundred
        } else {
            Decimal::ZERO
        };

        PortfolioAnalysis {
            portfolio,
            total_value,
            distributions,
            privacy_ratio,
        }
    }

    fn balance_of(&self, asset: &Asset) -> Decimal {
        let raw = if asset.native {
            self.balances
                .account_state(self.account_id)
                .map(|state| state.native_balance_raw)
        } else {
            self.balances
                .view_token_balance(&asset.token_id, self.account_id)
        };

        let result = raw.and_then(|raw| from_on_chain(&raw, asset).map_err(anyhow::Error::new));
        match result {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Failed to get balance for {}: {:#}", asset.symbol, e);
                Decimal::ZERO
            }
        }
    }
}
