//! Swap quote request builder.
//!
//! Accumulates input/output asset, amount, deadline and slippage into
//! the serialized structure the solver bus quote endpoint expects.
//! Pure transformation; all asset and amount validation happens here,
//! before any network call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::{to_on_chain, AssetRegistry};
use crate::config::DEFAULT_DEADLINE_MS;
use crate::error::IntentError;

/// Serialized quote request in the wire shape of the solver bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Protocol asset identifiers for both sides of the swap
    pub assets: RequestAssets,
    /// On-chain encoded amounts ("out" present only when a target was set)
    pub amounts: RequestAmounts,
    /// Deadline descriptor, relative to submission time
    pub deadline: RequestDeadline,
    /// Slippage tolerance, present only when explicitly set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage: Option<f64>,
}

/// Asset identifier group of a quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestAssets {
    /// Input side protocol asset identifier
    #[serde(rename = "in")]
    pub asset_in: String,
    /// Output side protocol asset identifier
    #[serde(rename = "out")]
    pub asset_out: String,
}

/// Amount group of a quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestAmounts {
    /// On-chain encoded input amount
    #[serde(rename = "in")]
    pub amount_in: String,
    /// On-chain encoded target output amount, if one was requested
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<String>,
}

/// Deadline descriptor of a quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDeadline {
    /// Deadline type; always "relative"
    #[serde(rename = "type")]
    pub kind: String,
    /// Milliseconds from submission time
    pub ms: u64,
}

/// Builder for intent quote requests.
///
/// Both setters resolve their symbol against the registry up front, so
/// an unsupported asset is rejected before the request ever reaches
/// the network.
#[derive(Debug, Clone)]
pub struct IntentRequest<'a> {
    registry: &'a AssetRegistry,
    asset_in: Option<String>,
    amount_in: Option<String>,
    asset_out: Option<String>,
    amount_out: Option<String>,
    min_deadline_ms: u64,
    slippage: Option<f64>,
}

impl<'a> IntentRequest<'a> {
    /// Create an empty request bound to an asset registry.
    pub fn new(registry: &'a AssetRegistry) -> Self {
        Self {
            registry,
            asset_in: None,
            amount_in: None,
            asset_out: None,
            amount_out: None,
            min_deadline_ms: DEFAULT_DEADLINE_MS,
            slippage: None,
        }
    }

    /// Override the relative deadline window.
    pub fn with_deadline_ms(mut self, ms: u64) -> Self {
        self.min_deadline_ms = ms;
        self
    }

    /// Set the input asset and amount (human units, strictly positive).
    pub fn set_asset_in(mut self, symbol: &str, amount: Decimal) -> Result<Self, IntentError> {
        let asset = self.registry.resolve(symbol)?;
        if amount <= Decimal::ZERO {
            return Err(IntentError::InvalidAmount(amount.to_string()));
        }
        self.amount_in = Some(to_on_chain(amount, asset)?);
        self.asset_in = Some(asset.asset_id());
        Ok(self)
    }

    /// Set the output asset and an optional target amount.
    pub fn set_asset_out(
        mut self,
        symbol: &str,
        amount: Option<Decimal>,
    ) -> Result<Self, IntentError> {
        let asset = self.registry.resolve(symbol)?;
        if let Some(amount) = amount {
            if amount <= Decimal::ZERO {
                return Err(IntentError::InvalidAmount(amount.to_string()));
            }
            self.amount_out = Some(to_on_chain(amount, asset)?);
        }
        self.asset_out = Some(asset.asset_id());
        Ok(self)
    }

    /// Set an explicit slippage tolerance.
    pub fn set_slippage(mut self, slippage: f64) -> Self {
        self.slippage = Some(slippage);
        self
    }

    /// Serialize into the solver bus wire shape.
    ///
    /// Fails when either side of the swap has not been set.
    pub fn serialize(&self) -> Result<QuoteRequest, IntentError> {
        let asset_in = self
            .asset_in
            .clone()
            .ok_or_else(|| IntentError::Config("input asset not set".to_string()))?;
        let amount_in = self
            .amount_in
            .clone()
            .ok_or_else(|| IntentError::Config("input amount not set".to_string()))?;
        let asset_out = self
            .asset_out
            .clone()
            .ok_or_else(|| IntentError::Config("output asset not set".to_string()))?;

        Ok(QuoteRequest {
            assets: RequestAssets {
                asset_in,
                asset_out,
            },
            amounts: RequestAmounts {
                amount_in,
                amount_out: self.amount_out.clone(),
            },
            deadline: RequestDeadline {
                kind: "relative".to_string(),
                ms: self.min_deadline_ms,
            },
            slippage: self.slippage,
        })
    }
}
