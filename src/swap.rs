//! Swap orchestration.
//!
//! Drives one swap through the strictly sequential pipeline:
//! request, fetch options, select, sign, publish. There is no backward
//! transition, no retry and no rollback: every attempt is an
//! independently nonced commitment.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::account::IntentSigner;
use crate::agent::PrivacyPreferences;
use crate::assets::{Asset, AssetRegistry};
use crate::commitment::{CommitmentBuilder, ShieldingOptions, SignedCommitment};
use crate::config::SigningConfig;
use crate::error::IntentError;
use crate::request::IntentRequest;
use crate::solver_bus::{select_best_option, SolverBusClient};

/// Pipeline state of one swap attempt. Transitions are strictly
/// forward; `Failed` is reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Building,
    QuotesFetched,
    OptionSelected,
    Signed,
    Published,
    Failed,
}

/// Requested privacy level for a swap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    /// Defer to capability-based defaulting
    #[default]
    Default,
    /// Force a transparent swap
    Transparent,
    /// Shield when a privacy-capable asset is involved
    Shielded,
}

impl FromStr for PrivacyLevel {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "transparent" => Ok(Self::Transparent),
            "shielded" => Ok(Self::Shielded),
            other => Err(IntentError::Config(format!(
                "unknown privacy level: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Transparent => "transparent",
            Self::Shielded => "shielded",
        };
        f.write_str(name)
    }
}

/// Result of a published swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// The commitment that was published
    pub commitment: SignedCommitment,
    /// The relay's publish result, verbatim
    pub relay_result: Value,
}

/// Resolve the effective shielding options for a swap.
///
/// An explicit level wins over the agent's default level. Only
/// `shielded` activates shielding metadata, and only when at least one
/// asset is privacy-capable; any other pairing runs transparent
/// regardless of the requested level. A `default` level returns `None`
/// so the commitment builder applies its capability-based defaulting.
pub fn resolve_shielding(
    level: Option<PrivacyLevel>,
    preferences: &PrivacyPreferences,
    asset_in: &Asset,
    asset_out: &Asset,
) -> Option<ShieldingOptions> {
    let level = level.unwrap_or(preferences.default_level);
    match level {
        PrivacyLevel::Default => None,
        PrivacyLevel::Transparent => Some(ShieldingOptions::transparent()),
        PrivacyLevel::Shielded => {
            if asset_in.shielded || asset_out.shielded {
                let memo = preferences
                    .memos_enabled
                    .then(|| format!("Swap {} to {}", asset_in.symbol, asset_out.symbol));
                Some(ShieldingOptions {
                    enabled: true,
                    memo,
                    viewing_key: None,
                })
            } else {
                Some(ShieldingOptions::transparent())
            }
        }
    }
}

/// Composes the request builder, quote fetch, selection, commitment
/// signing and publishing into the single swap operation.
pub struct SwapEngine<'a> {
    registry: &'a AssetRegistry,
    solver_bus: &'a SolverBusClient,
    signing: &'a SigningConfig,
}

impl<'a> SwapEngine<'a> {
    /// Create an engine over shared components.
    pub fn new(
        registry: &'a AssetRegistry,
        solver_bus: &'a SolverBusClient,
        signing: &'a SigningConfig,
    ) -> Self {
        Self {
            registry,
            solver_bus,
            signing,
        }
    }

    /// Execute one swap: fetch quotes, select the best option, sign a
    /// commitment and publish it.
    ///
    /// An empty quote list terminates with `NoLiquidity` before any
    /// signing occurs; publishing is never attempted in that case.
    ///
    /// # Arguments
    ///
    /// * `signer` - Account signing the commitment
    /// * `token_in` - Input token symbol
    /// * `amount_in` - Input amount in human units, strictly positive
    /// * `token_out` - Output token symbol
    /// * `shield_options` - Resolved shielding choices, or None to default by capability
    ///
    /// # Returns
    ///
    /// * `Ok(SwapOutcome)` - The published commitment and relay result
    /// * `Err(IntentError)` - A single categorized failure
    pub fn swap(
        &self,
        signer: &dyn IntentSigner,
        token_in: &str,
        amount_in: Decimal,
        token_out: &str,
        shield_options: Option<ShieldingOptions>,
    ) -> Result<SwapOutcome, IntentError> {
        let mut phase = SwapPhase::Building;
        debug!(?phase, "Starting swap {} {} -> {}", amount_in, token_in, token_out);

        let asset_in = self.registry.resolve(token_in)?;
        let asset_out = self.registry.resolve(token_out)?;
        if amount_in <= Decimal::ZERO {
            return Err(IntentError::InvalidAmount(amount_in.to_string()));
        }

        let request = IntentRequest::new(self.registry)
            .set_asset_in(token_in, amount_in)?
            .set_asset_out(token_out, None)?
            .serialize()?;

        let options = self.solver_bus.fetch_options(&request);
        if options.is_empty() {
            debug!(phase = ?SwapPhase::Failed, "No options returned");
            return Err(IntentError::NoLiquidity {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
            });
        }
        phase = SwapPhase::QuotesFetched;
        info!(?phase, "Found {} swap option(s)", options.len());

        let best = select_best_option(&options)?;
        phase = SwapPhase::OptionSelected;
        info!(?phase, "Selected best option: {} out", best.amount_out);

        let builder =
            CommitmentBuilder::new(&self.signing.verifying_contract, self.signing.deadline_ms);
        let commitment = builder.build(
            signer,
            asset_in,
            amount_in,
            asset_out,
            &best.amount_out,
            shield_options,
        )?;
        phase = SwapPhase::Signed;
        debug!(?phase, shielded = commitment.shield_params.is_some());

        let relay_result = self.solver_bus.publish_intent(&commitment)?;
        phase = SwapPhase::Published;
        info!(?phase, "Swap request submitted successfully");

        Ok(SwapOutcome {
            commitment,
            relay_result,
        })
    }
}
