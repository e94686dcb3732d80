//! Asset registry and on-chain amount codec.
//!
//! Maps human token symbols to on-chain identifiers, decimal precision
//! and shielding capability, and converts between human-readable
//! decimal amounts and the integer fixed-point representation used by
//! the protocol.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Largest mantissa a `Decimal` can carry (96 bits).
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// A token supported by the intents client.
///
/// Immutable once registered; the registry is built at startup and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Human symbol, unique registry key (e.g. "ZEC")
    pub symbol: String,
    /// On-chain token contract identifier
    pub token_id: String,
    /// Bridged OMFT contract identifier, if the token has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omft: Option<String>,
    /// Decimal precision of the on-chain representation
    pub decimals: u32,
    /// Whether the asset supports shielded (privacy-preserving) transfers
    #[serde(default)]
    pub shielded: bool,
    /// Whether this is the chain-native asset, addressed by its bare
    /// symbol instead of a token contract reference
    #[serde(default)]
    pub native: bool,
}

impl Asset {
    /// Protocol-level asset identifier in the form the solver bus expects.
    ///
    /// The native asset is addressed as `near`; every other token by a
    /// `nep141:` contract reference.
    pub fn asset_id(&self) -> String {
        if self.native {
            "near".to_string()
        } else {
            format!("nep141:{}", self.token_id)
        }
    }
}

/// Static symbol-to-asset mapping consulted at every stage that
/// touches a quantity or token identity.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: BTreeMap<String, Asset>,
}

impl AssetRegistry {
    /// Build a registry from a list of asset definitions.
    ///
    /// Rejects duplicate symbols, precision beyond what the amount
    /// codec can represent, and more than one native asset.
    pub fn from_assets(assets: Vec<Asset>) -> Result<Self, IntentError> {
        let mut map = BTreeMap::new();
        let mut natives = 0usize;
        for asset in assets {
            if asset.decimals > 28 {
                return Err(IntentError::Config(format!(
                    "asset {} has unsupported precision {} (max 28)",
                    asset.symbol, asset.decimals
                )));
            }
            if asset.native {
                natives += 1;
                if natives > 1 {
                    return Err(IntentError::Config(
                        "more than one native asset configured".to_string(),
                    ));
                }
            }
            if map.insert(asset.symbol.clone(), asset).is_some() {
                return Err(IntentError::Config(
                    "duplicate asset symbol in registry".to_string(),
                ));
            }
        }
        if map.is_empty() {
            return Err(IntentError::Config("asset registry is empty".to_string()));
        }
        Ok(Self { assets: map })
    }

    /// Registry with the built-in NEAR / ZEC / USDC table.
    pub fn with_defaults() -> Self {
        Self::from_assets(default_assets()).expect("built-in asset table is valid")
    }

    /// Look up an asset by symbol.
    pub fn resolve(&self, symbol: &str) -> Result<&Asset, IntentError> {
        self.assets
            .get(symbol)
            .ok_or_else(|| IntentError::UnsupportedAsset(symbol.to_string()))
    }

    /// All registered assets, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }
}

/// The reference asset table: NEAR (native), ZEC (shielded) and USDC.
pub fn default_assets() -> Vec<Asset> {
    vec![
        Asset {
            symbol: "NEAR".to_string(),
            token_id: "wrap.near".to_string(),
            omft: None,
            decimals: 24,
            shielded: false,
            native: true,
        },
        Asset {
            symbol: "ZEC".to_string(),
            token_id: "zcash.factory.bridge.near".to_string(),
            omft: Some("zcash-token.omft.near".to_string()),
            decimals: 8,
            shielded: true,
            native: false,
        },
        Asset {
            symbol: "USDC".to_string(),
            token_id: "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.factory.bridge.near".to_string(),
            omft: Some("eth-0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.omft.near".to_string()),
            decimals: 6,
            shielded: false,
            native: false,
        },
    ]
}

/// Convert a human-readable amount to the on-chain integer string at
/// the asset's precision.
///
/// Excess fractional digits are truncated toward zero; the same mode
/// applies in both directions, so a round trip recovers the amount
/// within one unit of the smallest denomination.
pub fn to_on_chain(amount: Decimal, asset: &Asset) -> Result<String, IntentError> {
    if amount <= Decimal::ZERO {
        return Err(IntentError::InvalidAmount(amount.to_string()));
    }
    let mantissa = amount.mantissa();
    let scale = amount.scale();
    let value = if scale <= asset.decimals {
        pow10(asset.decimals - scale)
            .and_then(|p| mantissa.checked_mul(p))
            .ok_or_else(|| IntentError::InvalidAmount(amount.to_string()))?
    } else {
        match pow10(scale - asset.decimals) {
            Some(p) => mantissa / p,
            None => 0,
        }
    };
    Ok(value.to_string())
}

/// Convert an on-chain integer string back to a human-readable amount.
///
/// Mantissas beyond `Decimal` range lose least-significant digits
/// (sub-unit precision only); the integer part never fails on
/// magnitude alone.
pub fn from_on_chain(raw: &str, asset: &Asset) -> Result<Decimal, IntentError> {
    let mut value: u128 = raw
        .trim()
        .parse()
        .map_err(|_| IntentError::InvalidAmount(raw.to_string()))?;
    let mut scale = asset.decimals;
    while value > MAX_MANTISSA && scale > 0 {
        value /= 10;
        scale -= 1;
    }
    if value > MAX_MANTISSA {
        return Err(IntentError::InvalidAmount(raw.to_string()));
    }
    Ok(Decimal::from_i128_with_scale(value as i128, scale))
}

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}
