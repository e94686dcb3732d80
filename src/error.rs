//! Error types for the intents client.

use thiserror::Error;

/// Failure categories surfaced by the swap pipeline and agent surface.
///
/// Asset and amount validation errors are always raised before any
/// network call. Quote-fetch transport failures never appear here:
/// they degrade to an empty option list (absence of quotes is a normal
/// market condition). Publish failures always propagate - a commitment
/// may already be in flight, so the caller must see them verbatim.
#[derive(Error, Debug)]
pub enum IntentError {
    /// Symbol is not in the asset registry.
    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),

    /// Amount is non-positive or not representable at the asset's precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The solver bus returned zero options for the requested pair.
    /// Recoverable; the caller may retry later.
    #[error("no swap options available for {token_in} to {token_out}")]
    NoLiquidity { token_in: String, token_out: String },

    /// Option selection was invoked on an empty list.
    #[error("no options provided")]
    NoOptions,

    /// The signer rejected or failed to sign the commitment payload.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The relay rejected the commitment or transport failed during
    /// submission. Never auto-retried: a retry requires a fresh nonce.
    #[error("failed to publish intent: {0}")]
    Publish(anyhow::Error),

    /// Malformed configuration, account material, or request state.
    #[error("configuration error: {0}")]
    Config(String),
}
