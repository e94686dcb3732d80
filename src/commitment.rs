//! Shielded commitment construction and signing.
//!
//! Builds the canonical quote payload for a token-diff intent, signs
//! it with the account's Ed25519 key, and attaches shielding metadata
//! when privacy is enabled. The serialized payload string is stored
//! verbatim in the commitment: those exact bytes are what the
//! signature covers, and what a verifier re-derives.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::{encode_public_key, encode_signature, IntentSigner};
use crate::assets::{to_on_chain, Asset};
use crate::error::IntentError;

/// Signing standard tag attached to every commitment.
pub const SIGNING_STANDARD: &str = "raw_ed25519";

/// Intent kind for an atomic two-sided balance change.
pub const TOKEN_DIFF_INTENT: &str = "token_diff";

/// Shielding choices for a single swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldingOptions {
    /// Whether the commitment carries shielding metadata
    pub enabled: bool,
    /// Optional transaction memo
    pub memo: Option<String>,
    /// Optional viewing key reference
    pub viewing_key: Option<String>,
}

impl ShieldingOptions {
    /// Options for a transparent swap.
    pub fn transparent() -> Self {
        Self::default()
    }

    /// Options for a shielded swap without memo or viewing key.
    pub fn shielded() -> Self {
        Self {
            enabled: true,
            memo: None,
            viewing_key: None,
        }
    }
}

/// A single atomic balance-change declaration.
///
/// The diff maps protocol asset identifiers to signed on-chain delta
/// strings: negative for debits, positive for credits. Entries keep
/// insertion order; the map layout is part of the signed bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDiffIntent {
    /// Intent kind, always `token_diff`
    pub intent: String,
    /// Asset identifier to signed delta string
    pub diff: serde_json::Map<String, Value>,
}

/// Canonical quote structure whose serialization gets signed.
///
/// Field order is part of the canonical byte layout; do not reorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePayload {
    /// Single-use random value preventing replay
    pub nonce: String,
    /// Account that signs the commitment
    pub signer_id: String,
    /// Contract that verifies the commitment
    pub verifying_contract: String,
    /// Absolute deadline, unix milliseconds as a string
    pub deadline: String,
    /// Ordered list of balance-change intents
    pub intents: Vec<TokenDiffIntent>,
}

/// Shielding metadata attached to a shielded commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldParams {
    /// Always true when present
    pub shielded: bool,
    /// Optional transaction memo
    pub memo: Option<String>,
    /// Optional viewing key reference
    pub viewing_key: Option<String>,
}

/// A signed, privacy-annotated commitment ready for publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCommitment {
    /// Signing standard tag
    pub standard: String,
    /// The exact serialized payload bytes that were signed
    pub payload: String,
    /// `ed25519:`-tagged base58 signature over the payload bytes
    pub signature: String,
    /// `ed25519:`-tagged base58 public key of the signer
    pub public_key: String,
    /// Shielding metadata, present iff privacy was enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_params: Option<ShieldParams>,
}

impl SignedCommitment {
    /// Check the signature against the stored payload bytes and the
    /// embedded public key.
    pub fn verify(&self) -> Result<(), IntentError> {
        let key_bytes = decode_tagged(&self.public_key)?;
        let key_bytes: [u8; 32] = key_bytes
            .as_slice()
            .try_into()
            .map_err(|_| IntentError::Signing("public key is not 32 bytes".to_string()))?;
        let key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| IntentError::Signing(format!("invalid public key: {}", e)))?;

        let sig_bytes = decode_tagged(&self.signature)?;
        let sig_bytes: [u8; 64] = sig_bytes
            .as_slice()
            .try_into()
            .map_err(|_| IntentError::Signing("signature is not 64 bytes".to_string()))?;
        let signature = Signature::from_bytes(&sig_bytes);

        key.verify_strict(self.payload.as_bytes(), &signature)
            .map_err(|e| IntentError::Signing(format!("signature verification failed: {}", e)))
    }
}

fn decode_tagged(value: &str) -> Result<Vec<u8>, IntentError> {
    let encoded = value
        .strip_prefix("ed25519:")
        .ok_or_else(|| IntentError::Signing(format!("missing ed25519 tag in '{}'", value)))?;
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| IntentError::Signing(format!("invalid base58: {}", e)))
}

/// Builds signed token-diff commitments.
pub struct CommitmentBuilder<'a> {
    verifying_contract: &'a str,
    deadline_window_ms: u64,
}

impl<'a> CommitmentBuilder<'a> {
    /// Create a builder for a verifying contract and deadline window.
    pub fn new(verifying_contract: &'a str, deadline_window_ms: u64) -> Self {
        Self {
            verifying_contract,
            deadline_window_ms,
        }
    }

    /// Build and sign a commitment for one swap.
    ///
    /// The input amount is on-chain encoded and negated (debit); the
    /// selected quote's output amount is already on-chain encoded and
    /// is credited verbatim. When no shielding options are supplied,
    /// shielding defaults to enabled iff either asset is
    /// privacy-capable.
    ///
    /// # Arguments
    ///
    /// * `signer` - Account that signs the payload
    /// * `asset_in` - Input asset definition
    /// * `amount_in` - Input amount in human units, strictly positive
    /// * `asset_out` - Output asset definition
    /// * `amount_out` - Selected quote output, on-chain decimal string
    /// * `shield_options` - Explicit shielding choices, or None to default by capability
    ///
    /// # Returns
    ///
    /// * `Ok(SignedCommitment)` - Signed, privacy-annotated commitment
    /// * `Err(IntentError)` - Invalid amounts or signing failure
    pub fn build(
        &self,
        signer: &dyn IntentSigner,
        asset_in: &Asset,
        amount_in: Decimal,
        asset_out: &Asset,
        amount_out: &str,
        shield_options: Option<ShieldingOptions>,
    ) -> Result<SignedCommitment, IntentError> {
        let shield_options = shield_options.unwrap_or_else(|| {
            if asset_in.shielded || asset_out.shielded {
                ShieldingOptions::shielded()
            } else {
                ShieldingOptions::transparent()
            }
        });

        amount_out
            .parse::<u128>()
            .map_err(|_| IntentError::InvalidAmount(amount_out.to_string()))?;

        let debit = format!("-{}", to_on_chain(amount_in, asset_in)?);

        let mut diff = serde_json::Map::new();
        diff.insert(asset_in.asset_id(), Value::String(debit));
        diff.insert(asset_out.asset_id(), Value::String(amount_out.to_string()));

        let payload = QuotePayload {
            nonce: fresh_nonce(),
            signer_id: signer.account_id().to_string(),
            verifying_contract: self.verifying_contract.to_string(),
            deadline: (now_ms() + self.deadline_window_ms).to_string(),
            intents: vec![TokenDiffIntent {
                intent: TOKEN_DIFF_INTENT.to_string(),
                diff,
            }],
        };

        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| IntentError::Signing(format!("payload serialization failed: {}", e)))?;
        let signature = signer.sign(payload_json.as_bytes())?;

        let shield_params = if shield_options.enabled {
            Some(ShieldParams {
                shielded: true,
                memo: shield_options.memo,
                viewing_key: shield_options.viewing_key,
            })
        } else {
            None
        };

        Ok(SignedCommitment {
            standard: SIGNING_STANDARD.to_string(),
            payload: payload_json,
            signature: encode_signature(&signature),
            public_key: encode_public_key(&signer.public_key()),
            shield_params,
        })
    }
}

/// Fresh 256-bit nonce from the OS random source, base64 encoded.
fn fresh_nonce() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}
