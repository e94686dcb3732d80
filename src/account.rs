//! Signer accounts.
//!
//! The commitment builder only needs an identity that can produce an
//! Ed25519 signature over the payload bytes and expose a stable public
//! key; key custody stays behind the `IntentSigner` seam. The
//! file-backed `IntentAccount` loads standard NEAR credential files.

use std::path::Path;

use anyhow::{Context, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::Deserialize;

use crate::error::IntentError;

/// Signing identity used for commitments.
pub trait IntentSigner {
    /// Account identifier embedded in signed payloads.
    fn account_id(&self) -> &str;

    /// Sign a message with the account's private key.
    fn sign(&self, message: &[u8]) -> Result<Signature, IntentError>;

    /// The account's stable public key.
    fn public_key(&self) -> VerifyingKey;
}

/// NEAR-style `ed25519:`-tagged base58 encoding of a public key.
pub fn encode_public_key(key: &VerifyingKey) -> String {
    format!("ed25519:{}", bs58::encode(key.to_bytes()).into_string())
}

/// NEAR-style `ed25519:`-tagged base58 encoding of a signature.
pub fn encode_signature(signature: &Signature) -> String {
    format!("ed25519:{}", bs58::encode(signature.to_bytes()).into_string())
}

/// On-disk NEAR credentials file layout.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    account_id: String,
    #[serde(alias = "secret_key")]
    private_key: String,
}

/// In-memory account backed by an Ed25519 signing key.
pub struct IntentAccount {
    account_id: String,
    signing_key: SigningKey,
}

impl std::fmt::Debug for IntentAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentAccount")
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl IntentAccount {
    /// Create an account from an existing signing key.
    pub fn new(account_id: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            account_id: account_id.into(),
            signing_key,
        }
    }

    /// Create an account from an encoded secret key.
    ///
    /// Accepts the NEAR `ed25519:<base58>` form (32-byte seed or
    /// 64-byte keypair, seed first) and a bare `0x`-prefixed hex seed.
    pub fn from_secret_key(account_id: impl Into<String>, secret: &str) -> Result<Self> {
        let bytes = if let Some(encoded) = secret.strip_prefix("ed25519:") {
            bs58::decode(encoded)
                .into_vec()
                .context("Failed to decode private key from base58")?
        } else if let Some(hex_part) = secret.strip_prefix("0x") {
            hex::decode(hex_part).context("Failed to decode private key from hex")?
        } else {
            anyhow::bail!("Unsupported private key format: expected ed25519:<base58> or 0x<hex>");
        };

        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.as_slice().try_into().unwrap(),
            64 => bytes[..32].try_into().unwrap(),
            len => anyhow::bail!(
                "Invalid private key length: expected 32 or 64 bytes, got {}",
                len
            ),
        };

        Ok(Self::new(account_id, SigningKey::from_bytes(&seed)))
    }

    /// Load an account from a NEAR credentials JSON file.
    ///
    /// The file carries `account_id` and `private_key` (or
    /// `secret_key`) fields as written by NEAR tooling.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read account file: {}", path.display()))?;
        let credentials: CredentialsFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse account file: {}", path.display()))?;
        Self::from_secret_key(credentials.account_id, &credentials.private_key)
    }
}

impl IntentSigner for IntentAccount {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, IntentError> {
        Ok(self.signing_key.sign(message))
    }

    fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}
