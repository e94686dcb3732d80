//! Shared test helpers for zec-intents unit tests.
//!
//! Provides constants, a deterministic test account, and in-memory
//! chain collaborators used across the test suite.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use ed25519_dalek::SigningKey;
use zec_intents::{AccountState, BalanceSource, IntentAccount, IntentsRegistrar};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy agent account id
pub const DUMMY_ACCOUNT_ID: &str = "agent.near";

/// Deterministic signing seed for the test account
pub const DUMMY_SEED: [u8; 32] = [7u8; 32];

/// Raw native balance of 5 NEAR in yoctoNEAR
pub const FIVE_NEAR_RAW: &str = "5000000000000000000000000";

/// ZEC token contract id from the default asset table
pub const ZEC_TOKEN_ID: &str = "zcash.factory.bridge.near";

/// USDC token contract id from the default asset table
pub const USDC_TOKEN_ID: &str = "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.factory.bridge.near";

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Deterministic test account.
pub fn test_account() -> IntentAccount {
    IntentAccount::new(DUMMY_ACCOUNT_ID, SigningKey::from_bytes(&DUMMY_SEED))
}

// ============================================================================
// CHAIN COLLABORATORS
// ============================================================================

/// In-memory balance source with per-token raw balances.
///
/// Tokens without an entry fail their query, which exercises the
/// degrade-to-zero path.
pub struct MemoryBalances {
    /// Raw native balance; None makes account_state fail
    pub native_raw: Option<String>,
    /// Raw balances keyed by token contract id
    pub tokens: HashMap<String, String>,
}

impl MemoryBalances {
    pub fn new(native_raw: &str) -> Self {
        Self {
            native_raw: Some(native_raw.to_string()),
            tokens: HashMap::new(),
        }
    }

    pub fn with_token(mut self, token_id: &str, raw: &str) -> Self {
        self.tokens.insert(token_id.to_string(), raw.to_string());
        self
    }
}

impl BalanceSource for MemoryBalances {
    fn account_state(&self, _account_id: &str) -> Result<AccountState> {
        match &self.native_raw {
            Some(raw) => Ok(AccountState {
                native_balance_raw: raw.clone(),
            }),
            None => Err(anyhow::anyhow!("account not found")),
        }
    }

    fn view_token_balance(&self, token_id: &str, _owner_id: &str) -> Result<String> {
        self.tokens
            .get(token_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("balance query timed out for {}", token_id))
    }
}

/// Recording registrar with a configurable failure message.
pub struct RecordingRegistrar {
    /// Error message returned by register calls; None means success
    pub fail_with: Option<String>,
    /// Registered (account, public key) pairs
    pub registered_keys: Mutex<Vec<(String, String)>>,
    /// Registered (token, owner) storage pairs
    pub registered_storage: Mutex<Vec<(String, String)>>,
}

impl RecordingRegistrar {
    pub fn succeeding() -> Self {
        Self {
            fail_with: None,
            registered_keys: Mutex::new(Vec::new()),
            registered_storage: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            registered_keys: Mutex::new(Vec::new()),
            registered_storage: Mutex::new(Vec::new()),
        }
    }
}

impl IntentsRegistrar for RecordingRegistrar {
    fn register_public_key(&self, account_id: &str, public_key: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow::anyhow!("{}", message));
        }
        self.registered_keys
            .lock()
            .unwrap()
            .push((account_id.to_string(), public_key.to_string()));
        Ok(())
    }

    fn register_token_storage(&self, token_id: &str, owner_id: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow::anyhow!("{}", message));
        }
        self.registered_storage
            .lock()
            .unwrap()
            .push((token_id.to_string(), owner_id.to_string()));
        Ok(())
    }
}
