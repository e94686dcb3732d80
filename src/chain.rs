//! Chain boundary collaborators.
//!
//! The client reads account state and token balances, and performs
//! one-time registration setup, through these traits. The chain RPC
//! implementation itself lives outside this crate.

use anyhow::Result;

/// Account state snapshot from the chain.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// Native balance in the chain's raw integer representation
    pub native_balance_raw: String,
}

/// Read access to account and token balances.
pub trait BalanceSource {
    /// Fetch the account's state, including its raw native balance.
    fn account_state(&self, account_id: &str) -> Result<AccountState>;

    /// Fetch a token balance as the raw on-chain decimal string.
    fn view_token_balance(&self, token_id: &str, owner_id: &str) -> Result<String>;
}

/// One-time registration setup against the intents contract.
///
/// Neither call is idempotent upstream: re-registering reports an
/// error whose text marks the existing registration. Callers route
/// those errors through [`is_already_registered_conflict`] and treat a
/// match as success.
pub trait IntentsRegistrar {
    /// Register the account's public key with the intents contract.
    fn register_public_key(&self, account_id: &str, public_key: &str) -> Result<()>;

    /// Register token storage for an account.
    fn register_token_storage(&self, token_id: &str, owner_id: &str) -> Result<()>;
}

/// Whether an upstream registration error reports an existing
/// registration.
///
/// The upstream API has no structured conflict code; the recognizable
/// phrasings are matched here and nowhere else.
pub fn is_already_registered_conflict(error: &anyhow::Error) -> bool {
    let text = format!("{:#}", error).to_lowercase();
    text.contains("already registered") || text.contains("public key already exists")
}
