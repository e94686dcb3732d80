//! NEAR Intents client with shielded Zcash support.
//!
//! Builds token-swap quote requests for the solver bus, selects the
//! best option, signs a canonical token-diff commitment and publishes
//! it. A thin agent layer adds portfolio reads, placeholder analytics
//! and typed privacy preferences.

pub mod account;
pub mod agent;
pub mod assets;
pub mod chain;
pub mod commitment;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod request;
pub mod solver_bus;
pub mod swap;

// Re-export public types for convenience
pub use account::{encode_public_key, encode_signature, IntentAccount, IntentSigner};
pub use agent::{PrivacyPreferences, PrivacyPreferencesUpdate, ZecAgent};
pub use assets::{default_assets, from_on_chain, to_on_chain, Asset, AssetRegistry};
pub use chain::{is_already_registered_conflict, AccountState, BalanceSource, IntentsRegistrar};
pub use commitment::{
    CommitmentBuilder, QuotePayload, ShieldParams, ShieldingOptions, SignedCommitment,
    TokenDiffIntent,
};
pub use config::AgentConfig;
pub use error::IntentError;
pub use portfolio::{FixedRates, PortfolioAnalysis, PortfolioView, RateSource};
pub use request::{IntentRequest, QuoteRequest};
pub use solver_bus::{select_best_option, SolverBusClient, SwapOption};
pub use swap::{resolve_shielding, PrivacyLevel, SwapEngine, SwapOutcome, SwapPhase};
