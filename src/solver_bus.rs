//! Solver bus RPC client.
//!
//! Wraps the relay's JSON envelope: `intents_getQuotes` fetches
//! competing swap options and `intents_publishIntent` submits a signed
//! commitment. The two operations deliberately fail differently:
//! quote fetching degrades to an empty option list (quote absence is a
//! normal market condition), while publishing fails loudly (the caller
//! must know whether a commitment may already be in flight).

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::commitment::SignedCommitment;
use crate::error::IntentError;
use crate::request::QuoteRequest;

/// JSON envelope wrapping every solver bus call.
#[derive(Debug, Serialize)]
struct RpcEnvelope<'a, P: Serialize> {
    method: &'a str,
    params: &'a P,
    id: u32,
}

/// Response envelope from the solver bus.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Serialize)]
struct PublishParams<'a> {
    signed_data: &'a SignedCommitment,
}

/// A candidate quote returned by a solver.
///
/// Only the output amount participates in selection; everything else
/// the solver attached rides along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapOption {
    /// Output amount in on-chain decimal representation
    pub amount_out: String,
    /// Solver-specific metadata
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// HTTP client for the solver bus RPC endpoint.
pub struct SolverBusClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl SolverBusClient {
    /// Create a new solver bus client with the default 30 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new solver bus client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Fetch swap options for a quote request.
    ///
    /// Transport errors, non-success statuses and malformed bodies are
    /// logged and collapse to an empty list: callers treat an empty
    /// list as "no liquidity", never as a fatal error.
    pub fn fetch_options(&self, request: &QuoteRequest) -> Vec<SwapOption> {
        match self.call("intents_getQuotes", request) {
            Ok(result) => match serde_json::from_value::<Vec<SwapOption>>(result) {
                Ok(options) => {
                    debug!("Solver bus returned {} option(s)", options.len());
                    options
                }
                Err(e) => {
                    warn!("Malformed quote response from solver bus: {}", e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Failed to fetch options from solver bus: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Publish a signed commitment to the solver bus.
    ///
    /// Any failure is surfaced verbatim. Publishing is not idempotent:
    /// never retry with the same commitment - a retry requires a fresh
    /// nonce.
    pub fn publish_intent(&self, commitment: &SignedCommitment) -> Result<Value, IntentError> {
        let params = PublishParams {
            signed_data: commitment,
        };
        self.call("intents_publishIntent", &params)
            .map_err(IntentError::Publish)
    }

    /// Issue one enveloped call and unwrap the `result` field.
    fn call<P: Serialize>(&self, method: &str, params: &P) -> Result<Value> {
        let envelope = RpcEnvelope {
            method,
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&envelope)
            .send()
            .with_context(|| format!("Failed to send {} request", method))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Solver bus returned {}: {}", status, body);
        }

        let body: RpcResponse = response
            .json()
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = body.error {
            anyhow::bail!("Solver bus error: {}", error);
        }

        body.result
            .with_context(|| format!("Missing result in {} response", method))
    }
}

/// Select the option with the highest numeric output amount.
///
/// Ties keep the first maximal element. Ranking is rate-only: privacy
/// characteristics of the assets involved do not enter the comparison,
/// even when a shielded asset is on one side of the swap.
pub fn select_best_option(options: &[SwapOption]) -> Result<&SwapOption, IntentError> {
    let mut best: Option<(&SwapOption, u128)> = None;
    for option in options {
        let value = match option.amount_out.parse::<u128>() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring option with unparsable amount_out: {}", option.amount_out);
                0
            }
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((option, value)),
        }
    }
    best.map(|(option, _)| option).ok_or(IntentError::NoOptions)
}
