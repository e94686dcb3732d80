//! ZEC intents CLI
//!
//! Entry point for quoting and executing swaps against the solver bus.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin zec_agent -- quote --token-in NEAR --amount 0.5 --token-out ZEC
//! cargo run --bin zec_agent -- swap --token-in NEAR --amount 0.5 --token-out ZEC --privacy-level shielded
//! ```
//!
//! The config path can also be set via environment variable:
//!
//! ```bash
//! ZEC_INTENTS_CONFIG=config/agent.toml cargo run --bin zec_agent -- quote ...
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use zec_intents::{
    resolve_shielding, AgentConfig, AssetRegistry, IntentAccount, IntentRequest, PrivacyLevel,
    PrivacyPreferences, SolverBusClient, SwapEngine,
};

#[derive(Parser, Debug)]
#[command(name = "zec_agent")]
#[command(about = "NEAR Intents client with shielded ZEC swaps")]
struct Args {
    /// Path to agent configuration file (default: config/agent.toml or ZEC_INTENTS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch quotes for a swap and print the best option
    Quote {
        /// Input token symbol
        #[arg(long)]
        token_in: String,
        /// Input amount in human units
        #[arg(long)]
        amount: Decimal,
        /// Output token symbol
        #[arg(long)]
        token_out: String,
    },
    /// Execute a swap: fetch quotes, sign and publish a commitment
    Swap {
        /// Input token symbol
        #[arg(long)]
        token_in: String,
        /// Input amount in human units
        #[arg(long)]
        amount: Decimal,
        /// Output token symbol
        #[arg(long)]
        token_out: String,
        /// Privacy level: default, transparent or shielded
        #[arg(long)]
        privacy_level: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let config = AgentConfig::load_from_path(args.config.as_deref())?;
    let registry = AssetRegistry::from_assets(config.assets.clone())?;
    let solver_bus = SolverBusClient::with_timeout(
        config.solver_bus.url.clone(),
        std::time::Duration::from_secs(config.solver_bus.timeout_secs),
    );

    match args.command {
        Command::Quote {
            token_in,
            amount,
            token_out,
        } => {
            let request = IntentRequest::new(&registry)
                .set_asset_in(&token_in, amount)?
                .set_asset_out(&token_out, None)?
                .serialize()?;
            let options = solver_bus.fetch_options(&request);
            if options.is_empty() {
                println!("No swap options available for {} to {}", token_in, token_out);
                return Ok(());
            }
            info!("Found {} swap option(s)", options.len());
            let best = zec_intents::select_best_option(&options)?;
            println!("{}", serde_json::to_string_pretty(best)?);
        }
        Command::Swap {
            token_in,
            amount,
            token_out,
            privacy_level,
        } => {
            let account_file = config
                .agent
                .account_file
                .clone()
                .context("agent.account_file must be set in the configuration to swap")?;
            let account = IntentAccount::load_from_file(&account_file)?;

            let level = privacy_level
                .as_deref()
                .map(|s| s.parse::<PrivacyLevel>())
                .transpose()?;
            let preferences = PrivacyPreferences::default();
            let asset_in = registry.resolve(&token_in)?;
            let asset_out = registry.resolve(&token_out)?;
            let shield_options = resolve_shielding(level, &preferences, asset_in, asset_out);

            let engine = SwapEngine::new(&registry, &solver_bus, &config.signing);
            let outcome = engine.swap(&account, &token_in, amount, &token_out, shield_options)?;
            println!("{}", serde_json::to_string_pretty(&outcome.relay_result)?);
        }
    }

    Ok(())
}
