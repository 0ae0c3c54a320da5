//! poa-generator: issuance decisions for PoA aggregators

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poa_generator::{decide, next_round_state, plan, GeneratorConfig};
use poa_lock::{CellRef, PoaSetup, RoundState};
use tracing_subscriber::EnvFilter;

/// Round-robin PoA subblock generator
#[derive(Parser, Debug)]
#[command(name = "poa-generator")]
#[command(about = "Decide when a PoA aggregator may issue its next subblock")]
struct Args {
    /// JSON configuration file (environment variables are used otherwise)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide for one setup/state pair and print the outcome as JSON
    Decide {
        /// PoA setup cell data (hex)
        #[arg(long)]
        setup: String,

        /// Round state cell data (hex)
        #[arg(long)]
        state: String,

        /// Current subtime (median time or tip block number)
        #[arg(long)]
        now: u64,

        /// Own aggregator index (defaults to the configured one)
        #[arg(long)]
        aggregator: Option<u16>,

        /// Reference of the state cell (hex), echoed in the plan
        #[arg(long)]
        state_ref: Option<String>,
    },
}

fn load_config(path: Option<&std::path::Path>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GeneratorConfig::from_json(&raw)?
        }
        None => GeneratorConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &GeneratorConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.with_target(true).try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("installing subscriber: {e}"))
}

fn parse_ref(raw: Option<&str>) -> Result<CellRef> {
    let mut reference = [0u8; 32];
    if let Some(raw) = raw {
        let bytes = hex::decode(raw.trim_start_matches("0x")).context("state ref is not hex")?;
        anyhow::ensure!(bytes.len() == 32, "state ref must be 32 bytes");
        reference.copy_from_slice(&bytes);
    }
    Ok(reference)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config)?;

    match args.command {
        Command::Decide {
            setup,
            state,
            now,
            aggregator,
            state_ref,
        } => {
            let setup_bytes =
                hex::decode(setup.trim_start_matches("0x")).context("setup is not hex")?;
            let state_bytes =
                hex::decode(state.trim_start_matches("0x")).context("state is not hex")?;
            let setup = PoaSetup::decode(&setup_bytes).context("invalid setup")?;
            let state = RoundState::decode(&state_bytes).context("invalid round state")?;
            let own = aggregator.unwrap_or(config.aggregator_index);
            let state_ref = parse_ref(state_ref.as_deref())?;

            let decision = decide(&setup, &state, own, now);
            let planned = plan(&setup, &state, &state_ref, own, now)?;
            tracing::debug!(?decision, own, now, "Decision made");

            let output = serde_json::json!({
                "decision": decision,
                "next_state": next_round_state(&state, decision, own, now),
                "next_state_hex": planned.map(|p| hex::encode(p.next_state.to_bytes())),
                "since": planned.map(|p| format!("0x{:016x}", p.since.0)),
                "state_ref": hex::encode(state_ref),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
