//! adsettle daemon: command-line entry point for the contract engine.

use std::path::PathBuf;
use std::sync::Arc;

use adsettle_crypto::{generate_keypair, Ed25519Signer};
use adsettle_evidence::HttpEvidenceFetcher;
use adsettle_node::{init_logging, Engine, EngineConfig, LogFormat};
use adsettle_store_lmdb::{LmdbEnvironment, LmdbStateStore};
use adsettle_types::SystemClock;
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "adsettle", about = "Multi-party advertising contract engine")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ADSETTLE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "ADSETTLE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Identity the operation runs as (required for `invoke`).
    #[arg(long, env = "ADSETTLE_CALLER")]
    caller: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ADSETTLE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ADSETTLE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seconds escrowed funds stay locked.
    #[arg(long, env = "ADSETTLE_ESCROW_LOCK_SECS")]
    escrow_lock_secs: Option<u64>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run one named operation, e.g. `invoke generatorContract media ac1,ac2 ...`.
    Invoke {
        /// Operation name.
        op: String,
        /// Operation arguments, in order.
        args: Vec<String>,
    },
    /// Print the effective configuration as TOML.
    Config,
    /// Print a fresh Ed25519 key pair as hex.
    Keygen,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(secs) = cli.escrow_lock_secs {
        config.escrow_lock_secs = secs;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let (op, args) = match cli.command {
        Command::Config => {
            println!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Command::Keygen => {
            let kp = generate_keypair();
            println!("public:  {}", kp.public.to_hex());
            println!("private: {}", hex::encode(kp.private.0));
            return Ok(());
        }
        Command::Invoke { op, args } => (op, args),
    };
    let caller = cli.caller.as_deref().context("--caller is required for invoke")?;

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes()?)
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))?;
    let fetcher = HttpEvidenceFetcher::new(config.evidence.fetch_policy())
        .context("building evidence fetcher")?;
    let engine = Engine::new(
        Arc::new(LmdbStateStore::new(env)),
        Arc::new(SystemClock),
        Arc::new(Ed25519Signer),
        Arc::new(fetcher),
        &config,
    );

    let output = engine.invoke(caller, &op, &args)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
