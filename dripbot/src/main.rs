//! Dripbot CLI - testnet faucet bot
//!
//! A command-line interface for running dripbot skills interactively.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use dripbot::error::{BotError, Result, SkillResult};
use dripbot::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Dripbot - drip testnet tokens via slash commands
#[derive(Parser)]
#[command(name = "dripbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "DRIPBOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,

    /// Start an interactive command session
    Run(RunArgs),

    /// List registered skills
    Skills,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Args)]
struct RunArgs {
    /// Sender wallet address used for faucet disbursements
    #[arg(short, long, env = "DRIPBOT_SENDER")]
    sender: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dripbot={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Run(args) => cmd_run(args, cli.config).await,
        Commands::Skills => cmd_skills(),
        Commands::Config(args) => cmd_config(args, cli.config).await,
    }
}

/// Responder that prints replies to stdout.
#[derive(Debug, Default)]
struct CliResponder;

#[async_trait]
impl Responder for CliResponder {
    async fn send(&self, text: &str) -> SkillResult<()> {
        println!("{text}");
        Ok(())
    }

    async fn send_receipt(&self, receipt: &Receipt) -> SkillResult<()> {
        println!("Receipt: {}", receipt.tx);
        Ok(())
    }
}

/// Initialize configuration.
async fn cmd_init() -> Result<()> {
    init_config().await?;
    println!("Configuration created: {}", config_path().display());
    println!();
    println!("Next steps:");
    println!("  1. export LEARNWEB3_API_KEY=<key>");
    println!("  2. dripbot run --sender <address>");
    Ok(())
}

/// Run the interactive dispatch loop.
async fn cmd_run(args: RunArgs, config_file: Option<PathBuf>) -> Result<()> {
    let config = load_or_default(config_file).await?;

    let cache: Arc<dyn CacheStore> = match &config.cache.dir {
        Some(dir) => Arc::new(FileCache::new(dir)),
        None => Arc::new(MemoryCache::new()),
    };

    let faucet = match config.faucet.resolve_api_key() {
        Some(key) => LearnWeb3Client::new(key).with_base_url(&config.faucet.base_url),
        None => {
            return Err(BotError::config(
                "no API key found; set LEARNWEB3_API_KEY or faucet.api_key",
            ));
        }
    };

    let registry = default_registry()?;
    let mut ctx = SkillContext::new(&args.sender, Arc::new(CliResponder), cache, Arc::new(faucet));

    println!("Dripbot | type a command, or 'exit' to quit\n");
    print!("{}", registry.help_text());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                return Ok(());
            }
        };

        let Some(line) = line else {
            return Ok(());
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            return Ok(());
        }

        match registry.dispatch(line, &mut ctx).await {
            Ok(true) => {}
            Ok(false) => {
                println!("Unknown command.\n");
                print!("{}", registry.help_text());
            }
            Err(e) => {
                tracing::error!(error = %e, "command failed");
                println!("Something went wrong: {e}");
            }
        }
    }
}

/// List registered skills.
fn cmd_skills() -> Result<()> {
    let registry = default_registry()?;
    print!("{}", registry.help_text());
    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: Option<PathBuf>) -> Result<()> {
    let path = config_file.unwrap_or_else(config_path);

    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            if path.exists() {
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| BotError::config(format!("failed to read config: {e}")))?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'dripbot init' to create one.");
            }
        }
        ConfigCommands::Validate => {
            if !path.exists() {
                println!("error: configuration file does not exist");
                return Ok(());
            }
            match dripbot::config::load_config_from(&path).await {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("error: {e}"),
            }
        }
    }

    Ok(())
}

/// Load configuration, falling back to defaults when no file exists.
async fn load_or_default(config_file: Option<PathBuf>) -> Result<BotConfig> {
    match config_file {
        Some(path) => Ok(dripbot::config::load_config_from(&path).await?),
        None => Ok(load_config().await.unwrap_or_default()),
    }
}
