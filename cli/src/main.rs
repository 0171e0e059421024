//! Entry point for running vote task scripts.

use anyhow::Context;
use clap::Parser;
use nomvote_cli::{CliConfig, OutputFormat, RunOptions, Runner, Script};
use nomvote_types::{Address, Network};
use nomvote_utils::LogFormat;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nomvote", about = "Fee-gated nomination vote task runner")]
struct Cli {
    /// Network to run against: "local", "rinkeby" or "mainnet".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "NOMVOTE_NETWORK")]
    network: Option<Network>,

    /// Registry owner address (0x-prefixed).
    #[arg(long, env = "NOMVOTE_OWNER")]
    owner: Option<Address>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "NOMVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "NOMVOTE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a task script against a fresh registry.
    Run {
        /// Path to the TOML task script.
        script: PathBuf,

        /// Print failed tasks and continue instead of stopping.
        #[arg(long)]
        keep_going: bool,

        /// Output format for task results.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective voting parameters as TOML.
    Params,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CliConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(owner) = cli.owner {
        config.owner = owner;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    nomvote_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run {
            script,
            keep_going,
            format,
        } => {
            let tasks = Script::from_file(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let runner = Runner::new(&config, RunOptions { format, keep_going })
                .context("building vote registry")?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let summary = runner.run(&tasks, &mut out)?;
            out.flush()?;

            if summary.failed > 0 {
                tracing::warn!("{} of {} tasks failed", summary.failed, tasks.tasks.len());
            }
        }
        Command::Params => {
            let params = toml::to_string_pretty(&config.params)
                .context("serializing voting parameters")?;
            print!("{params}");
        }
    }

    Ok(())
}
