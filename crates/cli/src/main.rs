// Stocktake CLI - reconcile an RFID registry against scans and on-hand logs

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};
use stocktake_recon::config::{DEFAULT_PREFIX, DEFAULT_SUFFIX_LEN};
use stocktake_recon::{ReconConfig, TagGrammar};

#[derive(Parser)]
#[command(name = "stocktake")]
#[command(about = "Find registered RFID items that were neither scanned nor checked out")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile registry, scanner list and on-hand log
    #[command(after_help = "\
Examples:
  stocktake run stocktake.toml
  stocktake run stocktake.toml --json
  stocktake run stocktake.toml --output result.json --fail-on-missing
  stocktake run --registry registry.csv --scanned list.txt --on-hand on_hand.xlsx
  stocktake run --registry registry.csv --scanned list.txt --on-hand on_hand.xlsx --out-dir out")]
    Run(run::RunArgs),

    /// Validate a stocktake config without running
    #[command(after_help = "\
Examples:
  stocktake validate stocktake.toml")]
    Validate {
        /// Path to the .toml config file
        config: PathBuf,
    },

    /// Check candidate strings against the tag grammar
    #[command(after_help = "\
Examples:
  stocktake check 304DB75F196000140000ABCD
  stocktake check 304db75f196000140000abcd 'not a tag'
  stocktake check --prefix E280 --suffix-len 4 E2800A1F")]
    Check {
        /// Candidate tags
        #[arg(required = true)]
        candidates: Vec<String>,

        /// Vendor prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Number of hex digits after the prefix
        #[arg(long, default_value_t = DEFAULT_SUFFIX_LEN)]
        suffix_len: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Check {
            candidates,
            prefix,
            suffix_len,
        } => cmd_check(&candidates, &prefix, suffix_len),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("RUST_LOG") {
        EnvFilter::new(env)
    } else {
        EnvFilter::new(match verbose {
            0 => "stocktake=warn,stocktake_recon=warn,stocktake_io=warn",
            1 => "stocktake=info,stocktake_recon=info,stocktake_io=info",
            _ => "stocktake=debug,stocktake_recon=debug,stocktake_io=debug",
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::args(format!("cannot read config {}: {e}", config_path.display())))?;

    let config = ReconConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))?;
    TagGrammar::from_config(&config.grammar).map_err(|e| CliError::config(e.to_string()))?;

    eprintln!(
        "config ok: \"{}\" (tags: {} + {} hex digits)",
        config.name, config.grammar.prefix, config.grammar.suffix_len
    );
    Ok(())
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(candidates: &[String], prefix: &str, suffix_len: usize) -> Result<(), CliError> {
    let grammar = TagGrammar::new(prefix, suffix_len).map_err(|e| CliError::config(e.to_string()))?;

    for candidate in candidates {
        match grammar.parse(candidate.trim()) {
            Some(tag) => println!("{candidate}\t{tag}"),
            None => println!("{candidate}\tinvalid"),
        }
    }
    Ok(())
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  stocktake-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  stocktake-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}
