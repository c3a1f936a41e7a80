//! `stocktake run`: reconcile registry, scanner list and on-hand log.

use std::path::{Path, PathBuf};

use clap::Args;
use stocktake_recon::model::{ExceptionRow, ReconInput, ReconReport};
use stocktake_recon::report::{exception_record, missing_records};
use stocktake_recon::ReconConfig;
use tracing::{info, warn};

use crate::exit_codes::{io_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_MISSING, EXIT_OUTPUT};
use crate::CliError;

#[derive(Args)]
pub struct RunArgs {
    /// Path to a stocktake .toml config (file paths inside resolve against its directory)
    pub config: Option<PathBuf>,

    /// Registry file (.csv, .tsv or workbook); overrides the config
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Scanner list, one reading per line; overrides the config
    #[arg(long)]
    pub scanned: Option<PathBuf>,

    /// On-hand log (workbook with one or more sheets, or .csv); overrides the config
    #[arg(long)]
    pub on_hand: Option<PathBuf>,

    /// Directory for report files; overrides the config
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the JSON report to stdout (summary still goes to stderr)
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Do not write report files
    #[arg(long)]
    pub no_write: bool,

    /// Exit with code 3 when any registered item is missing
    #[arg(long)]
    pub fail_on_missing: bool,
}

/// Input and output locations after applying config and flags.
struct RunPaths {
    registry: PathBuf,
    scanned: PathBuf,
    on_hand: PathBuf,
    out_dir: PathBuf,
    json: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let (config, paths) = resolve(&args)?;

    let input = load_input(&paths)?;

    let report = stocktake_recon::run(&config, &input).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))?;

    if !args.no_write {
        write_reports(&config, &paths, &report)?;
    }

    if let Some(ref path) = paths.json {
        stocktake_io::json::export(&report, path).map_err(|e| CliError::new(EXIT_OUTPUT, e.to_string()))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&report);

    if args.fail_on_missing && report.summary.missing > 0 {
        return Err(CliError::new(
            EXIT_MISSING,
            format!("{} registered item(s) missing", report.summary.missing),
        ));
    }

    Ok(())
}

fn resolve(args: &RunArgs) -> Result<(ReconConfig, RunPaths), CliError> {
    let (config, base_dir) = match args.config {
        Some(ref config_path) => {
            let config_str = std::fs::read_to_string(config_path).map_err(|e| {
                CliError::args(format!("cannot read config {}: {e}", config_path.display()))
            })?;
            let config = ReconConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))?;
            // Resolve file paths relative to config file's directory
            let base_dir = config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (config, base_dir)
        }
        None => {
            let (Some(registry), Some(scanned), Some(on_hand)) = (&args.registry, &args.scanned, &args.on_hand)
            else {
                return Err(CliError::args("no config given and not all inputs were supplied")
                    .with_hint("pass a config file, or all of --registry, --scanned and --on-hand"));
            };
            let config = ReconConfig::with_inputs(
                registry.to_string_lossy(),
                scanned.to_string_lossy(),
                on_hand.to_string_lossy(),
            );
            (config, PathBuf::from("."))
        }
    };

    let pick = |flag: &Option<PathBuf>, configured: &str| match flag {
        Some(path) => path.clone(),
        None => base_dir.join(configured),
    };

    let paths = RunPaths {
        registry: pick(&args.registry, &config.registry.file),
        scanned: pick(&args.scanned, &config.scanned.file),
        on_hand: pick(&args.on_hand, &config.on_hand.file),
        out_dir: pick(&args.out_dir, &config.output.dir),
        json: args
            .output
            .clone()
            .or_else(|| config.output.json.as_ref().map(|name| base_dir.join(name))),
    };

    Ok((config, paths))
}

fn load_input(paths: &RunPaths) -> Result<ReconInput, CliError> {
    let input_err = |e: stocktake_io::IoError| CliError::new(io_exit_code(&e), e.to_string());

    let scanned = stocktake_io::read_scanned(&paths.scanned).map_err(input_err)?;
    let registry = stocktake_io::read_registry(&paths.registry).map_err(input_err)?;
    let on_hand = stocktake_io::read_on_hand(&paths.on_hand).map_err(input_err)?;

    info!(
        scanned_lines = scanned.len(),
        registry_rows = registry.len(),
        on_hand_tables = on_hand.len(),
        "inputs loaded"
    );
    if on_hand.is_empty() {
        warn!(path = %paths.on_hand.display(), "on-hand file has no tables");
    }

    Ok(ReconInput {
        scanned,
        registry,
        on_hand,
    })
}

fn write_reports(config: &ReconConfig, paths: &RunPaths, report: &ReconReport) -> Result<(), CliError> {
    let out_err = |e: stocktake_io::IoError| CliError::new(EXIT_OUTPUT, e.to_string());

    std::fs::create_dir_all(&paths.out_dir).map_err(|e| {
        CliError::new(EXIT_OUTPUT, format!("cannot create {}: {e}", paths.out_dir.display()))
    })?;

    let missing_path = paths.out_dir.join(&config.output.missing);
    stocktake_io::write_records(&missing_records(&report.missing), "Missing", true, &missing_path)
        .map_err(out_err)?;
    eprintln!("wrote {}", missing_path.display());

    for (rows, file, sheet) in [
        (&report.registry_exceptions, &config.output.registry_exceptions, "Registry"),
        (&report.on_hand_exceptions, &config.output.on_hand_exceptions, "On hand"),
    ] {
        let path = paths.out_dir.join(file);
        if rows.is_empty() {
            // A report left over from an earlier run would read as current
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    CliError::new(EXIT_OUTPUT, format!("cannot remove stale {}: {e}", path.display()))
                })?;
                info!(path = %path.display(), "removed stale exception report");
            }
            continue;
        }
        stocktake_io::write_records(&exception_records(rows), sheet, false, &path).map_err(out_err)?;
        eprintln!("wrote {} ({} row(s) to review)", path.display(), rows.len());
    }

    Ok(())
}

fn exception_records(rows: &[ExceptionRow]) -> Vec<Vec<String>> {
    rows.iter().map(exception_record).collect()
}

/// Human summary to stderr, in fixed order.
fn print_summary(report: &ReconReport) {
    let rows = report.summary.rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    eprintln!();
    eprintln!("{}:", report.meta.config_name);
    for (label, value) in rows {
        eprintln!("  {label:<width$}  {value}");
    }
}
