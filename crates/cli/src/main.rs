//! `ark-index` CLI — command-line front end for the index builder.
//!
//! Calls `ark-index-core` directly with no server overhead.

use ark_index_core::config::load_config;
use ark_index_core::symbols::Adapter;
use ark_index_core::{build_index, verify_index, BuildOutcome, VerifyOutcome};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// `ark-index` — build and verify the repository index.
#[derive(Parser)]
#[command(name = "ark-index", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or incrementally refresh the repository index
    Build {
        /// Repository root (default: current directory)
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,

        /// Path to an `ark-index.toml` config file, overriding the default lookup
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ignore the cached ledger and reindex every file
        #[arg(long)]
        force: bool,

        /// Print the build result as JSON instead of a summary line
        #[arg(long)]
        json: bool,

        /// Raise the log level to debug
        #[arg(long)]
        verbose: bool,
    },
    /// Validate an existing index without rebuilding it
    Verify {
        /// Repository root (default: current directory)
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,

        /// Artifact directory, relative to repo-root (default: `.ark/index`)
        #[arg(long)]
        ark_dir: Option<PathBuf>,

        /// Print the verify result as JSON instead of a summary line
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("ark_index_cli={level},ark_index_core={level}"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Commands::Build { repo_root, config, force, json, verbose } => run_build(repo_root, config, force, json, verbose),
        Commands::Verify { repo_root, ark_dir, json } => run_verify(repo_root, ark_dir, json),
    }
}

fn canonical_repo_root(repo_root: PathBuf) -> Result<PathBuf, String> {
    repo_root.canonicalize().map_err(|e| format!("cannot resolve repo root {}: {e}", repo_root.display()))
}

fn run_build(repo_root: PathBuf, config_path: Option<PathBuf>, force: bool, json: bool, verbose: bool) -> ExitCode {
    init_logging(verbose);

    let repo_root = match canonical_repo_root(repo_root) {
        Ok(p) => p,
        Err(message) => return report_startup_error(&message, json),
    };

    let mut config = match load_config(&repo_root, config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => return report_build_error(&ark_index_core::ErrorPayload::from(&e), json),
    };
    config.force = config.force || force;
    config.verbose = config.verbose || verbose;

    let adapters = build_adapters(&config);

    tracing::info!(repo_root = %repo_root.display(), force = config.force, "starting build");
    let outcome = build_index(&config, &adapters);
    print_build_outcome(&outcome, json);
    if outcome.success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run_verify(repo_root: PathBuf, ark_dir: Option<PathBuf>, json: bool) -> ExitCode {
    init_logging(false);

    let repo_root = match canonical_repo_root(repo_root) {
        Ok(p) => p,
        Err(message) => return report_startup_error(&message, json),
    };
    let ark_dir = repo_root.join(ark_dir.unwrap_or_else(|| PathBuf::from(".ark/index")));

    let outcome = verify_index(&ark_dir);
    print_verify_outcome(&outcome, json);
    if outcome.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(feature = "treesitter")]
fn build_adapters(config: &ark_index_core::BuildConfig) -> Vec<Box<dyn Adapter>> {
    if config.adapters.iter().any(|name| name == "treesitter") {
        vec![Box::new(ark_index_core::symbols::treesitter::TreesitterAdapter::new())]
    } else {
        Vec::new()
    }
}

#[cfg(not(feature = "treesitter"))]
fn build_adapters(_config: &ark_index_core::BuildConfig) -> Vec<Box<dyn Adapter>> {
    Vec::new()
}

fn report_startup_error(message: &str, json: bool) -> ExitCode {
    if json {
        println!("{}", serde_json::json!({"success": false, "error": {"code": "ARK_INDEX_READ_ERROR", "message": message}}));
    } else {
        eprintln!("error: {message}");
    }
    ExitCode::FAILURE
}

fn report_build_error(error: &ark_index_core::ErrorPayload, json: bool) -> ExitCode {
    if json {
        println!("{}", serde_json::to_string(&BuildOutcome {
            success: false,
            error: Some(error.clone()),
            stats: Default::default(),
            warnings: Vec::new(),
        }.summary()).unwrap_or_default());
    } else {
        eprintln!("error [{}]: {}", error.code, error.message);
    }
    ExitCode::FAILURE
}

fn print_build_outcome(outcome: &BuildOutcome, json: bool) {
    if json {
        println!("{}", serde_json::to_string(&outcome.summary()).unwrap_or_default());
        return;
    }

    if let Some(error) = &outcome.error {
        eprintln!("error [{}]: {}", error.code, error.message);
        return;
    }

    let status = if outcome.warnings.is_empty() { "success" } else { "partial" };
    println!(
        "ark-index build: {status} — {} files ({} new, {} changed, {} deleted), {} symbols, {} tests, {} warning(s)",
        outcome.stats.total_files,
        outcome.stats.files_new,
        outcome.stats.files_changed,
        outcome.stats.files_deleted,
        outcome.stats.total_symbols,
        outcome.stats.total_tests,
        outcome.warnings.len(),
    );
    for warning in &outcome.warnings {
        let file = warning.file.as_deref().unwrap_or("-");
        println!("  [{}] {file}: {}", warning.code, warning.message);
    }
}

fn print_verify_outcome(outcome: &VerifyOutcome, json: bool) {
    if json {
        println!("{}", serde_json::json!({
            "valid": outcome.valid,
            "errors": outcome.errors,
            "warnings": outcome.warnings,
        }));
        return;
    }

    println!(
        "ark-index verify: {} — {} error(s), {} warning(s)",
        if outcome.valid { "valid" } else { "invalid" },
        outcome.errors.len(),
        outcome.warnings.len(),
    );
    for error in &outcome.errors {
        println!("  error: {error}");
    }
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
}

/// Serializable summary, separate from [`BuildOutcome`] itself so the CLI's
/// JSON shape stays stable independent of the library struct's field order.
trait Summarize {
    fn summary(&self) -> serde_json::Value;
}

impl Summarize for BuildOutcome {
    fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "success": self.success,
            "error": self.error,
            "stats": self.stats,
            "warnings": self.warnings,
        })
    }
}
