// pricecomp CLI - compare wholesaler price lists product by product

mod compare;
mod exit_codes;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_INGEST, EXIT_INVALID_CONFIG, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};
use pricecomp_io::IngestError;
use pricecomp_recon::{FuzzyPolicy, ReconError};

#[derive(Parser)]
#[command(name = "pricecomp")]
#[command(about = "Compare product prices across wholesaler CSV price lists")]
#[command(version)]
struct Cli {
    /// Debug logging to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match products across price lists and report per-wholesaler prices
    #[command(after_help = "\
Examples:
  pricecomp compare hurtownia_a.csv hurtownia_b.csv
  pricecomp compare *.csv --threshold 85 --policy best-match
  pricecomp compare a.csv b.csv --code-column Indeks --name-column Nazwa --price-column Cena
  pricecomp compare a.csv b.csv --config weekly.toml --json
  pricecomp compare a.csv b.csv c.csv --csv comparison.csv --quiet")]
    Compare {
        /// Price list files (.csv); at least two
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// TOML config file (columns, matching, output)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Column holding the product code
        #[arg(long, value_name = "COLUMN")]
        code_column: Option<String>,

        /// Column holding the product name
        #[arg(long, value_name = "COLUMN")]
        name_column: Option<String>,

        /// Column holding the price
        #[arg(long, value_name = "COLUMN")]
        price_column: Option<String>,

        /// Name similarity a fuzzy match must exceed (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,

        /// Which candidate wins when several names are similar enough
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Let each record fill at most one product
        #[arg(long)]
        consume: bool,

        /// Pre-filter fuzzy candidates by name length
        #[arg(long)]
        blocking: bool,

        /// Reconcile products on all cores
        #[arg(long)]
        parallel: bool,

        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the comparison table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Suppress the summary line
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  pricecomp validate weekly.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    FirstMatch,
    BestMatch,
}

impl From<PolicyArg> for FuzzyPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FirstMatch => FuzzyPolicy::FirstMatch,
            PolicyArg::BestMatch => FuzzyPolicy::BestMatch,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout is reserved for results
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Compare {
            files,
            config,
            code_column,
            name_column,
            price_column,
            threshold,
            policy,
            consume,
            blocking,
            parallel,
            json,
            output,
            csv,
            quiet,
        } => compare::cmd_compare(compare::CompareArgs {
            files,
            config,
            code_column,
            name_column,
            price_column,
            threshold,
            policy: policy.map(FuzzyPolicy::from),
            consume,
            blocking,
            parallel,
            json,
            output,
            csv,
            quiet,
        }),
        Commands::Validate { config } => compare::cmd_validate(config),
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IngestError> for CliError {
    fn from(err: IngestError) -> Self {
        let hint = match &err {
            IngestError::MissingColumn { .. } => {
                Some("map columns with --code-column/--name-column/--price-column or [columns] in the config".to_string())
            }
            IngestError::Encoding { .. } => Some("save the file as UTF-8 or Windows-1250".to_string()),
            _ => None,
        };
        Self { code: EXIT_INGEST, message: err.to_string(), hint }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => CliError::config(err.to_string()),
            ReconError::TooFewSources { .. } | ReconError::UnlabeledSource { .. } => CliError::args(err.to_string()),
        }
    }
}
