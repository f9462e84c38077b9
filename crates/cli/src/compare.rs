//! `pricecomp compare` / `pricecomp validate`.

use std::path::{Path, PathBuf};

use pricecomp_recon::{CandidateStrategy, FuzzyPolicy, ReconConfig, ReconResult, ReusePolicy};

use crate::table::render_table;
use crate::CliError;

pub struct CompareArgs {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub code_column: Option<String>,
    pub name_column: Option<String>,
    pub price_column: Option<String>,
    pub threshold: Option<u8>,
    pub policy: Option<FuzzyPolicy>,
    pub consume: bool,
    pub blocking: bool,
    pub parallel: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub quiet: bool,
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let (config, base_dir) = match &args.config {
        Some(path) => (load_config(path)?, config_dir(path)),
        None => (ReconConfig::default(), PathBuf::new()),
    };
    let config = apply_overrides(config, &args)?;
    tracing::debug!(
        threshold = config.matching.threshold,
        policy = %config.matching.policy,
        reuse = %config.matching.reuse,
        candidates = %config.matching.candidates,
        "matching config resolved"
    );

    let files = csv_inputs(&args.files)?;
    let sources = pricecomp_io::load_sources(&files, &config.columns)?;

    let result = pricecomp_recon::run(&config, &sources)?;

    // Flags win over [output] paths from the config
    let json_path = args
        .output
        .clone()
        .or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    let csv_path = args
        .csv
        .clone()
        .or_else(|| config.output.csv.as_ref().map(|p| base_dir.join(p)));

    if args.json || json_path.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = json_path {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        if args.json {
            println!("{json_str}");
        }
    }

    if let Some(ref path) = csv_path {
        pricecomp_io::export_rows(path, &result.sources, &result.rows())
            .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if !args.json {
        print!("{}", render_table(&result.sources, &result.rows()));
    }

    if !args.quiet {
        eprintln!("{}", summary_line(&result));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let m = &config.matching;
    eprintln!(
        "{}: ok (columns {}/{}/{}, threshold {}, {}, {}, {})",
        config_path.display(),
        config.columns.code,
        config.columns.name,
        config.columns.price,
        m.threshold,
        m.policy,
        m.reuse,
        m.candidates,
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read config {}: {e}", path.display())))?;
    Ok(ReconConfig::from_toml(&text)?)
}

fn config_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn apply_overrides(mut config: ReconConfig, args: &CompareArgs) -> Result<ReconConfig, CliError> {
    if let Some(ref c) = args.code_column {
        config.columns.code = c.clone();
    }
    if let Some(ref c) = args.name_column {
        config.columns.name = c.clone();
    }
    if let Some(ref c) = args.price_column {
        config.columns.price = c.clone();
    }
    if let Some(t) = args.threshold {
        config.matching.threshold = t;
    }
    if let Some(p) = args.policy {
        config.matching.policy = p;
    }
    if args.consume {
        config.matching.reuse = ReusePolicy::Consume;
    }
    if args.blocking {
        config.matching.candidates = CandidateStrategy::LengthBlocked;
    }
    if args.parallel {
        config.matching.parallel = true;
    }
    // Flags can map two fields onto one column
    config.validate().map_err(|e| CliError::args(e.to_string()))?;
    Ok(config)
}

/// Keep `.csv` inputs, warn about the rest.
fn csv_inputs(files: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut kept = Vec::with_capacity(files.len());
    for path in files {
        if is_csv(path) {
            kept.push(path.clone());
        } else {
            eprintln!("warning: skipping {} (not a .csv file)", path.display());
        }
    }
    if kept.len() < 2 {
        return Err(CliError::args(format!(
            "at least 2 CSV files are required, found {}",
            kept.len()
        ))
        .with_hint("pass two or more .csv price lists"));
    }
    Ok(kept)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn summary_line(result: &ReconResult) -> String {
    let s = &result.summary;
    format!(
        "{} products across {} price lists: {} priced everywhere, {} in one list only, {} unpriced ({} exact, {} fuzzy, {} missing)",
        s.products,
        s.sources,
        s.fully_priced,
        s.single_source,
        s.unpriced,
        s.exact_slots,
        s.fuzzy_slots,
        s.missing_slots,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CompareArgs {
        CompareArgs {
            files: vec![],
            config: None,
            code_column: None,
            name_column: None,
            price_column: None,
            threshold: None,
            policy: None,
            consume: false,
            blocking: false,
            parallel: false,
            json: false,
            output: None,
            csv: None,
            quiet: false,
        }
    }

    #[test]
    fn csv_extension_case_insensitive() {
        assert!(is_csv(Path::new("a.csv")));
        assert!(is_csv(Path::new("dir/B.CSV")));
        assert!(!is_csv(Path::new("a.xlsx")));
        assert!(!is_csv(Path::new("csv")));
    }

    #[test]
    fn non_csv_inputs_dropped() {
        let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.txt"), PathBuf::from("c.csv")];
        let kept = csv_inputs(&files).unwrap();
        assert_eq!(kept, vec![PathBuf::from("a.csv"), PathBuf::from("c.csv")]);
    }

    #[test]
    fn one_csv_is_usage_error() {
        let err = csv_inputs(&[PathBuf::from("a.csv"), PathBuf::from("b.xlsx")]).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }

    #[test]
    fn flags_override_config() {
        let config = ReconConfig::from_toml(
            "[columns]\ncode = \"sku\"\n[matching]\nthreshold = 70\n",
        )
        .unwrap();
        let a = CompareArgs {
            price_column: Some("Cena".into()),
            threshold: Some(90),
            policy: Some(FuzzyPolicy::BestMatch),
            consume: true,
            blocking: true,
            ..args()
        };
        let merged = apply_overrides(config, &a).unwrap();
        assert_eq!(merged.columns.code, "sku");
        assert_eq!(merged.columns.price, "Cena");
        assert_eq!(merged.matching.threshold, 90);
        assert_eq!(merged.matching.policy, FuzzyPolicy::BestMatch);
        assert_eq!(merged.matching.reuse, ReusePolicy::Consume);
        assert_eq!(merged.matching.candidates, CandidateStrategy::LengthBlocked);
        assert!(!merged.matching.parallel);
    }

    #[test]
    fn conflicting_column_flags_rejected() {
        let a = CompareArgs {
            name_column: Some("code".into()),
            ..args()
        };
        let err = apply_overrides(ReconConfig::default(), &a).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }
}
