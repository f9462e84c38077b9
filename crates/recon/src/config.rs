use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Default similarity threshold. A candidate matches when its score is
/// strictly greater than this value.
pub const DEFAULT_THRESHOLD: u8 = 80;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "price comparison".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            columns: ColumnMapping::default(),
            matching: MatchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Caller column names for the three canonical fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    #[serde(default = "default_code_column")]
    pub code: String,
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_price_column")]
    pub price: String,
}

fn default_code_column() -> String {
    "code".into()
}

fn default_name_column() -> String {
    "name".into()
}

fn default_price_column() -> String {
    "price".into()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            code: default_code_column(),
            name: default_name_column(),
            price: default_price_column(),
        }
    }
}

impl ColumnMapping {
    /// (canonical field, caller column) pairs in canonical order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [("code", &self.code), ("name", &self.name), ("price", &self.price)]
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Which candidate wins when several exceed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyPolicy {
    /// First candidate in source order above the threshold.
    #[default]
    FirstMatch,
    /// Highest score above the threshold; ties go to the earlier record.
    BestMatch,
}

/// Whether a record that filled a slot stays available to later products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// A fuzzy-matched record may fill slots of several products.
    #[default]
    Shared,
    /// Every record fills at most one slot across the whole run.
    Consume,
}

/// How fuzzy candidates are pre-selected before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    #[default]
    FullScan,
    /// Skip names whose length alone rules out a score above the threshold.
    LengthBlocked,
}

impl std::fmt::Display for FuzzyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstMatch => write!(f, "first_match"),
            Self::BestMatch => write!(f, "best_match"),
        }
    }
}

impl std::fmt::Display for ReusePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Consume => write!(f, "consume"),
        }
    }
}

impl std::fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullScan => write!(f, "full_scan"),
            Self::LengthBlocked => write!(f, "length_blocked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub policy: FuzzyPolicy,
    #[serde(default)]
    pub reuse: ReusePolicy,
    #[serde(default)]
    pub candidates: CandidateStrategy,
    /// Reconcile products on the rayon pool. Ignored in `consume` mode.
    #[serde(default)]
    pub parallel: bool,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            policy: FuzzyPolicy::default(),
            reuse: ReusePolicy::default(),
            candidates: CandidateStrategy::default(),
            parallel: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.matching.validate()?;

        for (field, column) in self.columns.fields() {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "column for '{field}' must not be empty"
                )));
            }
        }

        // One input column cannot feed two canonical fields
        let fields = self.columns.fields();
        for (i, (field_a, col_a)) in fields.iter().enumerate() {
            for (field_b, col_b) in &fields[i + 1..] {
                if col_a == col_b {
                    return Err(ReconError::ConfigValidation(format!(
                        "column '{col_a}' is mapped to both '{field_a}' and '{field_b}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.threshold > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
