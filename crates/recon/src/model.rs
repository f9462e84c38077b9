use serde::Serialize;

use crate::config::{CandidateStrategy, FuzzyPolicy, ReusePolicy};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single normalized product row from one wholesaler.
///
/// An empty `name` means the source supplied no usable name. A `None` price
/// means the source's price cell was absent or not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRecord {
    pub code: String,
    pub name: String,
    pub price: Option<f64>,
}

impl SourceRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// One wholesaler's records, in ingestion order.
#[derive(Debug, Clone)]
pub struct Source {
    pub label: String,
    pub records: Vec<SourceRecord>,
}

impl Source {
    pub fn new(label: impl Into<String>, records: Vec<SourceRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-product output
// ---------------------------------------------------------------------------

/// How one source slot of a product was filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotMatch {
    /// Record with the product's own code.
    Exact { position: usize },
    /// Record found by name similarity.
    Fuzzy {
        position: usize,
        code: String,
        score: u8,
    },
    Missing,
}

impl SlotMatch {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Best price + spread for one product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceStats {
    pub best_price: Option<f64>,
    pub spread: Option<f64>,
}

/// The engine's unit of output: one distinct product identity.
///
/// `prices` and `matches` always have one slot per source, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalProduct {
    pub identity: String,
    pub display_name: String,
    pub prices: Vec<Option<f64>>,
    pub best_price: Option<f64>,
    pub spread: Option<f64>,
    pub matches: Vec<SlotMatch>,
}

impl CanonicalProduct {
    pub fn valid_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().flatten().copied().filter(|p| !p.is_nan())
    }
}

/// Presentation row: product label, per-source prices, spread, best price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub product: String,
    pub prices: Vec<Option<f64>>,
    pub difference: Option<f64>,
    pub best_price: Option<f64>,
}

impl From<&CanonicalProduct> for ComparisonRow {
    fn from(p: &CanonicalProduct) -> Self {
        Self {
            product: p.display_name.clone(),
            prices: p.prices.clone(),
            difference: p.spread,
            best_price: p.best_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReconSummary {
    pub products: usize,
    pub sources: usize,
    /// Products priced by every source.
    pub fully_priced: usize,
    /// Products with exactly one valid price.
    pub single_source: usize,
    /// Products with no valid price at all.
    pub unpriced: usize,
    pub exact_slots: usize,
    pub fuzzy_slots: usize,
    pub missing_slots: usize,
    /// Records shadowed by a later record with the same code, across all sources.
    pub duplicate_codes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub threshold: u8,
    pub policy: FuzzyPolicy,
    pub reuse: ReusePolicy,
    pub candidates: CandidateStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    /// Source labels, positionally aligned with every product's `prices`.
    pub sources: Vec<String>,
    pub summary: ReconSummary,
    pub products: Vec<CanonicalProduct>,
}

impl ReconResult {
    pub fn rows(&self) -> Vec<ComparisonRow> {
        self.products.iter().map(ComparisonRow::from).collect()
    }
}
