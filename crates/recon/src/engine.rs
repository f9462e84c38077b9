use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;

use crate::aggregate::aggregate;
use crate::config::{MatchConfig, ReconConfig, ReusePolicy};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::index::ExactKeyIndex;
use crate::matcher::NameMatcher;
use crate::model::{CanonicalProduct, ReconMeta, ReconResult, SlotMatch, Source};

/// Label used when a product has neither a name nor a code.
pub const UNKNOWN_PRODUCT: &str = "Unknown product";

/// Validate inputs, reconcile, and wrap the products with metadata and a summary.
pub fn run(config: &ReconConfig, sources: &[Source]) -> Result<ReconResult, ReconError> {
    config.validate()?;
    validate_sources(sources)?;

    let (products, duplicate_codes) = reconcile_counting(sources, &config.matching);
    let summary = compute_summary(&products, sources.len(), duplicate_codes);

    tracing::info!(
        products = summary.products,
        sources = summary.sources,
        exact = summary.exact_slots,
        fuzzy = summary.fuzzy_slots,
        missing = summary.missing_slots,
        "reconciliation finished"
    );

    let m = &config.matching;
    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold: m.threshold,
            policy: m.policy,
            reuse: m.reuse,
            candidates: m.candidates,
        },
        sources: sources.iter().map(|s| s.label.clone()).collect(),
        summary,
        products,
    })
}

/// A comparison needs at least two labelled sources.
pub fn validate_sources(sources: &[Source]) -> Result<(), ReconError> {
    if sources.len() < 2 {
        return Err(ReconError::TooFewSources {
            found: sources.len(),
        });
    }
    if let Some(position) = sources.iter().position(|s| s.label.trim().is_empty()) {
        return Err(ReconError::UnlabeledSource { position });
    }
    Ok(())
}

/// Match records across sources and price every distinct product code.
///
/// Products come back sorted by code. Accepts any number of sources.
pub fn reconcile(sources: &[Source], config: &MatchConfig) -> Vec<CanonicalProduct> {
    reconcile_counting(sources, config).0
}

/// Display name used when no source supplied one.
pub fn fallback_label(code: &str) -> String {
    if code.is_empty() {
        UNKNOWN_PRODUCT.to_string()
    } else {
        format!("Product {code}")
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Read-only lookup structures for one source, built once per run.
struct SourceView<'a> {
    index: ExactKeyIndex<'a>,
    matcher: NameMatcher<'a>,
}

fn reconcile_counting(sources: &[Source], config: &MatchConfig) -> (Vec<CanonicalProduct>, usize) {
    let views: Vec<SourceView<'_>> = sources
        .iter()
        .map(|s| SourceView {
            index: ExactKeyIndex::build(&s.records),
            matcher: NameMatcher::new(&s.records, config),
        })
        .collect();
    let duplicates = views.iter().map(|v| v.index.duplicates()).sum();

    let codes: Vec<&str> = views
        .iter()
        .flat_map(|v| v.index.codes())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    tracing::debug!(
        sources = sources.len(),
        codes = codes.len(),
        duplicates,
        "indexes built"
    );

    let products = match config.reuse {
        ReusePolicy::Shared if config.parallel => codes
            .par_iter()
            .map(|code| reconcile_product(code, &views, &mut NoClaims))
            .collect(),
        ReusePolicy::Shared => codes
            .iter()
            .map(|code| reconcile_product(code, &views, &mut NoClaims))
            .collect(),
        ReusePolicy::Consume => {
            if config.parallel {
                tracing::warn!("consume mode shares claims across products, running sequentially");
            }
            let mut claims = Claims::new(&views);
            codes
                .iter()
                .map(|code| reconcile_product(code, &views, &mut claims))
                .filter(|p| {
                    let empty = p.matches.iter().all(SlotMatch::is_missing);
                    if empty {
                        tracing::debug!(code = %p.identity, "every record already claimed, dropping product");
                    }
                    !empty
                })
                .collect()
        }
    };

    (products, duplicates)
}

/// Tracks which records have already filled a slot.
trait ClaimLedger {
    /// Record may still fill a slot through its own code.
    fn is_available(&self, source: usize, position: usize) -> bool;
    /// Record may still fill a slot of another product through its name.
    fn may_absorb(&self, source: usize, position: usize) -> bool;
    fn claim(&mut self, source: usize, position: usize);
}

struct NoClaims;

impl ClaimLedger for NoClaims {
    fn is_available(&self, _source: usize, _position: usize) -> bool {
        true
    }

    fn may_absorb(&self, _source: usize, _position: usize) -> bool {
        true
    }

    fn claim(&mut self, _source: usize, _position: usize) {}
}

/// Consume-mode ledger.
///
/// A record whose code is also listed by another source is reserved for the
/// product with that code, so fuzzy claims never take it. A record that is
/// the only carrier of its code can be absorbed; its own product then has no
/// contributing record left and is dropped.
struct Claims {
    claimed: Vec<Vec<bool>>,
    reserved: Vec<Vec<bool>>,
}

impl Claims {
    fn new(views: &[SourceView<'_>]) -> Self {
        let mut carriers: HashMap<&str, usize> = HashMap::new();
        for view in views {
            for code in view.index.codes() {
                *carriers.entry(code).or_default() += 1;
            }
        }

        let reserved = views
            .iter()
            .map(|view| {
                let mut reserved = vec![false; view.index.record_count()];
                for code in view.index.codes() {
                    if carriers.get(code).copied().unwrap_or_default() > 1 {
                        if let Some(position) = view.index.position(code) {
                            reserved[position] = true;
                        }
                    }
                }
                reserved
            })
            .collect();

        Self {
            claimed: views.iter().map(|v| vec![false; v.index.record_count()]).collect(),
            reserved,
        }
    }
}

impl ClaimLedger for Claims {
    fn is_available(&self, source: usize, position: usize) -> bool {
        !self.claimed[source][position]
    }

    fn may_absorb(&self, source: usize, position: usize) -> bool {
        !self.claimed[source][position] && !self.reserved[source][position]
    }

    fn claim(&mut self, source: usize, position: usize) {
        self.claimed[source][position] = true;
    }
}

/// Per-product working state. Lives for one product only.
struct ProductAccumulator {
    display_name: String,
    prices: Vec<Option<f64>>,
    matches: Vec<SlotMatch>,
}

impl ProductAccumulator {
    fn with_sources(count: usize) -> Self {
        Self {
            display_name: String::new(),
            prices: Vec::with_capacity(count),
            matches: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, price: Option<f64>, slot: SlotMatch) {
        self.prices.push(price);
        self.matches.push(slot);
    }

    fn finish(self, code: &str) -> CanonicalProduct {
        let stats = aggregate(&self.prices);
        let display_name = if self.display_name.is_empty() {
            fallback_label(code)
        } else {
            self.display_name
        };
        CanonicalProduct {
            identity: code.to_string(),
            display_name,
            prices: self.prices,
            best_price: stats.best_price,
            spread: stats.spread,
            matches: self.matches,
        }
    }
}

fn reconcile_product(
    code: &str,
    views: &[SourceView<'_>],
    claims: &mut impl ClaimLedger,
) -> CanonicalProduct {
    let mut acc = ProductAccumulator::with_sources(views.len());

    for (source, view) in views.iter().enumerate() {
        let exact = view
            .index
            .entry(code)
            .filter(|&(position, _)| claims.is_available(source, position));

        if let Some((position, record)) = exact {
            if acc.display_name.is_empty() && record.has_name() {
                acc.display_name = record.name.clone();
            }
            claims.claim(source, position);
            acc.push(record.price, SlotMatch::Exact { position });
            continue;
        }

        let hit = view
            .matcher
            .find_where(&acc.display_name, |position| claims.may_absorb(source, position));

        match hit {
            Some(hit) => {
                tracing::debug!(
                    code,
                    source,
                    matched = %hit.record.code,
                    score = hit.score,
                    "fuzzy match"
                );
                claims.claim(source, hit.position);
                acc.push(
                    hit.record.price,
                    SlotMatch::Fuzzy {
                        position: hit.position,
                        code: hit.record.code.clone(),
                        score: hit.score,
                    },
                );
            }
            None => acc.push(None, SlotMatch::Missing),
        }
    }

    acc.finish(code)
}
