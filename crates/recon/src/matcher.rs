use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::config::{CandidateStrategy, FuzzyPolicy, MatchConfig};
use crate::model::SourceRecord;
use crate::similarity::{max_score_for_lengths, normalize_name, score_normalized};

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

/// Chooses which records of a source are worth scoring against a reference
/// name. Returned positions are ascending so first-match order is kept.
pub trait CandidateSelector: Send + Sync {
    fn select(&self, reference_len: usize) -> Cow<'_, [usize]>;
}

/// Every record that has a name.
pub struct FullScan {
    named: Vec<usize>,
}

impl FullScan {
    pub fn new(names: &[String]) -> Self {
        let named = names
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_empty())
            .map(|(i, _)| i)
            .collect();
        Self { named }
    }
}

impl CandidateSelector for FullScan {
    fn select(&self, _reference_len: usize) -> Cow<'_, [usize]> {
        Cow::Borrowed(&self.named)
    }
}

/// Records bucketed by name length. Only buckets whose length difference
/// still allows a score above the threshold are returned, which drops no
/// candidate that a full scan would have accepted.
pub struct LengthBlocked {
    buckets: BTreeMap<usize, Vec<usize>>,
    threshold: u8,
}

impl LengthBlocked {
    pub fn new(names: &[String], threshold: u8) -> Self {
        let mut buckets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            buckets.entry(name.chars().count()).or_default().push(i);
        }
        Self { buckets, threshold }
    }
}

impl CandidateSelector for LengthBlocked {
    fn select(&self, reference_len: usize) -> Cow<'_, [usize]> {
        let mut hits: Vec<&Vec<usize>> = self
            .buckets
            .iter()
            .filter(|(len, _)| max_score_for_lengths(reference_len, **len) > self.threshold)
            .map(|(_, positions)| positions)
            .collect();

        match hits.len() {
            0 => Cow::Owned(Vec::new()),
            1 => Cow::Borrowed(hits.remove(0).as_slice()),
            _ => {
                let mut merged: Vec<usize> = hits.into_iter().flatten().copied().collect();
                merged.sort_unstable();
                Cow::Owned(merged)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Name matcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyHit<'a> {
    pub position: usize,
    pub record: &'a SourceRecord,
    pub score: u8,
}

/// Fuzzy fallback over one source's records.
pub struct NameMatcher<'a> {
    records: &'a [SourceRecord],
    names: Vec<String>,
    selector: Box<dyn CandidateSelector + 'a>,
    threshold: u8,
    policy: FuzzyPolicy,
}

impl<'a> NameMatcher<'a> {
    pub fn new(records: &'a [SourceRecord], config: &MatchConfig) -> Self {
        let names: Vec<String> = records.iter().map(|r| normalize_name(&r.name)).collect();
        let selector: Box<dyn CandidateSelector> = match config.candidates {
            CandidateStrategy::FullScan => Box::new(FullScan::new(&names)),
            CandidateStrategy::LengthBlocked => {
                Box::new(LengthBlocked::new(&names, config.threshold))
            }
        };
        Self::with_selector(records, names, selector, config)
    }

    /// Build with a caller-supplied candidate selector.
    pub fn with_selector(
        records: &'a [SourceRecord],
        names: Vec<String>,
        selector: Box<dyn CandidateSelector + 'a>,
        config: &MatchConfig,
    ) -> Self {
        Self {
            records,
            names,
            selector,
            threshold: config.threshold,
            policy: config.policy,
        }
    }

    pub fn find(&self, reference: &str) -> Option<FuzzyHit<'a>> {
        self.find_where(reference, |_| true)
    }

    /// Like `find`, but only considers positions accepted by `available`.
    pub fn find_where(
        &self,
        reference: &str,
        available: impl Fn(usize) -> bool,
    ) -> Option<FuzzyHit<'a>> {
        if reference.is_empty() {
            return None;
        }
        let reference = normalize_name(reference);
        let candidates = self.selector.select(reference.chars().count());

        let mut best: Option<FuzzyHit<'a>> = None;
        for &position in candidates.iter() {
            if !available(position) {
                continue;
            }
            let name = &self.names[position];
            if name.is_empty() {
                continue;
            }
            let score = score_normalized(&reference, name);
            if score <= self.threshold {
                continue;
            }
            let hit = FuzzyHit {
                position,
                record: &self.records[position],
                score,
            };
            match self.policy {
                FuzzyPolicy::FirstMatch => return Some(hit),
                FuzzyPolicy::BestMatch => {
                    // Strict comparison keeps the earlier record on ties
                    if best.map_or(true, |b| score > b.score) {
                        best = Some(hit);
                    }
                }
            }
        }
        best
    }
}

/// Search `candidates` for a record named like `reference`, scanning all of them.
pub fn find_similar<'a>(
    reference: &str,
    candidates: &'a [SourceRecord],
    config: &MatchConfig,
) -> Option<&'a SourceRecord> {
    let config = MatchConfig {
        candidates: CandidateStrategy::FullScan,
        ..*config
    };
    NameMatcher::new(candidates, &config)
        .find(reference)
        .map(|hit| hit.record)
}
