// Property-based tests for reconciliation invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use pricecomp_recon::aggregate;
use pricecomp_recon::config::{CandidateStrategy, FuzzyPolicy, MatchConfig, ReusePolicy};
use pricecomp_recon::engine::reconcile;
use pricecomp_recon::model::{SlotMatch, Source, SourceRecord};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small code space so sources overlap often.
fn arb_code() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => "[A-D][0-3]",
        1 => Just(String::new()),
    ]
}

/// Names drawn from a few families so fuzzy matches actually happen.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(vec![
            "Widget", "Widgets", "widget", "Gadget", "Gadgets", "Sprocket", "Sprockets 10",
        ])
        .prop_map(str::to_string),
        1 => "[a-z ]{0,12}",
        1 => Just(String::new()),
    ]
}

/// Mostly numeric prices, sometimes missing, sometimes zero.
fn arb_price() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        6 => (0u32..100_000).prop_map(|c| Some(c as f64 / 100.0)),
        1 => Just(Some(0.0)),
        2 => Just(None),
    ]
}

fn arb_record() -> impl Strategy<Value = SourceRecord> {
    (arb_code(), arb_name(), arb_price())
        .prop_map(|(code, name, price)| SourceRecord::new(code, name, price))
}

fn arb_sources() -> impl Strategy<Value = Vec<Source>> {
    prop::collection::vec(prop::collection::vec(arb_record(), 0..12), 1..5).prop_map(|sets| {
        sets.into_iter()
            .enumerate()
            .map(|(i, records)| Source::new(format!("s{i}.csv"), records))
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = MatchConfig> {
    (
        prop::sample::select(vec![FuzzyPolicy::FirstMatch, FuzzyPolicy::BestMatch]),
        prop::sample::select(vec![ReusePolicy::Shared, ReusePolicy::Consume]),
        prop::sample::select(vec![CandidateStrategy::FullScan, CandidateStrategy::LengthBlocked]),
        60u8..=95,
    )
        .prop_map(|(policy, reuse, candidates, threshold)| MatchConfig {
            threshold,
            policy,
            reuse,
            candidates,
            parallel: false,
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn one_slot_per_source(sources in arb_sources(), config in arb_config()) {
        for p in reconcile(&sources, &config) {
            prop_assert_eq!(p.prices.len(), sources.len());
            prop_assert_eq!(p.matches.len(), sources.len());
        }
    }

    #[test]
    fn stats_follow_valid_prices(sources in arb_sources(), config in arb_config()) {
        for p in reconcile(&sources, &config) {
            let valid: Vec<f64> = p.prices.iter().flatten().copied().collect();
            match valid.len() {
                0 => {
                    prop_assert_eq!(p.best_price, None);
                    prop_assert_eq!(p.spread, None);
                }
                1 => {
                    prop_assert_eq!(p.best_price, Some(valid[0]));
                    prop_assert_eq!(p.spread, None);
                }
                _ => {
                    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert_eq!(p.best_price, Some(min));
                    prop_assert_eq!(p.spread, Some(max - min));
                }
            }
            prop_assert_eq!(aggregate(&p.prices).best_price, p.best_price);
        }
    }

    #[test]
    fn exact_slots_read_own_source(sources in arb_sources(), config in arb_config()) {
        for p in reconcile(&sources, &config) {
            for (i, slot) in p.matches.iter().enumerate() {
                if let SlotMatch::Exact { position } = slot {
                    let record = &sources[i].records[*position];
                    prop_assert_eq!(&record.code, &p.identity);
                    prop_assert_eq!(record.price, p.prices[i]);
                }
            }
        }
    }

    #[test]
    fn fuzzy_never_when_code_present(sources in arb_sources(), config in arb_config()) {
        for p in reconcile(&sources, &config) {
            for (i, slot) in p.matches.iter().enumerate() {
                let has_code = sources[i].records.iter().any(|r| r.code == p.identity);
                if has_code {
                    let is_exact = matches!(slot, SlotMatch::Exact { .. });
                    prop_assert!(is_exact);
                }
            }
        }
    }

    #[test]
    fn deterministic_and_parallel_safe(sources in arb_sources()) {
        let config = MatchConfig::default();
        let first = reconcile(&sources, &config);
        let second = reconcile(&sources, &config);
        let parallel = reconcile(&sources, &MatchConfig { parallel: true, ..config });
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &parallel);
    }

    #[test]
    fn shared_mode_one_product_per_code(sources in arb_sources()) {
        let mut codes: Vec<&str> = sources
            .iter()
            .flat_map(|s| s.records.iter().map(|r| r.code.as_str()))
            .collect();
        codes.sort_unstable();
        codes.dedup();

        let products = reconcile(&sources, &MatchConfig::default());
        let ids: Vec<&str> = products.iter().map(|p| p.identity.as_str()).collect();
        prop_assert_eq!(ids, codes);
    }

    #[test]
    fn consume_mode_uses_each_record_once(sources in arb_sources()) {
        let config = MatchConfig { reuse: ReusePolicy::Consume, ..MatchConfig::default() };
        let mut seen = std::collections::HashSet::new();
        for p in reconcile(&sources, &config) {
            for (i, slot) in p.matches.iter().enumerate() {
                let position = match slot {
                    SlotMatch::Exact { position } | SlotMatch::Fuzzy { position, .. } => *position,
                    SlotMatch::Missing => continue,
                };
                prop_assert!(seen.insert((i, position)), "record {position} of source {i} reused");
            }
        }
    }

    #[test]
    fn blocking_is_lossless(sources in arb_sources(), config in arb_config()) {
        let full = MatchConfig { candidates: CandidateStrategy::FullScan, ..config };
        let blocked = MatchConfig { candidates: CandidateStrategy::LengthBlocked, ..config };
        prop_assert_eq!(reconcile(&sources, &full), reconcile(&sources, &blocked));
    }
}
