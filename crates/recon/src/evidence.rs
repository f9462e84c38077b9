use crate::model::{CanonicalProduct, ReconSummary, SlotMatch};

/// Compute summary statistics from reconciled products.
pub fn compute_summary(
    products: &[CanonicalProduct],
    sources: usize,
    duplicate_codes: usize,
) -> ReconSummary {
    let mut summary = ReconSummary {
        products: products.len(),
        sources,
        duplicate_codes,
        ..ReconSummary::default()
    };

    for p in products {
        match p.valid_prices().count() {
            0 => summary.unpriced += 1,
            1 => summary.single_source += 1,
            _ => {}
        }
        if sources > 0 && p.valid_prices().count() == sources {
            summary.fully_priced += 1;
        }

        for slot in &p.matches {
            match slot {
                SlotMatch::Exact { .. } => summary.exact_slots += 1,
                SlotMatch::Fuzzy { .. } => summary.fuzzy_slots += 1,
                SlotMatch::Missing => summary.missing_slots += 1,
            }
        }
    }

    summary
}
