use crate::model::PriceStats;

/// Best price and spread over one product's per-source prices.
///
/// Missing and NaN entries are ignored. A spread needs at least two valid
/// prices; with one, only the best price is set.
pub fn aggregate(prices: &[Option<f64>]) -> PriceStats {
    let mut valid = prices.iter().flatten().copied().filter(|p| !p.is_nan());

    let Some(first) = valid.next() else {
        return PriceStats::default();
    };

    let (mut min, mut max, mut count) = (first, first, 1usize);
    for p in valid {
        min = min.min(p);
        max = max.max(p);
        count += 1;
    }

    PriceStats {
        best_price: Some(min),
        spread: (count >= 2).then(|| max - min),
    }
}
