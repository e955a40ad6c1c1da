//! Small robust-statistics helpers over sale history.

use craftbook_core::{Price, SaleRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::metrics::StackPopularity;

/// Kept band around the median: [median / 10, median x 10].
const OUTLIER_FACTOR: Decimal = Decimal::TEN;

/// Upper median of `prices`: element `len / 2` after sorting.
pub fn median(prices: &[Price]) -> Option<Price> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort();
    Some(sorted[sorted.len() / 2])
}

/// Sales with a positive price inside the outlier band around their median.
///
/// Order of `history` is preserved.
pub fn filter_outliers(history: &[SaleRecord]) -> Vec<&SaleRecord> {
    let priced: Vec<&SaleRecord> = history.iter().filter(|h| h.unit_price.is_positive()).collect();
    let prices: Vec<Price> = priced.iter().map(|h| h.unit_price).collect();
    let Some(median) = median(&prices) else {
        return priced;
    };

    let low = median.inner() / OUTLIER_FACTOR;
    let high = median.inner() * OUTLIER_FACTOR;
    priced
        .into_iter()
        .filter(|h| (low..=high).contains(&h.unit_price.inner()))
        .collect()
}

/// Arithmetic mean, `None` for no input.
pub fn mean(prices: impl IntoIterator<Item = Price>) -> Option<Price> {
    let mut total = Decimal::ZERO;
    let mut count = 0u32;
    for price in prices {
        total += price.inner();
        count += 1;
    }
    (count > 0).then(|| Price::new(total / Decimal::from(count)))
}

/// The `limit` most frequent sale quantities, larger quantity first on ties.
pub fn stack_popularity<'a>(
    history: impl IntoIterator<Item = &'a SaleRecord>,
    limit: usize,
) -> Vec<StackPopularity> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for sale in history {
        *counts.entry(sale.quantity).or_default() += 1;
    }

    let mut ranked: Vec<StackPopularity> = counts
        .into_iter()
        .map(|(quantity, frequency)| StackPopularity { quantity, frequency })
        .collect();
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(b.quantity.cmp(&a.quantity)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn sale(price: Decimal, quantity: u32) -> SaleRecord {
        SaleRecord::new(Price::new(price), quantity, Utc::now())
    }

    #[test]
    fn test_median_takes_upper_middle() {
        let prices: Vec<Price> = [dec!(4), dec!(1), dec!(3), dec!(2)].into_iter().map(Price::new).collect();
        assert_eq!(median(&prices), Some(Price::new(dec!(3))));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_filter_outliers() {
        let history = vec![
            sale(dec!(100), 1),
            sale(dec!(0), 1),
            sale(dec!(9), 1),
            sale(dec!(10), 1),
            sale(dec!(1000), 1),
            sale(dec!(1001), 1),
            sale(dec!(120), 1),
        ];
        let kept: Vec<Decimal> = filter_outliers(&history)
            .iter()
            .map(|h| h.unit_price.inner())
            .collect();
        // Median of positive prices is 100; band is [10, 1000].
        assert_eq!(kept, vec![dec!(100), dec!(10), dec!(1000), dec!(120)]);
    }

    #[test]
    fn test_mean() {
        let avg = mean([dec!(10), dec!(20), dec!(40)].into_iter().map(Price::new));
        assert_eq!(avg.map(|p| p.inner().round_dp(4)), Some(dec!(23.3333)));
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn test_stack_popularity_ties_prefer_larger() {
        let mut history = Vec::new();
        for _ in 0..4 {
            history.push(sale(dec!(10), 1));
            history.push(sale(dec!(10), 99));
        }
        history.push(sale(dec!(10), 5));
        history.push(sale(dec!(10), 7));
        history.push(sale(dec!(10), 7));

        let top = stack_popularity(&history, 3);
        assert_eq!(
            top,
            vec![
                StackPopularity { quantity: 99, frequency: 4 },
                StackPopularity { quantity: 1, frequency: 4 },
                StackPopularity { quantity: 7, frequency: 2 },
            ]
        );
    }
}
