//! Market metrics pipeline.
//!
//! Stages, in order:
//! 1. HQ filter, sort listings ascending and history newest first
//! 2. Outlier-filtered velocity
//! 3. Average price with Normal / Old / Estimated fallback
//! 4. Effective stock and days to sell
//! 5. Revenue, flip profit, ROI
//! 6. Cross-region arbitrage with a velocity-scaled staleness check
//! 7. Snipe detection on the two cheapest listings
//! 8. Stack popularity

use crate::config::AnalyticsConfig;
use crate::metrics::{AveragePriceType, MarketMetrics};
use crate::stats::{filter_outliers, mean, stack_popularity};
use chrono::{DateTime, Duration, Utc};
use craftbook_core::{Listing, MarketSnapshot, Price, SaleRecord};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

/// Reported `days_to_sell` when nothing sells.
pub const DAYS_TO_SELL_UNBOUNDED: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

/// Sample size for the Old and Estimated average tiers.
const FALLBACK_SAMPLE: usize = 5;

/// Listings above `min_price` x this are stale stock.
const EFFECTIVE_STOCK_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// A second listing above average x this is not a realistic resale price.
const SNIPE_GAP_FACTOR: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Snipes with ROI above this percentage qualify when cheap enough.
const SNIPE_MIN_ROI: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Maximum outlay for the ROI-based snipe rule.
const SNIPE_MAX_COST: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

const TOP_STACKS: usize = 3;

/// Analyze `snapshot` as of now.
pub fn analyze(snapshot: &MarketSnapshot, config: &AnalyticsConfig, hq_only: bool) -> MarketMetrics {
    analyze_at(snapshot, config, hq_only, Utc::now())
}

/// Analyze `snapshot` as of `now`.
pub fn analyze_at(
    snapshot: &MarketSnapshot,
    config: &AnalyticsConfig,
    hq_only: bool,
    now: DateTime<Utc>,
) -> MarketMetrics {
    let mut listings: Vec<&Listing> = snapshot
        .listings
        .iter()
        .filter(|l| !hq_only || l.hq)
        .collect();
    let mut history: Vec<&SaleRecord> = snapshot
        .history
        .iter()
        .filter(|h| !hq_only || h.hq)
        .collect();

    if listings.is_empty() && history.is_empty() {
        return MarketMetrics::empty();
    }

    listings.sort_by(|a, b| a.unit_price.cmp(&b.unit_price));
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let tax_rate = config.tax_rate();
    let owned_history: Vec<SaleRecord> = history.into_iter().cloned().collect();
    let valid = filter_outliers(&owned_history);

    // Velocity
    let velocity_days = Decimal::from(config.velocity_days());
    let velocity_cutoff = window_start(now, Duration::days(i64::from(config.velocity_days())));
    let recent: Vec<&SaleRecord> = valid
        .iter()
        .copied()
        .filter(|h| h.timestamp > velocity_cutoff)
        .collect();
    let units_sold: u64 = recent.iter().map(|h| u64::from(h.quantity)).sum();
    let velocity = Decimal::from(units_sold) / velocity_days;
    let transaction_velocity = Decimal::from(recent.len()) / velocity_days;

    let (average_price, average_price_type) = average_price(&valid, &listings, config, now);

    // Effective stock
    let min_price = listings.first().map(|l| l.unit_price).unwrap_or(Price::ZERO);
    let effective_limit = min_price.inner() * EFFECTIVE_STOCK_FACTOR;
    let effective_stock: u64 = listings
        .iter()
        .filter(|l| l.unit_price.inner() <= effective_limit)
        .map(|l| u64::from(l.quantity))
        .sum();
    let total_raw_stock: u64 = listings.iter().map(|l| u64::from(l.quantity)).sum();
    let days_to_sell = if velocity > Decimal::ZERO {
        Decimal::from(effective_stock) / velocity
    } else {
        DAYS_TO_SELL_UNBOUNDED
    };

    // Revenue and profit
    let expected_unit_revenue = min_price.after_tax(tax_rate);
    let flip_profit = average_price.after_tax(tax_rate) - min_price;
    let roi = flip_profit.pct_of(min_price).unwrap_or(Decimal::ZERO);

    let (arbitrage_spread, arbitrage_warning) = arbitrage(&listings, tax_rate, velocity, now);
    let (snipe_profit, snipe_cost) = snipe(&listings, average_price, tax_rate, config);
    let stack_popularity = stack_popularity(valid.iter().copied(), TOP_STACKS);

    debug!(
        listings = listings.len(),
        sales = owned_history.len(),
        valid_sales = valid.len(),
        %velocity,
        %average_price,
        average_price_type = %average_price_type,
        "Market analyzed"
    );

    MarketMetrics {
        velocity,
        transaction_velocity,
        average_price,
        average_price_type,
        min_price,
        effective_stock,
        total_raw_stock,
        days_to_sell,
        expected_unit_revenue,
        flip_profit,
        roi,
        arbitrage_spread,
        arbitrage_warning,
        snipe_profit,
        snipe_cost,
        stack_popularity,
    }
}

/// Tiered average. `valid` is newest first, `listings` cheapest first.
fn average_price(
    valid: &[&SaleRecord],
    listings: &[&Listing],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> (Price, AveragePriceType) {
    let cutoff = window_start(now, Duration::days(i64::from(config.average_price_window_days)));
    let normal = mean(
        valid
            .iter()
            .filter(|h| h.timestamp > cutoff)
            .take(config.average_price_sample_count)
            .map(|h| h.unit_price),
    );
    if let Some(avg) = normal {
        return (avg, AveragePriceType::Normal);
    }

    if let Some(avg) = mean(valid.iter().take(FALLBACK_SAMPLE).map(|h| h.unit_price)) {
        return (avg, AveragePriceType::Old);
    }

    if let Some(avg) = mean(listings.iter().take(FALLBACK_SAMPLE).map(|l| l.unit_price)) {
        return (avg, AveragePriceType::Estimated);
    }

    (Price::ZERO, AveragePriceType::None)
}

/// Start of the trailing window of length `span` ending at `now`. A window
/// reaching past the earliest representable time starts there.
pub(crate) fn window_start(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Seconds the cheapest region's data may age before it is flagged.
fn staleness_threshold(velocity: Decimal) -> Duration {
    if velocity > Decimal::from(20) {
        Duration::seconds(1800)
    } else if velocity < Decimal::ONE {
        Duration::seconds(21600)
    } else {
        Duration::seconds(7200)
    }
}

/// Spread between the priciest and cheapest regional minimum, after tax.
fn arbitrage(
    listings: &[&Listing],
    tax_rate: Decimal,
    velocity: Decimal,
    now: DateTime<Utc>,
) -> (Price, bool) {
    // `listings` is ascending, so the first listing seen per region is its
    // minimum and regional minimums come out ascending too.
    let mut regional: Vec<&Listing> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for &listing in listings {
        if seen.insert(listing.region.as_str()) {
            regional.push(listing);
        }
    }

    if regional.len() < 2 {
        return (Price::ZERO, false);
    }

    // First entry is the global minimum; last is the highest regional minimum.
    let cheapest = regional[0];
    let priciest = regional[regional.len() - 1];
    let spread = priciest.unit_price.after_tax(tax_rate) - cheapest.unit_price;
    let stale = now - cheapest.last_review_time > staleness_threshold(velocity);

    (spread, stale)
}

/// Profit and outlay of buying the cheapest stack and relisting at the
/// second-cheapest price. Zeros when the opportunity does not qualify.
fn snipe(
    listings: &[&Listing],
    average_price: Price,
    tax_rate: Decimal,
    config: &AnalyticsConfig,
) -> (Price, Price) {
    let none = (Price::ZERO, Price::ZERO);
    let [first, second, ..] = listings else {
        return none;
    };

    if average_price.is_positive()
        && second.unit_price.inner() > average_price.inner() * SNIPE_GAP_FACTOR
    {
        return none;
    }

    let unit_profit = second.unit_price.after_tax(tax_rate) - first.unit_price;
    let total_profit = unit_profit.times(first.quantity);
    let cost = first.stack_cost();
    let roi = unit_profit.pct_of(first.unit_price).unwrap_or(Decimal::ZERO);

    let worth = total_profit.inner() >= config.snipe_minimum_profit
        || (roi > SNIPE_MIN_ROI && cost.inner() < SNIPE_MAX_COST);

    if worth {
        (total_profit, cost)
    } else {
        none
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn listing(price: Decimal, quantity: u32, region: &str) -> Listing {
        Listing::new(Price::new(price), quantity, region).reviewed_at(now())
    }

    fn sale(price: Decimal, quantity: u32, days_ago: i64) -> SaleRecord {
        SaleRecord::new(Price::new(price), quantity, now() - Duration::days(days_ago))
    }

    #[test]
    fn test_staleness_threshold_tiers() {
        assert_eq!(staleness_threshold(dec!(21)), Duration::seconds(1800));
        assert_eq!(staleness_threshold(dec!(20)), Duration::seconds(7200));
        assert_eq!(staleness_threshold(dec!(1)), Duration::seconds(7200));
        assert_eq!(staleness_threshold(dec!(0.5)), Duration::seconds(21600));
    }

    #[test]
    fn test_huge_windows_cover_all_history() {
        let config = AnalyticsConfig {
            velocity_window_days: 100_000_000,
            average_price_window_days: 100_000_000,
            ..Default::default()
        };
        let snapshot = MarketSnapshot::new(
            vec![listing(dec!(100), 1, "Ramuh")],
            vec![sale(dec!(120), 2, 1), sale(dec!(80), 2, 400)],
        );
        let metrics = analyze_at(&snapshot, &config, false, now());

        assert_eq!(metrics.average_price_type, AveragePriceType::Normal);
        assert_eq!(metrics.average_price, Price::new(dec!(100)));
        assert_eq!(metrics.velocity, dec!(4) / dec!(100000000));
    }

    #[test]
    fn test_window_start_saturates() {
        assert_eq!(window_start(now(), Duration::days(1)), now() - Duration::days(1));
        assert_eq!(
            window_start(now(), Duration::days(100_000_000)),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn test_single_region_has_no_arbitrage() {
        let a = listing(dec!(100), 1, "Ramuh");
        let b = listing(dec!(300), 1, "Ramuh");
        assert_eq!(arbitrage(&[&a, &b], dec!(0.05), dec!(5), now()), (Price::ZERO, false));
    }

    #[test]
    fn test_effective_stock_and_days_to_sell() {
        let snapshot = MarketSnapshot::new(
            vec![
                listing(dec!(100), 10, "Ramuh"),
                listing(dec!(150), 5, "Ramuh"),
                listing(dec!(151), 20, "Ramuh"),
            ],
            vec![sale(dec!(100), 14, 1)],
        );
        let metrics = analyze_at(&snapshot, &AnalyticsConfig::default(), false, now());

        assert_eq!(metrics.effective_stock, 15);
        assert_eq!(metrics.total_raw_stock, 35);
        // 14 units over 7 days = 2/day
        assert_eq!(metrics.velocity, dec!(2));
        assert_eq!(metrics.days_to_sell, dec!(7.5));
    }

    #[test]
    fn test_flip_profit_and_roi() {
        let snapshot = MarketSnapshot::new(
            vec![listing(dec!(100), 1, "Ramuh")],
            vec![sale(dec!(200), 1, 1), sale(dec!(200), 1, 2)],
        );
        let metrics = analyze_at(&snapshot, &AnalyticsConfig::default(), false, now());

        assert_eq!(metrics.average_price_type, AveragePriceType::Normal);
        assert_eq!(metrics.expected_unit_revenue, Price::new(dec!(95)));
        // 200 * 0.95 - 100
        assert_eq!(metrics.flip_profit, Price::new(dec!(90)));
        assert_eq!(metrics.roi, dec!(90));
    }

    #[test]
    fn test_hq_only_filters_both_sides() {
        let snapshot = MarketSnapshot::new(
            vec![
                listing(dec!(50), 1, "Ramuh"),
                listing(dec!(80), 2, "Ramuh").with_hq(true),
            ],
            vec![sale(dec!(90), 3, 1).with_hq(true), sale(dec!(40), 9, 1)],
        );
        let metrics = analyze_at(&snapshot, &AnalyticsConfig::default(), true, now());

        assert_eq!(metrics.min_price, Price::new(dec!(80)));
        assert_eq!(metrics.total_raw_stock, 2);
        assert_eq!(metrics.average_price, Price::new(dec!(90)));
    }

    #[test]
    fn test_hq_only_without_hq_data_is_empty() {
        let snapshot = MarketSnapshot::new(vec![listing(dec!(50), 1, "Ramuh")], vec![]);
        let metrics = analyze_at(&snapshot, &AnalyticsConfig::default(), true, now());
        assert_eq!(metrics, MarketMetrics::empty());
    }
}
