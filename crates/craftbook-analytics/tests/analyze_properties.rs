//! Behavior of the metrics pipeline on hand-built markets.

use chrono::{DateTime, Duration, Utc};
use craftbook_analytics::{
    analyze, analyze_at, AnalyticsConfig, AveragePriceType, MarketMetrics, StackPopularity,
    DAYS_TO_SELL_UNBOUNDED,
};
use craftbook_core::{Listing, MarketSnapshot, Price, SaleRecord};
use rust_decimal::Decimal;
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

fn config() -> AnalyticsConfig {
    AnalyticsConfig::default()
}

#[test]
fn test_empty_snapshot_has_no_average() {
    let metrics = analyze(&MarketSnapshot::default(), &config(), false);

    assert_eq!(metrics.average_price_type, AveragePriceType::None);
    assert_eq!(metrics.velocity, Decimal::ZERO);
    assert_eq!(metrics.days_to_sell, DAYS_TO_SELL_UNBOUNDED);
    assert_eq!(metrics, MarketMetrics::empty());
}

#[test]
fn test_old_sales_fall_back_to_old_tier() {
    let history = (0..7).map(|i| sale(Decimal::from(100 + i * 10), 1, 40 + i)).collect();
    let snapshot = MarketSnapshot::new(vec![listing(dec!(90), 1, "Ramuh")], history);

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(metrics.average_price_type, AveragePriceType::Old);
    // Newest five: 100, 110, 120, 130, 140
    assert_eq!(metrics.average_price, Price::new(dec!(120)));
    assert_eq!(metrics.velocity, Decimal::ZERO);
}

#[test]
fn test_listings_only_estimate_average() {
    let listings = [10, 20, 30, 40, 50, 60]
        .iter()
        .map(|p| listing(Decimal::from(*p), 1, "Ramuh"))
        .collect();
    let metrics = analyze_at(&MarketSnapshot::new(listings, vec![]), &config(), false, now());

    assert_eq!(metrics.average_price_type, AveragePriceType::Estimated);
    assert_eq!(metrics.average_price, Price::new(dec!(30)));
}

#[test]
fn test_normal_tier_uses_most_recent_samples() {
    let config = AnalyticsConfig {
        average_price_sample_count: 2,
        ..config()
    };
    let history = vec![sale(dec!(300), 1, 3), sale(dec!(100), 1, 1), sale(dec!(200), 1, 2)];
    let snapshot = MarketSnapshot::new(vec![listing(dec!(150), 1, "Ramuh")], history);

    let metrics = analyze_at(&snapshot, &config, false, now());
    assert_eq!(metrics.average_price_type, AveragePriceType::Normal);
    assert_eq!(metrics.average_price, Price::new(dec!(150)));
}

#[test]
fn test_outliers_do_not_count_towards_velocity() {
    let history = vec![
        sale(dec!(100), 4, 1),
        sale(dec!(110), 3, 2),
        sale(dec!(90), 7, 3),
        sale(dec!(5), 500, 1),
        sale(dec!(0), 100, 1),
    ];
    let snapshot = MarketSnapshot::new(vec![listing(dec!(100), 1, "Ramuh")], history);

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(metrics.velocity, dec!(2));
    assert_eq!(metrics.transaction_velocity, dec!(3) / dec!(7));
}

#[test]
fn test_arbitrage_spread_across_regions() {
    let snapshot = MarketSnapshot::new(
        vec![
            listing(dec!(150), 1, "Gaia"),
            listing(dec!(100), 1, "Ramuh"),
            listing(dec!(180), 1, "Ramuh"),
            listing(dec!(120), 1, "Tonberry"),
        ],
        vec![],
    );

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(metrics.arbitrage_spread, Price::new(dec!(42.5)));
    assert!(!metrics.arbitrage_warning);
}

#[test]
fn test_stale_cheapest_region_raises_warning() {
    let stale = now() - Duration::hours(7);
    let snapshot = MarketSnapshot::new(
        vec![
            listing(dec!(100), 1, "Ramuh").reviewed_at(stale),
            listing(dec!(150), 1, "Gaia"),
        ],
        vec![],
    );

    // No sales: velocity < 1, so the threshold is six hours.
    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert!(metrics.arbitrage_warning);

    // Fast movers get a half-hour threshold.
    let fast_history = (0..30).map(|_| sale(dec!(100), 5, 1)).collect();
    let snapshot = MarketSnapshot::new(
        vec![
            listing(dec!(100), 1, "Ramuh").reviewed_at(now() - Duration::minutes(45)),
            listing(dec!(150), 1, "Gaia"),
        ],
        fast_history,
    );
    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert!(metrics.velocity > dec!(20));
    assert!(metrics.arbitrage_warning);
}

#[test]
fn test_cheap_high_roi_snipe_is_reported() {
    // No history: the average is estimated from listings at 125, so a
    // resale at 200 is within three times the average.
    let snapshot = MarketSnapshot::new(
        vec![listing(dec!(50), 10, "Ramuh"), listing(dec!(200), 5, "Ramuh")],
        vec![],
    );

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(metrics.average_price, Price::new(dec!(125)));
    // (200 * 0.95 - 50) * 10
    assert_eq!(metrics.snipe_profit, Price::new(dec!(1400)));
    assert_eq!(metrics.snipe_cost, Price::new(dec!(500)));
    assert!(metrics.has_snipe());
}

#[test]
fn test_snipe_rejected_when_resale_is_far_above_average() {
    let snapshot = MarketSnapshot::new(
        vec![listing(dec!(50), 10, "Ramuh"), listing(dec!(200), 5, "Ramuh")],
        vec![sale(dec!(60), 1, 1)],
    );

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(metrics.average_price, Price::new(dec!(60)));
    assert_eq!(metrics.snipe_profit, Price::ZERO);
    assert_eq!(metrics.snipe_cost, Price::ZERO);
}

#[test]
fn test_large_snipe_qualifies_on_total_profit() {
    let snapshot = MarketSnapshot::new(
        vec![listing(dec!(1000), 10, "Ramuh"), listing(dec!(1300), 1, "Ramuh")],
        vec![sale(dec!(1200), 1, 1)],
    );

    let metrics = analyze_at(&snapshot, &config(), false, now());
    // (1300 * 0.95 - 1000) * 10 = 2350, ROI only 23.5%.
    assert_eq!(metrics.snipe_profit, Price::new(dec!(2350)));
    assert_eq!(metrics.snipe_cost, Price::new(dec!(10000)));
}

#[test]
fn test_stack_popularity_ties_rank_larger_first() {
    let mut history = Vec::new();
    for day in 0..4 {
        history.push(sale(dec!(100), 10, day));
        history.push(sale(dec!(100), 20, day));
    }
    history.push(sale(dec!(100), 99, 1));
    let snapshot = MarketSnapshot::new(vec![], history);

    let metrics = analyze_at(&snapshot, &config(), false, now());
    assert_eq!(
        metrics.stack_popularity,
        vec![
            StackPopularity { quantity: 20, frequency: 4 },
            StackPopularity { quantity: 10, frequency: 4 },
            StackPopularity { quantity: 99, frequency: 1 },
        ]
    );
    assert_eq!(metrics.min_price, Price::ZERO);
    assert_eq!(metrics.roi, Decimal::ZERO);
}
