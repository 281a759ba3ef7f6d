use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use produce_inventory::{
    config::AppConfig,
    errors::ServiceError,
    models::{Catalog, Category, Product, Unit},
    repositories::MemoryStore,
    services::{
        analytics::AnalyticsRange,
        archive::{group_by_month, ArchiveFilter},
    },
    AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn products() -> Vec<Product> {
    vec![
        Product::new("melone", "Melone Honig", Category::Fruits, Unit::Piece, 1, dec!(2)),
        Product::new("tomaten", "Tomaten", Category::Vegetables, Unit::Kg, 2, Decimal::ONE),
        Product::new("eisberg", "Eisberg", Category::Salads, Unit::Piece, 3, dec!(0.8)),
    ]
}

fn app(top_products_limit: usize) -> AppState {
    let store = MemoryStore::with_products(products());
    let config = AppConfig {
        top_products_limit,
        ..AppConfig::default()
    };
    AppState::new(config, Arc::new(store), Catalog::new(products()), None)
}

#[tokio::test]
async fn empty_range_is_not_found() {
    let app = app(5);
    let result = app.analytics_service.report(AnalyticsRange::Week, date(4, 10)).await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn weekly_report_uses_latest_day() {
    let app = app(2);
    let inventory = &app.inventory_service;
    inventory.update_quantity(date(4, 1), "tomaten", dec!(30)).await.unwrap();
    inventory.update_quantity(date(4, 8), "melone", dec!(3)).await.unwrap();
    inventory.update_quantity(date(4, 9), "tomaten", dec!(4)).await.unwrap();
    inventory.update_quantity(date(4, 9), "eisberg", dec!(10)).await.unwrap();

    let report = app
        .analytics_service
        .report(AnalyticsRange::Week, date(4, 10))
        .await
        .unwrap();

    assert_eq!((report.start, report.end), (date(4, 3), date(4, 10)));
    let trend: Vec<_> = report.trend.iter().map(|p| (p.date, p.total_kg)).collect();
    assert_eq!(trend, [(date(4, 8), dec!(6)), (date(4, 9), dec!(12.0))]);

    let top: Vec<_> = report.top_products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(top, ["eisberg", "tomaten"]);

    let categories: Vec<_> = report.categories.iter().map(|c| c.category).collect();
    assert_eq!(categories, [Category::Vegetables, Category::Salads]);
}

#[tokio::test]
async fn custom_range_with_inverted_bounds_is_invalid() {
    let app = app(5);
    let range = AnalyticsRange::Custom {
        start: date(4, 9),
        end: date(4, 1),
    };
    assert_matches!(
        app.analytics_service.report(range, date(4, 10)).await,
        Err(ServiceError::InvalidInput(_))
    );
}

#[tokio::test]
async fn archive_filters_and_groups_history() {
    let app = app(5);
    let inventory = &app.inventory_service;
    inventory.update_quantity(date(2, 27), "melone", dec!(1)).await.unwrap();
    inventory.update_demand(date(3, 3), "melone", dec!(2)).await.unwrap();
    inventory.update_quantity(date(3, 4), "tomaten", dec!(5)).await.unwrap();

    let history = inventory.history(date(1, 1), date(3, 31), false).await.unwrap();

    let melon_days = ArchiveFilter::new(None, Some("melone".into())).apply(&history);
    let groups = group_by_month(melon_days);
    let months: Vec<_> = groups.keys().rev().map(String::as_str).collect();
    assert_eq!(months, ["2025-03", "2025-02"]);
    assert_eq!(groups["2025-03"].len(), 1);
    assert_eq!(groups["2025-03"][0].date, date(3, 3));

    let mondays = ArchiveFilter::new(Some("montag".into()), None).apply(&history);
    assert_eq!(mondays.len(), 1);
    assert_eq!(mondays[0].date, date(3, 3));
}
