//! History aggregation tests
//!
//! Statistics, seasonal trends, dashboard summary and recent activity over a
//! farmer's analyses (newest first).

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    dashboard_summary, farmer_statistics, fixed, recent_activity, seasonal_trends,
    AlternativeCrop, BoundaryGeometry, ClimateData, CropRecommendation, DataSource, FarmSize,
    FarmerStatistics, PrimaryCrop, Season, SoilAnalysis, SoilHealth, SoilProperties, SoilSample,
    SoilTexture,
};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 20, 10, 0, 0).unwrap()
}

fn analysis(crop: &str, ph: f64, fertility: f64, season: Season, age: Duration) -> SoilAnalysis {
    let date = now() - age;
    SoilAnalysis {
        id: Uuid::new_v4(),
        farmer_id: Uuid::nil(),
        boundary: BoundaryGeometry::with_measurements(
            vec![
                [75.7139, 15.3173],
                [75.7149, 15.3173],
                [75.7149, 15.3183],
                [75.7139, 15.3183],
            ],
            Some(2.5),
            None,
            None,
        )
        .unwrap(),
        sample: SoilSample {
            soil_properties: SoilProperties {
                ph,
                nitrogen: 0.4,
                phosphorus: 35.0,
                potassium: 140.0,
                organic_carbon: 16.0,
                clay: 42.0,
                sand: None,
                bulk_density: None,
                cec: Some(24.0),
                soil_type: SoilTexture::Clay,
            },
            climate_data: ClimateData {
                rainfall: 720.0,
                temperature: 27.0,
            },
        },
        soil_color: None,
        crop_recommendation: CropRecommendation {
            primary_crop: PrimaryCrop {
                name: crop.to_string(),
                match_score: 88.0,
                fertilizer: "DAP".to_string(),
            },
            alternative_crops: vec![
                AlternativeCrop {
                    name: "Jowar".to_string(),
                    match_score: 70.0,
                },
                AlternativeCrop {
                    name: "Groundnut".to_string(),
                    match_score: 65.0,
                },
            ],
        },
        soil_health: SoilHealth::Good,
        fertility_rating: fertility,
        analysis_date: date,
        season,
        data_source: DataSource::SoilGrids,
        notes: None,
        is_archived: false,
        report_viewed: false,
        report_downloaded: false,
        download_count: 0,
        created_at: date,
        updated_at: date,
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Averaging identical analyses gives back the single analysis
    #[test]
    fn prop_identical_analyses_keep_their_values(
        count in 1usize..20,
        ph in 4.0f64..9.0,
        fertility in 0.0f64..=10.0,
    ) {
        let one = analysis("Cotton", ph, fertility, Season::Kharif, Duration::days(3));
        let many = vec![one; count];

        let stats = farmer_statistics(&many);
        let stats = stats.stats().expect("non-empty history has statistics");
        prop_assert_eq!(stats.total_analyses, count);
        prop_assert_eq!(stats.average_ph, fixed(ph, 2));
        prop_assert_eq!(stats.average_fertility, fixed(fertility, 1));
        prop_assert_eq!(stats.most_recommended_crop.as_str(), "Cotton");
        prop_assert_eq!(stats.crop_distribution.get("Cotton"), Some(count));
    }

    /// Season groups partition the active history
    #[test]
    fn prop_seasonal_counts_sum_to_total(seasons in prop::collection::vec(0u8..3, 0..15)) {
        let history: Vec<SoilAnalysis> = seasons
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let season = match s {
                    0 => Season::Kharif,
                    1 => Season::Rabi,
                    _ => Season::Zaid,
                };
                analysis("Rice", 6.5, 7.0, season, Duration::days(i as i64))
            })
            .collect();

        let trends = seasonal_trends(&history);
        let total: usize = trends.iter().map(|t| t.count).sum();
        prop_assert_eq!(total, history.len());
        for trend in &trends {
            prop_assert_eq!(trend.crops.len(), trend.count);
            prop_assert!(trend.avg_ph.is_finite());
        }
    }
}

// ============================================================================
// Unit Tests: Statistics
// ============================================================================

#[cfg(test)]
mod statistics_tests {
    use super::*;

    #[test]
    fn test_empty_history_is_sentinel() {
        assert_eq!(farmer_statistics(&[]), FarmerStatistics::NoData);
        let json = serde_json::to_value(farmer_statistics(&[])).unwrap();
        assert_eq!(json["averagepH"], "-");
        assert_eq!(json["totalAreaAnalyzed"], "0.00");
    }

    #[test]
    fn test_most_recommended_crop_and_distribution() {
        let history = vec![
            analysis("Rice", 6.0, 6.5, Season::Kharif, Duration::days(1)),
            analysis("Rice", 6.4, 8.0, Season::Kharif, Duration::days(10)),
            analysis("Wheat", 7.1, 9.5, Season::Rabi, Duration::days(200)),
        ];
        let stats = farmer_statistics(&history);
        let stats = stats.stats().unwrap();

        assert_eq!(stats.most_recommended_crop, "Rice");
        assert_eq!(stats.crop_distribution.get("Rice"), Some(2));
        assert_eq!(stats.crop_distribution.get("Wheat"), Some(1));
        assert_eq!(stats.total_area_analyzed, dec("7.50"));
        assert_eq!(stats.average_ph, dec("6.50"));
        assert_eq!(stats.average_fertility, dec("8.0"));
        assert_eq!(stats.latest_analysis, history[0].analysis_date);

        let json = serde_json::to_value(&FarmerStatistics::Available(stats.clone())).unwrap();
        assert_eq!(json["cropDistribution"], serde_json::json!({"Rice": 2, "Wheat": 1}));
    }

    #[test]
    fn test_archived_analyses_are_ignored() {
        let mut archived = analysis("Maize", 5.0, 3.0, Season::Zaid, Duration::days(2));
        archived.is_archived = true;
        let history = vec![
            archived,
            analysis("Ragi", 6.0, 6.0, Season::Kharif, Duration::days(5)),
        ];
        let stats = farmer_statistics(&history);
        let stats = stats.stats().unwrap();
        assert_eq!(stats.total_analyses, 1);
        assert_eq!(stats.most_recommended_crop, "Ragi");
    }

    #[test]
    fn test_seasonal_trend_means_are_unrounded() {
        let history = vec![
            analysis("Rice", 6.1, 7.0, Season::Kharif, Duration::days(1)),
            analysis("Wheat", 7.0, 8.0, Season::Rabi, Duration::days(2)),
            analysis("Cotton", 6.2, 6.5, Season::Kharif, Duration::days(3)),
        ];
        let trends = seasonal_trends(&history);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].season, Season::Kharif);
        assert_eq!(trends[0].count, 2);
        assert!((trends[0].avg_ph - 6.15).abs() < 1e-9);
        assert!((trends[0].avg_fertility - 6.75).abs() < 1e-9);
        assert_eq!(trends[0].crops, vec!["Rice", "Cotton"]);
    }
}

// ============================================================================
// Unit Tests: Dashboard
// ============================================================================

#[cfg(test)]
mod dashboard_tests {
    use super::*;

    #[test]
    fn test_summary_from_history() {
        let history = vec![
            analysis("Rice", 6.5, 8.0, Season::Kharif, Duration::hours(3)),
            analysis("Rice", 6.5, 6.0, Season::Kharif, Duration::days(4)),
        ];
        let summary = dashboard_summary(FarmSize::Small, &history);
        assert_eq!(summary.farm_area, dec("5.00"));
        assert_eq!(summary.soil_health, Some(70));
        assert_eq!(summary.active_maps, 2);
        assert_eq!(summary.recommendations, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["farmArea"].as_f64(), Some(5.0));
        assert_eq!(json["soilHealth"], 70);
    }

    #[test]
    fn test_farm_size_fallbacks() {
        assert_eq!(dashboard_summary(FarmSize::Large, &[]).farm_area, Decimal::from(30));
        assert_eq!(dashboard_summary(FarmSize::Xlarge, &[]).farm_area, Decimal::from(100));
    }

    #[test]
    fn test_recent_activity_is_capped_and_captioned() {
        let history: Vec<SoilAnalysis> = (0..7)
            .map(|i| analysis("Rice", 6.5, 7.0, Season::Kharif, Duration::days(i)))
            .collect();
        let items = recent_activity(&history, now() - Duration::days(30), now());
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].time, "Just now");
        assert_eq!(items[1].time, "Yesterday");
        assert_eq!(items[2].time, "2 days ago");
        assert_eq!(items[0].description, "2.50 acres - Clay soil");
    }
}
