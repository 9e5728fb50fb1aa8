//! Soil scoring and crop matching tests
//!
//! Property-based and unit tests for:
//! - Soil health classification bands
//! - Fertility rating bounds
//! - Nutrient status and advisory thresholds
//! - Crop recommendation ranking

use proptest::prelude::*;
use shared::{
    advisory_level, classify_soil_health, fertility_rating, generate_advisories,
    normalize_recommendation, nutrient_status, recommend_crops, score_sample, AdvisoryKind,
    AlternativeCrop, ClimateData, CropRecommendation, Nutrient, NutrientLevel, NutrientStatus,
    PrimaryCrop, SoilHealth, SoilProperties, SoilSample, SoilTexture,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn texture_strategy() -> impl Strategy<Value = SoilTexture> {
    prop::sample::select(SoilTexture::ALL.to_vec())
}

/// Realistic lab ranges for Indian soils
fn sample_strategy() -> impl Strategy<Value = SoilSample> {
    (
        3.0f64..10.0,
        0.0f64..2.0,
        0.0f64..120.0,
        0.0f64..400.0,
        0.0f64..40.0,
        0.0f64..80.0,
        texture_strategy(),
        0.0f64..3000.0,
        5.0f64..45.0,
    )
        .prop_map(|(ph, n, p, k, oc, clay, soil_type, rainfall, temperature)| SoilSample {
            soil_properties: SoilProperties {
                ph,
                nitrogen: n,
                phosphorus: p,
                potassium: k,
                organic_carbon: oc,
                clay,
                sand: None,
                bulk_density: None,
                cec: None,
                soil_type,
            },
            climate_data: ClimateData {
                rainfall,
                temperature,
            },
        })
}

fn sample(ph: f64, n: f64, p: f64, k: f64, oc: f64) -> SoilSample {
    SoilSample {
        soil_properties: SoilProperties {
            ph,
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            organic_carbon: oc,
            clay: 30.0,
            sand: Some(40.0),
            bulk_density: None,
            cec: None,
            soil_type: SoilTexture::Loam,
        },
        climate_data: ClimateData {
            rainfall: 900.0,
            temperature: 25.0,
        },
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Neutral pH with rich organic carbon is always Excellent
    #[test]
    fn prop_excellent_band(ph in 6.0f64..=7.5, oc in 20.0f64..200.0) {
        prop_assert_eq!(classify_soil_health(ph, oc), SoilHealth::Excellent);
    }

    /// Extreme pH is Critical regardless of organic carbon
    #[test]
    fn prop_extreme_ph_is_critical(
        ph in prop_oneof![0.0f64..4.49, 9.01f64..14.0],
        oc in 0.0f64..200.0,
    ) {
        prop_assert_eq!(classify_soil_health(ph, oc), SoilHealth::Critical);
    }

    /// Organic carbon below 5 g/kg is Critical regardless of pH
    #[test]
    fn prop_low_carbon_is_critical(ph in 0.0f64..14.0, oc in 0.0f64..4.99) {
        prop_assert_eq!(classify_soil_health(ph, oc), SoilHealth::Critical);
    }

    /// Fertility stays on the 0-10 scale for any input
    #[test]
    fn prop_fertility_bounded(
        n in prop::num::f64::ANY,
        p in prop::num::f64::ANY,
        k in prop::num::f64::ANY,
    ) {
        let rating = fertility_rating(n, p, k);
        prop_assert!((0.0..=10.0).contains(&rating));
    }

    /// Scoring depends only on the sample
    #[test]
    fn prop_scoring_is_deterministic(s in sample_strategy()) {
        prop_assert_eq!(score_sample(&s), score_sample(&s));
    }

    /// The primary crop is never beaten by an alternative
    #[test]
    fn prop_primary_crop_is_best(s in sample_strategy()) {
        let rec = recommend_crops(&s);
        let primary = rec.primary_crop.match_score;
        prop_assert!((0.0..=100.0).contains(&primary));
        prop_assert!(rec.alternative_crops.len() <= 4);
        for alt in &rec.alternative_crops {
            prop_assert!((0.0..=100.0).contains(&alt.match_score));
            prop_assert!(alt.match_score <= primary);
        }
        prop_assert!(normalize_recommendation(rec).is_ok());
    }

    /// Advisories never exceed four cards
    #[test]
    fn prop_advisories_capped(s in sample_strategy()) {
        let analysis = analysis_from(s);
        let advisories = generate_advisories(Some(&analysis));
        prop_assert!(!advisories.is_empty());
        prop_assert!(advisories.len() <= 4);
    }
}

fn analysis_from(sample: SoilSample) -> shared::SoilAnalysis {
    use chrono::{TimeZone, Utc};
    use shared::{BoundaryGeometry, DataSource, Season};

    let date = Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap();
    let score = score_sample(&sample);
    let crop_recommendation = recommend_crops(&sample);
    shared::SoilAnalysis {
        id: uuid::Uuid::new_v4(),
        farmer_id: uuid::Uuid::new_v4(),
        boundary: BoundaryGeometry::from_coordinates(vec![
            [77.5946, 12.9716],
            [77.5956, 12.9716],
            [77.5956, 12.9726],
            [77.5946, 12.9726],
        ])
        .unwrap(),
        sample,
        soil_color: None,
        crop_recommendation,
        soil_health: score.soil_health,
        fertility_rating: score.fertility_rating,
        analysis_date: date,
        season: Season::from_month(11),
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

// ============================================================================
// Unit Tests: Scoring Examples
// ============================================================================

#[cfg(test)]
mod scoring_examples {
    use super::*;

    #[test]
    fn test_poor_nutrients_score_base_rating() {
        let score = score_sample(&sample(6.5, 0.2, 25.0, 100.0, 12.0));
        assert_eq!(score.fertility_rating, 5.0);
        assert_eq!(score.nitrogen_status, NutrientStatus::Low);
        assert_eq!(score.phosphorus_status, NutrientStatus::Low);
        assert_eq!(score.potassium_status, NutrientStatus::Low);
    }

    #[test]
    fn test_neutral_rich_soil_is_excellent() {
        assert_eq!(classify_soil_health(6.5, 25.0), SoilHealth::Excellent);
    }

    #[test]
    fn test_health_band_edges() {
        assert_eq!(classify_soil_health(5.5, 15.0), SoilHealth::Good);
        assert_eq!(classify_soil_health(8.5, 10.0), SoilHealth::Fair);
        assert_eq!(classify_soil_health(4.5, 5.0), SoilHealth::Poor);
        assert_eq!(classify_soil_health(9.0, 4.9), SoilHealth::Critical);
    }

    #[test]
    fn test_potassium_threshold_sets_stay_separate() {
        // 190 kg/ha reads Good in the report table but optimal on the dashboard
        assert_eq!(nutrient_status(Nutrient::Potassium, 190.0), NutrientStatus::Good);
        assert_eq!(
            advisory_level(Nutrient::Potassium, 190.0),
            NutrientLevel::Optimal
        );
        // and 160 earns the fertility bonus while still Medium in the table
        assert_eq!(fertility_rating(0.0, 0.0, 160.0), 7.0);
        assert_eq!(nutrient_status(Nutrient::Potassium, 160.0), NutrientStatus::Medium);
    }
}

// ============================================================================
// Unit Tests: Advisories
// ============================================================================

#[cfg(test)]
mod advisory_tests {
    use super::*;

    #[test]
    fn test_onboarding_without_history() {
        let advisories = generate_advisories(None);
        assert_eq!(advisories.len(), 3);
        assert!(advisories.iter().all(|a| a.kind == AdvisoryKind::Onboarding));
    }

    #[test]
    fn test_acidic_low_nutrient_order() {
        let analysis = analysis_from(sample(5.0, 0.1, 10.0, 80.0, 8.0));
        let kinds: Vec<AdvisoryKind> = generate_advisories(Some(&analysis))
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AdvisoryKind::PhCorrection,
                AdvisoryKind::Fertilizer,
                AdvisoryKind::CropSuitability,
                AdvisoryKind::OrganicMatter,
            ]
        );
    }

    #[test]
    fn test_healthy_soil_skips_organic_matter() {
        let analysis = analysis_from(sample(6.8, 0.8, 55.0, 190.0, 22.0));
        let advisories = generate_advisories(Some(&analysis));
        assert_eq!(advisories.len(), 3);
        assert_eq!(advisories[0].kind, AdvisoryKind::PhOptimal);
        assert_eq!(advisories[1].kind, AdvisoryKind::BalancedNutrients);
    }
}

// ============================================================================
// Unit Tests: Client-supplied recommendations
// ============================================================================

#[cfg(test)]
mod recommendation_tests {
    use super::*;

    fn recommendation(primary: f64, alternatives: &[(&str, f64)]) -> CropRecommendation {
        CropRecommendation {
            primary_crop: PrimaryCrop {
                name: "Rice".to_string(),
                match_score: primary,
                fertilizer: "Urea".to_string(),
            },
            alternative_crops: alternatives
                .iter()
                .map(|(name, score)| AlternativeCrop {
                    name: name.to_string(),
                    match_score: *score,
                })
                .collect(),
        }
    }

    #[test]
    fn test_scores_clamped_to_percentage() {
        let rec = normalize_recommendation(recommendation(140.0, &[("Wheat", -5.0)])).unwrap();
        assert_eq!(rec.primary_crop.match_score, 100.0);
        assert_eq!(rec.alternative_crops[0].match_score, 0.0);
    }

    #[test]
    fn test_outranking_alternative_rejected() {
        assert!(normalize_recommendation(recommendation(60.0, &[("Wheat", 75.0)])).is_err());
    }
}
