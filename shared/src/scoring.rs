//! Soil scoring rules
//!
//! Pure threshold rules that turn a [`SoilSample`] into soil health, a
//! fertility rating and nutrient status labels, plus the advisory list shown
//! on the farmer dashboard.
//!
//! Three nutrient threshold sets exist side by side and are intentionally not
//! unified:
//! - fertility bonus cut-offs (N > 0.5, P > 40, K > 150)
//! - report table status (K good above 180)
//! - dashboard advisory level (K high above 200)

use serde::{Deserialize, Serialize};

use crate::models::{SoilAnalysis, SoilHealth, SoilSample};

pub const BASE_FERTILITY: f64 = 5.0;
pub const MAX_FERTILITY: f64 = 10.0;
pub const MAX_ADVISORIES: usize = 4;

/// Organic carbon (g/kg) below which the organic-matter advisory is raised
pub const LOW_ORGANIC_CARBON: f64 = 15.0;

// ============================================================================
// Fertility & health
// ============================================================================

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Fertility rating on a 0-10 scale from N, P and K (kg/ha)
pub fn fertility_rating(nitrogen: f64, phosphorus: f64, potassium: f64) -> f64 {
    let mut rating = BASE_FERTILITY;
    if finite_or_zero(nitrogen) > 0.5 {
        rating += 1.5;
    }
    if finite_or_zero(phosphorus) > 40.0 {
        rating += 1.5;
    }
    if finite_or_zero(potassium) > 150.0 {
        rating += 2.0;
    }
    rating.clamp(0.0, MAX_FERTILITY)
}

/// Classify soil health from pH and organic carbon (g/kg). First match wins.
pub fn classify_soil_health(ph: f64, organic_carbon: f64) -> SoilHealth {
    const BANDS: [(SoilHealth, f64, f64, f64); 4] = [
        (SoilHealth::Excellent, 6.0, 7.5, 20.0),
        (SoilHealth::Good, 5.5, 8.0, 15.0),
        (SoilHealth::Fair, 5.0, 8.5, 10.0),
        (SoilHealth::Poor, 4.5, 9.0, 5.0),
    ];

    BANDS
        .iter()
        .find(|(_, ph_min, ph_max, oc_min)| {
            ph >= *ph_min && ph <= *ph_max && organic_carbon >= *oc_min
        })
        .map(|(health, ..)| *health)
        .unwrap_or(SoilHealth::Critical)
}

// ============================================================================
// Nutrient status
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];

    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "Nitrogen",
            Nutrient::Phosphorus => "Phosphorus",
            Nutrient::Potassium => "Potassium",
        }
    }

    /// Symbol and unit label used in report tables
    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "Nitrogen (N)",
            Nutrient::Phosphorus => "Phosphorus (P)",
            Nutrient::Potassium => "Potassium (K)",
        }
    }

    pub fn value_in(&self, sample: &SoilSample) -> f64 {
        let p = &sample.soil_properties;
        match self {
            Nutrient::Nitrogen => p.nitrogen,
            Nutrient::Phosphorus => p.phosphorus,
            Nutrient::Potassium => p.potassium,
        }
    }

    /// (low_below, good_above) for report tables
    fn status_thresholds(&self) -> (f64, f64) {
        match self {
            Nutrient::Nitrogen => (0.3, 0.7),
            Nutrient::Phosphorus => (30.0, 50.0),
            Nutrient::Potassium => (120.0, 180.0),
        }
    }

    /// (low_below, high_above) for dashboard advisories
    fn advisory_thresholds(&self) -> (f64, f64) {
        match self {
            Nutrient::Nitrogen => (0.3, 0.7),
            Nutrient::Phosphorus => (30.0, 50.0),
            Nutrient::Potassium => (120.0, 200.0),
        }
    }
}

/// Report-table nutrient status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NutrientStatus {
    Low,
    Medium,
    Good,
}

impl NutrientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientStatus::Low => "Low",
            NutrientStatus::Medium => "Medium",
            NutrientStatus::Good => "Good",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            NutrientStatus::Low => "#ef4444",
            NutrientStatus::Medium => "#f59e0b",
            NutrientStatus::Good => "#10b981",
        }
    }
}

impl std::fmt::Display for NutrientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn nutrient_status(nutrient: Nutrient, value: f64) -> NutrientStatus {
    let (low, good) = nutrient.status_thresholds();
    let value = finite_or_zero(value);
    if value < low {
        NutrientStatus::Low
    } else if value > good {
        NutrientStatus::Good
    } else {
        NutrientStatus::Medium
    }
}

/// Dashboard advisory nutrient level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NutrientLevel {
    Low,
    Optimal,
    High,
}

pub fn advisory_level(nutrient: Nutrient, value: f64) -> NutrientLevel {
    let (low, high) = nutrient.advisory_thresholds();
    let value = finite_or_zero(value);
    if value < low {
        NutrientLevel::Low
    } else if value > high {
        NutrientLevel::High
    } else {
        NutrientLevel::Optimal
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhClass {
    Acidic,
    Optimal,
    Alkaline,
}

pub fn classify_ph(ph: f64) -> PhClass {
    if ph < 5.5 {
        PhClass::Acidic
    } else if ph > 8.0 {
        PhClass::Alkaline
    } else {
        PhClass::Optimal
    }
}

// ============================================================================
// Sample scoring
// ============================================================================

/// Everything derived from one sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilScore {
    pub soil_health: SoilHealth,
    pub fertility_rating: f64,
    pub nitrogen_status: NutrientStatus,
    pub phosphorus_status: NutrientStatus,
    pub potassium_status: NutrientStatus,
}

pub fn score_sample(sample: &SoilSample) -> SoilScore {
    let p = &sample.soil_properties;
    SoilScore {
        soil_health: classify_soil_health(p.ph, p.organic_carbon),
        fertility_rating: fertility_rating(p.nitrogen, p.phosphorus, p.potassium),
        nitrogen_status: nutrient_status(Nutrient::Nitrogen, p.nitrogen),
        phosphorus_status: nutrient_status(Nutrient::Phosphorus, p.phosphorus),
        potassium_status: nutrient_status(Nutrient::Potassium, p.potassium),
    }
}

// ============================================================================
// Advisories
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    PhCorrection,
    PhOptimal,
    Fertilizer,
    BalancedNutrients,
    CropSuitability,
    OrganicMatter,
    Onboarding,
}

/// One dashboard recommendation card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
}

impl Advisory {
    fn new(kind: AdvisoryKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Dashboard advisories for the farmer's latest analysis.
///
/// Order is pH, nutrients, crop, organic matter; at most four are returned.
pub fn generate_advisories(latest: Option<&SoilAnalysis>) -> Vec<Advisory> {
    let Some(analysis) = latest else {
        return onboarding_advisories();
    };

    let soil = &analysis.sample.soil_properties;
    let crop = &analysis.crop_recommendation.primary_crop;
    let mut advisories = Vec::with_capacity(MAX_ADVISORIES);

    advisories.push(match classify_ph(soil.ph) {
        PhClass::Acidic => Advisory::new(
            AdvisoryKind::PhCorrection,
            "Soil pH Too Acidic",
            format!(
                "Current pH is {}. Apply lime (calcium carbonate) at 2-3 tons per acre to raise pH to optimal range (6.0-7.0).",
                soil.ph
            ),
        ),
        PhClass::Alkaline => Advisory::new(
            AdvisoryKind::PhCorrection,
            "Soil pH Too Alkaline",
            format!(
                "Current pH is {}. Apply sulfur or gypsum to lower pH. Add organic matter to improve soil structure.",
                soil.ph
            ),
        ),
        PhClass::Optimal => Advisory::new(
            AdvisoryKind::PhOptimal,
            "Optimal pH Level",
            format!(
                "Your soil pH ({}) is in the ideal range. Continue current soil management practices.",
                soil.ph
            ),
        ),
    });

    let deficient: Vec<&str> = Nutrient::ALL
        .iter()
        .filter(|n| advisory_level(**n, n.value_in(&analysis.sample)) == NutrientLevel::Low)
        .map(|n| n.name())
        .collect();

    advisories.push(if deficient.is_empty() {
        Advisory::new(
            AdvisoryKind::BalancedNutrients,
            "Balanced Nutrient Levels",
            format!(
                "NPK levels are well-balanced. Maintain with regular application of {}.",
                crop.fertilizer
            ),
        )
    } else {
        Advisory::new(
            AdvisoryKind::Fertilizer,
            "Fertilizer Application Needed",
            format!(
                "{} levels are low. Apply {} at recommended rates before sowing.",
                deficient.join(", "),
                crop.fertilizer
            ),
        )
    });

    advisories.push(Advisory::new(
        AdvisoryKind::CropSuitability,
        format!("Best Crop: {}", crop.name),
        format!(
            "Based on your soil conditions (pH: {}, {}), {} has {:.0}% compatibility. Expected yield: High with proper care.",
            soil.ph, soil.soil_type, crop.name, crop.match_score
        ),
    ));

    if soil.organic_carbon < LOW_ORGANIC_CARBON {
        advisories.push(Advisory::new(
            AdvisoryKind::OrganicMatter,
            "Improve Organic Matter",
            format!(
                "Current organic carbon is {} g/kg. Add compost, green manure, or crop residues to improve soil health and water retention.",
                soil.organic_carbon
            ),
        ));
    }

    advisories.truncate(MAX_ADVISORIES);
    advisories
}

fn onboarding_advisories() -> Vec<Advisory> {
    vec![
        Advisory::new(
            AdvisoryKind::Onboarding,
            "Create Your First Soil Map",
            "Start by mapping your farm boundaries and analyzing your soil to get personalized recommendations.",
        ),
        Advisory::new(
            AdvisoryKind::Onboarding,
            "Upload Lab Results",
            "If you have soil test results from a laboratory, upload them for more accurate crop recommendations.",
        ),
        Advisory::new(
            AdvisoryKind::Onboarding,
            "Explore Crop Database",
            "Browse through our extensive crop database to learn about different crops suitable for your region.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fertility_base_rating() {
        assert_eq!(fertility_rating(0.2, 25.0, 100.0), 5.0);
    }

    #[test]
    fn test_fertility_all_bonuses() {
        assert_eq!(fertility_rating(0.8, 45.0, 200.0), 10.0);
    }

    #[test]
    fn test_fertility_thresholds_are_strict() {
        assert_eq!(fertility_rating(0.5, 40.0, 150.0), 5.0);
    }

    #[test]
    fn test_fertility_non_finite_treated_as_zero() {
        assert_eq!(fertility_rating(f64::NAN, f64::INFINITY, 200.0), 7.0);
    }

    #[test]
    fn test_health_first_match_wins() {
        assert_eq!(classify_soil_health(6.5, 25.0), SoilHealth::Excellent);
        assert_eq!(classify_soil_health(6.5, 16.0), SoilHealth::Good);
        assert_eq!(classify_soil_health(8.2, 30.0), SoilHealth::Fair);
        assert_eq!(classify_soil_health(4.6, 30.0), SoilHealth::Poor);
        assert_eq!(classify_soil_health(4.4, 30.0), SoilHealth::Critical);
        assert_eq!(classify_soil_health(7.0, 4.9), SoilHealth::Critical);
    }

    #[test]
    fn test_health_nan_is_critical() {
        assert_eq!(classify_soil_health(f64::NAN, 25.0), SoilHealth::Critical);
    }

    #[test]
    fn test_report_and_advisory_potassium_thresholds_differ() {
        assert_eq!(nutrient_status(Nutrient::Potassium, 190.0), NutrientStatus::Good);
        assert_eq!(advisory_level(Nutrient::Potassium, 190.0), NutrientLevel::Optimal);
    }

    #[test]
    fn test_ph_class() {
        assert_eq!(classify_ph(5.4), PhClass::Acidic);
        assert_eq!(classify_ph(5.5), PhClass::Optimal);
        assert_eq!(classify_ph(8.0), PhClass::Optimal);
        assert_eq!(classify_ph(8.1), PhClass::Alkaline);
    }

    #[test]
    fn test_onboarding_advisories_without_analysis() {
        let advisories = generate_advisories(None);
        assert_eq!(advisories.len(), 3);
        assert_eq!(advisories[0].title, "Create Your First Soil Map");
        assert!(advisories.iter().all(|a| a.kind == AdvisoryKind::Onboarding));
    }
}
