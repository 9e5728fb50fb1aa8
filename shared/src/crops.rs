//! Crop suitability matching
//!
//! Scores a fixed catalogue of Western Maharashtra crops against a soil
//! sample. Each crop has optimal bands for pH, rainfall and temperature plus
//! preferred textures; the match score is a weighted closeness to those
//! bands on a 0-100 scale.

use serde::Serialize;
use thiserror::Error;

use crate::models::{AlternativeCrop, CropRecommendation, PrimaryCrop, SoilSample, SoilTexture};

pub const MAX_ALTERNATIVES: usize = 4;
pub const MAX_MATCH_SCORE: f64 = 100.0;

const PH_WEIGHT: f64 = 35.0;
const RAINFALL_WEIGHT: f64 = 25.0;
const TEMPERATURE_WEIGHT: f64 = 25.0;
const TEXTURE_WEIGHT: f64 = 15.0;

/// Distance outside a band at which a component scores zero
const PH_TOLERANCE: f64 = 1.5;
const RAINFALL_TOLERANCE_MM: f64 = 600.0;
const TEMPERATURE_TOLERANCE_C: f64 = 8.0;
/// Texture credit when the soil is not one the crop prefers
const OFF_TEXTURE_CREDIT: f64 = 0.4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropProfile {
    pub name: &'static str,
    pub ph: (f64, f64),
    pub rainfall_mm: (f64, f64),
    pub temperature_c: (f64, f64),
    pub textures: &'static [SoilTexture],
    pub fertilizer: &'static str,
}

use SoilTexture::*;

pub const CROP_CATALOGUE: &[CropProfile] = &[
    CropProfile {
        name: "Sugarcane",
        ph: (6.5, 7.5),
        rainfall_mm: (1100.0, 1500.0),
        temperature_c: (20.0, 35.0),
        textures: &[ClayLoam, Loam, Clay],
        fertilizer: "Urea + SSP + MOP (250:115:115 kg/ha)",
    },
    CropProfile {
        name: "Cotton",
        ph: (6.0, 8.0),
        rainfall_mm: (500.0, 1000.0),
        temperature_c: (21.0, 32.0),
        textures: &[Clay, ClayLoam],
        fertilizer: "NPK 19:19:19 + Urea",
    },
    CropProfile {
        name: "Soybean",
        ph: (6.0, 7.5),
        rainfall_mm: (600.0, 1000.0),
        temperature_c: (20.0, 30.0),
        textures: &[Loam, ClayLoam, SiltyLoam],
        fertilizer: "DAP (100 kg/ha) + Rhizobium culture",
    },
    CropProfile {
        name: "Rice",
        ph: (5.5, 7.0),
        rainfall_mm: (1000.0, 2000.0),
        temperature_c: (22.0, 32.0),
        textures: &[Clay, ClayLoam, SiltyLoam],
        fertilizer: "Urea + DAP + MOP (100:50:50 kg/ha)",
    },
    CropProfile {
        name: "Wheat",
        ph: (6.0, 7.5),
        rainfall_mm: (400.0, 750.0),
        temperature_c: (12.0, 25.0),
        textures: &[Loam, ClayLoam, SiltyLoam],
        fertilizer: "NPK 12:32:16 + Urea top dressing",
    },
    CropProfile {
        name: "Jowar",
        ph: (6.0, 8.0),
        rainfall_mm: (400.0, 900.0),
        temperature_c: (25.0, 32.0),
        textures: &[Clay, ClayLoam, Loam],
        fertilizer: "Urea + SSP (80:40 kg/ha)",
    },
    CropProfile {
        name: "Bajra",
        ph: (6.5, 8.0),
        rainfall_mm: (300.0, 700.0),
        temperature_c: (25.0, 35.0),
        textures: &[Sandy, SandyLoam, Loam],
        fertilizer: "Urea + SSP (60:30 kg/ha)",
    },
    CropProfile {
        name: "Tur (Pigeon Pea)",
        ph: (6.5, 7.5),
        rainfall_mm: (600.0, 1000.0),
        temperature_c: (20.0, 30.0),
        textures: &[Loam, SandyLoam, ClayLoam],
        fertilizer: "DAP (100 kg/ha)",
    },
    CropProfile {
        name: "Gram (Chickpea)",
        ph: (6.0, 8.0),
        rainfall_mm: (400.0, 700.0),
        temperature_c: (15.0, 25.0),
        textures: &[Loam, ClayLoam, SandyLoam],
        fertilizer: "DAP + Rhizobium seed treatment",
    },
    CropProfile {
        name: "Groundnut",
        ph: (6.0, 7.0),
        rainfall_mm: (500.0, 1000.0),
        temperature_c: (22.0, 30.0),
        textures: &[SandyLoam, Sandy, Loam],
        fertilizer: "Gypsum + SSP (25:50 kg/ha)",
    },
    CropProfile {
        name: "Onion",
        ph: (6.0, 7.5),
        rainfall_mm: (650.0, 1000.0),
        temperature_c: (13.0, 30.0),
        textures: &[Loam, SandyLoam, SiltyLoam],
        fertilizer: "NPK 10:26:26 + Sulphur",
    },
    CropProfile {
        name: "Grapes",
        ph: (6.5, 8.0),
        rainfall_mm: (500.0, 900.0),
        temperature_c: (15.0, 35.0),
        textures: &[SandyLoam, Loam, ClayLoam],
        fertilizer: "NPK 19:19:19 + Potassium Sulphate",
    },
    CropProfile {
        name: "Maize",
        ph: (5.5, 7.5),
        rainfall_mm: (500.0, 1100.0),
        temperature_c: (21.0, 30.0),
        textures: &[Loam, SandyLoam, SiltyLoam],
        fertilizer: "Urea + DAP + MOP (120:60:40 kg/ha)",
    },
    CropProfile {
        name: "Turmeric",
        ph: (5.0, 7.5),
        rainfall_mm: (1500.0, 2250.0),
        temperature_c: (20.0, 30.0),
        textures: &[Loam, ClayLoam, SandyLoam],
        fertilizer: "FYM + NPK (60:50:120 kg/ha)",
    },
];

/// 1.0 inside the band, falling linearly to 0.0 at `tolerance` outside it
fn band_closeness(value: f64, (min, max): (f64, f64), tolerance: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let distance = if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    };
    (1.0 - distance / tolerance).clamp(0.0, 1.0)
}

pub fn clamp_match_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, MAX_MATCH_SCORE)
    } else {
        0.0
    }
}

/// Match score for one crop, rounded to one decimal place
pub fn match_score(crop: &CropProfile, sample: &SoilSample) -> f64 {
    let soil = &sample.soil_properties;
    let climate = &sample.climate_data;

    let texture = if crop.textures.contains(&soil.soil_type) {
        1.0
    } else {
        OFF_TEXTURE_CREDIT
    };

    let raw = PH_WEIGHT * band_closeness(soil.ph, crop.ph, PH_TOLERANCE)
        + RAINFALL_WEIGHT * band_closeness(climate.rainfall, crop.rainfall_mm, RAINFALL_TOLERANCE_MM)
        + TEMPERATURE_WEIGHT
            * band_closeness(climate.temperature, crop.temperature_c, TEMPERATURE_TOLERANCE_C)
        + TEXTURE_WEIGHT * texture;

    (clamp_match_score(raw) * 10.0).round() / 10.0
}

/// Rank the whole catalogue, best first. Ties keep catalogue order.
pub fn rank_crops(sample: &SoilSample) -> Vec<(&'static CropProfile, f64)> {
    let mut ranked: Vec<_> = CROP_CATALOGUE
        .iter()
        .map(|crop| (crop, match_score(crop, sample)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Best crop for the sample plus up to four alternatives
pub fn recommend_crops(sample: &SoilSample) -> CropRecommendation {
    let ranked = rank_crops(sample);
    let mut iter = ranked.into_iter();

    // The catalogue is a non-empty constant
    let (best, best_score) = iter
        .next()
        .unwrap_or((&CROP_CATALOGUE[0], 0.0));

    CropRecommendation {
        primary_crop: PrimaryCrop {
            name: best.name.to_string(),
            match_score: best_score,
            fertilizer: best.fertilizer.to_string(),
        },
        alternative_crops: iter
            .take(MAX_ALTERNATIVES)
            .map(|(crop, score)| AlternativeCrop {
                name: crop.name.to_string(),
                match_score: score,
            })
            .collect(),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RecommendationError {
    #[error("primary crop name is empty")]
    EmptyPrimaryName,

    #[error("alternative crop '{name}' scores higher than the primary crop")]
    AlternativeOutranksPrimary { name: String },
}

/// Clean up a recommendation supplied by a client.
///
/// Scores are clamped to 0-100, blank alternatives dropped and the rest
/// ordered by descending score (stable). An alternative that still beats the
/// primary crop is rejected rather than silently swapped.
pub fn normalize_recommendation(
    mut recommendation: CropRecommendation,
) -> Result<CropRecommendation, RecommendationError> {
    let primary = &mut recommendation.primary_crop;
    primary.name = primary.name.trim().to_string();
    if primary.name.is_empty() {
        return Err(RecommendationError::EmptyPrimaryName);
    }
    primary.match_score = clamp_match_score(primary.match_score);
    let primary_score = primary.match_score;

    recommendation.alternative_crops.retain(|a| !a.name.trim().is_empty());
    for alt in recommendation.alternative_crops.iter_mut() {
        alt.name = alt.name.trim().to_string();
        alt.match_score = clamp_match_score(alt.match_score);
    }
    recommendation
        .alternative_crops
        .sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

    if let Some(alt) = recommendation
        .alternative_crops
        .iter()
        .find(|a| a.match_score > primary_score)
    {
        return Err(RecommendationError::AlternativeOutranksPrimary {
            name: alt.name.clone(),
        });
    }

    Ok(recommendation)
}
