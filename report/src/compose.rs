//! Turn farmers and analyses into layout trees

use chrono::{DateTime, Datelike, Utc};
use shared::{
    format_long_date, nutrient_status, FarmSize, Farmer, Nutrient, SoilAnalysis, SoilSample,
};

use crate::error::{RenderError, RenderResult};
use crate::layout::{CropCard, Cover, HealthCard, NutrientRow, ReportLayout, Row, Section};
use crate::style::{Color, BLOCK_GAP, SECTION_GAP};

pub const SINGLE_REPORT_TITLE: &str = "SOIL ANALYSIS REPORT";
pub const COMPILATION_TITLE: &str = "SOIL ANALYSIS REPORTS";
pub const COMPILATION_SUBTITLE: &str = "COMPILATION REPORT";
pub const NPK_TITLE: &str = "NPK ANALYSIS";
pub const NOT_AVAILABLE: &str = "N/A";

/// The farmer details a report prints
#[derive(Debug, Clone, PartialEq)]
pub struct FarmerHeading {
    pub full_name: String,
    pub location: String,
    pub farm_size: FarmSize,
}

impl From<&Farmer> for FarmerHeading {
    fn from(farmer: &Farmer) -> Self {
        Self {
            full_name: farmer.full_name.clone(),
            location: farmer.location.clone(),
            farm_size: farmer.farm_size,
        }
    }
}

/// Short Indian date, e.g. "5/3/2024"
pub fn format_short_date(date: DateTime<Utc>) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Reject analyses that cannot produce a meaningful report
pub fn ensure_renderable(analysis: &SoilAnalysis) -> RenderResult<()> {
    let missing = if analysis.crop_recommendation.primary_crop.name.trim().is_empty() {
        Some("primary crop")
    } else if analysis.boundary.coordinates.is_empty() {
        Some("boundary coordinates")
    } else if !analysis.boundary.area.is_finite() || !analysis.boundary.perimeter.is_finite() {
        Some("boundary measurements")
    } else if !analysis.sample.is_finite() {
        Some("soil measurements")
    } else if !analysis.fertility_rating.is_finite() {
        Some("fertility rating")
    } else {
        None
    };
    match missing {
        Some(missing) => Err(RenderError::IncompleteAnalysis {
            analysis_id: analysis.id,
            missing,
        }),
        None => Ok(()),
    }
}

fn optional(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn nutrient_rows(sample: &SoilSample) -> Vec<NutrientRow> {
    Nutrient::ALL
        .iter()
        .map(|&nutrient| {
            let value = nutrient.value_in(sample);
            let status = nutrient_status(nutrient, value);
            let formatted = match nutrient {
                Nutrient::Nitrogen => format!("{value:.2} kg/ha"),
                _ => format!("{value:.0} kg/ha"),
            };
            NutrientRow {
                label: nutrient.label().to_string(),
                value: formatted,
                status: status.as_str().to_string(),
                status_color: Color::from_hex(status.color_hex()),
            }
        })
        .collect()
}

fn nutrients_section(analysis: &SoilAnalysis) -> Section {
    Section::Nutrients {
        title: NPK_TITLE.to_string(),
        rows: nutrient_rows(&analysis.sample),
    }
}

fn health_and_crops(analysis: &SoilAnalysis) -> Section {
    let rec = &analysis.crop_recommendation;
    Section::HealthAndCrops {
        health: HealthCard {
            health: analysis.soil_health.as_str().to_string(),
            color: Color::from_hex(analysis.soil_health.color_hex()),
            fertility: analysis.fertility_rating,
        },
        crop: CropCard {
            name: rec.primary_crop.name.clone(),
            match_score: rec.primary_crop.match_score,
            fertilizer: rec.primary_crop.fertilizer.clone(),
            alternatives: rec
                .alternative_crops
                .iter()
                .take(3)
                .map(|alt| (alt.name.clone(), alt.match_score))
                .collect(),
        },
    }
}

/// Full one-analysis report
pub fn single_report_layout(
    farmer: &FarmerHeading,
    analysis: &SoilAnalysis,
) -> RenderResult<ReportLayout> {
    ensure_renderable(analysis)?;

    let boundary = &analysis.boundary;
    let props = &analysis.sample.soil_properties;
    let climate = &analysis.sample.climate_data;

    let layout = ReportLayout::new()
        .section(Section::Header {
            title: SINGLE_REPORT_TITLE.to_string(),
        })
        .section(Section::Table {
            title: "FARMER INFORMATION".to_string(),
            rows: vec![
                Row::new("Farmer Name", farmer.full_name.as_str()),
                Row::new("Location", farmer.location.as_str()),
                Row::new("Farm Size", farmer.farm_size.report_label()),
                Row::new("Analysis Date", format_long_date(analysis.analysis_date)),
                Row::new("Season", analysis.season.as_str()),
            ],
        })
        .gap(SECTION_GAP)
        .section(Section::Table {
            title: "FARM BOUNDARY DETAILS".to_string(),
            rows: vec![
                Row::new("Area", format!("{:.2} acres", boundary.area)),
                Row::new("Perimeter", format!("{:.2} km", boundary.perimeter)),
                Row::new(
                    "Center Coordinates",
                    format!(
                        "{:.6}°N, {:.6}°E",
                        boundary.center_point.latitude, boundary.center_point.longitude
                    ),
                ),
                Row::new("Boundary Points", boundary.coordinates.len().to_string()),
            ],
        })
        .gap(SECTION_GAP)
        .section(Section::Table {
            title: "SOIL PROPERTIES ANALYSIS".to_string(),
            rows: vec![
                Row::new("Soil Type", props.soil_type.as_str()),
                Row::new("pH Level", format!("{:.2}", props.ph)),
                Row::new("Organic Carbon", format!("{:.2} g/kg", props.organic_carbon)),
                Row::new("Clay Content", format!("{:.1}%", props.clay)),
                Row::new("Sand Content", optional(props.sand, |v| format!("{v:.1}%"))),
                Row::new("Bulk Density", optional(props.bulk_density, |v| format!("{v} g/cm³"))),
            ],
        })
        .gap(SECTION_GAP)
        .section(nutrients_section(analysis))
        .gap(SECTION_GAP)
        .section(Section::Table {
            title: "CLIMATE CONDITIONS".to_string(),
            rows: vec![
                Row::new("Average Rainfall", format!("{} mm", climate.rainfall)),
                Row::new("Average Temperature", format!("{}°C", climate.temperature)),
            ],
        })
        .gap(BLOCK_GAP)
        .section(health_and_crops(analysis));

    Ok(layout)
}

/// Cover page followed by one condensed page per analysis
pub fn multi_report_layout(
    farmer: &FarmerHeading,
    analyses: &[SoilAnalysis],
) -> RenderResult<ReportLayout> {
    if analyses.is_empty() {
        return Err(RenderError::NoAnalyses);
    }
    analyses.iter().try_for_each(ensure_renderable)?;

    let total = analyses.len();
    let mut layout = ReportLayout::new().section(Section::Cover(Cover {
        title: COMPILATION_TITLE.to_string(),
        subtitle: COMPILATION_SUBTITLE.to_string(),
        farmer_name: farmer.full_name.clone(),
        location: farmer.location.clone(),
        total_reports: total,
    }));

    for (index, analysis) in analyses.iter().enumerate() {
        layout = layout
            .page_break()
            .section(Section::Header {
                title: format!("{SINGLE_REPORT_TITLE} - {}/{total}", index + 1),
            })
            .section(Section::Table {
                title: "BASIC INFORMATION".to_string(),
                rows: vec![
                    Row::new("Farmer", farmer.full_name.as_str()),
                    Row::new("Date", format_short_date(analysis.analysis_date)),
                    Row::new("Area", format!("{:.2} acres", analysis.boundary.area)),
                    Row::new("Soil Type", analysis.sample.soil_properties.soil_type.as_str()),
                ],
            })
            .gap(SECTION_GAP)
            .section(nutrients_section(analysis))
            .gap(BLOCK_GAP)
            .section(health_and_crops(analysis));
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_short_date(date), "5/3/2024");
    }

    #[test]
    fn test_optional_value() {
        assert_eq!(optional(None, |v| format!("{v}")), "N/A");
        assert_eq!(optional(Some(1.35), |v| format!("{v} g/cm³")), "1.35 g/cm³");
    }
}
