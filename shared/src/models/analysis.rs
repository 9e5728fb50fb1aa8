//! Soil analysis records

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::boundary::BoundaryGeometry;
use super::soil::{SoilColor, SoilSample};

/// Indian cropping season
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
    #[serde(rename = "Year-round")]
    YearRound,
}

impl Season {
    /// Season an analysis falls into when none is given. Month is 1-based.
    pub fn from_month(month: u32) -> Self {
        match month {
            6..=10 => Season::Kharif,
            4 | 5 => Season::Zaid,
            _ => Season::Rabi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
            Season::YearRound => "Year-round",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Kharif" => Some(Season::Kharif),
            "Rabi" => Some(Season::Rabi),
            "Zaid" => Some(Season::Zaid),
            "Year-round" => Some(Season::YearRound),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the soil measurements came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    #[serde(rename = "SoilGrids API")]
    SoilGrids,
    Simulated,
    #[serde(rename = "Manual Entry")]
    ManualEntry,
    #[serde(rename = "Satellite Analysis")]
    SatelliteAnalysis,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::SoilGrids => "SoilGrids API",
            DataSource::Simulated => "Simulated",
            DataSource::ManualEntry => "Manual Entry",
            DataSource::SatelliteAnalysis => "Satellite Analysis",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SoilGrids API" => Some(DataSource::SoilGrids),
            "Simulated" => Some(DataSource::Simulated),
            "Manual Entry" => Some(DataSource::ManualEntry),
            "Satellite Analysis" => Some(DataSource::SatelliteAnalysis),
            _ => None,
        }
    }
}

/// Five-level soil health class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoilHealth {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl SoilHealth {
    pub const ALL: [SoilHealth; 5] = [
        SoilHealth::Excellent,
        SoilHealth::Good,
        SoilHealth::Fair,
        SoilHealth::Poor,
        SoilHealth::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilHealth::Excellent => "Excellent",
            SoilHealth::Good => "Good",
            SoilHealth::Fair => "Fair",
            SoilHealth::Poor => "Poor",
            SoilHealth::Critical => "Critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|h| h.as_str() == s)
    }

    /// Badge colour as a hex string
    pub fn color_hex(&self) -> &'static str {
        match self {
            SoilHealth::Excellent => "#10b981",
            SoilHealth::Good => "#22c55e",
            SoilHealth::Fair => "#f59e0b",
            SoilHealth::Poor => "#ef4444",
            SoilHealth::Critical => "#dc2626",
        }
    }
}

impl std::fmt::Display for SoilHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryCrop {
    pub name: String,
    /// 0-100
    pub match_score: f64,
    pub fertilizer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeCrop {
    pub name: String,
    pub match_score: f64,
}

/// Best crop plus ranked alternatives, most compatible first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub primary_crop: PrimaryCrop,
    #[serde(default)]
    pub alternative_crops: Vec<AlternativeCrop>,
}

/// A persisted soil analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilAnalysis {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub boundary: BoundaryGeometry,
    #[serde(flatten)]
    pub sample: SoilSample,
    pub soil_color: Option<SoilColor>,
    pub crop_recommendation: CropRecommendation,
    pub soil_health: SoilHealth,
    pub fertility_rating: f64,
    pub analysis_date: DateTime<Utc>,
    pub season: Season,
    pub data_source: DataSource,
    pub notes: Option<String>,
    pub is_archived: bool,
    pub report_viewed: bool,
    pub report_downloaded: bool,
    pub download_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Long-form Indian English date, e.g. "5 March 2024"
pub fn format_long_date(date: DateTime<Utc>) -> String {
    format!("{} {}", date.day(), date.format("%B %Y"))
}
