//! Aggregate views over a farmer's analysis history
//!
//! All functions take the farmer's analyses newest first. Archived entries
//! are skipped. Nothing here touches storage.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::models::{FarmSize, Season, SoilAnalysis};

pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Round half away from zero to `dp` places, keeping trailing zeros
pub fn fixed(value: f64, dp: u32) -> Decimal {
    let mut d = Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    d.rescale(dp);
    d
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn active(analyses: &[SoilAnalysis]) -> impl Iterator<Item = &SoilAnalysis> {
    analyses.iter().filter(|a| !a.is_archived)
}

// ============================================================================
// Crop frequency
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropCount {
    pub crop: String,
    pub count: usize,
}

/// Crop name to count, in first-seen order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropDistribution(Vec<CropCount>);

impl CropDistribution {
    pub fn record(&mut self, crop: &str) {
        match self.0.iter_mut().find(|c| c.crop == crop) {
            Some(entry) => entry.count += 1,
            None => self.0.push(CropCount {
                crop: crop.to_string(),
                count: 1,
            }),
        }
    }

    pub fn get(&self, crop: &str) -> Option<usize> {
        self.0.iter().find(|c| c.crop == crop).map(|c| c.count)
    }

    pub fn entries(&self) -> &[CropCount] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest count; on ties the crop seen first wins
    pub fn most_frequent(&self) -> Option<&str> {
        let mut best: Option<&CropCount> = None;
        for entry in &self.0 {
            if best.map_or(true, |b| entry.count > b.count) {
                best = Some(entry);
            }
        }
        best.map(|b| b.crop.as_str())
    }
}

impl Serialize for CropDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.crop, &entry.count)?;
        }
        map.end()
    }
}

pub fn crop_distribution(analyses: &[SoilAnalysis]) -> CropDistribution {
    let mut dist = CropDistribution::default();
    for analysis in active(analyses) {
        dist.record(&analysis.crop_recommendation.primary_crop.name);
    }
    dist
}

// ============================================================================
// Farmer statistics
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerStats {
    pub total_analyses: usize,
    /// Acres, 2 dp
    pub total_area_analyzed: Decimal,
    /// 2 dp
    #[serde(rename = "averagepH")]
    pub average_ph: Decimal,
    /// 1 dp
    pub average_fertility: Decimal,
    pub most_recommended_crop: String,
    pub latest_analysis: DateTime<Utc>,
    pub crop_distribution: CropDistribution,
}

/// Statistics for a farmer, or the explicit no-data sentinel
#[derive(Debug, Clone, PartialEq)]
pub enum FarmerStatistics {
    Available(FarmerStats),
    NoData,
}

impl FarmerStatistics {
    pub fn stats(&self) -> Option<&FarmerStats> {
        match self {
            FarmerStatistics::Available(s) => Some(s),
            FarmerStatistics::NoData => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoDataPlaceholder {
    total_analyses: usize,
    total_area_analyzed: &'static str,
    #[serde(rename = "averagepH")]
    average_ph: &'static str,
    average_fertility: &'static str,
    most_recommended_crop: &'static str,
    latest_analysis: Option<DateTime<Utc>>,
    crop_distribution: CropDistribution,
}

impl Serialize for FarmerStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FarmerStatistics::Available(stats) => stats.serialize(serializer),
            FarmerStatistics::NoData => NoDataPlaceholder {
                total_analyses: 0,
                total_area_analyzed: "0.00",
                average_ph: "-",
                average_fertility: "-",
                most_recommended_crop: "-",
                latest_analysis: None,
                crop_distribution: CropDistribution::default(),
            }
            .serialize(serializer),
        }
    }
}

pub fn farmer_statistics(analyses: &[SoilAnalysis]) -> FarmerStatistics {
    let items: Vec<&SoilAnalysis> = active(analyses).collect();
    let Some(latest) = items.first() else {
        return FarmerStatistics::NoData;
    };

    let total_area: f64 = items.iter().map(|a| a.boundary.area).sum();
    let avg_ph = mean(items.iter().map(|a| a.sample.soil_properties.ph)).unwrap_or(0.0);
    let avg_fertility = mean(items.iter().map(|a| a.fertility_rating)).unwrap_or(0.0);
    let distribution = crop_distribution(analyses);

    FarmerStatistics::Available(FarmerStats {
        total_analyses: items.len(),
        total_area_analyzed: fixed(total_area, 2),
        average_ph: fixed(avg_ph, 2),
        average_fertility: fixed(avg_fertility, 1),
        most_recommended_crop: distribution.most_frequent().unwrap_or("-").to_string(),
        latest_analysis: latest.analysis_date,
        crop_distribution: distribution,
    })
}

// ============================================================================
// Seasonal trends
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalTrend {
    pub season: Season,
    pub count: usize,
    #[serde(rename = "avgpH")]
    pub avg_ph: f64,
    pub avg_fertility: f64,
    pub crops: Vec<String>,
}

/// Per-season grouping in order of first appearance
pub fn seasonal_trends(analyses: &[SoilAnalysis]) -> Vec<SeasonalTrend> {
    let mut groups: Vec<(Season, Vec<&SoilAnalysis>)> = Vec::new();
    for analysis in active(analyses) {
        match groups.iter_mut().find(|(s, _)| *s == analysis.season) {
            Some((_, members)) => members.push(analysis),
            None => groups.push((analysis.season, vec![analysis])),
        }
    }

    groups
        .into_iter()
        .map(|(season, members)| SeasonalTrend {
            season,
            count: members.len(),
            avg_ph: mean(members.iter().map(|a| a.sample.soil_properties.ph)).unwrap_or(0.0),
            avg_fertility: mean(members.iter().map(|a| a.fertility_rating)).unwrap_or(0.0),
            crops: members
                .iter()
                .map(|a| a.crop_recommendation.primary_crop.name.clone())
                .collect(),
        })
        .collect()
}

// ============================================================================
// Dashboard
// ============================================================================

fn dash_if_none<S: Serializer, T: Serialize>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => v.serialize(s),
        None => s.serialize_str("-"),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Acres, sent as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub farm_area: Decimal,
    /// Mean fertility as a percentage
    #[serde(serialize_with = "dash_if_none")]
    pub soil_health: Option<u32>,
    pub active_maps: usize,
    pub recommendations: usize,
    pub total_analyses: usize,
    pub most_recommended_crop: String,
    #[serde(rename = "averagepH", serialize_with = "dash_if_none")]
    pub average_ph: Option<Decimal>,
}

pub fn dashboard_summary(farm_size: FarmSize, analyses: &[SoilAnalysis]) -> DashboardSummary {
    let items: Vec<&SoilAnalysis> = active(analyses).collect();
    let statistics = farmer_statistics(analyses);
    let stats = statistics.stats();

    let soil_health = mean(items.iter().map(|a| a.fertility_rating))
        .map(|avg| (avg / 10.0 * 100.0).round().clamp(0.0, 100.0) as u32);

    DashboardSummary {
        farm_area: stats
            .map(|s| s.total_area_analyzed)
            .unwrap_or_else(|| fixed(farm_size.estimated_acres(), 0)),
        soil_health,
        active_maps: items.len(),
        recommendations: items
            .first()
            .map_or(0, |a| a.crop_recommendation.alternative_crops.len() + 1),
        total_analyses: stats.map_or(0, |s| s.total_analyses),
        most_recommended_crop: stats
            .map(|s| s.most_recommended_crop.clone())
            .unwrap_or_else(|| "-".to_string()),
        average_ph: stats.map(|s| s.average_ph),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityItem {
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub time: String,
    pub link: String,
}

/// "Just now", "3 hours ago", "Yesterday", "12 days ago"
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - then).max(chrono::Duration::zero());
    match elapsed.num_days() {
        0 => match elapsed.num_hours() {
            0 => "Just now".to_string(),
            1 => "1 hour ago".to_string(),
            h => format!("{} hours ago", h),
        },
        1 => "Yesterday".to_string(),
        d => format!("{} days ago", d),
    }
}

fn days_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days().max(0);
    if days == 1 {
        "1 day ago".to_string()
    } else {
        format!("{} days ago", days)
    }
}

/// Up to five latest analyses, or a welcome entry for new farmers
pub fn recent_activity(
    analyses: &[SoilAnalysis],
    registered_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<ActivityItem> {
    let items: Vec<ActivityItem> = active(analyses)
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|a| ActivityItem {
            title: "Soil Analysis Completed".to_string(),
            description: format!(
                "{:.2} acres - {} soil",
                a.boundary.area, a.sample.soil_properties.soil_type
            ),
            time: relative_time(a.analysis_date, now),
            link: "/reports".to_string(),
        })
        .collect();

    if !items.is_empty() {
        return items;
    }

    vec![ActivityItem {
        title: "Welcome to SOILY!".to_string(),
        description: "Start by creating your first soil analysis".to_string(),
        time: days_ago(registered_at, now),
        link: "/soil-map".to_string(),
    }]
}
