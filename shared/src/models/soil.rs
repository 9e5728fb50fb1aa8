//! Soil sample measurements

use serde::{Deserialize, Serialize};

/// Soil texture class recorded with each sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SoilTexture {
    Clay,
    Sandy,
    Silty,
    #[serde(rename = "Clay Loam")]
    ClayLoam,
    #[serde(rename = "Sandy Loam")]
    SandyLoam,
    #[serde(rename = "Silty Loam")]
    SiltyLoam,
    Loam,
    Other,
}

impl SoilTexture {
    pub const ALL: [SoilTexture; 8] = [
        SoilTexture::Clay,
        SoilTexture::Sandy,
        SoilTexture::Silty,
        SoilTexture::ClayLoam,
        SoilTexture::SandyLoam,
        SoilTexture::SiltyLoam,
        SoilTexture::Loam,
        SoilTexture::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilTexture::Clay => "Clay",
            SoilTexture::Sandy => "Sandy",
            SoilTexture::Silty => "Silty",
            SoilTexture::ClayLoam => "Clay Loam",
            SoilTexture::SandyLoam => "Sandy Loam",
            SoilTexture::SiltyLoam => "Silty Loam",
            SoilTexture::Loam => "Loam",
            SoilTexture::Other => "Other",
        }
    }

    /// Parse the stored label; unknown labels map to `Other`
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(SoilTexture::Other)
    }
}

impl std::fmt::Display for SoilTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Laboratory or remote-sensed soil properties
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilProperties {
    #[serde(rename = "pH")]
    pub ph: f64,
    /// kg/ha
    pub nitrogen: f64,
    /// kg/ha
    pub phosphorus: f64,
    /// kg/ha
    pub potassium: f64,
    /// g/kg
    pub organic_carbon: f64,
    /// Percent
    pub clay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sand: Option<f64>,
    /// g/cm³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_density: Option<f64>,
    /// cmol/kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cec: Option<f64>,
    pub soil_type: SoilTexture,
}

/// Climate averages for the sampled area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateData {
    /// mm per year
    pub rainfall: f64,
    /// °C
    pub temperature: f64,
}

/// Everything the scoring engine needs from one sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoilSample {
    pub soil_properties: SoilProperties,
    pub climate_data: ClimateData,
}

impl SoilSample {
    /// True when every required measurement is a finite number
    pub fn is_finite(&self) -> bool {
        let p = &self.soil_properties;
        [
            p.ph,
            p.nitrogen,
            p.phosphorus,
            p.potassium,
            p.organic_carbon,
            p.clay,
            self.climate_data.rainfall,
            self.climate_data.temperature,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Observed soil colour
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
