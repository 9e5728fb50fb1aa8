//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// A single latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported interface languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Gu,
    Pa,
    Ta,
    Te,
    Bn,
    Kn,
    Ml,
    Or,
    As,
    Ur,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Language::En,
        Language::Hi,
        Language::Mr,
        Language::Gu,
        Language::Pa,
        Language::Ta,
        Language::Te,
        Language::Bn,
        Language::Kn,
        Language::Ml,
        Language::Or,
        Language::As,
        Language::Ur,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
            Language::Gu => "gu",
            Language::Pa => "pa",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Bn => "bn",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Or => "or",
            Language::As => "as",
            Language::Ur => "ur",
        }
    }

    /// Name shown in language pickers, with the native script in brackets
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi (हिंदी)",
            Language::Mr => "Marathi (मराठी)",
            Language::Gu => "Gujarati (ગુજરાતી)",
            Language::Pa => "Punjabi (ਪੰਜਾਬੀ)",
            Language::Ta => "Tamil (தமிழ்)",
            Language::Te => "Telugu (తెలుగు)",
            Language::Bn => "Bengali (বাংলা)",
            Language::Kn => "Kannada (ಕನ್ನಡ)",
            Language::Ml => "Malayalam (മലയാളം)",
            Language::Or => "Odia (ଓଡ଼ିଆ)",
            Language::As => "Assamese (অসমীয়া)",
            Language::Ur => "Urdu (اردو)",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
