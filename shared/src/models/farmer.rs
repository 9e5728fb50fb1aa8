//! Farmer account models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Language;

/// Self-reported farm size band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FarmSize {
    Small,
    Medium,
    Large,
    Xlarge,
}

impl FarmSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmSize::Small => "small",
            FarmSize::Medium => "medium",
            FarmSize::Large => "large",
            FarmSize::Xlarge => "xlarge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(FarmSize::Small),
            "medium" => Some(FarmSize::Medium),
            "large" => Some(FarmSize::Large),
            "xlarge" => Some(FarmSize::Xlarge),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FarmSize::Small => "Less than 2 acres",
            FarmSize::Medium => "2-10 acres",
            FarmSize::Large => "10-50 acres",
            FarmSize::Xlarge => "More than 50 acres",
        }
    }

    /// Label used on printed reports
    pub fn report_label(&self) -> &'static str {
        match self {
            FarmSize::Small => "Small (< 2 acres)",
            FarmSize::Medium => "Medium (2-10 acres)",
            FarmSize::Large => "Large (10-50 acres)",
            FarmSize::Xlarge => "Extra Large (> 50 acres)",
        }
    }

    /// Representative acreage when no boundary has been mapped yet
    pub fn estimated_acres(&self) -> f64 {
        match self {
            FarmSize::Small => 2.0,
            FarmSize::Medium => 6.0,
            FarmSize::Large => 30.0,
            FarmSize::Xlarge => 100.0,
        }
    }
}

impl std::fmt::Display for FarmSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regional soil classification as reported by the farmer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FarmerSoilType {
    Alluvial,
    Black,
    Red,
    Laterite,
    Desert,
    Mountain,
    Mixed,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IrrigationType {
    Drip,
    Sprinkler,
    Flood,
    Rainfed,
    Mixed,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: true,
            push: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "type")]
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        if self.tier == SubscriptionTier::Free {
            return true;
        }
        self.status == SubscriptionStatus::Active && self.end_date.is_some_and(|end| end > today)
    }
}

/// Crop the farmer already grows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerCrop {
    pub name: String,
    pub season: Option<String>,
    /// Acres
    pub area: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: None,
            city: None,
            state: None,
            pincode: None,
            country: "India".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Registered farmer. The credential hash never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub farm_size: FarmSize,
    pub preferred_language: Language,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile_image: Option<String>,
    pub address: Address,
    pub crops: Vec<FarmerCrop>,
    pub soil_type: Option<FarmerSoilType>,
    pub irrigation_type: Option<IrrigationType>,
    pub farming_experience: Option<i32>,
    pub notifications: NotificationPreferences,
    pub subscription: Subscription,
    pub last_login: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Farmer fields safe to show to the farmer themselves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub farm_size: FarmSize,
    pub farm_size_description: String,
    pub preferred_language: Language,
    pub language_name: String,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Farmer {
    pub fn farm_size_description(&self) -> &'static str {
        self.farm_size.description()
    }

    pub fn has_premium_access(&self) -> bool {
        matches!(
            self.subscription.tier,
            SubscriptionTier::Premium | SubscriptionTier::Enterprise
        )
    }

    pub fn is_subscription_active(&self, today: NaiveDate) -> bool {
        self.subscription.is_active(today)
    }

    pub fn public_profile(&self) -> FarmerProfile {
        FarmerProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            farm_size: self.farm_size,
            farm_size_description: self.farm_size.description().to_string(),
            preferred_language: self.preferred_language,
            language_name: self.preferred_language.display_name().to_string(),
            profile_image: self.profile_image.clone(),
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}
