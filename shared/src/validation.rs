//! Validation utilities for the SOILY platform
//!
//! Includes India-specific checks for phone numbers and PIN codes.

use crate::models::{CropRecommendation, SoilSample};

pub const FULL_NAME_MIN_CHARS: usize = 3;
pub const FULL_NAME_MAX_CHARS: usize = 100;
pub const LOCATION_MAX_CHARS: usize = 200;
pub const NOTES_MAX_CHARS: usize = 1000;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// A rejected field and the reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// Account Validations
// ============================================================================

/// Lowercase and trim an email before storage or lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err("Please enter a valid email address");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Please enter a valid email address");
    };
    if local.is_empty() || domain.contains('@') {
        return Err("Please enter a valid email address");
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err("Please enter a valid email address"),
    }
}

/// Remove all whitespace from a phone number
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Indian mobile number: 10 digits starting with 6-9
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let phone = normalize_phone(phone);
    let valid = phone.len() == 10
        && phone.chars().all(|c| c.is_ascii_digit())
        && matches!(phone.chars().next(), Some('6'..='9'));
    if valid {
        Ok(())
    } else {
        Err("Please enter a valid 10-digit phone number")
    }
}

/// Six-digit Indian postal PIN code, first digit non-zero
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    let pincode = pincode.trim();
    let valid = pincode.len() == 6
        && pincode.chars().all(|c| c.is_ascii_digit())
        && !pincode.starts_with('0');
    if valid {
        Ok(())
    } else {
        Err("PIN code must be 6 digits")
    }
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err("Password must be at least 8 characters long");
    }
    Ok(())
}

pub fn validate_full_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if len < FULL_NAME_MIN_CHARS {
        return Err("Name must be at least 3 characters long");
    }
    if len > FULL_NAME_MAX_CHARS {
        return Err("Name cannot exceed 100 characters");
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), &'static str> {
    let len = location.trim().chars().count();
    if len == 0 {
        return Err("Farm location is required");
    }
    if len > LOCATION_MAX_CHARS {
        return Err("Location cannot exceed 200 characters");
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<(), &'static str> {
    if notes.chars().count() > NOTES_MAX_CHARS {
        return Err("Notes cannot exceed 1000 characters");
    }
    Ok(())
}

// ============================================================================
// Soil Sample Validations
// ============================================================================

fn check_range(
    value: f64,
    min: f64,
    max: f64,
    field: &'static str,
    message: &'static str,
) -> Result<(), FieldError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(FieldError::new(field, message))
    }
}

/// Range checks on every measurement of a submitted sample
pub fn validate_soil_sample(sample: &SoilSample) -> Result<(), FieldError> {
    let p = &sample.soil_properties;
    check_range(p.ph, 0.0, 14.0, "soilProperties.pH", "pH must be between 0 and 14")?;
    check_range(p.nitrogen, 0.0, f64::MAX, "soilProperties.nitrogen", "Nitrogen cannot be negative")?;
    check_range(p.phosphorus, 0.0, f64::MAX, "soilProperties.phosphorus", "Phosphorus cannot be negative")?;
    check_range(p.potassium, 0.0, f64::MAX, "soilProperties.potassium", "Potassium cannot be negative")?;
    check_range(
        p.organic_carbon,
        0.0,
        f64::MAX,
        "soilProperties.organicCarbon",
        "Organic carbon cannot be negative",
    )?;
    check_range(p.clay, 0.0, 100.0, "soilProperties.clay", "Clay must be between 0 and 100%")?;
    if let Some(sand) = p.sand {
        check_range(sand, 0.0, 100.0, "soilProperties.sand", "Sand must be between 0 and 100%")?;
    }
    if let Some(bd) = p.bulk_density {
        check_range(bd, 0.0, f64::MAX, "soilProperties.bulkDensity", "Bulk density cannot be negative")?;
    }
    if let Some(cec) = p.cec {
        check_range(cec, 0.0, f64::MAX, "soilProperties.cec", "CEC cannot be negative")?;
    }

    let c = &sample.climate_data;
    check_range(c.rainfall, 0.0, f64::MAX, "climateData.rainfall", "Rainfall cannot be negative")?;
    check_range(
        c.temperature,
        -60.0,
        60.0,
        "climateData.temperature",
        "Temperature must be between -60 and 60 °C",
    )?;
    Ok(())
}

/// Crop names must be present; scores are clamped later rather than rejected
pub fn validate_crop_recommendation(rec: &CropRecommendation) -> Result<(), FieldError> {
    if rec.primary_crop.name.trim().is_empty() {
        return Err(FieldError::new(
            "cropRecommendation.primaryCrop.name",
            "Primary crop name is required",
        ));
    }
    if rec.primary_crop.fertilizer.trim().is_empty() {
        return Err(FieldError::new(
            "cropRecommendation.primaryCrop.fertilizer",
            "Fertilizer recommendation is required",
        ));
    }
    Ok(())
}
