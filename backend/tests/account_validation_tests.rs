//! Registration and profile validation tests
//!
//! Property-based and unit tests for the checks applied to farmer accounts
//! and submitted soil samples before anything is stored.

use proptest::prelude::*;
use shared::{
    normalize_email, normalize_phone, validate_email, validate_full_name, validate_indian_phone,
    validate_location, validate_notes, validate_password, validate_pincode, validate_soil_sample,
    ClimateData, FarmSize, Language, Season, SoilProperties, SoilSample, SoilTexture,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,8}\\.(com|org|in|co\\.in)"
}

/// Generate valid Indian mobile numbers, with optional spacing
fn indian_phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[6-9][0-9]{9}",
        "[6-9][0-9]{4} [0-9]{5}",
    ]
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

/// Generate valid farmer names
fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{3}[A-Za-z ]{0,40}"
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_generated_emails_are_valid(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    /// Lookups are case- and whitespace-insensitive
    #[test]
    fn prop_email_normalization_is_idempotent(email in email_strategy()) {
        let shouted = format!("  {}  ", email.to_uppercase());
        let normalized = normalize_email(&shouted);
        prop_assert_eq!(&normalized, &email);
        prop_assert_eq!(normalize_email(&normalized), normalized.clone());
    }

    #[test]
    fn prop_indian_phones_are_valid(phone in indian_phone_strategy()) {
        prop_assert!(validate_indian_phone(&phone).is_ok());
        prop_assert_eq!(normalize_phone(&phone).len(), 10);
    }

    /// Numbers starting 0-5 are landlines or invalid
    #[test]
    fn prop_non_mobile_prefix_rejected(phone in "[0-5][0-9]{9}") {
        prop_assert!(validate_indian_phone(&phone).is_err());
    }

    #[test]
    fn prop_password_length(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn prop_short_passwords_rejected(password in "[a-z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }

    #[test]
    fn prop_names_accepted(name in name_strategy()) {
        prop_assert!(validate_full_name(&name).is_ok());
    }

    /// Every language round-trips through its code
    #[test]
    fn prop_language_codes(index in 0usize..Language::ALL.len()) {
        let language = Language::ALL[index];
        prop_assert_eq!(Language::from_code(language.code()), Some(language));
    }

    /// Month to season mapping covers the calendar
    #[test]
    fn prop_every_month_has_a_season(month in 1u32..=12) {
        prop_assert_ne!(Season::from_month(month), Season::YearRound);
    }
}

// ============================================================================
// Unit Tests: Account fields
// ============================================================================

#[cfg(test)]
mod account_tests {
    use super::*;

    #[test]
    fn test_invalid_emails() {
        for email in ["", "farmer", "farmer@", "@example.com", "a b@example.com", "a@@b.com", "a@b"] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn test_invalid_phones() {
        for phone in ["98765", "98765432100", "98765abcde", "+919876543210"] {
            assert!(validate_indian_phone(phone).is_err(), "{phone} should be rejected");
        }
    }

    #[test]
    fn test_pincode() {
        assert!(validate_pincode("411001").is_ok());
        assert!(validate_pincode("011001").is_err());
        assert!(validate_pincode("41100").is_err());
    }

    #[test]
    fn test_name_and_location_limits() {
        assert!(validate_full_name("  Al ").is_err());
        assert!(validate_full_name(&"a".repeat(101)).is_err());
        assert!(validate_location("   ").is_err());
        assert!(validate_location(&"x".repeat(201)).is_err());
        assert!(validate_location("Nashik, Maharashtra").is_ok());
        assert!(validate_notes(&"n".repeat(1000)).is_ok());
        assert!(validate_notes(&"n".repeat(1001)).is_err());
    }

    #[test]
    fn test_farm_size_labels() {
        assert_eq!(FarmSize::parse("xlarge"), Some(FarmSize::Xlarge));
        assert_eq!(FarmSize::parse("huge"), None);
        assert_eq!(FarmSize::Medium.description(), "2-10 acres");
    }
}

// ============================================================================
// Unit Tests: Sample ranges
// ============================================================================

#[cfg(test)]
mod sample_tests {
    use super::*;

    fn sample() -> SoilSample {
        SoilSample {
            soil_properties: SoilProperties {
                ph: 7.2,
                nitrogen: 0.45,
                phosphorus: 28.0,
                potassium: 210.0,
                organic_carbon: 9.5,
                clay: 18.0,
                sand: Some(62.0),
                bulk_density: Some(1.5),
                cec: Some(12.0),
                soil_type: SoilTexture::SandyLoam,
            },
            climate_data: ClimateData {
                rainfall: 540.0,
                temperature: 29.0,
            },
        }
    }

    #[test]
    fn test_realistic_sample_passes() {
        assert!(validate_soil_sample(&sample()).is_ok());
    }

    #[test]
    fn test_ph_out_of_range_names_field() {
        let mut s = sample();
        s.soil_properties.ph = 15.0;
        let err = validate_soil_sample(&s).unwrap_err();
        assert_eq!(err.field, "soilProperties.pH");
    }

    #[test]
    fn test_non_finite_rainfall_rejected() {
        let mut s = sample();
        s.climate_data.rainfall = f64::NAN;
        let err = validate_soil_sample(&s).unwrap_err();
        assert_eq!(err.field, "climateData.rainfall");
    }

    #[test]
    fn test_negative_nutrient_rejected() {
        let mut s = sample();
        s.soil_properties.potassium = -1.0;
        assert!(validate_soil_sample(&s).is_err());
    }
}
