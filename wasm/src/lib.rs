//! WebAssembly module for the SOILY platform
//!
//! Lets the browser preview results before a sample is saved:
//! - Soil health and fertility scoring
//! - Nutrient status labels
//! - Crop recommendations
//! - Season lookup

use wasm_bindgen::prelude::*;

use shared::crops::recommend_crops;
use shared::models::{Season, SoilSample};
use shared::scoring::{classify_soil_health, fertility_rating, nutrient_status, score_sample, Nutrient};
use shared::validation::validate_soil_sample;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("soily-wasm ready"));
}

fn parse_sample(sample_json: &str) -> Result<SoilSample, JsValue> {
    let sample: SoilSample = serde_json::from_str(sample_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid sample JSON: {}", e)))?;
    validate_soil_sample(&sample)
        .map_err(|e| JsValue::from_str(&format!("{}: {}", e.field, e.message)))?;
    Ok(sample)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Soil health label for a pH / organic carbon (g/kg) pair
#[wasm_bindgen]
pub fn classify_health(ph: f64, organic_carbon: f64) -> String {
    classify_soil_health(ph, organic_carbon).to_string()
}

/// Fertility rating (0-10) from N, P and K in kg/ha
#[wasm_bindgen]
pub fn fertility(nitrogen: f64, phosphorus: f64, potassium: f64) -> f64 {
    fertility_rating(nitrogen, phosphorus, potassium)
}

/// Report status ("Low", "Medium", "Good") for one nutrient.
/// `nutrient` is "nitrogen", "phosphorus" or "potassium".
#[wasm_bindgen]
pub fn nutrient_status_label(nutrient: &str, value: f64) -> Result<String, JsValue> {
    let nutrient = match nutrient.to_ascii_lowercase().as_str() {
        "nitrogen" | "n" => Nutrient::Nitrogen,
        "phosphorus" | "p" => Nutrient::Phosphorus,
        "potassium" | "k" => Nutrient::Potassium,
        other => return Err(JsValue::from_str(&format!("Unknown nutrient '{}'", other))),
    };
    Ok(nutrient_status(nutrient, value).to_string())
}

/// Cropping season for a calendar month (1-12)
#[wasm_bindgen]
pub fn season_for_month(month: u32) -> String {
    Season::from_month(month).to_string()
}

/// Full score of a sample as JSON
#[wasm_bindgen]
pub fn score_sample_json(sample_json: &str) -> Result<String, JsValue> {
    let sample = parse_sample(sample_json)?;
    to_json(&score_sample(&sample))
}

/// Primary crop plus alternatives for a sample, as JSON
#[wasm_bindgen]
pub fn recommend_crops_json(sample_json: &str) -> Result<String, JsValue> {
    let sample = parse_sample(sample_json)?;
    to_json(&recommend_crops(&sample))
}
