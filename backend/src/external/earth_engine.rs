//! Earth Engine client for Sentinel-2 true-colour field imagery
//!
//! Authenticates with a service account key (RS256 JWT exchanged for an
//! OAuth2 access token) and renders a PNG of the clearest scene over a
//! field polygon.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::EarthEngineConfig;
use crate::error::{AppError, AppResult};

const EARTH_ENGINE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine.readonly";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Tokens are refreshed this many seconds before they expire
const TOKEN_REFRESH_MARGIN: i64 = 60;

#[derive(Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Earth Engine API client
#[derive(Clone)]
pub struct EarthEngineClient {
    client: Client,
    base_url: String,
    project: String,
    date_from: String,
    date_to: String,
    key: ServiceAccountKey,
    token_cache: Arc<Mutex<Option<CachedToken>>>,
}

impl EarthEngineClient {
    /// Read the service account key named in configuration
    pub fn from_config(config: &EarthEngineConfig) -> anyhow::Result<Self> {
        let key_json = std::fs::read_to_string(&config.key_path)
            .with_context(|| format!("Service account key {} unreadable", config.key_path))?;
        let key: ServiceAccountKey =
            serde_json::from_str(&key_json).context("Failed to parse service account key")?;

        Ok(Self {
            client: Client::new(),
            base_url: "https://earthengine.googleapis.com/v1".to_string(),
            project: config.project.clone(),
            date_from: config.date_from.clone(),
            date_to: config.date_to.clone(),
            key,
            token_cache: Arc::new(Mutex::new(None)),
        })
    }

    fn cached_token(&self, now: i64) -> AppResult<Option<String>> {
        let cache = self
            .token_cache
            .lock()
            .map_err(|_| AppError::Internal("Earth Engine token cache poisoned".to_string()))?;
        Ok(cache
            .as_ref()
            .filter(|t| now < t.expires_at - TOKEN_REFRESH_MARGIN)
            .map(|t| t.access_token.clone()))
    }

    /// Valid OAuth2 access token, minting a new one when the cached one is stale
    pub async fn access_token(&self) -> AppResult<String> {
        let now = Utc::now().timestamp();
        if let Some(token) = self.cached_token(now)? {
            return Ok(token);
        }

        let claims = json!({
            "iss": self.key.client_email,
            "scope": EARTH_ENGINE_SCOPE,
            "aud": TOKEN_URI,
            "iat": now,
            "exp": now + 3600,
        });
        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid service account private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign service account JWT: {}", e)))?;

        let response = self
            .client
            .post(TOKEN_URI)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Token exchange error: {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse token response: {}", e)))?;

        let mut cache = self
            .token_cache
            .lock()
            .map_err(|_| AppError::Internal("Earth Engine token cache poisoned".to_string()))?;
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        tracing::debug!("Refreshed Earth Engine access token");

        Ok(token.access_token)
    }

    /// PNG bytes of the least cloudy Sentinel-2 scene over the polygon
    pub async fn true_color_png(&self, coordinates: &[[f64; 2]]) -> AppResult<Vec<u8>> {
        let token = self.access_token().await?;
        let url = format!("{}/projects/{}:getPixels", self.base_url, self.project);
        let body = pixels_request(coordinates, &self.date_from, &self.date_to);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Satellite fetch failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Earth Engine error: {} - {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ExternalService(format!("Satellite fetch failed: {}", e)))?;
        tracing::debug!("Fetched {} byte field image", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// GeoJSON polygon with an explicitly closed ring
pub fn polygon(coordinates: &[[f64; 2]]) -> serde_json::Value {
    let mut ring = coordinates.to_vec();
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    json!({ "type": "Polygon", "coordinates": [ring] })
}

/// `getPixels` request body rendering bands B4/B3/B2 stretched 0-2000
pub fn pixels_request(coordinates: &[[f64; 2]], date_from: &str, date_to: &str) -> serde_json::Value {
    let region = polygon(coordinates);
    let expression = format!(
        "var region = ee.Geometry({region});\n\
         var img = ee.ImageCollection('COPERNICUS/S2')\n\
             .filterBounds(region)\n\
             .filterDate('{date_from}', '{date_to}')\n\
             .sort('CLOUDY_PIXEL_PERCENTAGE')\n\
             .first()\n\
             .select(['B4','B3','B2']);\n\
         img.visualize({{min:0, max:2000}});"
    );
    json!({
        "expression": expression,
        "fileFormat": "png",
        "region": region,
    })
}

pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_closes_ring() {
        let p = polygon(&[[73.0, 18.0], [73.1, 18.0], [73.1, 18.1]]);
        let ring = p["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
    }

    #[test]
    fn test_polygon_keeps_closed_ring() {
        let p = polygon(&[[73.0, 18.0], [73.1, 18.0], [73.1, 18.1], [73.0, 18.0]]);
        assert_eq!(p["coordinates"][0].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_pixels_request_shape() {
        let body = pixels_request(&[[73.0, 18.0], [73.1, 18.0], [73.1, 18.1]], "2024-01-01", "2024-12-31");
        assert_eq!(body["fileFormat"], "png");
        assert_eq!(body["region"]["type"], "Polygon");
        let expr = body["expression"].as_str().unwrap();
        assert!(expr.contains("COPERNICUS/S2"));
        assert!(expr.contains("filterDate('2024-01-01', '2024-12-31')"));
        assert!(expr.contains("select(['B4','B3','B2'])"));
        assert!(expr.contains("{min:0, max:2000}"));
    }

    #[test]
    fn test_png_data_url() {
        assert_eq!(png_data_url(&[0x89, b'P', b'N', b'G']), "data:image/png;base64,iVBORw==");
    }
}
