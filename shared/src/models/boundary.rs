//! Farm boundary geometry
//!
//! Coordinates are GeoJSON-ordered `[longitude, latitude]` pairs. A ring may
//! repeat its first vertex at the end or leave the closing edge implicit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::GeoPoint;

/// Equatorial radius used for spherical polygon area (WGS84)
const AREA_EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Mean radius used for haversine distances
const MEAN_EARTH_RADIUS_KM: f64 = 6_371.0;
const SQ_METRES_PER_ACRE: f64 = 4_046.856_422_4;

#[derive(Debug, Error, PartialEq)]
pub enum BoundaryError {
    #[error("boundary needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),

    #[error("coordinate {index} is outside valid longitude/latitude ranges")]
    InvalidCoordinate { index: usize },

    #[error("boundary encloses no area")]
    ZeroArea,
}

/// Boundary polygon plus the measurements derived from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryGeometry {
    pub coordinates: Vec<[f64; 2]>,
    /// Acres
    pub area: f64,
    /// Kilometres
    pub perimeter: f64,
    pub center_point: GeoPoint,
}

impl BoundaryGeometry {
    /// Derive area, perimeter and centre from the raw ring
    pub fn from_coordinates(coordinates: Vec<[f64; 2]>) -> Result<Self, BoundaryError> {
        let ring = open_ring(&coordinates);
        check_ring(ring)?;

        let area = ring_area_acres(ring);
        if area <= 0.0 || !area.is_finite() {
            return Err(BoundaryError::ZeroArea);
        }

        Ok(Self {
            area,
            perimeter: ring_perimeter_km(ring),
            center_point: ring_center(ring),
            coordinates,
        })
    }

    /// Accept client-measured values when they are usable, deriving the rest
    pub fn with_measurements(
        coordinates: Vec<[f64; 2]>,
        area: Option<f64>,
        perimeter: Option<f64>,
        center_point: Option<GeoPoint>,
    ) -> Result<Self, BoundaryError> {
        let mut geometry = Self::from_coordinates(coordinates)?;
        if let Some(a) = area.filter(|a| a.is_finite() && *a > 0.0) {
            geometry.area = a;
        }
        if let Some(p) = perimeter.filter(|p| p.is_finite() && *p > 0.0) {
            geometry.perimeter = p;
        }
        if let Some(c) = center_point.filter(|c| valid_point(c.longitude, c.latitude)) {
            geometry.center_point = c;
        }
        Ok(geometry)
    }
}

fn valid_point(lng: f64, lat: f64) -> bool {
    lng.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat)
}

/// Strip the closing vertex if the ring repeats its first point
fn open_ring(coordinates: &[[f64; 2]]) -> &[[f64; 2]] {
    match (coordinates.first(), coordinates.last()) {
        (Some(first), Some(last)) if coordinates.len() > 1 && first == last => {
            &coordinates[..coordinates.len() - 1]
        }
        _ => coordinates,
    }
}

fn check_ring(ring: &[[f64; 2]]) -> Result<(), BoundaryError> {
    if let Some(index) = ring.iter().position(|[lng, lat]| !valid_point(*lng, *lat)) {
        return Err(BoundaryError::InvalidCoordinate { index });
    }
    if ring.len() < 3 {
        return Err(BoundaryError::TooFewPoints(ring.len()));
    }
    Ok(())
}

/// Spherical excess approximation over an open ring, in acres
pub fn ring_area_acres(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let lower = ring[i];
        let middle = ring[(i + 1) % n];
        let upper = ring[(i + 2) % n];
        total += (upper[0].to_radians() - lower[0].to_radians()) * middle[1].to_radians().sin();
    }

    let sq_metres = (total * AREA_EARTH_RADIUS_M * AREA_EARTH_RADIUS_M / 2.0).abs();
    sq_metres / SQ_METRES_PER_ACRE
}

/// Closed-ring perimeter using haversine edge lengths, in kilometres
pub fn ring_perimeter_km(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| haversine_km(ring[i], ring[(i + 1) % n]))
        .sum()
}

pub fn haversine_km(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lat1, lat2) = (a[1].to_radians(), b[1].to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b[0] - a[0]).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Vertex mean of the open ring
pub fn ring_center(ring: &[[f64; 2]]) -> GeoPoint {
    if ring.is_empty() {
        return GeoPoint::new(0.0, 0.0);
    }
    let n = ring.len() as f64;
    let (lng_sum, lat_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p[0], lat + p[1]));
    GeoPoint::new(lat_sum / n, lng_sum / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Roughly 100 m x 100 m square near Pune
    fn square() -> Vec<[f64; 2]> {
        vec![
            [73.8500, 18.5200],
            [73.8509, 18.5200],
            [73.8509, 18.5209],
            [73.8500, 18.5209],
        ]
    }

    #[test]
    fn test_square_area_is_about_two_and_a_half_acres() {
        let g = BoundaryGeometry::from_coordinates(square()).unwrap();
        // ~94.9 m x ~100.1 m ≈ 9500 m² ≈ 2.35 acres
        assert!(g.area > 2.0 && g.area < 2.7, "area was {}", g.area);
    }

    #[test]
    fn test_closed_and_open_rings_match() {
        let mut closed = square();
        closed.push(closed[0]);
        let a = BoundaryGeometry::from_coordinates(square()).unwrap();
        let b = BoundaryGeometry::from_coordinates(closed).unwrap();
        assert!((a.area - b.area).abs() < 1e-9);
        assert!((a.perimeter - b.perimeter).abs() < 1e-9);
        assert_eq!(a.coordinates.len() + 1, b.coordinates.len());
    }

    #[test]
    fn test_perimeter_is_about_four_hundred_metres() {
        let g = BoundaryGeometry::from_coordinates(square()).unwrap();
        assert!(g.perimeter > 0.35 && g.perimeter < 0.42, "perimeter was {}", g.perimeter);
    }

    #[test]
    fn test_center_is_vertex_mean() {
        let g = BoundaryGeometry::from_coordinates(square()).unwrap();
        assert!((g.center_point.latitude - 18.52045).abs() < 1e-9);
        assert!((g.center_point.longitude - 73.85045).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let err = BoundaryGeometry::from_coordinates(vec![[73.0, 18.0], [73.1, 18.0], [73.0, 18.0]])
            .unwrap_err();
        assert_eq!(err, BoundaryError::TooFewPoints(2));
    }

    #[test]
    fn test_invalid_coordinate() {
        let mut coords = square();
        coords[2] = [200.0, 18.0];
        assert_eq!(
            BoundaryGeometry::from_coordinates(coords).unwrap_err(),
            BoundaryError::InvalidCoordinate { index: 2 }
        );
    }

    #[test]
    fn test_collinear_points_have_no_area() {
        let coords = vec![[73.0, 18.0], [73.0, 18.1], [73.0, 18.2]];
        assert_eq!(
            BoundaryGeometry::from_coordinates(coords).unwrap_err(),
            BoundaryError::ZeroArea
        );
    }

    #[test]
    fn test_client_measurements_preferred_when_positive() {
        let g = BoundaryGeometry::with_measurements(square(), Some(3.5), Some(-1.0), None).unwrap();
        assert_eq!(g.area, 3.5);
        assert!(g.perimeter > 0.0);
    }
}
