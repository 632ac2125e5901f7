use serde::Serialize;

use crate::predict::error::PredictError;
use crate::predict::frames::{WGS84_A_KM, WGS84_E2};

/// Observer location on the WGS-84 ellipsoid. Ranges are enforced here so
/// nothing downstream has to re-check them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundObserver {
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_km: f64,
}

impl GroundObserver {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Result<Self, PredictError> {
        if !latitude_deg.is_finite() || !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "latitude {} outside [-90, 90]",
                latitude_deg
            )));
        }
        if !longitude_deg.is_finite() || !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "longitude {} outside [-180, 180]",
                longitude_deg
            )));
        }
        if !altitude_km.is_finite() || altitude_km < 0.0 {
            return Err(PredictError::InvalidObserver(format!(
                "altitude {} km is negative",
                altitude_km
            )));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        })
    }

    /// Parse `"lat, lng"` in degrees.
    pub fn from_coordinates(coordinates: &str, altitude_km: Option<f64>) -> Result<Self, PredictError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(PredictError::InvalidObserver(format!(
                "expected \"lat, lng\", got {:?}",
                coordinates
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| PredictError::InvalidObserver(format!("{:?}: {}", s, e)))
        };
        Self::new(parse(parts[0])?, parse(parts[1])?, altitude_km.unwrap_or(0.0))
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let x = (n + self.altitude_km) * cos_lat * lon.cos();
        let y = (n + self.altitude_km) * cos_lat * lon.sin();
        let z = (n * (1.0 - WGS84_E2) + self.altitude_km) * sin_lat;
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(90.5, 0.0, 0.0)]
    #[case(-91.0, 0.0, 0.0)]
    #[case(0.0, 180.1, 0.0)]
    #[case(0.0, -200.0, 0.0)]
    #[case(0.0, 0.0, -0.1)]
    #[case(f64::NAN, 0.0, 0.0)]
    fn rejects_out_of_range(#[case] lat: f64, #[case] lng: f64, #[case] alt: f64) {
        assert!(matches!(
            GroundObserver::new(lat, lng, alt),
            Err(PredictError::InvalidObserver(_))
        ));
    }

    #[rstest]
    #[case(90.0, 180.0, 0.0)]
    #[case(-90.0, -180.0, 4.5)]
    #[case(0.0, 0.0, 0.0)]
    fn accepts_boundaries(#[case] lat: f64, #[case] lng: f64, #[case] alt: f64) {
        assert!(GroundObserver::new(lat, lng, alt).is_ok());
    }

    #[test]
    fn parses_coordinates() {
        let observer = GroundObserver::from_coordinates(" 52.5, 13.4 ", Some(0.034)).unwrap();
        assert_eq!(observer.latitude_deg(), 52.5);
        assert_eq!(observer.longitude_deg(), 13.4);
        assert_eq!(observer.altitude_km(), 0.034);
        assert!(GroundObserver::from_coordinates("52.5", None).is_err());
        assert!(GroundObserver::from_coordinates("north, east", None).is_err());
        assert!(GroundObserver::from_coordinates("95.0, 0.0", None).is_err());
    }

    #[test]
    fn ecef_on_equator_and_pole() {
        let equator = GroundObserver::new(0.0, 0.0, 0.0).unwrap().position_ecef_km();
        assert_relative_eq!(equator[0], WGS84_A_KM, epsilon = 1e-9);
        assert_relative_eq!(equator[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(equator[2], 0.0, epsilon = 1e-9);

        let pole = GroundObserver::new(90.0, 0.0, 1.0).unwrap().position_ecef_km();
        assert_relative_eq!(pole[2], 6356.752 + 1.0, epsilon = 1e-3);
    }
}
