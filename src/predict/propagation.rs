use chrono::{DateTime, Utc};
use log::debug;
use std::f64::consts::PI;

use crate::predict::error::PredictError;
use crate::predict::frames::{
    ecef_to_geodetic, ecef_to_look_angles, sidereal_time, teme_to_ecef, teme_to_geodetic, Geodetic,
};
use crate::predict::types::{OrbitalElements, PropagationSample};
use crate::predict::GroundObserver;

const MINUTES_PER_DAY: f64 = 1440.0;

// WGS-72 geopotential, as used by SGP4 initialisation
const WGS72_EARTH_RADIUS_KM: f64 = 6378.135;
const WGS72_MU_KM3_S2: f64 = 398_600.8;
const WGS72_J2: f64 = 0.001_082_616;

/// Inertial (TEME) state at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub instant: DateTime<Utc>,
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Mean orbital elements in the propagator's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    pub inclination_rad: f64,
    pub raan_rad: f64,
    pub eccentricity: f64,
    pub arg_of_perigee_rad: f64,
    pub mean_anomaly_rad: f64,
    /// Kozai mean motion as published in the element set.
    pub mean_motion_rad_per_min: f64,
    /// Semi-major axis from the Brouwer mean motion, in Earth radii.
    pub semi_major_axis_er: f64,
    pub revolution_number: u64,
    pub epoch: DateTime<Utc>,
}

/// Position/velocity source the pass scanner and the parameter deriver run on.
///
/// `state` returns `None` when the model cannot produce a position for an
/// instant. Callers treat that as missing data, never as a failure.
pub trait Propagator {
    type Model;

    fn parse(&self, elements: &OrbitalElements) -> Result<Self::Model, PredictError>;

    fn mean_elements(&self, model: &Self::Model) -> MeanElements;

    fn state(&self, model: &Self::Model, instant: DateTime<Utc>) -> Option<StateVector>;

    fn geodetic(&self, model: &Self::Model, instant: DateTime<Utc>) -> Option<Geodetic> {
        let state = self.state(model, instant)?;
        Some(teme_to_geodetic(state.position_km, sidereal_time(instant)))
    }

    fn sample(
        &self,
        model: &Self::Model,
        observer: &GroundObserver,
        instant: DateTime<Utc>,
    ) -> Option<PropagationSample> {
        let state = self.state(model, instant)?;
        let sat_ecef = teme_to_ecef(state.position_km, sidereal_time(instant));
        let look = ecef_to_look_angles(observer, sat_ecef);
        let geodetic = ecef_to_geodetic(sat_ecef);

        Some(PropagationSample {
            instant,
            elevation_deg: look.elevation_rad.to_degrees(),
            latitude_deg: geodetic.latitude_rad.to_degrees(),
            longitude_deg: geodetic.longitude_rad.to_degrees(),
            altitude_km: geodetic.altitude_km,
        })
    }
}

pub struct Sgp4Model {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

/// SGP4/SDP4 through the `sgp4` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    type Model = Sgp4Model;

    fn parse(&self, elements: &OrbitalElements) -> Result<Sgp4Model, PredictError> {
        let constants = sgp4::Constants::from_elements(&elements.elements)
            .map_err(|e| PredictError::invalid_elements(&elements.name, e))?;
        Ok(Sgp4Model {
            elements: elements.elements.clone(),
            constants,
        })
    }

    fn mean_elements(&self, model: &Sgp4Model) -> MeanElements {
        let el = &model.elements;
        let inclination_rad = el.inclination.to_radians();
        let mean_motion_rad_per_min = el.mean_motion * 2.0 * PI / MINUTES_PER_DAY;
        MeanElements {
            inclination_rad,
            raan_rad: el.right_ascension.to_radians(),
            eccentricity: el.eccentricity,
            arg_of_perigee_rad: el.argument_of_perigee.to_radians(),
            mean_anomaly_rad: el.mean_anomaly.to_radians(),
            mean_motion_rad_per_min,
            semi_major_axis_er: brouwer_semi_major_axis(
                mean_motion_rad_per_min,
                inclination_rad,
                el.eccentricity,
            ),
            revolution_number: el.revolution_number,
            epoch: el.datetime.and_utc(),
        }
    }

    fn state(&self, model: &Sgp4Model, instant: DateTime<Utc>) -> Option<StateVector> {
        let minutes = match model
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
        {
            Ok(m) => m,
            Err(e) => {
                debug!("{}: no epoch offset for {}: {}", model.elements.norad_id, instant, e);
                return None;
            }
        };

        let prediction = match model.constants.propagate(minutes) {
            Ok(p) => p,
            Err(e) => {
                debug!("{}: propagation unavailable at {}: {}", model.elements.norad_id, instant, e);
                return None;
            }
        };

        let finite = prediction
            .position
            .iter()
            .chain(prediction.velocity.iter())
            .all(|v| v.is_finite());
        if !finite {
            debug!("{}: non-finite state at {}", model.elements.norad_id, instant);
            return None;
        }

        Some(StateVector {
            instant,
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

/// Recover the Brouwer (un-Kozai) mean motion the way SGP4 initialises and
/// return the matching semi-major axis in Earth radii.
fn brouwer_semi_major_axis(kozai_rad_per_min: f64, inclination_rad: f64, eccentricity: f64) -> f64 {
    let ke = 60.0 / (WGS72_EARTH_RADIUS_KM.powi(3) / WGS72_MU_KM3_S2).sqrt();
    let cos_i = inclination_rad.cos();
    let beta2 = 1.0 - eccentricity * eccentricity;

    let a1 = (ke / kozai_rad_per_min).powf(2.0 / 3.0);
    let d1 = 0.75 * WGS72_J2 * (3.0 * cos_i * cos_i - 1.0) / (beta2.sqrt() * beta2);
    let del1 = d1 / (a1 * a1);
    let a0 = a1 * (1.0 - del1 * del1 - del1 * (1.0 / 3.0 + 134.0 * del1 * del1 / 81.0));
    let del0 = d1 / (a0 * a0);
    let brouwer = kozai_rad_per_min / (1.0 + del0);

    (ke / brouwer).powf(2.0 / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::testing::{iss, ISS_LINE1};
    use approx::assert_relative_eq;
    use chrono::Duration;

    #[test]
    fn mean_elements_in_radians() {
        let sat = iss();
        let model = Sgp4Propagator.parse(&sat).unwrap();
        let mean = Sgp4Propagator.mean_elements(&model);
        assert_relative_eq!(mean.inclination_rad.to_degrees(), 51.6461, epsilon = 1e-9);
        assert_relative_eq!(mean.raan_rad.to_degrees(), 221.2784, epsilon = 1e-9);
        assert_relative_eq!(mean.eccentricity, 0.0001413, epsilon = 1e-12);
        assert_relative_eq!(mean.mean_motion_rad_per_min, 0.067_610_036, epsilon = 1e-8);
        assert_relative_eq!(mean.semi_major_axis_er, 1.065_641_65, epsilon = 1e-6);
        assert_eq!(mean.revolution_number, 23600);
        assert_eq!(mean.epoch, sat.epoch());
        assert!(ISS_LINE1.contains("20194.88612269"));
    }

    #[test]
    fn state_at_epoch_is_leo() {
        let sat = iss();
        let model = Sgp4Propagator.parse(&sat).unwrap();
        let state = Sgp4Propagator.state(&model, sat.epoch()).unwrap();
        let r = state.position_km.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((6700.0..6900.0).contains(&r), "radius {}", r);
    }

    #[test]
    fn sample_reports_geodetic_altitude() {
        let sat = iss();
        let observer = GroundObserver::new(0.0, 0.0, 0.0).unwrap();
        let model = Sgp4Propagator.parse(&sat).unwrap();
        let instant = sat.epoch() + Duration::minutes(30);
        let sample = Sgp4Propagator.sample(&model, &observer, instant).unwrap();
        assert_eq!(sample.instant, instant);
        assert!((380.0..460.0).contains(&sample.altitude_km), "{}", sample.altitude_km);
        assert!(sample.latitude_deg.abs() <= 52.0);
        assert!((-180.0..=180.0).contains(&sample.longitude_deg));
        assert!((-90.0..=90.0).contains(&sample.elevation_deg));
    }
}
