use std::f64::consts::PI;

use crate::predict::error::PredictError;
use crate::predict::frames::WGS84_A_KM;
use crate::predict::propagation::{Propagator, Sgp4Propagator};
use crate::predict::types::{OrbitalElements, OrbitalParameters};

const MINUTES_PER_DAY: f64 = 1440.0;

/// Derives human-readable orbit parameters from an element set.
#[derive(Debug, Clone, Default)]
pub struct ParameterDeriver<P> {
    propagator: P,
}

impl<P: Propagator> ParameterDeriver<P> {
    pub fn new(propagator: P) -> Self {
        Self { propagator }
    }

    pub fn derive(&self, elements: &OrbitalElements) -> Result<OrbitalParameters, PredictError> {
        let model = self.propagator.parse(elements)?;
        let mean = self.propagator.mean_elements(&model);

        let n = mean.mean_motion_rad_per_min;
        let semi_major_axis_km = mean.semi_major_axis_er * WGS84_A_KM;

        // Missing position at epoch only leaves the epoch fields empty.
        let at_epoch = self.propagator.geodetic(&model, mean.epoch);

        Ok(OrbitalParameters {
            inclination_deg: mean.inclination_rad.to_degrees(),
            raan_deg: mean.raan_rad.to_degrees(),
            eccentricity: mean.eccentricity,
            arg_of_perigee_deg: mean.arg_of_perigee_rad.to_degrees(),
            mean_anomaly_deg: mean.mean_anomaly_rad.to_degrees(),
            mean_motion_rev_per_day: n * MINUTES_PER_DAY / (2.0 * PI),
            period_minutes: 2.0 * PI / n,
            apogee_alt_km: semi_major_axis_km * (1.0 + mean.eccentricity) - WGS84_A_KM,
            perigee_alt_km: semi_major_axis_km * (1.0 - mean.eccentricity) - WGS84_A_KM,
            rev_number_at_epoch: mean.revolution_number,
            epoch: mean.epoch,
            epoch_lat: at_epoch.map(|g| g.latitude_rad.to_degrees()),
            epoch_lng: at_epoch.map(|g| g.longitude_rad.to_degrees()),
            epoch_alt_km: at_epoch.map(|g| g.altitude_km),
        })
    }
}

/// Orbit parameters through SGP4.
pub fn derive_parameters(elements: &OrbitalElements) -> Result<OrbitalParameters, PredictError> {
    ParameterDeriver::new(Sgp4Propagator).derive(elements)
}
