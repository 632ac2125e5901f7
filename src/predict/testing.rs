//! Fixtures shared by the predict tests.

use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::propagation::{MeanElements, Propagator, StateVector};
use crate::predict::types::{OrbitalElements, PropagationSample};
use crate::predict::GroundObserver;

pub const ISS_NAME: &str = "ISS (ZARYA)";
pub const ISS_LINE1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_LINE2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

pub const POLAR_NAME: &str = "POLAR LEO";
pub const POLAR_LINE1: &str = "1 28654U 05018A   20194.50000000  .00000050  00000-0  50000-4 0  9994";
pub const POLAR_LINE2: &str = "2 28654  99.0500 200.0000 0014000 100.0000 260.0000 14.12500000 78543";

pub fn iss() -> OrbitalElements {
    OrbitalElements::from_tle(Some(ISS_NAME.into()), ISS_LINE1, ISS_LINE2).unwrap()
}

pub fn polar() -> OrbitalElements {
    OrbitalElements::from_tle(Some(POLAR_NAME.into()), POLAR_LINE1, POLAR_LINE2).unwrap()
}

/// Elevation profile replayed sample by sample. Entry `i` answers for
/// `start + i * step`; `None` entries and instants past the end are
/// unavailable. The sub-satellite point of sample `i` is `(i, -i)`.
/// Ids in `rejected_ids` fail to parse, ids in `panic_ids` panic in `parse`.
#[derive(Debug, Clone)]
pub struct CannedElevations {
    pub start: DateTime<Utc>,
    pub step: Duration,
    pub elevations: Vec<Option<f64>>,
    pub mean: Option<MeanElements>,
    pub rejected_ids: Vec<u64>,
    pub panic_ids: Vec<u64>,
}

impl CannedElevations {
    pub fn new(start: DateTime<Utc>, step: Duration, elevations: Vec<Option<f64>>) -> Self {
        Self {
            start,
            step,
            elevations,
            mean: None,
            rejected_ids: Vec::new(),
            panic_ids: Vec::new(),
        }
    }

    pub fn index_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        let offset = (instant - self.start).num_milliseconds();
        let step = self.step.num_milliseconds();
        if offset < 0 || offset % step != 0 {
            return None;
        }
        usize::try_from(offset / step).ok()
    }
}

impl Propagator for CannedElevations {
    type Model = ();

    fn parse(&self, elements: &OrbitalElements) -> Result<(), PredictError> {
        if self.panic_ids.contains(&elements.norad_id) {
            panic!("canned propagator refuses {}", elements.name);
        }
        if self.rejected_ids.contains(&elements.norad_id) {
            return Err(PredictError::invalid_elements(&elements.name, "rejected"));
        }
        Ok(())
    }

    fn mean_elements(&self, _model: &()) -> MeanElements {
        self.mean.unwrap_or(MeanElements {
            inclination_rad: 0.0,
            raan_rad: 0.0,
            eccentricity: 0.0,
            arg_of_perigee_rad: 0.0,
            mean_anomaly_rad: 0.0,
            mean_motion_rad_per_min: 0.06,
            semi_major_axis_er: 1.1,
            revolution_number: 0,
            epoch: self.start,
        })
    }

    fn state(&self, _model: &(), _instant: DateTime<Utc>) -> Option<StateVector> {
        None
    }

    fn sample(
        &self,
        _model: &(),
        _observer: &GroundObserver,
        instant: DateTime<Utc>,
    ) -> Option<PropagationSample> {
        let index = self.index_of(instant)?;
        let elevation_deg = (*self.elevations.get(index)?)?;
        Some(PropagationSample {
            instant,
            elevation_deg,
            latitude_deg: index as f64,
            longitude_deg: -(index as f64),
            altitude_km: 500.0,
        })
    }
}
