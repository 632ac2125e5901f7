mod batch;
mod error;
mod format;
mod frames;
mod ground_station;
mod parameters;
mod pass_finder;
mod propagation;
mod tle_loader;
mod types;

#[cfg(test)]
mod testing;

pub use batch::{derive_catalog, merge_passes, scan_catalog};
pub use error::PredictError;
pub use format::{format_coordinate, format_duration, format_instant, Axis};
pub use frames::{Geodetic, LookAngles};
pub use ground_station::GroundObserver;
pub use parameters::{derive_parameters, ParameterDeriver};
pub use pass_finder::{predict_passes, PassScanner, DEFAULT_MIN_PASS_SECONDS, DEFAULT_STEP_SECONDS};
pub use propagation::{MeanElements, Propagator, Sgp4Model, Sgp4Propagator, StateVector};
pub use tle_loader::{parse_catalog, split_groups, Catalog, TleGroup, TleLoader};
pub use types::{
    OrbitalElements, OrbitalParameters, PropagationSample, SatellitePass, TimeWindow,
};
