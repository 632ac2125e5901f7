use std::sync::Arc;

use log::warn;

use crate::abort::AbortSignal;
use crate::predict::error::PredictError;
use crate::predict::parameters::ParameterDeriver;
use crate::predict::pass_finder::PassScanner;
use crate::predict::propagation::Propagator;
use crate::predict::types::{OrbitalElements, OrbitalParameters, SatellitePass, TimeWindow};
use crate::predict::GroundObserver;

/// Scan every satellite on the blocking pool and merge the results by AOS.
///
/// Satellites whose elements are rejected, or whose scan panics, are logged
/// and left out. An abort
/// cancels the whole batch.
pub async fn scan_catalog<P>(
    scanner: Arc<PassScanner<P>>,
    satellites: Vec<OrbitalElements>,
    observer: GroundObserver,
    window: TimeWindow,
    abort: AbortSignal,
) -> Result<Vec<SatellitePass>, PredictError>
where
    P: Propagator + Send + Sync + 'static,
{
    let handles: Vec<_> = satellites
        .into_iter()
        .map(|sat| {
            let scanner = scanner.clone();
            let abort = abort.clone();
            let name = sat.name.clone();
            let handle = tokio::task::spawn_blocking(move || {
                scanner.scan_with_abort(&sat, &observer, &window, &abort)
            });
            (name, handle)
        })
        .collect();

    let mut per_satellite = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Pass scan for {} did not finish: {}", name, e);
                continue;
            }
        };
        match result {
            Ok(passes) => per_satellite.push(passes),
            Err(PredictError::Cancelled) => return Err(PredictError::Cancelled),
            Err(e) => warn!("Failed to predict passes for {}: {}", name, e),
        }
    }

    Ok(merge_passes(per_satellite))
}

/// Flatten per-satellite results and order by AOS. The sort is stable, so
/// equal AOS instants keep the input order.
pub fn merge_passes(per_satellite: Vec<Vec<SatellitePass>>) -> Vec<SatellitePass> {
    let mut all: Vec<_> = per_satellite.into_iter().flatten().collect();
    all.sort_by_key(|p| p.aos);
    all
}

/// Derive parameters for each satellite. Failures are logged and yield `None`
/// so the satellite can still be listed.
pub fn derive_catalog<'a, P: Propagator>(
    deriver: &ParameterDeriver<P>,
    satellites: &[&'a OrbitalElements],
) -> Vec<(&'a OrbitalElements, Option<OrbitalParameters>)> {
    satellites
        .iter()
        .map(|&sat| {
            let params = match deriver.derive(sat) {
                Ok(params) => Some(params),
                Err(e) => {
                    warn!("Could not interpret TLE for {} ({}): {}", sat.name, sat.norad_id, e);
                    None
                }
            };
            (sat, params)
        })
        .collect()
}
