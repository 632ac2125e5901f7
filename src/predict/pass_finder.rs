use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::abort::AbortSignal;
use crate::predict::error::PredictError;
use crate::predict::propagation::{Propagator, Sgp4Propagator};
use crate::predict::types::{OrbitalElements, PropagationSample, SatellitePass, TimeWindow};
use crate::predict::GroundObserver;

pub const DEFAULT_STEP_SECONDS: i64 = 30;
pub const DEFAULT_MIN_PASS_SECONDS: i64 = 60;
const HORIZON_ELEVATION: f64 = 0.0;

/// Sweeps a time window at a fixed step and turns the elevation signal into
/// discrete passes.
#[derive(Debug, Clone)]
pub struct PassScanner<P> {
    propagator: P,
    step: Duration,
    min_duration: Duration,
}

#[derive(Debug, Clone, Copy)]
struct OpenPass {
    aos: DateTime<Utc>,
    aos_lat: f64,
    aos_lng: f64,
    max_elevation_deg: f64,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    /// No sample seen yet.
    Unobserved,
    BelowHorizon,
    InPass(OpenPass),
    /// Already above the horizon when the window opened; the rise was not observed.
    Truncated,
}

impl Default for PassScanner<Sgp4Propagator> {
    fn default() -> Self {
        Self::new(Sgp4Propagator)
    }
}

impl<P: Propagator> PassScanner<P> {
    pub fn new(propagator: P) -> Self {
        Self {
            propagator,
            step: Duration::seconds(DEFAULT_STEP_SECONDS),
            min_duration: Duration::seconds(DEFAULT_MIN_PASS_SECONDS),
        }
    }

    pub fn with_step(mut self, step: Duration) -> Result<Self, PredictError> {
        if step <= Duration::zero() {
            return Err(PredictError::InvalidStep(format!(
                "{} ms is not positive",
                step.num_milliseconds()
            )));
        }
        self.step = step;
        Ok(self)
    }

    /// Passes must last strictly longer than this to be reported.
    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Find all passes of one satellite whose rise and set both fall inside
    /// `window`, ordered by AOS.
    pub fn scan(
        &self,
        elements: &OrbitalElements,
        observer: &GroundObserver,
        window: &TimeWindow,
    ) -> Result<Vec<SatellitePass>, PredictError> {
        self.scan_with_abort(elements, observer, window, &AbortSignal::new())
    }

    /// Same as [`PassScanner::scan`], checking `abort` before every sample.
    pub fn scan_with_abort(
        &self,
        elements: &OrbitalElements,
        observer: &GroundObserver,
        window: &TimeWindow,
        abort: &AbortSignal,
    ) -> Result<Vec<SatellitePass>, PredictError> {
        let model = self.propagator.parse(elements)?;

        let mut passes = Vec::new();
        let mut state = ScanState::Unobserved;
        let mut unavailable = 0usize;
        let mut next = Some(window.start());

        // A step past the representable date range ends the sweep.
        while let Some(cursor) = next.filter(|t| *t < window.end()) {
            next = cursor.checked_add_signed(self.step);
            if abort.is_aborted() {
                return Err(PredictError::Cancelled);
            }

            let Some(sample) = self.propagator.sample(&model, observer, cursor) else {
                unavailable += 1;
                continue;
            };
            let visible = sample.elevation_deg > HORIZON_ELEVATION;

            state = match (state, visible) {
                (ScanState::Unobserved, true) => ScanState::Truncated,
                (ScanState::Unobserved | ScanState::BelowHorizon, false) => ScanState::BelowHorizon,
                (ScanState::BelowHorizon, true) => ScanState::InPass(OpenPass {
                    aos: sample.instant,
                    aos_lat: sample.latitude_deg,
                    aos_lng: sample.longitude_deg,
                    max_elevation_deg: sample.elevation_deg,
                }),
                (ScanState::InPass(mut open), true) => {
                    open.max_elevation_deg = open.max_elevation_deg.max(sample.elevation_deg);
                    ScanState::InPass(open)
                }
                (ScanState::InPass(open), false) => {
                    if let Some(pass) = self.close_pass(elements, open, &sample) {
                        passes.push(pass);
                    }
                    ScanState::BelowHorizon
                }
                (ScanState::Truncated, true) => ScanState::Truncated,
                (ScanState::Truncated, false) => {
                    debug!(
                        "{}: dropping pass in progress at window start {}",
                        elements.name,
                        window.start()
                    );
                    ScanState::BelowHorizon
                }
            };
        }

        if let ScanState::InPass(open) = state {
            debug!(
                "{}: dropping pass still open at window end (AOS {})",
                elements.name, open.aos
            );
        }
        if unavailable > 0 {
            debug!(
                "{}: {} samples unavailable between {} and {}",
                elements.name,
                unavailable,
                window.start(),
                window.end()
            );
        }

        Ok(passes)
    }

    fn close_pass(
        &self,
        elements: &OrbitalElements,
        open: OpenPass,
        los: &PropagationSample,
    ) -> Option<SatellitePass> {
        let duration_seconds = seconds(los.instant - open.aos);
        if duration_seconds <= seconds(self.min_duration) {
            debug!(
                "{}: discarding {:.1} s pass at {}",
                elements.name, duration_seconds, open.aos
            );
            return None;
        }

        Some(SatellitePass {
            satellite: elements.name.clone(),
            norad_id: elements.norad_id,
            aos: open.aos,
            los: los.instant,
            duration_seconds,
            max_elevation_deg: open.max_elevation_deg,
            aos_lat: open.aos_lat,
            aos_lng: open.aos_lng,
            los_lat: los.latitude_deg,
            los_lng: los.longitude_deg,
        })
    }
}

fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// Find all passes for a satellite within a time range, using SGP4 and the
/// default step and minimum duration.
pub fn predict_passes(
    elements: &OrbitalElements,
    observer: &GroundObserver,
    window: &TimeWindow,
) -> Result<Vec<SatellitePass>, PredictError> {
    PassScanner::<Sgp4Propagator>::default().scan(elements, observer, window)
}
