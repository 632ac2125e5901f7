use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::predict::error::PredictError;

const TLE_LINE_LEN: usize = 69;

/// A parsed two-line element set, identified by its NORAD id and display name.
#[derive(Debug, Clone)]
pub struct OrbitalElements {
    pub name: String,
    pub norad_id: u64,
    pub line1: String,
    pub line2: String,
    pub elements: sgp4::Elements,
}

impl OrbitalElements {
    /// Parse a TLE. Both element lines are checked for their prefix, length and
    /// modulo-10 checksum before the fields are decoded.
    pub fn from_tle(name: Option<String>, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let line1 = line1.trim_end();
        let line2 = line2.trim_end();
        let label = name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", catalog_number(line1)));

        validate_line(line1, '1').map_err(|m| PredictError::invalid_elements(&label, m))?;
        validate_line(line2, '2').map_err(|m| PredictError::invalid_elements(&label, m))?;

        let elements = sgp4::Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PredictError::invalid_elements(&label, e))?;

        Ok(Self {
            name: name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id)),
            norad_id: elements.norad_id,
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
        })
    }

    /// Epoch of the element set as an absolute UTC instant.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }
}

fn catalog_number(line1: &str) -> &str {
    line1.get(2..7).map(str::trim).unwrap_or("?")
}

fn validate_line(line: &str, number: char) -> Result<(), String> {
    if !line.starts_with(number) || line.chars().nth(1) != Some(' ') {
        return Err(format!("line {} must start with \"{} \"", number, number));
    }
    if !line.is_ascii() {
        return Err(format!("line {} contains non-ASCII characters", number));
    }
    if line.len() != TLE_LINE_LEN {
        return Err(format!(
            "line {} has {} characters, expected {}",
            number,
            line.len(),
            TLE_LINE_LEN
        ));
    }
    let expected = line
        .as_bytes()
        .last()
        .filter(|b| b.is_ascii_digit())
        .map(|b| u32::from(b - b'0'))
        .ok_or_else(|| format!("line {} has no checksum digit", number))?;
    let computed = checksum(&line[..TLE_LINE_LEN - 1]);
    if computed != expected {
        return Err(format!(
            "line {} checksum mismatch: expected {}, computed {}",
            number, expected, computed
        ));
    }
    Ok(())
}

/// Modulo-10 sum of the digits on a TLE line, with '-' counting as 1.
pub fn checksum(body: &str) -> u32 {
    body.bytes()
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Closed-open scan interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PredictError> {
        if start >= end {
            return Err(PredictError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Result<Self, PredictError> {
        let end = start
            .checked_add_signed(length)
            .ok_or(PredictError::WindowOutOfRange { start, length })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// What the propagator facade reports for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationSample {
    pub instant: DateTime<Utc>,
    pub elevation_deg: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// A predicted satellite pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatellitePass {
    pub satellite: String,
    pub norad_id: u64,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub duration_seconds: f64,
    pub max_elevation_deg: f64,
    pub aos_lat: f64,
    pub aos_lng: f64,
    pub los_lat: f64,
    pub los_lng: f64,
}

/// Descriptive orbit parameters derived from an element set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalParameters {
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
    pub period_minutes: f64,
    pub apogee_alt_km: f64,
    pub perigee_alt_km: f64,
    pub rev_number_at_epoch: u64,
    pub epoch: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_alt_km: Option<f64>,
}
