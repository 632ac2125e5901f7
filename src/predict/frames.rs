use chrono::{DateTime, Utc};
use std::f64::consts::PI;

use crate::predict::GroundObserver;

// WGS-84 ellipsoid
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.006_694_379_990_14;

const GEODETIC_ITERATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_rad: f64,
    pub elevation_rad: f64,
    pub range_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub altitude_km: f64,
}

/// Greenwich sidereal angle in radians.
pub fn sidereal_time(instant: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
}

pub fn teme_to_ecef(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn ecef_to_look_angles(observer: &GroundObserver, sat_ecef: [f64; 3]) -> LookAngles {
    let sta_ecef = observer.position_ecef_km();
    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth_rad = east.atan2(north).rem_euclid(2.0 * PI);
    let elevation_rad = if range_km > 0.0 {
        (up / range_km).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };

    LookAngles {
        azimuth_rad,
        elevation_rad,
        range_km,
    }
}

/// Iterative WGS-84 geodetic latitude; longitude in [-pi, pi].
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> Geodetic {
    let [x, y, z] = ecef;
    let r = (x * x + y * y).sqrt();
    let longitude_rad = y.atan2(x);

    let mut latitude_rad = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude_rad.sin();
        c = 1.0 / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        latitude_rad = (z + WGS84_A_KM * c * WGS84_E2 * sin_lat).atan2(r);
    }

    let altitude_km = if latitude_rad.cos().abs() > 1e-9 {
        r / latitude_rad.cos() - WGS84_A_KM * c
    } else {
        // over a pole
        z.abs() - WGS84_A_KM * (1.0 - WGS84_E2).sqrt()
    };

    Geodetic {
        latitude_rad,
        longitude_rad,
        altitude_km,
    }
}

pub fn teme_to_geodetic(pos_teme: [f64; 3], gmst: f64) -> Geodetic {
    ecef_to_geodetic(teme_to_ecef(pos_teme, gmst))
}
