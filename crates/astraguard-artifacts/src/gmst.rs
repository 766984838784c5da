//! Visualization-grade ECI(TEME)->ECEF rotation via Greenwich mean sidereal time.
//!
//! GMST only: no polar motion or nutation. Not navigation-grade.

use chrono::{DateTime, Datelike, Timelike, Utc};

fn datetime_to_julian_days(dt: DateTime<Utc>) -> f64 {
    let (mut year, mut month) = (dt.year(), dt.month() as i32);
    let day = dt.day() as f64;
    let hour = dt.hour() as f64;
    let minute = dt.minute() as f64;
    let second = dt.second() as f64 + dt.timestamp_subsec_millis() as f64 / 1000.0;

    if month <= 2 {
        year -= 1;
        month += 12;
    }
    let a = (year as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let frac_day = (hour + minute / 60.0 + second / 3600.0) / 24.0;

    (365.25 * (year as f64 + 4716.0)).floor() + (30.6001 * (month as f64 + 1.0)).floor() + day + b - 1524.5
        + frac_day
}

/// Greenwich mean sidereal time in radians at `dt`.
pub fn gmst_radians(dt: DateTime<Utc>) -> f64 {
    let jd = datetime_to_julian_days(dt);
    let t = (jd - 2451545.0) / 36525.0;
    let gmst_deg = 280.46061837 + 360.98564736629 * (jd - 2451545.0) + 0.000387933 * t * t
        - (t * t * t) / 38710000.0;
    (gmst_deg.rem_euclid(360.0)).to_radians()
}

/// Rotates an ECI (TEME-like) position about the z-axis by GMST to
/// approximate ECEF. Input and output share units.
pub fn rotate_eci_to_ecef(position: [f64; 3], theta_rad: f64) -> [f64; 3] {
    let (s, c) = theta_rad.sin_cos();
    [
        c * position[0] + s * position[1],
        -s * position[0] + c * position[1],
        position[2],
    ]
}
