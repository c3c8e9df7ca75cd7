//! Simplified sun position and panel incidence.
//!
//! Declination follows Cooper's equation, the hour angle uses the whole
//! local clock hour, and longitude does not enter the formula.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};

use crate::models::prediction::SolarGeometry;

const DEG: f64 = std::f64::consts::PI / 180.0;

/// Location-local wall clock time for a UTC instant and a UTC offset.
pub fn local_time(utc_now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    utc_now.naive_utc() + Duration::seconds(i64::from(utc_offset_seconds))
}

/// Solar declination in degrees for a 1-based day of year.
pub fn declination_deg(day_of_year: u32) -> f64 {
    23.45 * (360.0 * (284.0 + f64::from(day_of_year)) / 365.0 * DEG).sin()
}

/// Hour angle in degrees; negative before noon.
pub fn hour_angle_deg(hour: u32) -> f64 {
    15.0 * (f64::from(hour) - 12.0)
}

fn acos_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos() / DEG
}

pub fn zenith_deg(latitude_deg: f64, declination_deg: f64, hour_angle_deg: f64) -> f64 {
    let (lat, decl, h) = (latitude_deg * DEG, declination_deg * DEG, hour_angle_deg * DEG);
    acos_deg(lat.sin() * decl.sin() + lat.cos() * decl.cos() * h.cos())
}

/// Angle between the sun and the panel normal; azimuth 180 faces south.
pub fn incidence_deg(zenith_deg: f64, tilt_deg: f64, azimuth_deg: f64) -> f64 {
    let (z, beta, gamma) = (zenith_deg * DEG, tilt_deg * DEG, (azimuth_deg - 180.0) * DEG);
    acos_deg(z.cos() * beta.cos() + z.sin() * beta.sin() * gamma.cos())
}

pub fn calculate(latitude_deg: f64, tilt_deg: f64, azimuth_deg: f64, local: NaiveDateTime) -> SolarGeometry {
    let decl = declination_deg(local.ordinal());
    let h = hour_angle_deg(local.hour());
    let zenith = zenith_deg(latitude_deg, decl, h);
    SolarGeometry { zenith, angle_of_incidence: incidence_deg(zenith, tilt_deg, azimuth_deg) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 30, 0).unwrap()
    }

    #[test]
    fn declination_extremes() {
        // Day 172 ≈ June solstice, day 355 ≈ December solstice, day 81 ≈ equinox.
        assert!((declination_deg(172) - 23.45).abs() < 0.1);
        assert!((declination_deg(355) + 23.45).abs() < 0.1);
        assert!(declination_deg(81).abs() < 0.5);
    }

    #[test]
    fn equator_equinox_noon_is_overhead() {
        let g = calculate(0.0, 0.0, 180.0, at(2025, 3, 22, 12));
        assert!(g.zenith < 1.0, "zenith {:.2}", g.zenith);
    }

    #[test]
    fn flat_panel_incidence_equals_zenith() {
        let g = calculate(45.0, 0.0, 90.0, at(2025, 6, 21, 10));
        assert!((g.zenith - g.angle_of_incidence).abs() < 1e-9);
    }

    #[test]
    fn south_tilt_at_latitude_faces_equinox_sun() {
        // Tilt equal to latitude, facing south, equinox noon: sun hits the normal.
        let g = calculate(40.0, 40.0, 180.0, at(2025, 3, 22, 12));
        assert!(g.angle_of_incidence < 1.5, "incidence {:.2}", g.angle_of_incidence);
    }

    #[test]
    fn midnight_sun_is_below_horizon() {
        let g = calculate(45.0, 30.0, 180.0, at(2025, 6, 21, 0));
        assert!(g.zenith > 90.0);
        assert!(!g.zenith.is_nan() && !g.angle_of_incidence.is_nan());
    }

    #[test]
    fn polar_extremes_never_produce_nan() {
        for lat in [-90.0, 90.0] {
            for hour in 0..24 {
                let g = calculate(lat, 60.0, 240.0, at(2025, 12, 21, hour));
                assert!(g.zenith.is_finite() && g.angle_of_incidence.is_finite());
            }
        }
    }

    #[test]
    fn local_time_applies_offset() {
        let utc = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let local = local_time(utc, 3600);
        assert_eq!(local.ordinal(), 1);
        assert_eq!(local.hour(), 0);
    }
}
