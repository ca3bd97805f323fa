//! Sun-path geometry per BS EN ISO 52010-1.
//!
//! All angles are carried in degrees at the API (matching the standard's
//! published formulas) and converted to radians only inside the trig
//! expressions. Per-day quantities take a 0-based day of year; per-hour
//! quantities take the solar time derived from an hour-of-year.

use ds_core::Real;

/// Angular deviation of the earth's orbit for a 0-based day of year, degrees.
pub fn earth_orbit_deviation(day_of_year: usize) -> Real {
    360.0 / 365.0 * (day_of_year + 1) as Real
}

/// Solar declination, degrees.
pub fn solar_declination(earth_orbit_deviation_deg: Real) -> Real {
    let rd = earth_orbit_deviation_deg.to_radians();
    0.33281 - 22.984 * rd.cos() - 0.3499 * (2.0 * rd).cos() - 0.1398 * (3.0 * rd).cos()
        + 3.7872 * rd.sin()
        + 0.03205 * (2.0 * rd).sin()
        + 0.07187 * (3.0 * rd).sin()
}

/// Equation of time in minutes for a 0-based day of year.
pub fn equation_of_time(day_of_year: usize) -> Real {
    let nday = (day_of_year + 1) as i32;
    match nday {
        n if n < 21 => 2.6 + 0.44 * n as Real,
        n if n < 136 => 5.2 + 9.0 * ((n - 43) as Real * 0.0357).cos(),
        n if n < 241 => 1.4 - 5.0 * ((n - 135) as Real * 0.0449).cos(),
        n if n < 336 => -6.3 - 10.0 * ((n - 306) as Real * 0.036).cos(),
        _ => 0.45 * (nday - 359) as Real,
    }
}

/// Shift between local clock time and solar time from site longitude, hours.
/// Daylight saving is disregarded.
pub fn time_shift(timezone: Real, longitude: Real) -> Real {
    timezone - longitude / 15.0
}

/// Solar time for a 0-based hour of day.
pub fn solar_time(hour_of_day: usize, equation_of_time_min: Real, time_shift_h: Real) -> Real {
    // hour sections in the standard are 1-based (hour 1 covers 0h-1h)
    (hour_of_day + 1) as Real - equation_of_time_min / 60.0 - time_shift_h
}

/// Solar hour angle in the middle of the hour section, degrees, wrapped to
/// [-180, 180].
pub fn solar_hour_angle(solar_time_h: Real) -> Real {
    let mut angle = 15.0 * (12.5 - solar_time_h);
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Solar altitude above the horizon, degrees, clamped to zero below the
/// horizon.
pub fn solar_altitude(latitude: Real, declination: Real, hour_angle: Real) -> Real {
    let lat = latitude.to_radians();
    let dec = declination.to_radians();
    let ha = hour_angle.to_radians();

    let asol = (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos())
        .asin()
        .to_degrees();
    if asol < 0.0001 { 0.0 } else { asol }
}

pub fn solar_zenith_angle(altitude: Real) -> Real {
    90.0 - altitude
}

/// Solar azimuth, degrees from south, eastwards positive, range [-180, 180].
pub fn solar_azimuth_angle(
    latitude: Real,
    declination: Real,
    hour_angle: Real,
    altitude: Real,
) -> Real {
    let lat = latitude.to_radians();
    let dec = declination.to_radians();
    let ha = (180.0 - hour_angle).to_radians();
    let alt = altitude.to_radians();

    let sin_aux1_num = dec.cos() * ha.sin();
    let cos_aux1_num = lat.cos() * dec.sin() + lat.sin() * dec.cos() * ha.cos();
    let denominator = alt.sin().asin().cos();

    let sin_aux1 = sin_aux1_num / denominator;
    let cos_aux1 = cos_aux1_num / denominator;
    let aux2 = (sin_aux1_num.asin() / denominator).to_degrees();

    // BS EN ISO 52010-1:2017 formula 16
    if sin_aux1 >= 0.0 && cos_aux1 > 0.0 {
        if aux2 > 180.0 { aux2 - 180.0 } else { 180.0 - aux2 }
    } else if cos_aux1 < 0.0 {
        aux2
    } else {
        -(180.0 + aux2)
    }
}

/// Relative optical air mass, with the Kasten correction near the horizon.
pub fn air_mass(altitude: Real) -> Real {
    if altitude >= 10.0 {
        1.0 / altitude.to_radians().sin()
    } else {
        1.0 / (altitude.to_radians().sin() + 0.15 * (altitude + 3.885).powf(-1.253))
    }
}

/// Extra-terrestrial irradiance for the day, W/m^2.
pub fn extra_terrestrial_radiation(earth_orbit_deviation_deg: Real) -> Real {
    1367.0 * (1.0 + 0.033 * earth_orbit_deviation_deg.to_radians().cos())
}

/// Angle of incidence of the solar beam on an inclined surface, degrees.
///
/// `tilt` is measured from horizontal (0-180, upwards facing); `orientation`
/// is the azimuth of the surface normal's horizontal projection, -180 to 180.
pub fn solar_angle_of_incidence(
    tilt: Real,
    orientation: Real,
    latitude: Real,
    declination: Real,
    hour_angle: Real,
) -> Real {
    let tilt = tilt.to_radians();
    let ori = orientation.to_radians();
    let lat = latitude.to_radians();
    let dec = declination.to_radians();
    let ha = hour_angle.to_radians();

    (dec.sin() * lat.sin() * tilt.cos() - dec.sin() * lat.cos() * tilt.sin() * ori.cos()
        + dec.cos() * lat.cos() * tilt.cos() * ha.cos()
        + dec.cos() * lat.sin() * tilt.sin() * ori.cos() * ha.cos()
        + dec.cos() * tilt.sin() * ori.sin() * ha.sin())
    .acos()
    .to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declination_stays_in_tropic_band() {
        for day in 0..365 {
            let dec = solar_declination(earth_orbit_deviation(day));
            assert!((-24.0..=24.0).contains(&dec), "day {day}: {dec}");
        }
    }

    #[test]
    fn equation_of_time_is_continuous_in_minutes() {
        for day in 0..365 {
            let eot = equation_of_time(day);
            assert!((-20.0..=20.0).contains(&eot), "day {day}: {eot}");
        }
    }

    #[test]
    fn hour_angle_wraps() {
        assert!((solar_hour_angle(12.5)).abs() < 1e-12);
        let w = solar_hour_angle(0.5);
        assert!((-180.0..=180.0).contains(&w));
    }

    #[test]
    fn altitude_clamped_below_horizon() {
        // midnight at mid latitude
        let dec = solar_declination(earth_orbit_deviation(0));
        let alt = solar_altitude(51.5, dec, solar_hour_angle(0.5));
        assert_eq!(alt, 0.0);
    }

    #[test]
    fn noon_altitude_higher_in_summer() {
        let winter_dec = solar_declination(earth_orbit_deviation(0));
        let summer_dec = solar_declination(earth_orbit_deviation(172));
        let winter = solar_altitude(51.5, winter_dec, 0.0);
        let summer = solar_altitude(51.5, summer_dec, 0.0);
        assert!(summer > winter + 30.0);
    }

    #[test]
    fn air_mass_grows_toward_horizon() {
        assert!((air_mass(90.0) - 1.0).abs() < 1e-12);
        assert!(air_mass(5.0) > air_mass(30.0));
    }

    #[test]
    fn incidence_zero_tilt_equals_zenith() {
        // horizontal surface: angle of incidence is the zenith angle
        let dec = solar_declination(earth_orbit_deviation(172));
        let alt = solar_altitude(51.5, dec, 0.0);
        let aoi = solar_angle_of_incidence(0.0, 0.0, 51.5, dec, 0.0);
        assert!((aoi - (90.0 - alt)).abs() < 1e-6);
    }
}
