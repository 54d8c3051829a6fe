use crate::utils::constants::{
    HEAT_INDEX_MIN_TEMP_F, MAGNUS_A, MAGNUS_B_C, MAGNUS_E0_HPA, MS_TO_KMH, MS_TO_MPH,
    WIND_CHILL_MAX_TEMP_C, WIND_CHILL_MIN_SPEED_MPH,
};

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

/// NWS heat index (Rothfusz regression with the Steadman fallback and the
/// low/high humidity adjustments), in °F.
///
/// `rh` is a fraction in `[0, 1]`. Returns `None` below 80 °F, where the
/// regression is undefined.
pub fn heat_index_f(temp_f: f64, rh: f64) -> Option<f64> {
    if temp_f < HEAT_INDEX_MIN_TEMP_F {
        return None;
    }

    let t = temp_f;
    let t2 = t * t;
    let rh2 = rh * rh;

    let simple = -10.3 + 1.1 * t + 4.7 * rh;

    let mut hi = if simple < 79.0 {
        simple
    } else {
        -42.379 + 2.049_015_23 * t + 1014.333_127 * rh
            - 22.475_541 * t * rh
            - 6.837_83e-3 * t2
            - 548.171_7 * rh2
            + 1.228_74e-1 * t2 * rh
            + 8.5282 * t * rh2
            - 1.99e-2 * t2 * rh2
    };

    let rh_pct = rh * 100.0;
    if rh_pct <= 13.0 && (80.0..=112.0).contains(&t) {
        hi -= (13.0 - rh_pct) / 4.0 * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    }
    if rh_pct > 85.0 && (80.0..=87.0).contains(&t) {
        hi += 0.02 * (rh_pct - 85.0) * (87.0 - t);
    }

    Some(hi)
}

/// JAG/TI wind chill index, in °F.
///
/// Returns `None` above 50 °F or at speeds of 3 mph or less, where the index
/// is undefined.
pub fn wind_chill_f(temp_f: f64, speed_ms: f64) -> Option<f64> {
    let temp_c = fahrenheit_to_celsius(temp_f);
    if temp_c > WIND_CHILL_MAX_TEMP_C || speed_ms * MS_TO_MPH <= WIND_CHILL_MIN_SPEED_MPH {
        return None;
    }

    let speed_factor = (speed_ms * MS_TO_KMH).powf(0.16);
    let wcti = (0.6215 + 0.3965 * speed_factor) * temp_c - 11.37 * speed_factor + 13.12;
    Some(celsius_to_fahrenheit(wcti))
}

/// Saturation vapor pressure over water (Bolton), hPa
fn saturation_vapor_pressure_hpa(temp_c: f64) -> f64 {
    MAGNUS_E0_HPA * (MAGNUS_A * temp_c / (temp_c + MAGNUS_B_C)).exp()
}

/// Dew point from temperature and relative humidity (fraction), in °F.
///
/// Returns `None` at zero humidity, where there is no vapor to condense.
pub fn dewpoint_f(temp_f: f64, rh: f64) -> Option<f64> {
    if rh <= 0.0 {
        return None;
    }
    let vapor_pressure = rh * saturation_vapor_pressure_hpa(fahrenheit_to_celsius(temp_f));
    let val = (vapor_pressure / MAGNUS_E0_HPA).ln();
    Some(celsius_to_fahrenheit(MAGNUS_B_C * val / (MAGNUS_A - val))).filter(|td| td.is_finite())
}
