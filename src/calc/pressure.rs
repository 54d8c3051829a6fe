use crate::calc::fahrenheit_to_celsius;
use crate::utils::constants::{
    DRY_AIR_GAS_CONSTANT, STANDARD_GRAVITY, STANDARD_LAPSE_RATE, STANDARD_PRESSURE_HPA,
    STANDARD_TEMPERATURE_K, ZERO_CELSIUS_K,
};

/// Station pressure implied by an altimeter setting at `elevation_m` (hPa).
///
/// Smithsonian Meteorological Tables form, including the 0.3 hPa offset the
/// altimeter convention carries.
pub fn altimeter_to_station_pressure(altimeter_hpa: f64, elevation_m: f64) -> f64 {
    let n = DRY_AIR_GAS_CONSTANT * STANDARD_LAPSE_RATE / STANDARD_GRAVITY;
    let reduction =
        STANDARD_PRESSURE_HPA.powf(n) * STANDARD_LAPSE_RATE * elevation_m / STANDARD_TEMPERATURE_K;
    (altimeter_hpa.powf(n) - reduction).powf(1.0 / n) + 0.3
}

/// Mean sea-level pressure from an altimeter setting, station elevation and
/// air temperature (°F), using an isothermal scale height.
pub fn altimeter_to_sea_level_pressure(altimeter_hpa: f64, elevation_m: f64, temp_f: f64) -> f64 {
    let station_pressure = altimeter_to_station_pressure(altimeter_hpa, elevation_m);
    let temp_k = fahrenheit_to_celsius(temp_f) + ZERO_CELSIUS_K;
    let scale_height = DRY_AIR_GAS_CONSTANT * temp_k / STANDARD_GRAVITY;
    station_pressure * (elevation_m / scale_height).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_pressure_at_sea_level() {
        let p = altimeter_to_station_pressure(1013.25, 0.0);
        assert!((p - 1013.55).abs() < 1e-6);
    }

    #[test]
    fn test_station_pressure_decreases_with_height() {
        let low = altimeter_to_station_pressure(1013.25, 67.78);
        let high = altimeter_to_station_pressure(1013.25, 95.37);
        assert!(high < low);
        assert!(low < 1013.25);
        assert!((low - 1005.43).abs() < 0.05, "station pressure was {low}");
    }

    #[test]
    fn test_sea_level_pressure_farm_elevation() {
        let mslp = altimeter_to_sea_level_pressure(1013.25, 67.777_221_679_687_5, 77.0);
        assert!((mslp - 1013.27).abs() < 0.05, "mslp was {mslp}");
    }

    #[test]
    fn test_sea_level_pressure_colder_air_is_higher() {
        let warm = altimeter_to_sea_level_pressure(1000.0, 95.37, 95.0);
        let cold = altimeter_to_sea_level_pressure(1000.0, 95.37, 10.0);
        assert!(cold > warm);
    }
}
