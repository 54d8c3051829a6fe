//! Meteorological conversions and derived quantities.
//!
//! Every function here is a pure function of a single observation's fields,
//! plus the site elevation for pressure reduction.

pub mod pressure;
pub mod thermo;
pub mod wind;

pub use pressure::{altimeter_to_sea_level_pressure, altimeter_to_station_pressure};
pub use thermo::{
    celsius_to_fahrenheit, dewpoint_f, fahrenheit_to_celsius, heat_index_f, wind_chill_f,
};
pub use wind::{wind_components_kt, WindComponents};
