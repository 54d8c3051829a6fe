/// Timestamp layout used by the logger feed and the store files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp column name in the feed and the store
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

/// Raw column names written by the loggers
pub const AIR_TEMP_COLUMN: &str = "AvgAT";
pub const RELATIVE_HUMIDITY_COLUMN: &str = "AvgRH";
pub const PRESSURE_COLUMN: &str = "AvgBP";
pub const SOLAR_RADIATION_COLUMN: &str = "AvgSR";
pub const BATTERY_COLUMN: &str = "Batt";

/// Known wind speed/direction column pairs, probed in order
pub const WIND_COLUMN_PAIRS: [(&str, &str); 2] = [("AvgWS", "AvgWD"), ("AWS", "AWD")];

/// Unit conversions
pub const MS_TO_KNOTS: f64 = 1.943_844_492_440_604;
pub const MS_TO_KMH: f64 = 3.6;
pub const MS_TO_MPH: f64 = 2.236_936_292_054_402;

/// Physical constants
pub const STANDARD_GRAVITY: f64 = 9.806_65; // m/s^2
pub const DRY_AIR_GAS_CONSTANT: f64 = 287.047_490_977_184_6; // J/(kg K)
pub const STANDARD_LAPSE_RATE: f64 = 0.0065; // K/m
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;
pub const STANDARD_TEMPERATURE_K: f64 = 288.0;
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// Magnus coefficients (Bolton 1980)
pub const MAGNUS_E0_HPA: f64 = 6.112;
pub const MAGNUS_A: f64 = 17.67;
pub const MAGNUS_B_C: f64 = 243.5;

/// Heat index and wind chill applicability limits
pub const HEAT_INDEX_MIN_TEMP_F: f64 = 80.0;
pub const WIND_CHILL_MAX_TEMP_C: f64 = 10.0;
pub const WIND_CHILL_MIN_SPEED_MPH: f64 = 3.0;

/// Largest plausible air temperature change between consecutive rows
pub const TEMP_JUMP_THRESHOLD_C: f64 = 10.0;

/// Processing defaults
pub const DEFAULT_WINDOW_HOURS: i64 = 24;
pub const DEFAULT_FEED_RECORDS: u32 = 145;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 60;
pub const WIND_SAMPLE_STRIDE: usize = 2;
pub const WIND_DIRECTION_BREAK_DEG: f64 = 180.0;

/// Feed endpoint defaults
pub const DEFAULT_FEED_BASE_URL: &str = "http://afs102.tamu.edu:8080/";
pub const DEFAULT_USER_AGENT: &str = concat!("mesoplot/", env!("CARGO_PKG_VERSION"));
