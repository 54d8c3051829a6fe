use serde::Serialize;

use crate::utils::constants::MS_TO_KNOTS;

/// Eastward (u) and northward (v) wind components, knots
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindComponents {
    pub u_kt: f64,
    pub v_kt: f64,
}

/// Decompose a meteorological wind (direction the wind blows *from*,
/// 0° = north, clockwise) into u/v components in knots.
pub fn wind_components_kt(speed_ms: f64, direction_deg: f64) -> WindComponents {
    let direction = direction_deg.to_radians();
    let speed_kt = speed_ms * MS_TO_KNOTS;
    WindComponents {
        u_kt: -speed_kt * direction.sin(),
        v_kt: -speed_kt * direction.cos(),
    }
}
