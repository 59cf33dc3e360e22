//! # Drive Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the differential drive actuator.
///
/// The actuator turns a speed and a steering angle into individual wheel speeds, so these two
/// numbers are the whole interface between the motion controller and the motors.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveDems {
    /// Demanded speed as a percentage of the maximum motor speed.
    ///
    /// Positive speeds are forwards, negative speeds are backwards.
    pub speed_pct: i32,

    /// Demanded steering angle in degrees.
    ///
    /// Positive angles turn to the right (clockwise seen from above), negative angles to the left.
    pub angle_deg: i32,
}
