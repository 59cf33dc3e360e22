//! # Command intents
//!
//! Intents are the opaque commands the car accepts from the outside world. Whatever decodes the
//! remote control (a serial character protocol, a joystick bridge, a script) produces these; the
//! car never needs to know how they were encoded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command intent for the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Drive in one of the fixed directions at the currently selected speed.
    Drive(Direction),

    /// Stop the car, cancelling any parking maneuver in progress.
    Stop,

    /// Select the speed used by the directional commands.
    Speed {
        /// Speed as a percentage of the maximum, between 0 and 100.
        speed_pct: i32,
    },

    /// Set the course to hold and start tracking it.
    Course {
        /// Course in degrees, measured clockwise like the heading sensor.
        course_deg: i32,
    },

    /// Enable or disable drift correction.
    DriftCorrection(bool),

    /// Enable or disable autonomous (obstacle reactive) driving.
    Autonomy(bool),

    /// Start or abort the parking maneuver.
    Parking(bool),

    /// Switch the siren on or off.
    Siren(bool),

    /// Aim the camera.
    Camera(CameraAim),

    /// A joystick axis moved to a new position.
    Axis {
        /// The axis which moved.
        axis: StickAxis,

        /// Position of the axis between -100 and +100.
        position: i32,
    },
}

/// Fixed driving directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,

    /// Small nudge to the left while driving forwards.
    CorrectLeft,

    /// Small nudge to the right while driving forwards.
    CorrectRight,
}

/// Directions the camera can be aimed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraAim {
    Left,
    Right,
}

/// Joystick axes which carry meaning for the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickAxis {
    /// Left stick horizontal axis, steers the car.
    LeftX,

    /// Left stick vertical axis, sets the speed. Positive is forwards.
    LeftY,

    /// Right stick horizontal axis, steers the car.
    RightX,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum IntentParseError {
    #[error("Intent contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Intent {
    /// Parse a new intent from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, IntentParseError> {
        serde_json::from_str(json_str).map_err(IntentParseError::InvalidJson)
    }

    /// Returns true if the intent directly commands the car's motion.
    ///
    /// Motion intents are the ones which must not interfere with an active parking maneuver.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Intent::Drive(_) | Intent::Course { .. } | Intent::Axis { .. }
        )
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(
            Intent::from_json(r#"{"Drive": "ForwardLeft"}"#).unwrap(),
            Intent::Drive(Direction::ForwardLeft)
        );
        assert_eq!(Intent::from_json(r#""Stop""#).unwrap(), Intent::Stop);
        assert_eq!(
            Intent::from_json(r#"{"Speed": {"speed_pct": 40}}"#).unwrap(),
            Intent::Speed { speed_pct: 40 }
        );
        assert_eq!(
            Intent::from_json(r#"{"Axis": {"axis": "LeftY", "position": -55}}"#).unwrap(),
            Intent::Axis {
                axis: StickAxis::LeftY,
                position: -55
            }
        );

        assert!(Intent::from_json(r#"{"Drive": "Sideways"}"#).is_err());
        assert!(Intent::from_json("not json").is_err());
    }

    #[test]
    fn test_is_motion() {
        assert!(Intent::Drive(Direction::Forward).is_motion());
        assert!(Intent::Course { course_deg: 90 }.is_motion());
        assert!(!Intent::Stop.is_motion());
        assert!(!Intent::Parking(false).is_motion());
        assert!(!Intent::Siren(true).is_motion());
    }
}
