//! Parameters structure for the simulator

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated car and the street it drives along.
///
/// Frame: x along the street, y towards the car's right (the kerb side), heading clockwise from
/// the x axis.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- CAR ----

    /// Length of the car body.
    ///
    /// Units: centimetres
    pub car_length_cm: f64,

    /// Width of the car body.
    ///
    /// Units: centimetres
    pub car_width_cm: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: centimetres
    pub wheel_base_cm: f64,

    /// Distance covered in one tick at 100 % speed.
    ///
    /// Units: centimetres/tick
    pub max_speed_cm_per_tick: f64,

    /// Steering angle at which the inner wheel stops.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    /// Range beyond which the range finders hear no echo.
    ///
    /// Units: centimetres
    pub max_range_cm: f64,

    /// Initial pose `[x_cm, y_cm, heading_deg]`.
    pub start_pose: [f64; 3],

    // ---- STREET ----

    /// Position of the kerb line.
    ///
    /// Units: centimetres
    pub kerb_y_cm: f64,

    /// Parked cars and other box obstacles.
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

/// An axis aligned box obstacle.
///
/// Units: centimetres
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Obstacle {
    pub x_min_cm: f64,
    pub x_max_cm: f64,
    pub y_min_cm: f64,
    pub y_max_cm: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    /// A street with two parked cars against the kerb, leaving a gap of 60 cm between them. The car
    /// starts 7.5 cm out from the parked cars.
    fn default() -> Self {
        Self {
            car_length_cm: 25.0,
            car_width_cm: 15.0,
            wheel_base_cm: 15.0,
            max_speed_cm_per_tick: 4.0,
            max_angle_deg: 90.0,
            max_range_cm: 300.0,
            start_pose: [0.0, 25.0, 0.0],
            kerb_y_cm: 60.0,
            obstacles: vec![
                Obstacle {
                    x_min_cm: -40.0,
                    x_max_cm: 60.0,
                    y_min_cm: 40.0,
                    y_max_cm: 60.0,
                },
                Obstacle {
                    x_min_cm: 120.0,
                    x_max_cm: 220.0,
                    y_min_cm: 40.0,
                    y_max_cm: 60.0,
                },
            ],
        }
    }
}
