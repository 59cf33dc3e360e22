//! # Equipment interfaces
//!
//! Traits the control modules use to reach the car's peripherals. Peripheral drivers (the
//! ultrasonic and infrared range finders, the wheel encoders, the gyroscope and the motor shield)
//! implement these; the [`crate::sim`] module provides simulated implementations.
//!
//! No read may block for longer than the peripheral's own bounded timeout. A peripheral that times
//! out or has nothing to report returns `None`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::drive::DriveDems, intent::CameraAim};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A distance sensor (ultrasonic or infrared).
pub trait RangeFinder {
    /// Read the distance to the nearest obstacle in centimetres, or `None` if there was no echo.
    fn read_cm(&mut self) -> Option<u32>;
}

/// A wheel encoder counting travelled distance.
pub trait Odometer {
    /// Read the cumulative distance travelled by the wheel in centimetres.
    ///
    /// The count never decreases, whichever way the wheel turns.
    fn distance_cm(&mut self) -> Option<u64>;
}

/// A heading sensor (gyroscope).
pub trait HeadingSensor {
    /// Read the current heading in degrees, clockwise.
    fn heading_deg(&mut self) -> Option<i32>;
}

/// The differential drive actuator.
pub trait DriveActuator {
    /// Apply the given demands to the motors.
    ///
    /// Demands passed in have already been clamped to the car's limits.
    fn actuate(&mut self, dems: DriveDems);
}

/// Auxiliary outputs with no feedback into the control logic.
pub trait AuxOutputs {
    /// Switch the siren on or off.
    fn set_siren(&mut self, on: bool);

    /// Aim the camera.
    fn aim_camera(&mut self, aim: CameraAim);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The full set of sensing peripherals owned by the [`crate::sensor_hub::SensorHub`].
pub struct SensorSuite {
    /// Forward looking ultrasonic sensor.
    pub front: Box<dyn RangeFinder>,

    /// Side looking ultrasonic sensor at the front of the car.
    pub front_side: Box<dyn RangeFinder>,

    /// Side looking infrared sensor in the middle of the car.
    pub middle_side: Box<dyn RangeFinder>,

    /// Infrared sensor looking diagonally out of the rear corner.
    pub rear_corner: Box<dyn RangeFinder>,

    /// Rearward looking ultrasonic sensor.
    pub rear: Box<dyn RangeFinder>,

    pub odometer_left: Box<dyn Odometer>,
    pub odometer_right: Box<dyn Odometer>,

    pub heading: Box<dyn HeadingSensor>,
}
