//! Parameters structure for the SensorHub

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the SensorHub.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the left and right wheels.
    ///
    /// Units: centimetres
    pub wheel_base_cm: f64,

    // ---- SECTOR THRESHOLDS ----

    /// Room required at the front side sensor for the forward sector to be
    /// viable.
    ///
    /// Units: centimetres
    pub front_side_clearance_cm: u32,

    /// Room required at the middle side sensor for the forward sector to be
    /// viable.
    ///
    /// Units: centimetres
    pub middle_side_clearance_cm: u32,

    /// Room required at the rear corner sensor for the reverse sector to be
    /// viable.
    ///
    /// Units: centimetres
    pub rear_corner_clearance_cm: u32,

    /// Room required at the rear sensor for the reverse sector to be viable.
    ///
    /// Units: centimetres
    pub rear_clearance_cm: u32,

    /// Distance the sector must stay viable over before it counts as clear.
    ///
    /// Units: centimetres
    pub min_clear_distance_cm: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_base_cm: 15.0,
            front_side_clearance_cm: 20,
            middle_side_clearance_cm: 20,
            rear_corner_clearance_cm: 4,
            rear_clearance_cm: 8,
            min_clear_distance_cm: 40,
        }
    }
}
