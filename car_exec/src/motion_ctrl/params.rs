//! Parameters structure for MotionCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Motion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LIMITS ----

    /// Largest speed magnitude the actuator accepts.
    ///
    /// Units: percent
    pub max_speed_pct: i32,

    /// Largest steering angle magnitude the actuator accepts.
    ///
    /// Units: degrees
    pub max_angle_deg: i32,

    // ---- DIRECTIONAL COMMANDS ----

    /// Speed used by the directional commands until another is selected.
    ///
    /// Units: percent
    pub default_speed_pct: i32,

    /// Steering angle for left and right.
    ///
    /// Units: degrees
    pub turn_angle_deg: i32,

    /// Steering angle for the diagonal directions.
    ///
    /// Units: degrees
    pub diag_angle_deg: i32,

    /// Steering angle for the small left and right corrections.
    ///
    /// Units: degrees
    pub nudge_angle_deg: i32,

    // ---- COURSE TRACKING ----

    /// Proportional gain from heading error to steering angle.
    pub course_gain: f64,

    /// Largest steering angle course tracking may command.
    ///
    /// Units: degrees
    pub max_correction_deg: i32,

    // ---- DRIFT CORRECTION ----

    /// Difference between the wheel deltas of one cycle above which the car
    /// is drifting.
    ///
    /// Units: centimetres
    pub drift_tolerance_cm: u64,

    /// Steering bias applied while drifting.
    ///
    /// Units: degrees
    pub drift_bias_deg: i32,

    // ---- ALIGNMENT ----

    /// Steering change per alignment step.
    ///
    /// Units: degrees
    pub align_step_deg: i32,

    /// Number of steps after which alignment snaps the steering to centre.
    pub max_align_steps: u32,

    // ---- OBSTACLE REACTION ----

    /// Front range below which an autonomous car moving forwards halts.
    ///
    /// Units: centimetres
    pub front_stop_cm: u32,

    /// Rear range below which an autonomous car moving backwards halts.
    ///
    /// Units: centimetres
    pub rear_stop_cm: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_speed_pct: 100,
            max_angle_deg: 90,
            default_speed_pct: 30,
            turn_angle_deg: 90,
            diag_angle_deg: 45,
            nudge_angle_deg: 10,
            course_gain: 1.0,
            max_correction_deg: 30,
            drift_tolerance_cm: 3,
            drift_bias_deg: 5,
            align_step_deg: 10,
            max_align_steps: 20,
            front_stop_cm: 20,
            rear_stop_cm: 10,
        }
    }
}
