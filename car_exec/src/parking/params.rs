//! Parameters structure for the parking maneuver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the parking maneuver.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SPEEDS AND ANGLES ----

    /// Speed while searching for a gap and entering.
    ///
    /// Units: percent
    pub move_speed_pct: i32,

    /// Speed while reversing into the gap.
    ///
    /// Units: percent
    pub turn_speed_pct: i32,

    /// Steering angle while reversing into the gap.
    ///
    /// Units: degrees
    pub turn_angle_deg: i32,

    /// Speed while positioning within the space.
    ///
    /// Units: percent
    pub creep_speed_pct: i32,

    // ---- SAFETY ----

    /// Range in the direction of travel below which the maneuver is aborted.
    ///
    /// Units: centimetres
    pub safety_distance_cm: u32,

    /// Range at the rear corner or middle side sensors below which backing and positioning are
    /// aborted.
    ///
    /// Units: centimetres
    pub side_safety_distance_cm: u32,

    // ---- SEARCH ----

    /// Smallest gap worth reversing into perpendicular to the kerb.
    ///
    /// Units: centimetres
    pub reverse_in_gap_cm: u64,

    /// Smallest gap worth parallel parking in.
    ///
    /// Units: centimetres
    pub parallel_gap_cm: u64,

    /// Distance after which the search gives up.
    ///
    /// Units: centimetres
    pub max_search_distance_cm: u64,

    /// Number of ticks after which the search gives up.
    pub max_search_ticks: u64,

    // ---- ENTRY AND BACKING ----

    /// Distance driven forwards past the end of the gap before reversing.
    ///
    /// Units: centimetres
    pub entry_offset_cm: u64,

    /// Number of ticks to wait stationary between motions.
    pub settle_ticks: u64,

    /// Rotation at which parallel backing stops turning in and reverses straight, until the reverse
    /// sector closes and it counter steers.
    ///
    /// Units: degrees
    pub parallel_turn_deg: i32,

    /// Rotation at which reverse-in backing straightens.
    ///
    /// Units: degrees
    pub reverse_in_turn_deg: i32,

    /// Heading error accepted as back on course after counter steering.
    ///
    /// Units: degrees
    pub heading_tolerance_deg: i32,

    /// Distance after which backing ends whatever the sensors say.
    ///
    /// Units: centimetres
    pub max_backing_distance_cm: u64,

    // ---- POSITIONING ----

    /// Range reported for a sensor with no echo when positioning.
    ///
    /// Units: centimetres
    pub no_echo_range_cm: u32,

    /// Desired rear range once reversed in.
    ///
    /// Units: centimetres
    pub rear_target_cm: u32,

    /// Positioning error accepted as positioned.
    ///
    /// Units: centimetres
    pub positioning_tolerance_cm: u32,

    /// Largest middle side and rear corner ranges for the car to count as parked against the
    /// kerb or its neighbours.
    ///
    /// Units: centimetres
    pub parked_side_max_cm: u32,

    /// Largest distance covered by one positioning attempt.
    ///
    /// Units: centimetres
    pub creep_distance_cm: u64,

    /// Number of positioning attempts before giving up.
    pub max_positioning_attempts: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            move_speed_pct: 30,
            turn_speed_pct: 35,
            turn_angle_deg: 60,
            creep_speed_pct: 20,
            safety_distance_cm: 5,
            side_safety_distance_cm: 2,
            reverse_in_gap_cm: 20,
            parallel_gap_cm: 45,
            max_search_distance_cm: 600,
            max_search_ticks: 2000,
            entry_offset_cm: 10,
            settle_ticks: 5,
            parallel_turn_deg: 50,
            reverse_in_turn_deg: 85,
            heading_tolerance_deg: 5,
            max_backing_distance_cm: 80,
            no_echo_range_cm: 300,
            rear_target_cm: 10,
            positioning_tolerance_cm: 5,
            parked_side_max_cm: 15,
            creep_distance_cm: 10,
            max_positioning_attempts: 3,
        }
    }
}
