//! # Parking module
//!
//! This module implements the [`ParkingCtrl`] state machine, which parks the car in the first
//! suitable gap along a row of parked cars on its right. The maneuver is broken down into phases:
//!
//! - `Idle` - No maneuver is in progress.
//! - `Starting` - The reference course and odometry are captured and sector monitoring starts.
//! - `Aligning` - The steering is centred.
//! - `Searching` - The car drives along the row holding its course, measuring gaps.
//! - `Entering` - The car moves past the gap to where it will reverse from.
//! - `Backing` - The car reverses into the gap, parallel or perpendicular depending on its length.
//!   It turns in, then reverses straight until the reverse sector closes. Parallel backing then
//!   counter steers back onto the course.
//! - `Positioning` - The car creeps to centre itself in the space.
//! - `Measuring` - The position is checked, positioning is retried a bounded number of times. The
//!   car only counts as parked with echoes both ahead and behind (parallel) and with the middle
//!   side and rear corner sensors close to the kerb or its neighbours.
//! - `FinalAligning` - The steering is centred in the space.
//! - `Stopping` - The car halts and the maneuver ends, successfully or not.
//! - `Waiting` - A pause of a number of ticks before resuming with another phase.
//!
//! Any phase is preempted by an obstacle within the safety distance in the direction of travel,
//! or by the car leaving autonomous mode. While backing and positioning the rear corner and middle
//! side sensors are watched too, against the smaller side safety distance.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod phase;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::Params;
pub use phase::*;
pub use state::ParkingCtrl;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while initialising the parking controller.
#[derive(Debug, thiserror::Error)]
pub enum ParkingError {
    #[error("Failed to load the parking parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
