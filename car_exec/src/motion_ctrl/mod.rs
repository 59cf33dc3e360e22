//! # Motion control module
//!
//! MotionCtrl owns the drive actuator. It turns speed and steering requests
//! into actuator demands, and layers on the closed loop behaviours of the
//! car: holding a course, correcting drift between the wheels, centring the
//! steering, and halting in front of obstacles while autonomous.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod course;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cmd::*;
pub use course::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while initialising MotionCtrl.
#[derive(Debug, thiserror::Error)]
pub enum MotionCtrlError {
    #[error("Could not load the MotionCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

/// Progress of the steering alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignStatus {
    InProgress,
    Done,
}
