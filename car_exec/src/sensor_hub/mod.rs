//! # SensorHub
//!
//! Owns every ranging, odometry and heading peripheral, polling them once per
//! cycle into a single time coherent [`Snapshot`]. The hub also judges the
//! lateral sector beside the car (is there room right now, has there been
//! room for long enough) and measures gaps between obstacles from odometry.
//!
//! No error ever leaves the hub at runtime. A peripheral with nothing to say
//! produces [`Range::NoEcho`], or leaves odometry and heading unchanged.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod sector;
mod snapshot;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use sector::*;
pub use snapshot::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while initialising the SensorHub.
#[derive(Debug, thiserror::Error)]
pub enum SensorHubError {
    #[error("Could not load the SensorHub parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
