//! # Simulation
//!
//! Simulated implementations of the equipment interfaces, so the car software can run and be
//! tested without the car. Two flavours are provided:
//!
//! - [`SimWorld`] - differential drive kinematics in a street of parked cars, with ray cast range
//!   finders, wheel encoders and a gyroscope.
//! - [`ManualFeed`] - devices whose readings are set directly each cycle, with recording
//!   actuators, for exactly scripted scenarios.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod manual;
mod params;
mod world;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use manual::*;
pub use params::*;
pub use world::*;
