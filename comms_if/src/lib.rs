//! # Communications interface crate.
//!
//! Provides the interfaces shared between the car executable and whatever produces its commands
//! (remote control decoders, scripts, higher level planners).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command intents accepted by the car
pub mod intent;

/// Demand definitions for equipment (like the drive actuator)
pub mod eqpt;
