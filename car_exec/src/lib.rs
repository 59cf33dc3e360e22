//! # Car library.
//!
//! This library allows the executable and the integration tests to access items defined inside the
//! car crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment interfaces - traits implemented by the car's peripherals
pub mod eqpt;

/// SensorHub - polls the sensors and judges the sector beside the car
pub mod sensor_hub;

/// Motion control module - converts speed and steering requests into drive demands
pub mod motion_ctrl;

/// Parking module - the parking maneuver state machine
pub mod parking;

/// Data store - owns the modules and runs the control cycle
pub mod data_store;

/// Intent processor - applies command intents to the data store
pub mod intent_processor;

/// Simulation - simulated peripherals for running without the car
pub mod sim;
