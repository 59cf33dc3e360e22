//! Parking phases and outcomes

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::{self, Display};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The phases of the parking maneuver.
///
/// Exactly one phase is active at a time. `Idle` is both the initial and the terminal phase.
#[derive(Debug, Clone, PartialEq)]
pub enum ParkingPhase {
    /// No maneuver in progress.
    Idle,

    /// Capture the reference course and odometry, start monitoring the sector.
    Starting,

    /// Centre the steering before searching.
    Aligning,

    /// Drive along the row looking for a gap.
    Searching,

    /// Move forward past the gap by the entry offset.
    Entering {
        start_odometry_cm: u64,
    },

    /// Reverse into the gap.
    Backing {
        /// Chosen on the first step of the phase.
        variant: Option<ParkingVariant>,

        stage: BackingStage,
    },

    /// Creep forwards or backwards to centre the car in the space.
    Positioning {
        variant: ParkingVariant,
        attempt: u32,
        start_odometry_cm: u64,
    },

    /// Check whether the car is positioned well enough.
    Measuring {
        variant: ParkingVariant,
        attempt: u32,
    },

    /// Centre the steering in the space.
    FinalAligning,

    /// Halt the car and end the maneuver.
    Stopping {
        outcome: ParkingOutcome,
    },

    /// Hold the current command until the deadline tick, then move to `resume`.
    Waiting {
        resume: Box<ParkingPhase>,
        deadline_tick: u64,
    },
}

/// The two ways of parking in a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkingVariant {
    /// Reverse in alongside the kerb, for gaps at least a car length long.
    Parallel,

    /// Reverse in perpendicular to the kerb, for shorter gaps.
    ReverseIn,
}

/// Progress through the `Backing` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingStage {
    /// Reversing with the steering turned towards the kerb.
    TurningIn,

    /// Reversing straight until the reverse sector closes.
    Straight,

    /// Reversing with the steering turned away from the kerb until back on course. Parallel
    /// parking only.
    CounterSteering,
}

/// How a maneuver ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ParkingOutcome {
    Succeeded,
    Failed(ParkingFailure),
}

/// Reasons a maneuver can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParkingFailure {
    #[error("No suitable gap was found within the search budget")]
    SearchExhausted,

    #[error("Could not position the car within tolerance in the allowed attempts")]
    PositioningExhausted,

    #[error("An obstacle came within the safety distance")]
    SafetyViolation,

    #[error("The maneuver was cancelled")]
    Cancelled,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ParkingPhase {
    fn default() -> Self {
        ParkingPhase::Idle
    }
}

impl ParkingPhase {
    /// Name of the phase without its data.
    pub fn name(&self) -> &'static str {
        match self {
            ParkingPhase::Idle => "Idle",
            ParkingPhase::Starting => "Starting",
            ParkingPhase::Aligning => "Aligning",
            ParkingPhase::Searching => "Searching",
            ParkingPhase::Entering { .. } => "Entering",
            ParkingPhase::Backing { .. } => "Backing",
            ParkingPhase::Positioning { .. } => "Positioning",
            ParkingPhase::Measuring { .. } => "Measuring",
            ParkingPhase::FinalAligning => "FinalAligning",
            ParkingPhase::Stopping { .. } => "Stopping",
            ParkingPhase::Waiting { .. } => "Waiting",
        }
    }
}

impl Display for ParkingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParkingPhase::Backing { variant: Some(v), stage } =>
                write!(f, "Backing ({:?}, {:?})", v, stage),
            ParkingPhase::Positioning { variant, attempt, .. } =>
                write!(f, "Positioning ({:?}, attempt {})", variant, attempt),
            ParkingPhase::Measuring { variant, attempt } =>
                write!(f, "Measuring ({:?}, attempt {})", variant, attempt),
            ParkingPhase::Stopping { outcome } => write!(f, "Stopping ({})", outcome),
            ParkingPhase::Waiting { resume, deadline_tick } =>
                write!(f, "Waiting until tick {} then {}", deadline_tick, resume),
            p => write!(f, "{}", p.name()),
        }
    }
}

impl Display for ParkingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParkingOutcome::Succeeded => write!(f, "succeeded"),
            ParkingOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
