//! Snapshot data types produced by the SensorHub

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::wrap_deg;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single range reading.
///
/// "No echo" is kept distinct from any distance: a sensor which heard nothing
/// does not claim the obstacle is far away, only that it saw none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Range {
    /// An echo was received from an obstacle this many centimetres away.
    Echo(u32),

    /// No echo was received before the sensor's timeout.
    NoEcho,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// All range readings taken on one polling cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeSnapshot {
    pub front: Range,
    pub front_side: Range,
    pub middle_side: Range,
    pub rear_corner: Range,
    pub rear: Range,
}

/// Wheel odometry.
///
/// Units: centimetres
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OdometryState {
    /// Cumulative distance travelled by the left wheel.
    pub left_cm: u64,

    /// Cumulative distance travelled by the right wheel.
    pub right_cm: u64,

    /// Mean of the left and right distances.
    pub average_cm: u64,

    /// Rotation implied by the difference between the wheel distances,
    /// positive when the right wheel has travelled further.
    ///
    /// Units: degrees
    pub angular_displacement_deg: i32,

    /// Change in the average distance since the previous poll.
    pub delta_cm: u64,
}

/// Heading of the car.
///
/// Units: degrees, clockwise, in [0, 360)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeadingState {
    /// Heading as reported by the sensor.
    pub raw_deg: i32,

    /// Heading relative to the last synchronisation point.
    pub synced_deg: i32,
}

/// Everything the SensorHub knows about the car's surroundings on one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub ranges: RangeSnapshot,
    pub odometry: OdometryState,
    pub heading: HeadingState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Range {
    fn default() -> Self {
        Range::NoEcho
    }
}

impl From<Option<u32>> for Range {
    fn from(reading: Option<u32>) -> Self {
        match reading {
            Some(d) => Range::Echo(d),
            None => Range::NoEcho,
        }
    }
}

impl Range {
    /// The measured distance, or `None` if there was no echo.
    pub fn cm(&self) -> Option<u32> {
        match self {
            Range::Echo(d) => Some(*d),
            Range::NoEcho => None,
        }
    }

    /// The measured distance, or `far_cm` if there was no echo.
    pub fn cm_or(&self, far_cm: u32) -> u32 {
        self.cm().unwrap_or(far_cm)
    }

    /// Returns true if this reading leaves more than `threshold_cm` of room.
    ///
    /// No echo means no obstacle, so it always has room.
    pub fn exceeds(&self, threshold_cm: u32) -> bool {
        match self {
            Range::Echo(d) => *d > threshold_cm,
            Range::NoEcho => true,
        }
    }

    /// Returns true if an obstacle was seen closer than `threshold_cm`.
    pub fn is_below(&self, threshold_cm: u32) -> bool {
        match self {
            Range::Echo(d) => *d < threshold_cm,
            Range::NoEcho => false,
        }
    }
}

impl OdometryState {
    /// Build the odometry state from new wheel distances.
    ///
    /// `previous` is the state on the previous poll and is used for the delta.
    pub fn new(left_cm: u64, right_cm: u64, wheel_base_cm: f64, previous: &OdometryState) -> Self {
        let average_cm = (left_cm + right_cm) / 2;

        let diff_cm = right_cm as f64 - left_cm as f64;
        let angular_displacement_deg = if wheel_base_cm > 0.0 {
            (diff_cm / wheel_base_cm).to_degrees().round() as i32
        }
        else {
            0
        };

        Self {
            left_cm,
            right_cm,
            average_cm,
            angular_displacement_deg,
            delta_cm: average_cm.saturating_sub(previous.average_cm),
        }
    }
}

impl HeadingState {
    /// Build the heading state from a raw reading and the synchronisation offset.
    pub fn new(raw_deg: i32, offset_deg: i32) -> Self {
        Self {
            raw_deg: wrap_deg(raw_deg),
            synced_deg: wrap_deg(raw_deg - offset_deg),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_odometry_average() {
        let zero = OdometryState::default();

        for (l, r) in [(0u64, 0u64), (10, 20), (101, 100), (7, 0), (12345, 12350)].iter() {
            let odo = OdometryState::new(*l, *r, 15.0, &zero);
            assert_eq!(odo.average_cm, (l + r) / 2);
        }
    }

    #[test]
    fn test_odometry_derived() {
        let prev = OdometryState::new(100, 100, 15.0, &OdometryState::default());
        assert_eq!(prev.delta_cm, 100);
        assert_eq!(prev.angular_displacement_deg, 0);

        let odo = OdometryState::new(115, 100, 15.0, &prev);
        assert_eq!(odo.delta_cm, 7);
        assert_eq!(odo.angular_displacement_deg, -57);

        let odo = OdometryState::new(100, 115, 15.0, &prev);
        assert_eq!(odo.angular_displacement_deg, 57);
    }

    #[test]
    fn test_range() {
        assert!(Range::NoEcho.exceeds(1000));
        assert!(!Range::NoEcho.is_below(1000));
        assert!(Range::Echo(61).exceeds(60));
        assert!(!Range::Echo(60).exceeds(60));
        assert!(Range::Echo(4).is_below(5));
        assert_eq!(Range::from(None), Range::NoEcho);
        assert_eq!(Range::from(Some(30)).cm_or(400), 30);
        assert_eq!(Range::NoEcho.cm_or(400), 400);
    }

    #[test]
    fn test_heading_sync() {
        let h = HeadingState::new(10, 30);
        assert_eq!(h.raw_deg, 10);
        assert_eq!(h.synced_deg, 340);

        let h = HeadingState::new(-5, 0);
        assert_eq!(h.raw_deg, 355);
    }
}
