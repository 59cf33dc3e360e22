//! Directional commands accepted by MotionCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Params;
use comms_if::{eqpt::drive::DriveDems, intent::Direction};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the demands for driving in a fixed direction at the given speed
/// magnitude.
///
/// Backwards directions negate the speed but keep the steering sign, so
/// "backward left" steers the same way as "forward left".
pub fn direction_dems(direction: Direction, speed_pct: i32, params: &Params) -> DriveDems {
    let speed = speed_pct.abs();

    let (speed_pct, angle_deg) = match direction {
        Direction::Forward => (speed, 0),
        Direction::Backward => (-speed, 0),
        Direction::Left => (speed, -params.turn_angle_deg),
        Direction::Right => (speed, params.turn_angle_deg),
        Direction::ForwardLeft => (speed, -params.diag_angle_deg),
        Direction::ForwardRight => (speed, params.diag_angle_deg),
        Direction::BackwardLeft => (-speed, -params.diag_angle_deg),
        Direction::BackwardRight => (-speed, params.diag_angle_deg),
        Direction::CorrectLeft => (speed, -params.nudge_angle_deg),
        Direction::CorrectRight => (speed, params.nudge_angle_deg),
    };

    DriveDems {
        speed_pct,
        angle_deg,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_direction_dems() {
        let p = Params::default();

        let d = direction_dems(Direction::Forward, 30, &p);
        assert_eq!((d.speed_pct, d.angle_deg), (30, 0));

        let d = direction_dems(Direction::Backward, 30, &p);
        assert_eq!((d.speed_pct, d.angle_deg), (-30, 0));

        let d = direction_dems(Direction::Left, 30, &p);
        assert_eq!((d.speed_pct, d.angle_deg), (30, -p.turn_angle_deg));

        let d = direction_dems(Direction::BackwardRight, -30, &p);
        assert_eq!((d.speed_pct, d.angle_deg), (-30, p.diag_angle_deg));

        let d = direction_dems(Direction::CorrectLeft, 30, &p);
        assert_eq!((d.speed_pct, d.angle_deg), (30, -p.nudge_angle_deg));
    }
}
