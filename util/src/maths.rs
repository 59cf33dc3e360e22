//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Degrees in a full turn.
pub const FULL_TURN_DEG: i32 = 360;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_deg(angle_deg: i32) -> i32 {
    angle_deg.rem_euclid(FULL_TURN_DEG)
}

/// Get the signed angular distance from `a` to `b` in degrees.
///
/// The result is the shortest rotation taking `a` onto `b`, accounting for
/// wrapping at 360, and lies in (-180, 180]. Positive values are clockwise.
pub fn get_ang_dist_deg(a: i32, b: i32) -> i32 {
    let d = wrap_deg(b - a);

    if d > FULL_TURN_DEG / 2 {
        d - FULL_TURN_DEG
    }
    else {
        d
    }
}

/// Returns true if `value` lies in the inclusive range `[min, max]`.
pub fn within_range<T: PartialOrd>(value: T, min: T, max: T) -> bool {
    value >= min && value <= max
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist_deg() {
        assert_eq!(get_ang_dist_deg(1, 2), 1);
        assert_eq!(get_ang_dist_deg(2, 1), -1);
        assert_eq!(get_ang_dist_deg(0, 360), 0);
        assert_eq!(get_ang_dist_deg(360, 0), 0);
        assert_eq!(get_ang_dist_deg(1, 360), -1);
        assert_eq!(get_ang_dist_deg(350, 10), 20);
        assert_eq!(get_ang_dist_deg(10, 350), -20);
        assert_eq!(get_ang_dist_deg(0, 180), 180);
        assert_eq!(get_ang_dist_deg(180, 0), 180);
    }

    #[test]
    fn test_wrap_deg() {
        assert_eq!(wrap_deg(-90), 270);
        assert_eq!(wrap_deg(725), 5);
        assert_eq!(wrap_deg(0), 0);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((-100f64, 100f64), (-90f64, 90f64), 50f64), 45f64);
        assert_eq!(lin_map((0f64, 1f64), (1f64, -1f64), 0.25f64), 0.5f64);
    }

    #[test]
    fn test_within_range() {
        assert!(within_range(5, 5, 10));
        assert!(within_range(10, 5, 10));
        assert!(!within_range(11, 5, 10));
    }
}
