//! Steering laws for course tracking, drift correction and alignment

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::get_ang_dist_deg;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Steering angle which turns the car from `heading_deg` towards
/// `course_deg`.
///
/// Proportional to the shortest angular error, saturated at
/// `max_correction_deg`.
pub fn course_correction_deg(
    heading_deg: i32,
    course_deg: i32,
    gain: f64,
    max_correction_deg: i32
) -> i32 {
    let error_deg = get_ang_dist_deg(heading_deg, course_deg);
    let correction = (gain * error_deg as f64).round() as i32;

    correction.max(-max_correction_deg).min(max_correction_deg)
}

/// Steering bias for the wheel deltas of one cycle, or `None` if the
/// difference between them is within tolerance.
///
/// A faster left wheel gives a bias to the right.
pub fn drift_bias_deg(
    left_delta_cm: u64,
    right_delta_cm: u64,
    tolerance_cm: u64,
    bias_deg: i32
) -> Option<i32> {
    let diff = left_delta_cm as i64 - right_delta_cm as i64;

    if diff.unsigned_abs() <= tolerance_cm {
        None
    }
    else if diff > 0 {
        Some(bias_deg)
    }
    else {
        Some(-bias_deg)
    }
}

/// Move the steering angle one step towards centre, never overshooting.
pub fn align_step_deg(angle_deg: i32, step_deg: i32) -> i32 {
    if angle_deg > 0 {
        (angle_deg - step_deg).max(0)
    }
    else {
        (angle_deg + step_deg).min(0)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_course_saturation() {
        assert_eq!(course_correction_deg(0, 170, 1.0, 30), 30);
        assert_eq!(course_correction_deg(0, 190, 1.0, 30), -30);
        assert_eq!(course_correction_deg(350, 5, 1.0, 30), 15);
        assert_eq!(course_correction_deg(90, 90, 1.0, 30), 0);
        assert_eq!(course_correction_deg(10, 0, 0.5, 30), -5);
    }

    #[test]
    fn test_course_convergence() {
        // Car yaws by a tenth of the steering angle each cycle
        let course = 90;
        let mut heading = 0.0f64;

        for _ in 0..300 {
            let angle = course_correction_deg(heading.round() as i32, course, 1.0, 30);
            heading += angle as f64 * 0.1;
        }

        assert!(get_ang_dist_deg(heading.round() as i32, course).abs() <= 1);
    }

    #[test]
    fn test_drift_bias() {
        assert_eq!(drift_bias_deg(100, 94, 3, 5), Some(5));
        assert_eq!(drift_bias_deg(94, 100, 3, 5), Some(-5));
        assert_eq!(drift_bias_deg(100, 99, 3, 5), None);
        assert_eq!(drift_bias_deg(100, 97, 3, 5), None);
    }

    #[test]
    fn test_align_step() {
        assert_eq!(align_step_deg(45, 10), 35);
        assert_eq!(align_step_deg(5, 10), 0);
        assert_eq!(align_step_deg(-25, 10), -15);
        assert_eq!(align_step_deg(0, 10), 0);
    }
}
