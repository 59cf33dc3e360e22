//! Implementations for the MotionCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};

// Internal
use super::{
    align_step_deg, course_correction_deg, direction_dems, drift_bias_deg,
    AlignStatus, MotionCtrlError, Params,
};
use crate::{eqpt::DriveActuator, sensor_hub::Snapshot};
use comms_if::{eqpt::drive::DriveDems, intent::Direction};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion control module state
pub struct MotionCtrl {
    params: Params,

    actuator: Box<dyn DriveActuator>,

    /// Demands last sent to the actuator.
    dems: DriveDems,

    /// Speed magnitude used by the directional commands.
    manual_speed_pct: i32,

    /// Course held while tracking.
    ///
    /// Units: degrees, clockwise
    course_deg: i32,

    autonomous: bool,
    tracking_course: bool,
    drift_correcting: bool,
    aligning: bool,

    /// Steering bias currently applied by drift correction.
    drift_bias_deg: i32,

    /// Number of alignment steps taken since alignment was enabled.
    align_steps: u32,

    /// Wheel odometry at the previous update, for the per cycle deltas.
    last_odometry_cm: Option<(u64, u64)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCtrl {
    /// Create a new controller driving the given actuator.
    ///
    /// The car starts stopped, in manual mode, with every steering mode off.
    pub fn new(params: Params, actuator: Box<dyn DriveActuator>) -> Self {
        Self {
            manual_speed_pct: params.default_speed_pct,
            params,
            actuator,
            dems: DriveDems::default(),
            course_deg: 0,
            autonomous: false,
            tracking_course: false,
            drift_correcting: false,
            aligning: false,
            drift_bias_deg: 0,
            align_steps: 0,
            last_odometry_cm: None,
        }
    }

    /// Initialise the controller, loading the parameters from the given file.
    pub fn init(
        params_path: &str,
        actuator: Box<dyn DriveActuator>
    ) -> Result<Self, MotionCtrlError> {
        let params = params::load(params_path)
            .map_err(MotionCtrlError::ParamLoadError)?;

        Ok(Self::new(params, actuator))
    }

    /// All demands reach the actuator through here.
    fn actuate(&mut self) {
        trace!("MotionCtrl demands: {:?}", self.dems);
        self.actuator.actuate(self.dems);
    }

    // ---- PRIMITIVES ----

    /// Set the target speed, clamped to the actuator limits.
    ///
    /// Takes effect on the next actuation.
    pub fn set_speed(&mut self, speed_pct: i32) {
        let max = self.params.max_speed_pct;
        self.dems.speed_pct = speed_pct.max(-max).min(max);
    }

    /// Set the target steering angle, clamped to the actuator limits.
    ///
    /// Takes effect on the next actuation.
    pub fn set_angle(&mut self, angle_deg: i32) {
        let max = self.params.max_angle_deg;
        self.dems.angle_deg = angle_deg.max(-max).min(max);
    }

    /// Drive at the given speed and steering angle.
    pub fn drive(&mut self, speed_pct: i32, angle_deg: i32) {
        self.set_speed(speed_pct);
        self.set_angle(angle_deg);
        self.actuate();
    }

    /// Change the speed, keeping the steering angle.
    pub fn drive_speed(&mut self, speed_pct: i32) {
        self.set_speed(speed_pct);
        self.actuate();
    }

    /// Change the steering angle, keeping the speed.
    pub fn steer(&mut self, angle_deg: i32) {
        self.set_angle(angle_deg);
        self.actuate();
    }

    /// Bring the car to a standstill, keeping every mode as it is.
    pub fn halt(&mut self) {
        self.drive_speed(0);
    }

    /// Bring the car to a standstill and leave course tracking, drift bias
    /// and alignment.
    ///
    /// The odometry baseline is dropped too, the next update only takes a new
    /// one.
    pub fn stop(&mut self) {
        self.tracking_course = false;
        self.aligning = false;
        self.align_steps = 0;
        self.drift_bias_deg = 0;
        self.last_odometry_cm = None;
        self.halt();
    }

    /// Drive in a fixed direction at the manual speed.
    pub fn go(&mut self, direction: Direction) {
        let dems = direction_dems(direction, self.manual_speed_pct, &self.params);
        debug!("MotionCtrl going {:?}", direction);
        self.drive(dems.speed_pct, dems.angle_deg);
    }

    pub fn forward(&mut self) {
        self.go(Direction::Forward)
    }

    pub fn backward(&mut self) {
        self.go(Direction::Backward)
    }

    pub fn left(&mut self) {
        self.go(Direction::Left)
    }

    pub fn right(&mut self) {
        self.go(Direction::Right)
    }

    pub fn forward_left(&mut self) {
        self.go(Direction::ForwardLeft)
    }

    pub fn forward_right(&mut self) {
        self.go(Direction::ForwardRight)
    }

    pub fn backward_left(&mut self) {
        self.go(Direction::BackwardLeft)
    }

    pub fn backward_right(&mut self) {
        self.go(Direction::BackwardRight)
    }

    pub fn correct_left(&mut self) {
        self.go(Direction::CorrectLeft)
    }

    pub fn correct_right(&mut self) {
        self.go(Direction::CorrectRight)
    }

    /// Select the speed magnitude used by the directional commands.
    pub fn set_manual_speed(&mut self, speed_pct: i32) {
        self.manual_speed_pct = speed_pct.abs().min(self.params.max_speed_pct);
    }

    // ---- ACCESSORS ----

    pub fn dems(&self) -> DriveDems {
        self.dems
    }

    pub fn speed_pct(&self) -> i32 {
        self.dems.speed_pct
    }

    pub fn angle_deg(&self) -> i32 {
        self.dems.angle_deg
    }

    pub fn manual_speed_pct(&self) -> i32 {
        self.manual_speed_pct
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    // ---- AUTONOMY ----

    pub fn enable_autonomy(&mut self) {
        if !self.autonomous {
            info!("Autonomy enabled");
        }
        self.autonomous = true;
    }

    /// Leave autonomous mode, halting the car.
    pub fn disable_autonomy(&mut self) {
        if self.autonomous {
            info!("Autonomy disabled");
        }
        self.autonomous = false;
        self.halt();
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }

    // ---- COURSE TRACKING ----

    /// Start holding the given course.
    pub fn enable_tracking_course(&mut self, course_deg: i32) {
        self.set_course(course_deg);
        self.tracking_course = true;
        info!("Tracking course {} deg", self.course_deg);
    }

    pub fn disable_tracking_course(&mut self) {
        self.tracking_course = false;
    }

    pub fn is_tracking_course(&self) -> bool {
        self.tracking_course
    }

    pub fn set_course(&mut self, course_deg: i32) {
        self.course_deg = util::maths::wrap_deg(course_deg);
    }

    pub fn course_deg(&self) -> i32 {
        self.course_deg
    }

    /// Steer towards the course from the given heading.
    ///
    /// Returns the steering angle commanded.
    pub fn track_course(&mut self, heading_deg: i32) -> i32 {
        let angle_deg = course_correction_deg(
            heading_deg,
            self.course_deg,
            self.params.course_gain,
            self.params.max_correction_deg
        );
        self.steer(angle_deg);
        angle_deg
    }

    // ---- DRIFT CORRECTION ----

    pub fn enable_drift_correction(&mut self) {
        self.drift_correcting = true;
    }

    pub fn disable_drift_correction(&mut self) {
        self.drift_correcting = false;
    }

    pub fn is_drift_correcting(&self) -> bool {
        self.drift_correcting
    }

    /// Returns true if the steering angle was set by something other than
    /// drift correction.
    fn is_manually_steering(&self) -> bool {
        self.dems.angle_deg != self.drift_bias_deg
    }

    /// Correct for the given wheel deltas of one cycle.
    ///
    /// Inactive while tracking a course or steering manually. Returns the
    /// steering angle commanded, or `None` if nothing was commanded.
    pub fn drift_correction(&mut self, left_delta_cm: u64, right_delta_cm: u64) -> Option<i32> {
        if !self.drift_correcting || self.tracking_course || self.is_manually_steering() {
            return None;
        }

        let bias = drift_bias_deg(
            left_delta_cm,
            right_delta_cm,
            self.params.drift_tolerance_cm,
            self.params.drift_bias_deg
        );

        match bias {
            Some(b) => {
                if b != self.drift_bias_deg {
                    debug!("Drift detected ({} / {} cm), bias {} deg", left_delta_cm, right_delta_cm, b);
                }
                self.drift_bias_deg = b;
            }
            // Back within tolerance, remove any bias still applied
            None if self.drift_bias_deg != 0 => self.drift_bias_deg = 0,
            None => return None,
        }

        let b = self.drift_bias_deg;
        self.steer(b);
        Some(b)
    }

    // ---- ALIGNMENT ----

    pub fn enable_alignment(&mut self) {
        self.aligning = true;
        self.align_steps = 0;
    }

    pub fn disable_alignment(&mut self) {
        self.aligning = false;
    }

    pub fn is_aligning(&self) -> bool {
        self.aligning
    }

    /// Take one step centring the steering.
    ///
    /// Once the step limit is reached the steering is snapped to centre.
    pub fn align(&mut self) -> AlignStatus {
        if self.dems.angle_deg == 0 {
            self.aligning = false;
            self.align_steps = 0;
            return AlignStatus::Done;
        }

        self.aligning = true;
        self.align_steps += 1;

        let angle_deg = if self.align_steps >= self.params.max_align_steps {
            warn!("Alignment step limit reached, centring steering");
            0
        }
        else {
            align_step_deg(self.dems.angle_deg, self.params.align_step_deg)
        };
        self.steer(angle_deg);

        if angle_deg == 0 {
            self.aligning = false;
            self.align_steps = 0;
            AlignStatus::Done
        }
        else {
            AlignStatus::InProgress
        }
    }

    // ---- CYCLIC PROCESSING ----

    /// The autonomous update, performed on every cycle the car is not
    /// parking.
    ///
    /// While autonomous the car halts if it is about to hit something in its
    /// direction of travel. Course tracking takes precedence over drift
    /// correction, then any alignment in progress takes a step.
    pub fn update(&mut self, snapshot: &Snapshot) {
        let odo = (snapshot.odometry.left_cm, snapshot.odometry.right_cm);
        let deltas = self.last_odometry_cm
            .map(|(l, r)| (odo.0.saturating_sub(l), odo.1.saturating_sub(r)));
        self.last_odometry_cm = Some(odo);

        if self.autonomous {
            let ranges = &snapshot.ranges;
            let blocked = (self.dems.speed_pct > 0 && ranges.front.is_below(self.params.front_stop_cm))
                || (self.dems.speed_pct < 0 && ranges.rear.is_below(self.params.rear_stop_cm));

            if blocked {
                warn!("Obstacle in the way, halting (front {:?}, rear {:?})", ranges.front, ranges.rear);
                self.halt();
            }
        }

        if self.tracking_course {
            self.track_course(snapshot.heading.synced_deg);
        }
        else if let Some((left, right)) = deltas {
            self.drift_correction(left, right);
        }

        if self.aligning {
            self.align();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
