//! Parking state machine

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};

use super::{
    BackingStage, Params, ParkingError, ParkingFailure, ParkingOutcome, ParkingPhase,
    ParkingVariant,
};
use crate::{
    motion_ctrl::{AlignStatus, MotionCtrl},
    sensor_hub::{MonitorAction, SectorEdge, SensorHub, TravelDirection},
};
use util::maths::{get_ang_dist_deg, within_range};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parking maneuver controller.
///
/// The controller reads the [`SensorHub`] and commands the car only through [`MotionCtrl`]. Changes
/// to sector monitoring are handed back from [`ParkingCtrl::step`] for the caller to apply to the
/// hub.
pub struct ParkingCtrl {
    params: Params,

    phase: ParkingPhase,

    /// Synchronised heading when the maneuver started.
    course_deg: i32,

    search_start_odometry_cm: u64,
    search_start_tick: u64,

    /// Odometry when backing started.
    backing_start_odometry_cm: u64,

    /// Length of the gap being parked in.
    gap_cm: u64,

    /// Gap lengths measured by the current or last search.
    displacements: Vec<i64>,

    outcome: Option<ParkingOutcome>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ParkingCtrl {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            phase: ParkingPhase::Idle,
            course_deg: 0,
            search_start_odometry_cm: 0,
            search_start_tick: 0,
            backing_start_odometry_cm: 0,
            gap_cm: 0,
            displacements: Vec::new(),
            outcome: None,
        }
    }

    /// Initialise the controller, loading the parameters from the given file.
    pub fn init(params_path: &str) -> Result<Self, ParkingError> {
        let params = util::params::load(params_path)
            .map_err(ParkingError::ParamLoadError)?;

        Ok(Self::new(params))
    }

    pub fn phase(&self) -> &ParkingPhase {
        &self.phase
    }

    /// Returns true while a maneuver is in progress.
    pub fn is_parking(&self) -> bool {
        self.phase != ParkingPhase::Idle
    }

    /// How the last maneuver ended, `None` if none has ended yet.
    pub fn last_outcome(&self) -> Option<&ParkingOutcome> {
        self.outcome.as_ref()
    }

    /// Shortest gap measured by the current or last search.
    ///
    /// Units: centimetres
    pub fn shortest_displacement(&self) -> Option<i64> {
        self.displacements.iter().min().copied()
    }

    /// Start a maneuver, putting the car in autonomous mode.
    ///
    /// Ignored if a maneuver is already in progress.
    pub fn initiate(&mut self, motion: &mut MotionCtrl) {
        if self.is_parking() {
            warn!("Parking already in progress ({}), ignoring", self.phase);
            return;
        }

        motion.enable_autonomy();
        self.change_phase(ParkingPhase::Starting);
    }

    /// Abort the maneuver, halting the car now.
    ///
    /// The maneuver ends (`Idle`) on the next step.
    pub fn stop(&mut self, motion: &mut MotionCtrl) {
        if !self.is_parking() {
            return;
        }

        motion.halt();

        if !matches!(self.phase, ParkingPhase::Stopping { .. }) {
            self.change_phase(ParkingPhase::Stopping {
                outcome: ParkingOutcome::Failed(ParkingFailure::Cancelled),
            });
        }
    }

    /// The single point at which the phase changes.
    fn change_phase(&mut self, phase: ParkingPhase) {
        info!("Parking phase change to: {}", phase);
        self.phase = phase;
    }

    /// Halt here for `ticks` ticks, then move to `target`.
    pub fn wait_for(&mut self, target: ParkingPhase, ticks: u64, now_tick: u64) {
        self.change_phase(ParkingPhase::Waiting {
            resume: Box::new(target),
            deadline_tick: now_tick + ticks,
        });
    }

    /// Resume the waited for phase once the deadline has passed.
    ///
    /// Returns true if the wait is over.
    pub fn wait(&mut self, now_tick: u64) -> bool {
        let resume = match &self.phase {
            ParkingPhase::Waiting { resume, deadline_tick } if now_tick >= *deadline_tick =>
                (**resume).clone(),
            _ => return false,
        };

        self.change_phase(resume);
        true
    }

    /// Perform one step of the maneuver.
    ///
    /// Returns the change to sector monitoring the hub must apply before its next update.
    pub fn step(&mut self, hub: &SensorHub, motion: &mut MotionCtrl) -> MonitorAction {
        match self.phase {
            ParkingPhase::Idle => return MonitorAction::None,
            ParkingPhase::Stopping { .. } => (),
            _ => {
                if let Some(failure) = self.check_preemption(hub, motion) {
                    warn!("Parking aborted: {}", failure);
                    motion.halt();
                    self.change_phase(ParkingPhase::Stopping {
                        outcome: ParkingOutcome::Failed(failure),
                    });
                    return MonitorAction::None;
                }
            }
        }

        match self.phase.clone() {
            ParkingPhase::Idle => MonitorAction::None,
            ParkingPhase::Starting => self.start(hub, motion),
            ParkingPhase::Aligning => self.align(motion),
            ParkingPhase::Searching => self.search(hub, motion),
            ParkingPhase::Entering { start_odometry_cm } =>
                self.enter(hub, motion, start_odometry_cm),
            ParkingPhase::Backing { variant, stage } => self.back(hub, motion, variant, stage),
            ParkingPhase::Positioning { variant, attempt, start_odometry_cm } =>
                self.position(hub, motion, variant, attempt, start_odometry_cm),
            ParkingPhase::Measuring { variant, attempt } =>
                self.measure(hub, motion, variant, attempt),
            ParkingPhase::FinalAligning => self.final_align(motion),
            ParkingPhase::Stopping { outcome } => self.finish(motion, outcome),
            ParkingPhase::Waiting { .. } => {
                self.wait(hub.tick());
                MonitorAction::None
            }
        }
    }

    /// Check for the conditions which abort any phase.
    fn check_preemption(&self, hub: &SensorHub, motion: &MotionCtrl) -> Option<ParkingFailure> {
        let speed = motion.speed_pct();
        let safety_cm = self.params.safety_distance_cm;

        if (speed > 0 && hub.front().is_below(safety_cm))
            || (speed < 0 && hub.rear().is_below(safety_cm))
        {
            return Some(ParkingFailure::SafetyViolation);
        }

        // In the space the car swings its side towards the kerb and its neighbours
        let in_space = matches!(
            self.phase,
            ParkingPhase::Backing { .. } | ParkingPhase::Positioning { .. }
        );
        let side_cm = self.params.side_safety_distance_cm;

        if in_space
            && (hub.rear_corner().is_below(side_cm) || hub.middle_side().is_below(side_cm))
        {
            return Some(ParkingFailure::SafetyViolation);
        }

        if !motion.is_autonomous() {
            return Some(ParkingFailure::Cancelled);
        }

        None
    }

    // ---- PHASES ----

    fn start(&mut self, hub: &SensorHub, motion: &mut MotionCtrl) -> MonitorAction {
        self.course_deg = hub.heading().synced_deg;
        self.search_start_odometry_cm = hub.odometry().average_cm;
        self.search_start_tick = hub.tick();
        self.gap_cm = 0;
        self.displacements.clear();
        self.outcome = None;

        debug!(
            "Parking reference: course {} deg, odometry {} cm, tick {}",
            self.course_deg, self.search_start_odometry_cm, self.search_start_tick
        );

        motion.enable_alignment();
        self.change_phase(ParkingPhase::Aligning);

        MonitorAction::Start(TravelDirection::Forward)
    }

    fn align(&mut self, motion: &mut MotionCtrl) -> MonitorAction {
        if motion.align() == AlignStatus::Done {
            motion.enable_tracking_course(self.course_deg);
            self.change_phase(ParkingPhase::Searching);
        }

        MonitorAction::None
    }

    fn search(&mut self, hub: &SensorHub, motion: &mut MotionCtrl) -> MonitorAction {
        motion.set_speed(self.params.move_speed_pct);
        motion.track_course(hub.heading().synced_deg);

        let odometry_cm = hub.odometry().average_cm;

        if hub.passing_edge() == Some(SectorEdge::GapClosed) {
            if let Some(gap_cm) = hub.edge_displacement_cm() {
                debug!("Passed a {} cm gap", gap_cm);
                self.displacements.push(gap_cm);

                if gap_cm >= self.params.reverse_in_gap_cm as i64 {
                    self.gap_found(gap_cm as u64, odometry_cm);
                    return MonitorAction::None;
                }
            }
        }
        else if hub.is_clear_sector() {
            // Long enough to park in without waiting for its end
            if let Some(gap_cm) = hub.gap_length_cm() {
                if gap_cm >= self.params.parallel_gap_cm {
                    self.displacements.push(gap_cm as i64);
                    self.gap_found(gap_cm, odometry_cm);
                    return MonitorAction::None;
                }
            }
        }

        let travelled_cm = odometry_cm.saturating_sub(self.search_start_odometry_cm);
        let elapsed_ticks = hub.tick().saturating_sub(self.search_start_tick);

        if travelled_cm > self.params.max_search_distance_cm
            || elapsed_ticks > self.params.max_search_ticks
        {
            warn!(
                "No gap found after {} cm and {} ticks (shortest gap {:?} cm)",
                travelled_cm,
                elapsed_ticks,
                self.shortest_displacement()
            );
            motion.halt();
            self.change_phase(ParkingPhase::Stopping {
                outcome: ParkingOutcome::Failed(ParkingFailure::SearchExhausted),
            });
        }

        MonitorAction::None
    }

    fn gap_found(&mut self, gap_cm: u64, odometry_cm: u64) {
        info!("Found a {} cm gap at {} cm", gap_cm, odometry_cm);
        self.gap_cm = gap_cm;
        self.change_phase(ParkingPhase::Entering {
            start_odometry_cm: odometry_cm,
        });
    }

    fn enter(
        &mut self,
        hub: &SensorHub,
        motion: &mut MotionCtrl,
        start_odometry_cm: u64
    ) -> MonitorAction {
        let travelled_cm = hub.odometry().average_cm.saturating_sub(start_odometry_cm);

        if travelled_cm >= self.params.entry_offset_cm {
            motion.stop();
            self.wait_for(
                ParkingPhase::Backing {
                    variant: None,
                    stage: BackingStage::TurningIn,
                },
                self.params.settle_ticks,
                hub.tick()
            );
            return MonitorAction::Start(TravelDirection::Reverse);
        }

        motion.set_speed(self.params.move_speed_pct);
        motion.track_course(hub.heading().synced_deg);

        MonitorAction::None
    }

    fn back(
        &mut self,
        hub: &SensorHub,
        motion: &mut MotionCtrl,
        variant: Option<ParkingVariant>,
        stage: BackingStage
    ) -> MonitorAction {
        let odometry_cm = hub.odometry().average_cm;

        let variant = match variant {
            Some(v) => v,
            None => {
                let v = if self.gap_cm >= self.params.parallel_gap_cm {
                    ParkingVariant::Parallel
                }
                else {
                    ParkingVariant::ReverseIn
                };
                self.backing_start_odometry_cm = odometry_cm;
                self.set_stage(v, BackingStage::TurningIn);
                v
            }
        };

        let travelled_cm = odometry_cm.saturating_sub(self.backing_start_odometry_cm);

        if travelled_cm >= self.params.max_backing_distance_cm {
            debug!("Backing ended after {} cm", travelled_cm);
            self.end_backing(hub, motion, variant);
            return MonitorAction::None;
        }

        let rotation_deg = get_ang_dist_deg(self.course_deg, hub.heading().synced_deg).abs();
        let closed = !hub.is_sector_viable();
        let speed_pct = -self.params.turn_speed_pct;
        let turn_deg = self.params.turn_angle_deg;

        match (stage, variant) {
            (BackingStage::CounterSteering, _) => {
                if rotation_deg <= self.params.heading_tolerance_deg {
                    self.end_backing(hub, motion, variant);
                }
                else {
                    motion.drive(speed_pct, -turn_deg);
                }
            }

            // Close to the kerb or the car behind
            (_, ParkingVariant::Parallel) if closed => {
                self.set_stage(variant, BackingStage::CounterSteering);
                motion.drive(speed_pct, -turn_deg);
            }
            (_, ParkingVariant::ReverseIn) if closed => {
                debug!("Backing ended after {} cm", travelled_cm);
                self.end_backing(hub, motion, variant);
            }

            (BackingStage::TurningIn, _) => {
                let turn_in_deg = match variant {
                    ParkingVariant::Parallel => self.params.parallel_turn_deg,
                    ParkingVariant::ReverseIn => self.params.reverse_in_turn_deg,
                };

                if rotation_deg >= turn_in_deg {
                    self.set_stage(variant, BackingStage::Straight);
                    motion.drive(speed_pct, 0);
                }
                else {
                    motion.drive(speed_pct, turn_deg);
                }
            }
            (BackingStage::Straight, _) => motion.drive(speed_pct, 0),
        }

        MonitorAction::None
    }

    fn set_stage(&mut self, variant: ParkingVariant, stage: BackingStage) {
        self.change_phase(ParkingPhase::Backing {
            variant: Some(variant),
            stage,
        });
    }

    fn end_backing(&mut self, hub: &SensorHub, motion: &mut MotionCtrl, variant: ParkingVariant) {
        motion.halt();
        self.wait_for(
            ParkingPhase::Positioning {
                variant,
                attempt: 0,
                start_odometry_cm: hub.odometry().average_cm,
            },
            self.params.settle_ticks,
            hub.tick()
        );
    }

    /// Signed distance the car is away from where it should be.
    ///
    /// For parallel parking this is the excess of front over rear room, for reverse-in the excess
    /// of rear room over the target.
    fn positioning_error_cm(&self, hub: &SensorHub, variant: ParkingVariant) -> i64 {
        let far_cm = self.params.no_echo_range_cm;

        match variant {
            ParkingVariant::Parallel =>
                (hub.front().cm_or(far_cm) as i64 - hub.rear().cm_or(far_cm) as i64) / 2,
            ParkingVariant::ReverseIn =>
                hub.rear().cm_or(far_cm) as i64 - self.params.rear_target_cm as i64,
        }
    }

    /// Returns true if the car is within tolerance of where it should be along the space.
    ///
    /// Parallel parking needs something both ahead and behind to centre between.
    fn is_positioned(&self, hub: &SensorHub, variant: ParkingVariant) -> bool {
        let no_echoes = hub.front().cm().is_none() && hub.rear().cm().is_none();
        if variant == ParkingVariant::Parallel && no_echoes {
            return false;
        }

        let tol = self.params.positioning_tolerance_cm as i64;
        within_range(self.positioning_error_cm(hub, variant), -tol, tol)
    }

    /// Returns true if the car's right side is in against the kerb or its neighbours.
    fn is_against_side(&self, hub: &SensorHub) -> bool {
        let max_cm = self.params.parked_side_max_cm;

        [hub.middle_side(), hub.rear_corner()]
            .iter()
            .all(|r| matches!(r.cm(), Some(d) if d <= max_cm))
    }

    fn position(
        &mut self,
        hub: &SensorHub,
        motion: &mut MotionCtrl,
        variant: ParkingVariant,
        attempt: u32,
        start_odometry_cm: u64
    ) -> MonitorAction {
        let error_cm = self.positioning_error_cm(hub, variant);
        let travelled_cm = hub.odometry().average_cm.saturating_sub(start_odometry_cm);

        if self.is_positioned(hub, variant) || travelled_cm >= self.params.creep_distance_cm {
            motion.halt();
            self.wait_for(
                ParkingPhase::Measuring { variant, attempt },
                self.params.settle_ticks,
                hub.tick()
            );
            return MonitorAction::None;
        }

        // Move to take up the excess room
        let forwards = match variant {
            ParkingVariant::Parallel => error_cm > 0,
            ParkingVariant::ReverseIn => error_cm < 0,
        };
        let speed_pct = if forwards {
            self.params.creep_speed_pct
        }
        else {
            -self.params.creep_speed_pct
        };
        motion.drive(speed_pct, 0);

        MonitorAction::None
    }

    fn measure(
        &mut self,
        hub: &SensorHub,
        motion: &mut MotionCtrl,
        variant: ParkingVariant,
        attempt: u32
    ) -> MonitorAction {
        let error_cm = self.positioning_error_cm(hub, variant);

        if self.is_positioned(hub, variant) && self.is_against_side(hub) {
            debug!("Positioned within {} cm", error_cm);
            motion.enable_alignment();
            self.change_phase(ParkingPhase::FinalAligning);
        }
        else if attempt + 1 < self.params.max_positioning_attempts {
            self.change_phase(ParkingPhase::Positioning {
                variant,
                attempt: attempt + 1,
                start_odometry_cm: hub.odometry().average_cm,
            });
        }
        else {
            warn!(
                "Not parked after {} positioning attempts ({} cm out, side {:?} / {:?})",
                attempt + 1,
                error_cm,
                hub.middle_side(),
                hub.rear_corner()
            );
            motion.halt();
            self.change_phase(ParkingPhase::Stopping {
                outcome: ParkingOutcome::Failed(ParkingFailure::PositioningExhausted),
            });
        }

        MonitorAction::None
    }

    fn final_align(&mut self, motion: &mut MotionCtrl) -> MonitorAction {
        if motion.align() == AlignStatus::Done {
            self.change_phase(ParkingPhase::Stopping {
                outcome: ParkingOutcome::Succeeded,
            });
        }

        MonitorAction::None
    }

    fn finish(&mut self, motion: &mut MotionCtrl, outcome: ParkingOutcome) -> MonitorAction {
        motion.stop();
        info!("Parking {}", outcome);
        self.outcome = Some(outcome);
        self.change_phase(ParkingPhase::Idle);

        MonitorAction::Reset
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        motion_ctrl::Params as MotionParams,
        sensor_hub::Params as HubParams,
        sim::{DemsRecord, ManualFeed, ManualReadings, RecordingActuator, RecordingAux},
    };

    struct Rig {
        feed: ManualFeed,
        dems: DemsRecord,
        hub: SensorHub,
        motion: MotionCtrl,
        parking: ParkingCtrl,
    }

    impl Rig {
        /// Car stationary beside a parked car.
        fn new(params: Params) -> Self {
            let feed = ManualFeed::new(ManualReadings {
                front_side: Some(10),
                left_cm: Some(0),
                right_cm: Some(0),
                heading_deg: Some(0),
                ..ManualReadings::default()
            });
            let (aux, _) = RecordingAux::new();
            let hub = SensorHub::new(HubParams::default(), feed.sensor_suite(), Box::new(aux));
            let (act, dems) = RecordingActuator::new();
            let motion = MotionCtrl::new(MotionParams::default(), Box::new(act));

            Self {
                feed,
                dems,
                hub,
                motion,
                parking: ParkingCtrl::new(params),
            }
        }

        fn cycle(&mut self) {
            self.hub.update();
            let action = self.parking.step(&self.hub, &mut self.motion);
            self.hub.apply_monitor_action(action);
        }

        /// Cycle until the phase has the given name, advancing the odometry each cycle.
        fn cycle_until(&mut self, name: &str, advance_cm: u64, max_cycles: usize) -> bool {
            for _ in 0..max_cycles {
                if self.parking.phase().name() == name {
                    return true;
                }
                self.feed.advance(advance_cm);
                self.cycle();
            }
            self.parking.phase().name() == name
        }

        fn start_searching(&mut self) {
            self.parking.initiate(&mut self.motion);
            self.cycle();
            assert_eq!(self.parking.phase(), &ParkingPhase::Aligning);
            assert!(self.hub.is_monitoring());
            self.cycle();
            assert_eq!(self.parking.phase(), &ParkingPhase::Searching);
        }

        /// Drive 5 cm per cycle past a gap of the given length and back alongside a parked car.
        fn pass_gap(&mut self, gap_cm: u64) {
            self.feed.set(|r| r.front_side = Some(200));
            for _ in 0..(gap_cm / 5) {
                self.feed.advance(5);
                self.cycle();
            }
            self.feed.set(|r| r.front_side = Some(10));
            self.feed.advance(5);
            self.cycle();
        }

        /// Find a parallel gap and start backing into it.
        fn start_parallel(&mut self) {
            self.start_searching();
            self.feed.set(|r| r.front_side = Some(200));
            assert!(self.cycle_until("Backing", 5, 40));
            self.cycle();
            assert_eq!(
                self.parking.phase(),
                &ParkingPhase::Backing {
                    variant: Some(ParkingVariant::Parallel),
                    stage: BackingStage::TurningIn
                }
            );
        }

        /// Set the side readings of a car tucked in against the kerb.
        fn tuck_in(&mut self) {
            self.feed.set(|r| {
                r.middle_side = Some(6);
                r.rear_corner = Some(9);
            });
        }
    }

    #[test]
    fn test_idle() {
        let mut rig = Rig::new(Params::default());
        rig.cycle();
        assert!(!rig.parking.is_parking());
        assert!(rig.dems.is_empty());
        assert_eq!(rig.parking.last_outcome(), None);
        assert_eq!(rig.parking.shortest_displacement(), None);
    }

    #[test]
    fn test_reverse_in_gap() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();

        rig.cycle();
        assert_eq!(rig.motion.speed_pct(), Params::default().move_speed_pct);

        // Too short to use
        rig.pass_gap(10);
        assert_eq!(rig.parking.phase(), &ParkingPhase::Searching);
        assert_eq!(rig.parking.shortest_displacement(), Some(10));

        rig.pass_gap(30);
        assert_eq!(rig.parking.phase().name(), "Entering");
        assert_eq!(rig.parking.shortest_displacement(), Some(10));

        // Entering moves forward then waits stationary
        assert!(rig.cycle_until("Waiting", 5, 10));
        assert_eq!(rig.motion.speed_pct(), 0);
        assert!(!rig.motion.is_tracking_course());

        assert!(rig.cycle_until("Backing", 0, 10));
        rig.cycle();
        assert_eq!(
            rig.parking.phase(),
            &ParkingPhase::Backing {
                variant: Some(ParkingVariant::ReverseIn),
                stage: BackingStage::TurningIn
            }
        );
        assert_eq!(
            rig.dems.last().map(|d| (d.speed_pct, d.angle_deg)),
            Some((-Params::default().turn_speed_pct, Params::default().turn_angle_deg))
        );
    }

    #[test]
    fn test_parallel_gap_found_while_open() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();

        rig.feed.set(|r| r.front_side = Some(200));
        assert!(rig.cycle_until("Entering", 5, 20));
        assert_eq!(rig.parking.shortest_displacement(), Some(45));

        assert!(rig.cycle_until("Backing", 5, 20));
        rig.cycle();
        assert!(matches!(
            rig.parking.phase(),
            ParkingPhase::Backing {
                variant: Some(ParkingVariant::Parallel),
                ..
            }
        ));
    }

    #[test]
    fn test_reverse_in_to_success() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();
        rig.pass_gap(30);
        assert!(rig.cycle_until("Backing", 5, 20));
        rig.cycle();

        // Rear sector closes in, just short of the target
        rig.tuck_in();
        rig.feed.set(|r| r.rear = Some(8));
        assert!(rig.cycle_until("FinalAligning", 0, 30));
        assert!(rig.cycle_until("Idle", 0, 30));

        assert_eq!(rig.parking.last_outcome(), Some(&ParkingOutcome::Succeeded));
        assert_eq!(rig.motion.dems().speed_pct, 0);
        assert_eq!(rig.motion.dems().angle_deg, 0);
        assert!(!rig.hub.is_monitoring());
    }

    #[test]
    fn test_positioning_exhausted() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();
        rig.pass_gap(30);
        assert!(rig.cycle_until("Backing", 5, 20));
        rig.cycle();

        // 20 cm too much room behind, and the car never gets closer
        rig.tuck_in();
        rig.feed.set(|r| r.rear = Some(30));
        assert!(rig.cycle_until("Idle", 5, 200));
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::PositioningExhausted))
        );
    }

    #[test]
    fn test_parallel_backing_stages() {
        let mut rig = Rig::new(Params::default());
        let p = Params::default();
        rig.start_parallel();
        let turn_in_from = rig.dems.len() - 1;

        // Turned in far enough, reverse straight
        rig.feed.set(|r| r.heading_deg = Some(340));
        rig.cycle();
        rig.feed.set(|r| r.heading_deg = Some(360 - p.parallel_turn_deg));
        rig.cycle();
        rig.cycle();
        assert_eq!(
            rig.parking.phase(),
            &ParkingPhase::Backing {
                variant: Some(ParkingVariant::Parallel),
                stage: BackingStage::Straight
            }
        );

        // Rear corner up to the kerb, counter steer
        rig.feed.set(|r| r.rear_corner = Some(4));
        rig.cycle();
        rig.feed.set(|r| r.heading_deg = Some(345));
        rig.cycle();
        assert_eq!(
            rig.parking.phase(),
            &ParkingPhase::Backing {
                variant: Some(ParkingVariant::Parallel),
                stage: BackingStage::CounterSteering
            }
        );

        // Back on course
        rig.feed.set(|r| r.heading_deg = Some(358));
        rig.cycle();
        assert_eq!(rig.parking.phase().name(), "Waiting");
        assert_eq!(rig.motion.speed_pct(), 0);

        let mut angles: Vec<i32> = rig.dems.all()[turn_in_from..]
            .iter()
            .filter(|d| d.speed_pct != 0)
            .map(|d| {
                assert_eq!(d.speed_pct, -p.turn_speed_pct);
                d.angle_deg
            })
            .collect();
        angles.dedup();
        assert_eq!(angles, vec![p.turn_angle_deg, 0, -p.turn_angle_deg]);
    }

    #[test]
    fn test_parallel_parked() {
        let mut rig = Rig::new(Params::default());
        rig.start_parallel();

        // Backed in, centred between the cars ahead and behind
        rig.tuck_in();
        rig.feed.set(|r| {
            r.front = Some(20);
            r.rear = Some(18);
        });
        assert!(rig.cycle_until("Idle", 5, 300));
        assert_eq!(rig.parking.last_outcome(), Some(&ParkingOutcome::Succeeded));
    }

    #[test]
    fn test_parallel_without_echoes_not_parked() {
        let mut rig = Rig::new(Params::default());
        rig.start_parallel();

        // Nothing ahead or behind to centre between
        rig.tuck_in();
        assert!(rig.cycle_until("Idle", 5, 300));
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::PositioningExhausted))
        );
    }

    #[test]
    fn test_parallel_still_in_street_not_parked() {
        let mut rig = Rig::new(Params::default());
        rig.start_parallel();

        // Centred, but the side is still well out from the kerb
        rig.feed.set(|r| {
            r.front = Some(20);
            r.rear = Some(20);
            r.middle_side = Some(40);
            r.rear_corner = None;
        });
        assert!(rig.cycle_until("Idle", 5, 300));
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::PositioningExhausted))
        );
    }

    #[test]
    fn test_side_safety_while_backing() {
        let mut rig = Rig::new(Params::default());

        // Close on the side while searching is only a blocked sector
        rig.start_searching();
        rig.feed.set(|r| r.middle_side = Some(1));
        rig.cycle();
        assert_eq!(rig.parking.phase(), &ParkingPhase::Searching);

        let mut rig = Rig::new(Params::default());
        rig.start_parallel();
        rig.feed.set(|r| r.rear_corner = Some(1));
        rig.cycle();
        assert_eq!(
            rig.parking.phase(),
            &ParkingPhase::Stopping {
                outcome: ParkingOutcome::Failed(ParkingFailure::SafetyViolation)
            }
        );
        assert_eq!(rig.motion.speed_pct(), 0);
    }

    #[test]
    fn test_safety_violation() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();
        rig.cycle();

        rig.feed.set(|r| r.front = Some(3));
        rig.cycle();
        assert_eq!(
            rig.parking.phase(),
            &ParkingPhase::Stopping {
                outcome: ParkingOutcome::Failed(ParkingFailure::SafetyViolation)
            }
        );
        assert_eq!(rig.motion.speed_pct(), 0);

        rig.cycle();
        assert!(!rig.parking.is_parking());
        assert!(!rig.hub.is_monitoring());
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::SafetyViolation))
        );
    }

    #[test]
    fn test_stop_within_one_cycle() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();
        rig.cycle();
        assert!(rig.motion.speed_pct() > 0);

        rig.parking.stop(&mut rig.motion);
        assert_eq!(rig.motion.speed_pct(), 0);

        rig.cycle();
        assert!(!rig.parking.is_parking());
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::Cancelled))
        );
    }

    #[test]
    fn test_autonomy_lost() {
        let mut rig = Rig::new(Params::default());
        rig.start_searching();

        rig.motion.disable_autonomy();
        rig.cycle();
        rig.cycle();
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::Cancelled))
        );
    }

    #[test]
    fn test_search_exhausted() {
        let mut rig = Rig::new(Params {
            max_search_distance_cm: 50,
            ..Params::default()
        });
        rig.start_searching();

        assert!(rig.cycle_until("Idle", 10, 20));
        assert_eq!(
            rig.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::SearchExhausted))
        );
    }

    #[test]
    fn test_wait() {
        let mut parking = ParkingCtrl::new(Params::default());
        parking.wait_for(ParkingPhase::FinalAligning, 3, 10);

        assert!(!parking.wait(11));
        assert!(!parking.wait(12));
        assert!(parking.wait(13));
        assert_eq!(parking.phase(), &ParkingPhase::FinalAligning);

        // Not waiting, nothing to do
        assert!(!parking.wait(100));
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut rig = Rig::new(Params::default());
            let mut trace = vec![];
            rig.parking.initiate(&mut rig.motion);

            for i in 0..60u64 {
                let front_side = if (10..20).contains(&i) { 200 } else { 10 };
                rig.feed.set(|r| r.front_side = Some(front_side));
                rig.feed.advance(3);
                rig.cycle();
                trace.push((
                    rig.parking.phase().clone(),
                    rig.motion.dems(),
                    rig.parking.shortest_displacement(),
                ));
            }

            trace
        };

        assert_eq!(run(), run());
    }
}
