//! Implementations for the SensorHub state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};

// Internal
use super::{
    HeadingState, MonitorAction, OdometryState, Params, Range, RangeSnapshot,
    SectorEdge, SectorMonitor, SensorHubError, Snapshot, TravelDirection,
};
use crate::eqpt::{AuxOutputs, SensorSuite};
use comms_if::intent::CameraAim;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// SensorHub module state
pub struct SensorHub {
    params: Params,

    sensors: SensorSuite,
    aux: Box<dyn AuxOutputs>,

    enabled: bool,

    /// Number of calls to `update`, counted whether or not polling is enabled.
    tick: u64,

    snapshot: Snapshot,

    /// Raw heading considered to be zero.
    heading_offset_deg: i32,

    monitor: SectorMonitor,

    siren_on: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SensorHub {
    /// Create a new hub owning the given peripherals.
    ///
    /// Polling starts enabled.
    pub fn new(params: Params, sensors: SensorSuite, aux: Box<dyn AuxOutputs>) -> Self {
        Self {
            params,
            sensors,
            aux,
            enabled: true,
            tick: 0,
            snapshot: Snapshot::default(),
            heading_offset_deg: 0,
            monitor: SectorMonitor::default(),
            siren_on: false,
        }
    }

    /// Initialise the hub, loading the parameters from the given file.
    pub fn init(
        params_path: &str,
        sensors: SensorSuite,
        aux: Box<dyn AuxOutputs>
    ) -> Result<Self, SensorHubError> {
        let params = params::load(params_path)
            .map_err(SensorHubError::ParamLoadError)?;

        Ok(Self::new(params, sensors, aux))
    }

    /// Poll every peripheral once and replace the snapshot.
    ///
    /// Does nothing but count the tick while disabled.
    pub fn update(&mut self) {
        self.tick += 1;

        if !self.enabled {
            // No new sample, so no edge is being passed
            self.monitor.clear_edge();
            return;
        }

        let ranges = RangeSnapshot {
            front: self.sensors.front.read_cm().into(),
            front_side: self.sensors.front_side.read_cm().into(),
            middle_side: self.sensors.middle_side.read_cm().into(),
            rear_corner: self.sensors.rear_corner.read_cm().into(),
            rear: self.sensors.rear.read_cm().into(),
        };

        let prev_odo = self.snapshot.odometry;
        let left_cm = self.sensors.odometer_left.distance_cm().unwrap_or(prev_odo.left_cm);
        let right_cm = self.sensors.odometer_right.distance_cm().unwrap_or(prev_odo.right_cm);
        let odometry = OdometryState::new(left_cm, right_cm, self.params.wheel_base_cm, &prev_odo);

        let heading = match self.sensors.heading.heading_deg() {
            Some(h) => HeadingState::new(h, self.heading_offset_deg),
            None => self.snapshot.heading,
        };

        self.snapshot = Snapshot {
            ranges,
            odometry,
            heading,
        };

        trace!("SensorHub snapshot {}: {:?}", self.tick, self.snapshot);

        if self.monitor.is_active() {
            let viable = self.is_sector_viable();
            self.monitor.sample(viable, odometry.average_cm);

            if let Some(edge) = self.monitor.edge() {
                debug!(
                    "Sector edge {:?} at {} cm (displacement {:?} cm)",
                    edge,
                    odometry.average_cm,
                    self.monitor.displacement_cm()
                );
            }
        }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            info!("SensorHub polling enabled");
        }
        self.enabled = true;
    }

    /// Stop polling. Accessors keep returning the last snapshot.
    pub fn disable(&mut self) {
        if self.enabled {
            info!("SensorHub polling disabled");
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The poll counter, used as the time base for all timers.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    // ---- ACCESSORS ----

    pub fn front(&self) -> Range {
        self.snapshot.ranges.front
    }

    pub fn front_side(&self) -> Range {
        self.snapshot.ranges.front_side
    }

    pub fn middle_side(&self) -> Range {
        self.snapshot.ranges.middle_side
    }

    pub fn rear_corner(&self) -> Range {
        self.snapshot.ranges.rear_corner
    }

    pub fn rear(&self) -> Range {
        self.snapshot.ranges.rear
    }

    pub fn odometry(&self) -> &OdometryState {
        &self.snapshot.odometry
    }

    pub fn heading(&self) -> &HeadingState {
        &self.snapshot.heading
    }

    /// Average speed over the last poll.
    ///
    /// Units: centimetres/tick
    pub fn avg_speed_cm_per_tick(&self) -> u64 {
        self.snapshot.odometry.delta_cm
    }

    /// Make the current raw heading the new zero of the synchronised heading.
    pub fn zero_heading(&mut self) {
        self.heading_offset_deg = self.snapshot.heading.raw_deg;
        self.snapshot.heading = HeadingState::new(
            self.snapshot.heading.raw_deg,
            self.heading_offset_deg
        );
        info!("Heading synchronised at raw {} deg", self.heading_offset_deg);
    }

    // ---- SECTOR ----

    /// Returns true if every sensor of the sector has room right now.
    ///
    /// The sector is the one for the monitored direction of travel, or the
    /// forward one when not monitoring.
    pub fn is_sector_viable(&self) -> bool {
        let r = &self.snapshot.ranges;

        match self.monitor.direction() {
            TravelDirection::Forward =>
                r.front_side.exceeds(self.params.front_side_clearance_cm)
                && r.middle_side.exceeds(self.params.middle_side_clearance_cm),
            TravelDirection::Reverse =>
                r.rear_corner.exceeds(self.params.rear_corner_clearance_cm)
                && r.rear.exceeds(self.params.rear_clearance_cm),
        }
    }

    /// Returns true if the sector has stayed viable over at least the minimum
    /// clear distance.
    pub fn is_clear_sector(&self) -> bool {
        self.monitor.is_clear(
            self.snapshot.odometry.average_cm,
            self.params.min_clear_distance_cm
        )
    }

    /// Start a monitoring session for the given direction of travel.
    pub fn monitor(&mut self, direction: TravelDirection) {
        self.monitor.start(direction, self.snapshot.odometry.average_cm);
        info!(
            "Sector monitoring started ({:?}) at {} cm",
            direction, self.snapshot.odometry.average_cm
        );
    }

    /// End monitoring, discarding in progress measurements.
    pub fn reset_monitor(&mut self) {
        if self.monitor.is_active() {
            info!("Sector monitoring reset");
        }
        self.monitor.reset();
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_active()
    }

    /// Apply a monitoring change requested by another module.
    pub fn apply_monitor_action(&mut self, action: MonitorAction) {
        match action {
            MonitorAction::None => (),
            MonitorAction::Start(direction) => self.monitor(direction),
            MonitorAction::Reset => self.reset_monitor(),
        }
    }

    /// Returns true on the sample where the sector's viability changed.
    pub fn passing_obstacle(&self) -> bool {
        self.monitor.edge().is_some()
    }

    /// The edge detected on the latest sample, if any.
    pub fn passing_edge(&self) -> Option<SectorEdge> {
        self.monitor.edge()
    }

    /// Odometry at the last two edges.
    ///
    /// Units: centimetres
    pub fn edge_displacement_cm(&self) -> Option<i64> {
        self.monitor.displacement_cm()
    }

    pub fn sector_start_cm(&self) -> Option<u64> {
        self.monitor.sector_start_cm()
    }

    pub fn sector_end_cm(&self) -> Option<u64> {
        self.monitor.sector_end_cm()
    }

    /// Length of the open gap, or of the last closed one.
    ///
    /// Units: centimetres
    pub fn gap_length_cm(&self) -> Option<u64> {
        self.monitor.gap_length_cm(self.snapshot.odometry.average_cm)
    }

    // ---- AUXILIARY OUTPUTS ----

    pub fn siren_on(&mut self) {
        self.siren_on = true;
        self.aux.set_siren(true);
    }

    pub fn siren_off(&mut self) {
        self.siren_on = false;
        self.aux.set_siren(false);
    }

    pub fn is_siren_on(&self) -> bool {
        self.siren_on
    }

    pub fn camera_left(&mut self) {
        self.aux.aim_camera(CameraAim::Left);
    }

    pub fn camera_right(&mut self) {
        self.aux.aim_camera(CameraAim::Right);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{AuxRecord, ManualFeed, ManualReadings, RecordingAux};

    fn hub_with(readings: ManualReadings) -> (SensorHub, ManualFeed, AuxRecord) {
        let feed = ManualFeed::new(readings);
        let (aux, record) = RecordingAux::new();
        let hub = SensorHub::new(Params::default(), feed.sensor_suite(), Box::new(aux));
        (hub, feed, record)
    }

    #[test]
    fn test_passing_obstacle_scenario() {
        let (mut hub, feed, _) = hub_with(ManualReadings::default());
        hub.update();
        hub.monitor(TravelDirection::Forward);

        let front_side = [200, 200, 200, 10, 200, 200];
        let mut passing = vec![];
        let mut odo_at = vec![];

        for (i, d) in front_side.iter().enumerate() {
            feed.set(|r| {
                r.front_side = Some(*d);
                r.left_cm = Some(10 * i as u64);
                r.right_cm = Some(10 * i as u64);
            });
            hub.update();
            passing.push(hub.passing_obstacle());
            odo_at.push(hub.odometry().average_cm as i64);
        }

        assert_eq!(passing, vec![false, false, false, true, true, false]);
        assert_eq!(hub.edge_displacement_cm(), Some(odo_at[4] - odo_at[3]));
    }

    #[test]
    fn test_snapshot_sentinels() {
        let (mut hub, feed, _) = hub_with(ManualReadings {
            front: Some(80),
            left_cm: Some(100),
            right_cm: Some(110),
            heading_deg: Some(45),
            ..ManualReadings::default()
        });
        hub.update();
        assert_eq!(hub.front(), Range::Echo(80));
        assert_eq!(hub.rear(), Range::NoEcho);
        assert_eq!(hub.odometry().average_cm, 105);
        assert_eq!(hub.heading().raw_deg, 45);

        // Missing readings keep the previous odometry and heading
        feed.set(|r| {
            r.front = None;
            r.left_cm = None;
            r.heading_deg = None;
        });
        hub.update();
        assert_eq!(hub.front(), Range::NoEcho);
        assert_eq!(hub.odometry().left_cm, 100);
        assert_eq!(hub.heading().raw_deg, 45);
        assert_eq!(hub.avg_speed_cm_per_tick(), 0);

        hub.zero_heading();
        assert_eq!(hub.heading().synced_deg, 0);
        feed.set(|r| r.heading_deg = Some(40));
        hub.update();
        assert_eq!(hub.heading().synced_deg, 355);
    }

    #[test]
    fn test_disabled_keeps_snapshot() {
        let (mut hub, feed, _) = hub_with(ManualReadings {
            front: Some(50),
            ..ManualReadings::default()
        });
        hub.update();
        hub.disable();
        feed.set(|r| r.front = Some(10));
        hub.update();

        assert!(!hub.is_enabled());
        assert_eq!(hub.front(), Range::Echo(50));
        assert_eq!(hub.tick(), 2);

        hub.enable();
        hub.update();
        assert_eq!(hub.front(), Range::Echo(10));
    }

    #[test]
    fn test_disabled_drops_edge() {
        let (mut hub, feed, _) = hub_with(ManualReadings::default());
        hub.update();
        hub.monitor(TravelDirection::Forward);
        hub.update();

        feed.set(|r| r.front_side = Some(10));
        hub.update();
        assert_eq!(hub.passing_edge(), Some(SectorEdge::GapClosed));

        hub.disable();
        for _ in 0..3 {
            hub.update();
            assert!(!hub.passing_obstacle());
            assert_eq!(hub.passing_edge(), None);
        }

        // The measurements survive, only the edge is gone
        assert!(hub.is_monitoring());
        assert_eq!(hub.edge_displacement_cm(), Some(0));
    }

    #[test]
    fn test_clear_sector() {
        let (mut hub, feed, _) = hub_with(ManualReadings::default());
        hub.update();
        hub.apply_monitor_action(MonitorAction::Start(TravelDirection::Forward));
        assert!(hub.is_monitoring());

        for odo in [0u64, 20, 40].iter() {
            feed.set(|r| {
                r.left_cm = Some(*odo);
                r.right_cm = Some(*odo);
            });
            hub.update();
        }
        assert!(hub.is_clear_sector());
        assert_eq!(hub.gap_length_cm(), Some(40));

        feed.set(|r| r.middle_side = Some(20));
        hub.update();
        assert!(!hub.is_sector_viable());
        assert!(!hub.is_clear_sector());
        assert_eq!(hub.passing_edge(), Some(SectorEdge::GapClosed));

        hub.apply_monitor_action(MonitorAction::Reset);
        assert!(!hub.is_monitoring());
        assert!(!hub.passing_obstacle());
    }

    #[test]
    fn test_aux_outputs() {
        let (mut hub, _, record) = hub_with(ManualReadings::default());
        hub.siren_on();
        assert!(hub.is_siren_on());
        assert!(record.siren());
        hub.siren_off();
        assert!(!record.siren());

        hub.camera_left();
        assert_eq!(record.camera(), Some(CameraAim::Left));
        hub.camera_right();
        assert_eq!(record.camera(), Some(CameraAim::Right));
    }
}
