//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use crate::{motion_ctrl::MotionCtrl, parking::ParkingCtrl, sensor_hub::SensorHub};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// Owns the three control modules and runs them in order on each cycle.
pub struct DataStore {
    /// Number of cycles already executed
    pub num_cycles: u128,

    pub sensor_hub: SensorHub,
    pub motion_ctrl: MotionCtrl,
    pub parking: ParkingCtrl,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(sensor_hub: SensorHub, motion_ctrl: MotionCtrl, parking: ParkingCtrl) -> Self {
        Self {
            num_cycles: 0,
            sensor_hub,
            motion_ctrl,
            parking,
        }
    }

    /// Execute one control cycle.
    ///
    /// The hub is polled first. A maneuver in progress then has sole control of the car,
    /// otherwise MotionCtrl performs its own autonomous update.
    pub fn cycle(&mut self) {
        self.sensor_hub.update();

        if self.parking.is_parking() {
            let action = self.parking.step(&self.sensor_hub, &mut self.motion_ctrl);
            self.sensor_hub.apply_monitor_action(action);
        }
        else {
            self.motion_ctrl.update(self.sensor_hub.snapshot());
        }

        trace!(
            "Cycle {} complete: phase {}, dems {:?}",
            self.num_cycles,
            self.parking.phase(),
            self.motion_ctrl.dems()
        );

        self.num_cycles += 1;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        motion_ctrl, parking, sensor_hub,
        sim::{ManualFeed, ManualReadings, RecordingActuator, RecordingAux},
    };

    fn data_store(feed: &ManualFeed) -> DataStore {
        let (aux, _) = RecordingAux::new();
        let (act, _) = RecordingActuator::new();

        DataStore::new(
            SensorHub::new(sensor_hub::Params::default(), feed.sensor_suite(), Box::new(aux)),
            MotionCtrl::new(motion_ctrl::Params::default(), Box::new(act)),
            ParkingCtrl::new(parking::Params::default())
        )
    }

    #[test]
    fn test_cycle_order() {
        let feed = ManualFeed::new(ManualReadings::default());
        let mut ds = data_store(&feed);

        ds.motion_ctrl.enable_autonomy();
        ds.motion_ctrl.forward();
        ds.cycle();
        assert_eq!(ds.num_cycles, 1);
        assert_eq!(ds.sensor_hub.tick(), 1);
        assert!(ds.motion_ctrl.speed_pct() > 0);

        // The autonomous update sees this cycle's snapshot
        feed.set(|r| r.front = Some(5));
        ds.cycle();
        assert_eq!(ds.motion_ctrl.speed_pct(), 0);
    }

    #[test]
    fn test_parking_takes_over() {
        let feed = ManualFeed::new(ManualReadings {
            front_side: Some(10),
            ..ManualReadings::default()
        });
        let mut ds = data_store(&feed);

        ds.parking.initiate(&mut ds.motion_ctrl);
        ds.cycle();
        assert!(ds.sensor_hub.is_monitoring());
        assert!(ds.motion_ctrl.is_autonomous());

        ds.parking.stop(&mut ds.motion_ctrl);
        ds.cycle();
        assert!(!ds.parking.is_parking());
        assert!(!ds.sensor_hub.is_monitoring());
    }
}
