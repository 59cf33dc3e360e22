//! # Intent processor module
//!
//! The intent processor applies command intents coming from any source (remote control, joystick,
//! script) to the data store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::data_store::DataStore;
use comms_if::intent::{CameraAim, Intent, StickAxis};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Range of joystick axis positions.
const AXIS_RANGE: (f64, f64) = (-100.0, 100.0);

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute an intent.
///
/// Mutates the datastore to send commands to different modules. Motion intents are rejected while
/// a parking maneuver is in progress, the maneuver must be stopped first.
pub fn exec(ds: &mut DataStore, intent: &Intent) {
    debug!("Executing intent {:?}", intent);

    if intent.is_motion() && ds.parking.is_parking() {
        warn!("Rejected {:?} while parking ({})", intent, ds.parking.phase());
        return;
    }

    match intent {
        Intent::Drive(direction) => ds.motion_ctrl.go(*direction),
        Intent::Stop => {
            ds.parking.stop(&mut ds.motion_ctrl);
            ds.motion_ctrl.stop();
        }
        Intent::Speed { speed_pct } => ds.motion_ctrl.set_manual_speed(*speed_pct),
        Intent::Course { course_deg } => ds.motion_ctrl.enable_tracking_course(*course_deg),
        Intent::DriftCorrection(true) => ds.motion_ctrl.enable_drift_correction(),
        Intent::DriftCorrection(false) => ds.motion_ctrl.disable_drift_correction(),
        Intent::Autonomy(true) => ds.motion_ctrl.enable_autonomy(),
        Intent::Autonomy(false) => ds.motion_ctrl.disable_autonomy(),
        Intent::Parking(true) => ds.parking.initiate(&mut ds.motion_ctrl),
        Intent::Parking(false) => ds.parking.stop(&mut ds.motion_ctrl),
        Intent::Siren(true) => ds.sensor_hub.siren_on(),
        Intent::Siren(false) => ds.sensor_hub.siren_off(),
        Intent::Camera(CameraAim::Left) => ds.sensor_hub.camera_left(),
        Intent::Camera(CameraAim::Right) => ds.sensor_hub.camera_right(),
        Intent::Axis { axis, position } => exec_axis(ds, *axis, *position),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a joystick axis position onto speed or steering.
fn exec_axis(ds: &mut DataStore, axis: StickAxis, position: i32) {
    let position = (position as f64).max(AXIS_RANGE.0).min(AXIS_RANGE.1);

    match axis {
        StickAxis::LeftY => {
            let max = ds.motion_ctrl.params().max_speed_pct as f64;
            let speed_pct = lin_map(AXIS_RANGE, (-max, max), position).round() as i32;
            ds.motion_ctrl.drive_speed(speed_pct);
        }
        StickAxis::LeftX | StickAxis::RightX => {
            let max = ds.motion_ctrl.params().max_angle_deg as f64;
            let angle_deg = lin_map(AXIS_RANGE, (-max, max), position).round() as i32;
            ds.motion_ctrl.steer(angle_deg);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        motion_ctrl::{self, MotionCtrl},
        parking::{self, ParkingCtrl, ParkingFailure, ParkingOutcome},
        sensor_hub::{self, SensorHub},
        sim::{AuxRecord, ManualFeed, ManualReadings, RecordingActuator, RecordingAux},
    };
    use comms_if::intent::Direction;

    fn data_store() -> (DataStore, AuxRecord) {
        let feed = ManualFeed::new(ManualReadings {
            front_side: Some(10),
            ..ManualReadings::default()
        });
        let (aux, aux_record) = RecordingAux::new();
        let (act, _) = RecordingActuator::new();

        let ds = DataStore::new(
            SensorHub::new(sensor_hub::Params::default(), feed.sensor_suite(), Box::new(aux)),
            MotionCtrl::new(motion_ctrl::Params::default(), Box::new(act)),
            ParkingCtrl::new(parking::Params::default())
        );

        (ds, aux_record)
    }

    #[test]
    fn test_manual_intents() {
        let (mut ds, aux) = data_store();

        exec(&mut ds, &Intent::Speed { speed_pct: 60 });
        exec(&mut ds, &Intent::Drive(Direction::ForwardRight));
        assert_eq!(ds.motion_ctrl.speed_pct(), 60);
        assert_eq!(ds.motion_ctrl.angle_deg(), motion_ctrl::Params::default().diag_angle_deg);

        exec(&mut ds, &Intent::Siren(true));
        assert!(aux.siren());
        exec(&mut ds, &Intent::Camera(CameraAim::Left));
        assert_eq!(aux.camera(), Some(CameraAim::Left));

        exec(&mut ds, &Intent::Course { course_deg: 90 });
        assert!(ds.motion_ctrl.is_tracking_course());

        exec(&mut ds, &Intent::Stop);
        assert_eq!(ds.motion_ctrl.speed_pct(), 0);
        assert!(!ds.motion_ctrl.is_tracking_course());
    }

    #[test]
    fn test_axis() {
        let (mut ds, _) = data_store();

        exec(&mut ds, &Intent::Axis { axis: StickAxis::LeftY, position: 50 });
        assert_eq!(ds.motion_ctrl.speed_pct(), 50);

        exec(&mut ds, &Intent::Axis { axis: StickAxis::RightX, position: -100 });
        assert_eq!(ds.motion_ctrl.angle_deg(), -90);

        // Out of range positions saturate
        exec(&mut ds, &Intent::Axis { axis: StickAxis::LeftX, position: 250 });
        assert_eq!(ds.motion_ctrl.angle_deg(), 90);
    }

    #[test]
    fn test_motion_rejected_while_parking() {
        let (mut ds, _) = data_store();

        exec(&mut ds, &Intent::Parking(true));
        assert!(ds.parking.is_parking());

        exec(&mut ds, &Intent::Drive(Direction::Backward));
        assert_eq!(ds.motion_ctrl.speed_pct(), 0);

        // Non motion intents still go through
        exec(&mut ds, &Intent::Siren(true));
        assert!(ds.sensor_hub.is_siren_on());

        exec(&mut ds, &Intent::Stop);
        ds.cycle();
        assert!(!ds.parking.is_parking());
        assert_eq!(
            ds.parking.last_outcome(),
            Some(&ParkingOutcome::Failed(ParkingFailure::Cancelled))
        );

        exec(&mut ds, &Intent::Drive(Direction::Backward));
        assert!(ds.motion_ctrl.speed_pct() < 0);
    }
}
