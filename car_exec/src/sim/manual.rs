//! Hand driven devices
//!
//! Readings are set directly by the caller each cycle, and demands sent to the actuator are
//! recorded, so that scenarios can be played out exactly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::eqpt::{
    AuxOutputs, DriveActuator, HeadingSensor, Odometer, RangeFinder, SensorSuite,
};
use comms_if::{eqpt::drive::DriveDems, intent::CameraAim};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Values every device attached to a [`ManualFeed`] will report on its next read.
///
/// `None` is reported as "no reading".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualReadings {
    pub front: Option<u32>,
    pub front_side: Option<u32>,
    pub middle_side: Option<u32>,
    pub rear_corner: Option<u32>,
    pub rear: Option<u32>,
    pub left_cm: Option<u64>,
    pub right_cm: Option<u64>,
    pub heading_deg: Option<i32>,
}

/// Source of readings shared by a set of manual devices.
#[derive(Clone)]
pub struct ManualFeed {
    readings: Rc<RefCell<ManualReadings>>,
}

/// A device reading one value out of the feed.
struct ManualDevice<T> {
    readings: Rc<RefCell<ManualReadings>>,
    pick: fn(&ManualReadings) -> Option<T>,
}

/// Every set of demands an actuator received, oldest first.
#[derive(Clone, Default)]
pub struct DemsRecord(Rc<RefCell<Vec<DriveDems>>>);

/// Actuator which records its demands.
pub struct RecordingActuator {
    record: DemsRecord,
}

/// Latest state of the auxiliary outputs.
#[derive(Clone, Default)]
pub struct AuxRecord {
    siren: Rc<Cell<bool>>,
    camera: Rc<Cell<Option<CameraAim>>>,
}

/// Auxiliary outputs which record their state.
pub struct RecordingAux {
    record: AuxRecord,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ManualFeed {
    pub fn new(readings: ManualReadings) -> Self {
        Self {
            readings: Rc::new(RefCell::new(readings)),
        }
    }

    /// Change the readings.
    pub fn set<F: FnOnce(&mut ManualReadings)>(&self, f: F) {
        f(&mut self.readings.borrow_mut());
    }

    /// Add the same distance to both odometers, treating "no reading" as zero.
    pub fn advance(&self, distance_cm: u64) {
        self.set(|r| {
            r.left_cm = Some(r.left_cm.unwrap_or(0) + distance_cm);
            r.right_cm = Some(r.right_cm.unwrap_or(0) + distance_cm);
        });
    }

    /// Build a full sensor suite reading from this feed.
    pub fn sensor_suite(&self) -> SensorSuite {
        SensorSuite {
            front: self.device::<u32>(|r| r.front),
            front_side: self.device::<u32>(|r| r.front_side),
            middle_side: self.device::<u32>(|r| r.middle_side),
            rear_corner: self.device::<u32>(|r| r.rear_corner),
            rear: self.device::<u32>(|r| r.rear),
            odometer_left: self.device::<u64>(|r| r.left_cm),
            odometer_right: self.device::<u64>(|r| r.right_cm),
            heading: self.device::<i32>(|r| r.heading_deg),
        }
    }

    fn device<T>(&self, pick: fn(&ManualReadings) -> Option<T>) -> Box<ManualDevice<T>> {
        Box::new(ManualDevice {
            readings: self.readings.clone(),
            pick,
        })
    }
}

impl<T> ManualDevice<T> {
    fn read(&self) -> Option<T> {
        (self.pick)(&self.readings.borrow())
    }
}

impl RangeFinder for ManualDevice<u32> {
    fn read_cm(&mut self) -> Option<u32> {
        self.read()
    }
}

impl Odometer for ManualDevice<u64> {
    fn distance_cm(&mut self) -> Option<u64> {
        self.read()
    }
}

impl HeadingSensor for ManualDevice<i32> {
    fn heading_deg(&mut self) -> Option<i32> {
        self.read()
    }
}

impl DemsRecord {
    pub fn last(&self) -> Option<DriveDems> {
        self.0.borrow().last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn all(&self) -> Vec<DriveDems> {
        self.0.borrow().clone()
    }
}

impl RecordingActuator {
    pub fn new() -> (Self, DemsRecord) {
        let record = DemsRecord::default();
        (
            Self {
                record: record.clone(),
            },
            record,
        )
    }
}

impl DriveActuator for RecordingActuator {
    fn actuate(&mut self, dems: DriveDems) {
        self.record.0.borrow_mut().push(dems);
    }
}

impl AuxRecord {
    pub fn siren(&self) -> bool {
        self.siren.get()
    }

    pub fn camera(&self) -> Option<CameraAim> {
        self.camera.get()
    }
}

impl RecordingAux {
    pub fn new() -> (Self, AuxRecord) {
        let record = AuxRecord::default();
        (
            Self {
                record: record.clone(),
            },
            record,
        )
    }
}

impl AuxOutputs for RecordingAux {
    fn set_siren(&mut self, on: bool) {
        self.record.siren.set(on);
    }

    fn aim_camera(&mut self, aim: CameraAim) {
        self.record.camera.set(Some(aim));
    }
}
