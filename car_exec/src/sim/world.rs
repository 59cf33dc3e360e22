//! Kinematic simulation of the car in a street

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use log::{debug, trace, warn};

use super::{Obstacle, Params};
use crate::eqpt::{
    AuxOutputs, DriveActuator, HeadingSensor, Odometer, RangeFinder, SensorSuite,
};
use comms_if::{eqpt::drive::DriveDems, intent::CameraAim};
use util::maths::wrap_deg;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose of the car in the street frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x_cm: f64,
    pub y_cm: f64,

    /// Units: radians, clockwise from the x axis
    pub heading_rad: f64,
}

/// Mounting of a range finder on the car body.
///
/// Frame: x forwards, y to the right, angle clockwise from the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mount {
    x_cm: f64,
    y_cm: f64,
    angle_rad: f64,
}

/// Mounting positions of all the range finders.
#[derive(Debug, Clone, Copy)]
struct Mounts {
    front: Mount,
    front_side: Mount,
    middle_side: Mount,
    rear_corner: Mount,
    rear: Mount,
}

/// The simulated world: one car, some parked cars and a kerb.
pub struct SimWorld {
    params: Params,
    mounts: Mounts,
    pose: Pose,
    dems: DriveDems,

    /// Total distance covered by each wheel, regardless of direction.
    left_odo_cm: f64,
    right_odo_cm: f64,

    siren_on: bool,
    camera: Option<CameraAim>,
}

/// Shared handle to the world, as held by each simulated device.
pub type SharedWorld = Rc<RefCell<SimWorld>>;

/// Simulated range finder.
pub struct SimRangeFinder {
    world: SharedWorld,
    sensor: SimSensor,
}

/// Simulated wheel encoder.
pub struct SimOdometer {
    world: SharedWorld,
    wheel: Wheel,
}

/// Simulated gyroscope.
pub struct SimGyro {
    world: SharedWorld,
}

/// Simulated motor shield.
pub struct SimDrive {
    world: SharedWorld,
}

/// Simulated siren and camera mount.
pub struct SimAux {
    world: SharedWorld,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimSensor {
    Front,
    FrontSide,
    MiddleSide,
    RearCorner,
    Rear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: Params) -> Self {
        let half_len = params.car_length_cm / 2.0;
        let half_width = params.car_width_cm / 2.0;

        let mounts = Mounts {
            front: Mount {
                x_cm: half_len,
                y_cm: 0.0,
                angle_rad: 0.0,
            },
            front_side: Mount {
                x_cm: half_len - 5.0,
                y_cm: half_width,
                angle_rad: 90f64.to_radians(),
            },
            middle_side: Mount {
                x_cm: 0.0,
                y_cm: half_width,
                angle_rad: 90f64.to_radians(),
            },
            rear_corner: Mount {
                x_cm: -half_len,
                y_cm: half_width,
                angle_rad: 135f64.to_radians(),
            },
            rear: Mount {
                x_cm: -half_len,
                y_cm: 0.0,
                angle_rad: 180f64.to_radians(),
            },
        };

        let pose = Pose {
            x_cm: params.start_pose[0],
            y_cm: params.start_pose[1],
            heading_rad: params.start_pose[2].to_radians(),
        };

        Self {
            params,
            mounts,
            pose,
            dems: DriveDems::default(),
            left_odo_cm: 0.0,
            right_odo_cm: 0.0,
            siren_on: false,
            camera: None,
        }
    }

    /// Build a world and the full set of simulated devices attached to it.
    pub fn with_devices(params: Params) -> (SharedWorld, SensorSuite, SimDrive, SimAux) {
        let world = Rc::new(RefCell::new(Self::new(params)));

        let range = |sensor| -> Box<dyn RangeFinder> {
            Box::new(SimRangeFinder {
                world: world.clone(),
                sensor,
            })
        };

        let suite = SensorSuite {
            front: range(SimSensor::Front),
            front_side: range(SimSensor::FrontSide),
            middle_side: range(SimSensor::MiddleSide),
            rear_corner: range(SimSensor::RearCorner),
            rear: range(SimSensor::Rear),
            odometer_left: Box::new(SimOdometer {
                world: world.clone(),
                wheel: Wheel::Left,
            }),
            odometer_right: Box::new(SimOdometer {
                world: world.clone(),
                wheel: Wheel::Right,
            }),
            heading: Box::new(SimGyro {
                world: world.clone(),
            }),
        };

        let drive = SimDrive {
            world: world.clone(),
        };
        let aux = SimAux {
            world: world.clone(),
        };

        (world, suite, drive, aux)
    }

    /// Advance the world by one tick using the last demands received.
    pub fn step(&mut self) {
        let v = self.dems.speed_pct as f64 / 100.0 * self.params.max_speed_cm_per_tick;
        let r = if self.params.max_angle_deg > 0.0 {
            (self.dems.angle_deg as f64 / self.params.max_angle_deg).max(-1.0).min(1.0)
        }
        else {
            0.0
        };

        let left = v * (1.0 + r);
        let right = v * (1.0 - r);
        let dist = (left + right) / 2.0;
        let dtheta = (left - right) / self.params.wheel_base_cm;

        let mid_heading = self.pose.heading_rad + dtheta / 2.0;
        self.pose.x_cm += dist * mid_heading.cos();
        self.pose.y_cm += dist * mid_heading.sin();
        self.pose.heading_rad += dtheta;

        self.left_odo_cm += left.abs();
        self.right_odo_cm += right.abs();

        trace!("Sim pose: {:?}", self.pose);

        if self.is_colliding() {
            warn!("Sim car is in collision at {:?}", self.pose);
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn dems(&self) -> DriveDems {
        self.dems
    }

    pub fn siren_on(&self) -> bool {
        self.siren_on
    }

    pub fn camera(&self) -> Option<CameraAim> {
        self.camera
    }

    /// Heading in whole degrees, clockwise, in [0, 360).
    pub fn heading_deg(&self) -> i32 {
        wrap_deg(self.pose.heading_rad.to_degrees().round() as i32)
    }

    /// Range seen by the given sensor, `None` if nothing is within range.
    pub fn range_cm(&self, sensor: SimSensor) -> Option<u32> {
        let m = match sensor {
            SimSensor::Front => self.mounts.front,
            SimSensor::FrontSide => self.mounts.front_side,
            SimSensor::MiddleSide => self.mounts.middle_side,
            SimSensor::RearCorner => self.mounts.rear_corner,
            SimSensor::Rear => self.mounts.rear,
        };

        let (sin_h, cos_h) = self.pose.heading_rad.sin_cos();
        let origin = (
            self.pose.x_cm + m.x_cm * cos_h - m.y_cm * sin_h,
            self.pose.y_cm + m.x_cm * sin_h + m.y_cm * cos_h,
        );
        let ray_angle = self.pose.heading_rad + m.angle_rad;
        let dir = (ray_angle.cos(), ray_angle.sin());

        let mut nearest = self.params.obstacles
            .iter()
            .filter_map(|o| ray_box(origin, dir, o))
            .fold(f64::INFINITY, f64::min);

        if dir.1 > 1e-9 {
            let t = (self.params.kerb_y_cm - origin.1) / dir.1;
            if t >= 0.0 {
                nearest = nearest.min(t);
            }
        }

        if nearest <= self.params.max_range_cm {
            Some(nearest.round() as u32)
        }
        else {
            None
        }
    }

    /// Returns true if any corner of the car lies inside an obstacle.
    pub fn is_colliding(&self) -> bool {
        let half_len = self.params.car_length_cm / 2.0;
        let half_width = self.params.car_width_cm / 2.0;
        let (sin_h, cos_h) = self.pose.heading_rad.sin_cos();

        [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
            .iter()
            .map(|(sx, sy)| {
                let bx = sx * half_len;
                let by = sy * half_width;
                (
                    self.pose.x_cm + bx * cos_h - by * sin_h,
                    self.pose.y_cm + bx * sin_h + by * cos_h,
                )
            })
            .any(|(x, y)| {
                self.params.obstacles.iter().any(|o| {
                    x > o.x_min_cm && x < o.x_max_cm && y > o.y_min_cm && y < o.y_max_cm
                })
            })
    }
}

/// Distance along the ray to the box, using the slab method.
fn ray_box(origin: (f64, f64), dir: (f64, f64), o: &Obstacle) -> Option<f64> {
    let mut t_min = 0.0f64;
    let mut t_max = f64::INFINITY;

    for &(p, d, lo, hi) in [
        (origin.0, dir.0, o.x_min_cm, o.x_max_cm),
        (origin.1, dir.1, o.y_min_cm, o.y_max_cm),
    ].iter() {
        if d.abs() < 1e-9 {
            if p < lo || p > hi {
                return None;
            }
        }
        else {
            let t1 = (lo - p) / d;
            let t2 = (hi - p) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
    }

    if t_min <= t_max {
        Some(t_min)
    }
    else {
        None
    }
}

impl RangeFinder for SimRangeFinder {
    fn read_cm(&mut self) -> Option<u32> {
        self.world.borrow().range_cm(self.sensor)
    }
}

impl Odometer for SimOdometer {
    fn distance_cm(&mut self) -> Option<u64> {
        let w = self.world.borrow();
        let d = match self.wheel {
            Wheel::Left => w.left_odo_cm,
            Wheel::Right => w.right_odo_cm,
        };
        Some(d.floor() as u64)
    }
}

impl HeadingSensor for SimGyro {
    fn heading_deg(&mut self) -> Option<i32> {
        Some(self.world.borrow().heading_deg())
    }
}

impl DriveActuator for SimDrive {
    fn actuate(&mut self, dems: DriveDems) {
        self.world.borrow_mut().dems = dems;
    }
}

impl AuxOutputs for SimAux {
    fn set_siren(&mut self, on: bool) {
        debug!("Sim siren {}", if on { "on" } else { "off" });
        self.world.borrow_mut().siren_on = on;
    }

    fn aim_camera(&mut self, aim: CameraAim) {
        debug!("Sim camera aimed {:?}", aim);
        self.world.borrow_mut().camera = Some(aim);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
