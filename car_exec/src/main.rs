//! Main car-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Intent processing
//!         - SensorHub polling
//!         - Parking maneuver step, or MotionCtrl autonomous update
//!         - Simulation step
//!
//! Intents are taken from a script, and the peripherals are simulated.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use car_lib::{
    data_store::DataStore,
    intent_processor,
    motion_ctrl::MotionCtrl,
    parking::ParkingCtrl,
    sensor_hub::SensorHub,
    sim::{self, SimWorld},
};
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingIntents, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "car_exec", about = "Autonomous parking car executable")]
struct Opts {
    /// Path to the intent script to execute.
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Number of cycles to keep running after the last scripted intent.
    #[structopt(long, default_value = "0")]
    linger_cycles: u128,

    /// Run cycles back to back instead of at the cycle period.
    #[structopt(long)]
    fast: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("car_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Autonomous Car Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", opts.script);

    let mut si = ScriptInterpreter::new(&opts.script)
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {} cycles and contains {} intents\n",
        si.get_duration(),
        si.get_num_intents()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let sim_params: sim::Params = util::params::load("sim.toml")
        .wrap_err("Could not load the simulation parameters")?;
    let (world, sensors, drive, aux) = SimWorld::with_devices(sim_params);
    info!("Simulation initialised");

    let sensor_hub = SensorHub::init("sensor_hub.toml", sensors, Box::new(aux))
        .wrap_err("Failed to initialise the SensorHub")?;
    info!("SensorHub init complete");

    let motion_ctrl = MotionCtrl::init("motion_ctrl.toml", Box::new(drive))
        .wrap_err("Failed to initialise MotionCtrl")?;
    info!("MotionCtrl init complete");

    let parking = ParkingCtrl::init("parking.toml")
        .wrap_err("Failed to initialise ParkingCtrl")?;
    info!("ParkingCtrl init complete");

    let mut ds = DataStore::new(sensor_hub, motion_ctrl, parking);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut end_cycle: Option<u128> = None;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- INTENT PROCESSING ----

        match si.get_pending_intents(ds.num_cycles as u64) {
            PendingIntents::None => (),
            PendingIntents::Some(intents) => {
                for intent in intents.iter() {
                    intent_processor::exec(&mut ds, intent);
                }
            }
            PendingIntents::EndOfScript => {
                if end_cycle.is_none() {
                    info!("End of intent script reached");
                    end_cycle = Some(ds.num_cycles + opts.linger_cycles);
                }
            }
        }

        if let Some(end) = end_cycle {
            if ds.num_cycles >= end {
                break;
            }
        }

        // ---- CONTROL PROCESSING ----

        ds.cycle();

        world.borrow_mut().step();

        // ---- CYCLE MANAGEMENT ----

        if opts.fast {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    // ---- SHUTDOWN ----

    info!("Final pose: {:?}", world.borrow().pose());
    match ds.parking.last_outcome() {
        Some(o) => info!("Last parking maneuver {}", o),
        None => info!("No parking maneuver completed"),
    }
    info!("End of execution after {} cycles", ds.num_cycles);

    Ok(())
}
