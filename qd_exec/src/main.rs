//! Main quadruped executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Leg control processing
//!         - Archiving
//!         - Pose frame output
//!
//! # Modules
//!
//! All modules (e.g. `leg_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use qd_lib::data_store::DataStore;

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::eqpt::leg_msg::{encode_pose, Pose};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options of the executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "qd_exec", about = "Quadruped leg control executable")]
struct Opts {
    /// TC script to execute. Without a script the stance is held.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// File to append the network order pose frame of every cycle to.
    #[structopt(long, parse(from_os_str))]
    pose_out: Option<PathBuf>,

    /// Stop after this many cycles.
    #[structopt(long)]
    cycles: Option<u128>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    /// No telecommands, hold the stance.
    None,
    Script(ScriptInterpreter),
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
    let session = Session::new("qd_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("QD Leg Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- INITIALISE TC SOURCE ----

    let mut tc_source = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            // Load the script interpreter
            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            // Display some info
            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            TcSource::Script(si)
        }
        None => {
            info!("No script provided, holding the stance\n");
            TcSource::None
        }
    };

    // ---- INITIALISE OUTPUTS ----

    let mut pose_out = match opts.pose_out {
        Some(ref path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create the pose output file {:?}", path))?;
            info!("Writing pose frames to {:?}", path);
            Some(BufWriter::new(file))
        }
        None => None,
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.leg_ctrl
        .init("leg_ctrl.toml", &session)
        .wrap_err("Failed to initialise LegCtrl")?;
    info!("LegCtrl init complete");

    if let Some(robot) = ds.leg_ctrl.robot() {
        info!("Stance angles:");
        robot.print_ik_angles();
    }

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        match tc_source {
            TcSource::None => (),
            TcSource::Script(ref mut si) => match si.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                }
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break;
                }
            },
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.leg_ctrl.proc(&ds.leg_ctrl_input) {
            Ok((o, r)) => {
                ds.leg_ctrl_output = o;
                ds.leg_ctrl_status_rpt = r;
            }
            Err(e) => return Err(e).wrap_err("Error during LegCtrl processing"),
        };

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.leg_ctrl.write() {
            warn!("Could not write LegCtrl archive: {}", e);
        }

        // ---- POSE OUTPUT ----

        if let Some(ref mut w) = pose_out {
            let timestamp_ms = (ds.session_time_s * 1000.0) as u32;
            let frame = encode_pose(&Pose::from_angles(&ds.leg_ctrl_output, timestamp_ms)).to_bytes();

            w.write_all(&frame).wrap_err("Failed to write a pose frame")?;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();

        if let Some(max_cycles) = opts.cycles {
            if ds.num_cycles >= max_cycles {
                info!("Executed {} cycles, stopping", ds.num_cycles);
                break;
            }
        }
    }

    // ---- SHUTDOWN ----

    if let Some(mut w) = pose_out {
        w.flush().wrap_err("Failed to flush the pose output file")?;
    }

    info!("Final angles:");
    if let Some(robot) = ds.leg_ctrl.robot() {
        robot.print_ik_angles();
    }

    info!("End of execution");

    Ok(())
}
