//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the data store from the parameters
//!     - Main loop:
//!         - Bus event acquisition (read as JSON lines from stdin by a reader thread)
//!         - Event handling:
//!             - Telemetry decoding
//!             - Connection state tracking
//!         - Trajectory playback
//!         - Bus request output (written as JSON lines to stdout)
//!
//! An optional single argument gives the path to a trajectory file, which is played as soon as
//! the executable starts. The executable stops once stdin is closed and no playback is ongoing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use arm_lib::{
    arm_config::Joint,
    data_store::DataStore,
    params::ArmExecParams,
    traj_player::{PathFile, StepOutcome},
};
use comms_if::bus::{BusEvent, BusRequest};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("2-Link Arm Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams =
        util::params::load("arm.toml").wrap_err("Could not load arm params")?;

    info!("Exec parameters loaded");

    // ---- LOAD TRAJECTORY ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let path_file = match args.len() {
        1 => {
            info!("No trajectory provided, waiting for bus events\n");
            None
        }
        2 => {
            info!("Loading trajectory from \"{}\"", &args[1]);

            let file_str = fs::read_to_string(&args[1])
                .wrap_err_with(|| format!("Failed to read trajectory file {}", &args[1]))?;
            let file: PathFile =
                serde_json::from_str(&file_str).wrap_err("Failed to parse the trajectory file")?;

            info!("Loaded trajectory contains {} points\n", file.points.len());
            Some(file)
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(params.arm.clone(), params.history_len)
        .wrap_err("Failed to initialise the DataStore")?;

    info!(
        "Arm workspace sampled ({} points)",
        ds.workspace().len()
    );
    info!("Module initialisation complete\n");

    // ---- INITIALISE BUS ----

    let (req_tx, req_rx) = channel::<BusRequest>();
    let event_rx = spawn_event_reader();

    if let Some(ref bus) = params.bus {
        let req = BusRequest::connect(&bus.port, bus.baudrate, &bus.ids)
            .wrap_err("Invalid bus parameters")?;
        req_tx.send(req).ok();
        info!("Connection to {} requested", bus.port);
    }

    if let Some(file) = path_file {
        ds.trajectory = file.points;
        ds.start_playback(file.transform, req_tx.clone(), Instant::now())
            .wrap_err("Failed to start playback")?;
    }

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);
    let mut input_open = true;
    let mut stdout = io::stdout();

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- EVENT HANDLING ----

        while input_open {
            match event_rx.try_recv() {
                Ok(event) => ds.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("Bus event stream closed");
                    input_open = false;
                }
            }
        }

        // ---- PLAYBACK ----

        if let Some(rpt) = ds.player.poll(Instant::now()) {
            if let StepOutcome::Commanded { ticks, .. } = rpt.outcome {
                debug!(
                    "Point {} commanded: {:?}, measured: {:?} deg",
                    rpt.index,
                    ticks,
                    [
                        ds.measured_joint_deg(Joint::Shoulder),
                        ds.measured_joint_deg(Joint::Elbow)
                    ]
                );
            }
        }

        // ---- REQUEST OUTPUT ----

        write_requests(&req_rx, &mut stdout).wrap_err("Failed to write bus requests")?;

        if !input_open && !ds.player.is_playing() {
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Sleep until the end of the cycle, or until the next point is due if that's sooner
        let mut sleep_dur = cycle_period.checked_sub(cycle_dur);
        if let (Some(d), Some(due)) = (sleep_dur, ds.player.next_due()) {
            sleep_dur = Some(d.min(due.saturating_duration_since(Instant::now())));
        }

        match sleep_dur {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    if params.bus.is_some() {
        req_tx.send(BusRequest::DisconnectServos).ok();
        write_requests(&req_rx, &mut stdout).wrap_err("Failed to write bus requests")?;
    }

    session.save("telemetry.json", ds.telemetry.snapshot());

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Spawn the thread reading bus events from stdin.
///
/// The returned channel disconnects once stdin is closed.
fn spawn_event_reader() -> Receiver<BusEvent> {
    let (tx, rx) = channel();

    thread::spawn(move || read_events(tx));

    rx
}

fn read_events(tx: Sender<BusEvent>) {
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("Could not read from stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match BusEvent::from_json(&line) {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Could not parse bus event: {}", e),
        }
    }
}

/// Write all pending requests to the output as JSON lines.
fn write_requests<W: Write>(rx: &Receiver<BusRequest>, out: &mut W) -> Result<(), Report> {
    for req in rx.try_iter() {
        let json = req.to_json().wrap_err("Failed to serialise a bus request")?;
        writeln!(out, "{}", json)?;
    }

    out.flush()?;

    Ok(())
}
