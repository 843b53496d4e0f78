//! Terminal monitor: pick a destination, then watch a simulated walk there
//! and read everything the user would hear.

use clap::Parser;
use log::info;
use soundcampus::{
    gui::{destination_selector, fold_until_stop},
    navigator::DEFAULT_POLL_INTERVAL,
    position::{Fix, FixAccumulator, FixBuffer, SimulatedWalk},
    CampusRegistry, LocationRegistry, Navigator, TrackerState,
};
use std::{error::Error, path::PathBuf, sync::mpsc, thread, time::Duration};

#[derive(Debug, Parser)]
#[clap(version, about = "Watch a simulated navigation in the terminal")]
struct MonitorArgs {
    /// RON file with the campus locations
    #[arg(short = 'r', long = "registry")]
    registry: Option<PathBuf>,

    /// Id of the location the walk starts at
    #[arg(short = 'f', long = "from", default_value = "loc1")]
    from: String,

    /// Meters walked between two fixes
    #[arg(short = 's', long = "step", default_value_t = 7.0)]
    step: f64,

    /// Uniform jitter added to every fix, in meters
    #[arg(short = 'n', long = "noise", default_value_t = 2.0)]
    noise: f64,

    /// Real time between fixes, in milliseconds
    #[arg(short = 'i', long = "interval-ms", default_value_t = 500)]
    interval_ms: u64,
}

/// How long the fold waits when no fix is queued.
const IDLE_WAIT: Duration = Duration::from_millis(16);

type Walker = (Navigator<CampusRegistry>, FixAccumulator<FixBuffer>);

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = MonitorArgs::parse();

    let registry = match &args.registry {
        Some(path) => CampusRegistry::from_path(path)?,
        None => CampusRegistry::builtin(),
    };
    let from = registry
        .by_id(&args.from)
        .ok_or_else(|| format!("unknown location '{}'", args.from))?
        .coordinate;

    let destination = match destination_selector(&registry.all())? {
        Some(destination) => destination,
        None => return Ok(()),
    };
    info!("Walking to {}", destination.name);

    let (tx, rx) = mpsc::channel();
    let mut navigator = Navigator::new(registry);
    navigator.on_fix(Fix {
        coordinate: from,
        timestamp_ms: 0,
    });
    for event in navigator.start(&destination.id)? {
        tx.send(event.to_string())?;
    }

    let walk = SimulatedWalk::builder(from, destination.coordinate)
        .step(args.step)
        .noise(args.noise)
        .interval_ms(DEFAULT_POLL_INTERVAL.as_millis() as u64)
        .build();
    let pause = Duration::from_millis(args.interval_ms);

    // The walker reports from its own thread, like a receiver would.
    let buffer = FixBuffer::new();
    let producer = buffer.clone();
    thread::spawn(move || {
        for fix in walk {
            producer.push(fix);
            spin_sleep::sleep(pause);
        }
    });

    let step = move |(mut navigator, mut fixes): Walker| -> Walker {
        let fix = match fixes.poll_one() {
            Some(fix) => fix,
            None => {
                spin_sleep::sleep(IDLE_WAIT);
                return (navigator, fixes);
            }
        };

        let events = navigator.on_fix(fix);
        // The gui only stops listening once it is shutting down.
        for event in events {
            let _ = tx.send(event.to_string());
        }
        if navigator.session().state() == TrackerState::Arrived {
            // Whatever the walker reports after arrival is not worth reading.
            fixes.reset();
        } else if let Some(status) = navigator.status_line() {
            let _ = tx.send(format!("  {} at {} s", status, fix.timestamp_ms / 1000));
        }
        (navigator, fixes)
    };

    let (mut navigator, fixes) = fold_until_stop(
        "SoundCampus Navigation",
        (navigator, FixAccumulator::new(buffer)),
        step,
        rx,
    )?;
    info!("{} fixes received", fixes.received());

    match navigator.session().state() {
        TrackerState::Arrived => println!("Arrived at {}", destination.name),
        _ => {
            for event in navigator.stop() {
                println!("{}", event);
            }
        }
    }
    Ok(())
}
