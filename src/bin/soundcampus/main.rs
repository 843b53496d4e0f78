//! Command line front end: inspect the campus registry, print routes, and
//! run navigations from a simulated walk or a recorded fix log.

use clap::Parser;
use log::{info, warn};
use soundcampus::{
    args::{CommandTask, NavArgs, NearestCommand, ReplayCommand, RouteCommand, SimulateCommand},
    component::run_component,
    fix_log::read_fix_log_path,
    geodesy::{format_distance, CompassPoint},
    navigator::{plan_route, DEFAULT_POLL_INTERVAL},
    position::{Fix, SimulatedWalk},
    CampusRegistry, Coordinate, LocationRegistry, NamedLocation, NavEvent, NavigationError,
    Navigator, TrackerState,
};
use std::{error::Error, path::PathBuf, process, sync::mpsc::channel, time::Duration};

// Example:
// cargo run --bin soundcampus -- route --from loc1 --to loc4
// cargo run --bin soundcampus -- simulate --to loc3 --lat 39.9042 --lon 116.4074 --noise 2

fn main() {
    env_logger::init();
    let args = NavArgs::parse();

    let result = load_registry(args.registry.as_ref()).and_then(|registry| match args.command {
        CommandTask::Locations => list_locations(&registry),
        CommandTask::Nearest(cmd) => nearest(&registry, cmd),
        CommandTask::Route(cmd) => route(&registry, cmd),
        CommandTask::Simulate(cmd) => simulate(registry, cmd),
        CommandTask::Replay(cmd) => replay(registry, cmd),
    });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn load_registry(path: Option<&PathBuf>) -> Result<CampusRegistry, Box<dyn Error>> {
    match path {
        Some(path) => {
            let registry = CampusRegistry::from_path(path)?;
            info!("Loaded {} locations from {}", registry.len(), path.display());
            Ok(registry)
        }
        None => Ok(CampusRegistry::builtin()),
    }
}

fn lookup<'a>(registry: &'a CampusRegistry, id: &str) -> Result<&'a NamedLocation, NavigationError> {
    registry
        .by_id(id)
        .ok_or_else(|| NavigationError::UnknownLocation(id.to_owned()))
}

fn list_locations(registry: &CampusRegistry) -> Result<(), Box<dyn Error>> {
    for location in registry.all() {
        println!(
            "{:<6} {:<26} {:<12} {}  {}",
            location.id,
            location.name,
            location.category,
            location.coordinate,
            location.description
        );
    }
    Ok(())
}

fn nearest(registry: &CampusRegistry, cmd: NearestCommand) -> Result<(), Box<dyn Error>> {
    let here = Coordinate::new(cmd.latitude, cmd.longitude);
    let nearest = registry.nearest(&here).ok_or(NavigationError::NoRoute)?;
    let distance = here.distance_to(&nearest.coordinate);
    let heading = CompassPoint::from_bearing(here.bearing_to(&nearest.coordinate));
    println!(
        "{} ({}), {} to the {}",
        nearest.name,
        nearest.id,
        format_distance(distance),
        heading
    );
    Ok(())
}

fn route(registry: &CampusRegistry, cmd: RouteCommand) -> Result<(), Box<dyn Error>> {
    let start = lookup(registry, &cmd.from)?;
    let destination = lookup(registry, &cmd.to)?;
    let route = plan_route(Some(start), Some(destination))?;
    let heading = CompassPoint::from_bearing(start.coordinate.bearing_to(&destination.coordinate));

    println!(
        "{} -> {}: {}, heading {}",
        start.name,
        destination.name,
        format_distance(route.total_distance),
        heading
    );
    for (i, instruction) in route.instructions.iter().enumerate() {
        println!("  {}. {}", i + 1, instruction.description);
    }
    Ok(())
}

fn print_events(events: &[NavEvent]) -> bool {
    let mut arrived = false;
    for event in events {
        println!("{}", event);
        arrived |= matches!(event, NavEvent::Arrived { .. });
    }
    arrived
}

fn simulate(registry: CampusRegistry, cmd: SimulateCommand) -> Result<(), Box<dyn Error>> {
    let from = Coordinate::new(cmd.latitude, cmd.longitude);
    let to = lookup(&registry, &cmd.to)?.coordinate;

    let mut navigator = Navigator::new(registry);
    navigator.on_fix(Fix {
        coordinate: from,
        timestamp_ms: 0,
    });
    print_events(&navigator.start(&cmd.to)?);
    if let Some(status) = navigator.status_line() {
        println!("{}", status);
    }

    let walk = SimulatedWalk::builder(from, to)
        .step(cmd.step)
        .noise(cmd.noise)
        .interval_ms(DEFAULT_POLL_INTERVAL.as_millis() as u64)
        .seed(cmd.seed)
        .build();

    let (fix_tx, fix_rx) = channel();
    let (event_tx, event_rx) = channel();
    let handle = run_component(Box::new(navigator), fix_rx, event_tx);

    for fix in walk {
        fix_tx.send(fix)?;
        let events = event_rx.recv()?;
        if print_events(&events) {
            break;
        }
        if cmd.interval_ms > 0 {
            spin_sleep::sleep(Duration::from_millis(cmd.interval_ms));
        }
    }

    drop(fix_tx);
    let navigator = handle
        .join()
        .map_err(|_| "navigator thread panicked".to_owned())?;
    if navigator.session().state() != TrackerState::Arrived {
        warn!("Walk ended without arriving");
    }
    Ok(())
}

fn replay(registry: CampusRegistry, cmd: ReplayCommand) -> Result<(), Box<dyn Error>> {
    let fixes = read_fix_log_path(&cmd.file)?;
    info!("Replaying {} fixes from {}", fixes.len(), cmd.file.display());

    let mut fixes = fixes.into_iter();
    let first = fixes.next().ok_or(NavigationError::NoLocation)?;

    let mut navigator = Navigator::new(registry);
    navigator.on_fix(first);
    print_events(&navigator.start(&cmd.to)?);

    for fix in fixes {
        if print_events(&navigator.on_fix(fix)) {
            return Ok(());
        }
    }

    println!(
        "Log ended while {}",
        match navigator.session().state() {
            TrackerState::Navigating => "still navigating",
            TrackerState::Arrived => "arrived",
            TrackerState::Idle => "idle",
        }
    );
    Ok(())
}
