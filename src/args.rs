// Commandline argument parser using clap for SoundCampus

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct NavArgs {
    #[command(subcommand)]
    /// Which task to perform
    pub command: CommandTask,

    /// RON file with the campus locations. The built-in campus is used when
    /// this is not given
    #[arg(short = 'r', long = "registry", global = true)]
    pub registry: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// List every known location
    #[command(about)]
    Locations,

    /// Find the known location closest to a coordinate
    #[command(about)]
    Nearest(NearestCommand),

    /// Print the spoken instructions between two known locations
    #[command(about)]
    Route(RouteCommand),

    /// Walk a simulated user to a destination and print what they would hear
    #[command(about)]
    Simulate(SimulateCommand),

    /// Replay a recorded fix log through the tracker
    #[command(about)]
    Replay(ReplayCommand),
}

#[derive(Debug, Args, Clone)]
pub struct NearestCommand {
    /// Latitude in degrees
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: f64,

    /// Longitude in degrees
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: f64,
}

#[derive(Debug, Args, Clone)]
pub struct RouteCommand {
    /// Id of the starting location
    #[arg(short = 'f', long = "from")]
    pub from: String,

    /// Id of the destination
    #[arg(short = 't', long = "to")]
    pub to: String,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateCommand {
    /// Id of the destination
    #[arg(short = 't', long = "to")]
    pub to: String,

    /// Latitude the walk starts at
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: f64,

    /// Longitude the walk starts at
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: f64,

    /// Meters walked between two fixes
    #[arg(short = 's', long = "step", default_value_t = 7.0)]
    pub step: f64,

    /// Uniform jitter added to every fix, in meters
    #[arg(short = 'n', long = "noise", default_value_t = 0.0)]
    pub noise: f64,

    /// Real time to wait between fixes, in milliseconds. 0 runs as fast as
    /// possible
    #[arg(short = 'i', long = "interval-ms", default_value_t = 0)]
    pub interval_ms: u64,

    /// Seed for the noise generator
    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ReplayCommand {
    /// Id of the destination
    #[arg(short = 't', long = "to")]
    pub to: String,

    /// Fix log to replay, one `FIX:<lat>,<lon>,<timestamp_ms>` per line
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        NavArgs::command().debug_assert();
    }

    #[test]
    fn parses_simulate() {
        let args = NavArgs::parse_from([
            "soundcampus",
            "simulate",
            "--to",
            "loc3",
            "--lat",
            "-39.9",
            "--lon",
            "116.4",
            "--noise",
            "2.5",
        ]);
        match args.command {
            CommandTask::Simulate(cmd) => {
                assert_eq!(cmd.to, "loc3");
                assert_eq!(cmd.latitude, -39.9);
                assert_eq!(cmd.noise, 2.5);
                assert_eq!(cmd.step, 7.0);
                assert_eq!(cmd.interval_ms, 0);
            }
            other => panic!("parsed {:?}", other),
        }
        assert!(args.registry.is_none());
    }

    #[test]
    fn registry_is_global() {
        let args = NavArgs::parse_from(["soundcampus", "locations", "--registry", "campus.ron"]);
        assert_eq!(args.registry, Some(PathBuf::from("campus.ron")));
    }
}
