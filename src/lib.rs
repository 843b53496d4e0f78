//! SoundCampus speaks walking directions to visually impaired students as
//! they move around campus. This crate is the navigation engine behind it:
//! given where the user is and where they want to go, it produces a short
//! list of spoken instructions and then follows a stream of position fixes,
//! deciding when to say the next one and when the user has arrived.
//!
//! The engine never speaks, draws, or asks the device for a position. It
//! takes [`Fix`]es in and hands [`NavEvent`]s back, and whatever sits on
//! either side (GPS, text-to-speech, a screen) is somebody else's problem.
//!
//! - [`geodesy`]: haversine distance, bearings, turn classification
//! - [`route`]: the straight-line route synthesizer
//! - [`tracker`]: the progress state machine over a route
//! - [`navigator`]: an owned wrapper tying registry, fixes and tracker together
//! - [`registry`]: the read-only catalogue of campus locations
//! - [`position`] and [`fix_log`]: where fixes come from

pub mod args;
pub mod component;
pub mod fix_log;
pub mod geodesy;
pub mod gui;
pub mod navigator;
pub mod position;
pub mod registry;
pub mod route;
pub mod tracker;

pub use geodesy::Coordinate;
pub use navigator::{NavigationError, Navigator};
pub use position::Fix;
pub use registry::{CampusRegistry, LocationRegistry, NamedLocation};
pub use route::{synthesize, Direction, Instruction, Route};
pub use tracker::{NavEvent, TrackerSession, TrackerState};
