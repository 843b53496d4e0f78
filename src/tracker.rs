//! The navigation progress tracker.
//!
//! A [`TrackerSession`] is a plain value. Every operation consumes the old
//! session and hands back the next one together with the [`NavEvent`]s the
//! transition produced, so the caller owns the state and decides how the
//! events are spoken or shown.
//!
//! ```text
//!            start                  distance < 10 m
//!   Idle ------------> Navigating -----------------> Arrived
//!    ^                     |                            |
//!    +------ stop ---------+------------ stop ----------+
//! ```
//!
//! Only one instruction is considered per update. If fixes arrive so rarely
//! that the user covers more than one leg between them, the skipped leg is
//! never announced; the next update only moves the cursor forward by one.

use log::{debug, info};
use std::fmt::Display;

use crate::geodesy::{distance_meters, Coordinate, Meters};
use crate::registry::NamedLocation;
use crate::route::{Instruction, Route};

/// Closer than this to the destination and the route is complete.
pub const ARRIVAL_THRESHOLD_M: Meters = 10.0;

/// The cursor moves on once the remaining distance drops below this fraction
/// of the current leg.
pub const ADVANCE_FACTOR: f64 = 0.5;

/// Something the presentation layer should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// Navigation towards the named destination has begun.
    Started { destination: String },
    /// Speak this instruction.
    Announce(String),
    /// The user is at the named destination.
    Arrived { destination: String },
    /// Navigation was cancelled.
    Stopped,
}

impl Display for NavEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavEvent::Started { destination } => {
                write!(f, "Navigation started, destination: {}", destination)
            }
            NavEvent::Announce(text) => write!(f, "{}", text),
            NavEvent::Arrived { destination } => {
                write!(f, "You have arrived at {}", destination)
            }
            NavEvent::Stopped => write!(f, "Navigation stopped"),
        }
    }
}

/// Coarse state of a [`TrackerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Navigating,
    Arrived,
}

/// Progress through a single route.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrackerSession {
    #[default]
    Idle,
    Navigating {
        route: Route,
        /// Cursor into `route.instructions`, never past its length.
        index: usize,
    },
    Arrived {
        destination: NamedLocation,
    },
}

impl TrackerSession {
    /// Begins a fresh session on `route`, announcing its first instruction.
    pub fn start(route: Route) -> (Self, Vec<NavEvent>) {
        let mut events = vec![NavEvent::Started {
            destination: route.destination.name.clone(),
        }];
        if let Some(first) = route.instructions.first() {
            events.push(NavEvent::Announce(first.announcement()));
        }

        info!(
            "Navigation started: {} -> {} ({:.1} m, {} instructions)",
            route.start.name,
            route.destination.name,
            route.total_distance,
            route.len()
        );

        (TrackerSession::Navigating { route, index: 0 }, events)
    }

    /// Feeds one position fix into the session.
    ///
    /// Anything other than a navigating session is returned untouched with
    /// no events.
    pub fn update(self, position: &Coordinate) -> (Self, Vec<NavEvent>) {
        let (route, index) = match self {
            TrackerSession::Navigating { route, index } => (route, index),
            other => return (other, Vec::new()),
        };

        let remaining = distance_meters(position, &route.destination.coordinate);

        if remaining < ARRIVAL_THRESHOLD_M {
            info!(
                "Arrived at {} ({:.1} m away, instruction {})",
                route.destination.name, remaining, index
            );
            let events = vec![NavEvent::Arrived {
                destination: route.destination.name.clone(),
            }];
            return (
                TrackerSession::Arrived {
                    destination: route.destination,
                },
                events,
            );
        }

        let threshold = match route.instructions.get(index) {
            Some(current) => current.distance_meters as f64 * ADVANCE_FACTOR,
            None => return (TrackerSession::Navigating { route, index }, Vec::new()),
        };

        if remaining < threshold {
            let index = index + 1;
            let events = match route.instructions.get(index) {
                Some(next) => {
                    info!("Advancing to instruction {}: {}", index, next.description);
                    vec![NavEvent::Announce(next.announcement())]
                }
                None => Vec::new(),
            };
            return (TrackerSession::Navigating { route, index }, events);
        }

        // Also reached when `remaining` is NaN.
        debug!(
            "{:.1} m to go, holding instruction {} (advances below {:.1} m)",
            remaining, index, threshold
        );
        (TrackerSession::Navigating { route, index }, Vec::new())
    }

    /// Cancels whatever is going on. Always lands in [`TrackerSession::Idle`]
    /// and always reports [`NavEvent::Stopped`].
    pub fn stop(self) -> (Self, Vec<NavEvent>) {
        if self.state() != TrackerState::Idle {
            info!("Navigation stopped from {:?}", self.state());
        }
        (TrackerSession::Idle, vec![NavEvent::Stopped])
    }

    pub fn state(&self) -> TrackerState {
        match self {
            TrackerSession::Idle => TrackerState::Idle,
            TrackerSession::Navigating { .. } => TrackerState::Navigating,
            TrackerSession::Arrived { .. } => TrackerState::Arrived,
        }
    }

    /// True while a route is held and the destination has not been reached.
    pub fn is_active(&self) -> bool {
        match self {
            TrackerSession::Navigating { route, index } => *index < route.len(),
            _ => false,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            TrackerSession::Navigating { route, .. } => Some(route),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            TrackerSession::Navigating { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn current_instruction(&self) -> Option<&Instruction> {
        match self {
            TrackerSession::Navigating { route, index } => route.instructions.get(*index),
            _ => None,
        }
    }
}
