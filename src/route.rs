//! Turns a start and a destination into the short list of spoken
//! [`Instruction`]s the tracker walks through.
//!
//! There is no path graph behind this. A route is the straight line between
//! the two points, split in half when it is long enough that the user should
//! hear something before arriving.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::geodesy::{classify_bearing, distance_meters, initial_bearing_degrees, Meters};
use crate::registry::NamedLocation;

/// Routes longer than this many whole meters get an intermediate leg.
pub const SPLIT_THRESHOLD_M: u32 = 100;

/// Which way an [`Instruction`] tells the user to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Straight,
    Left,
    Right,
    Arrived,
}

impl Direction {
    /// The spoken verb for this direction.
    pub fn text(&self) -> &'static str {
        match self {
            Direction::Straight => "Go straight",
            Direction::Left => "Turn left",
            Direction::Right => "Turn right",
            Direction::Arrived => "Arrive",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// One leg of a [`Route`], or the terminal arrival marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub direction: Direction,
    pub distance_meters: u32,
    pub description: String,
}

impl Instruction {
    /// A leg travelled in `direction` for `distance_meters`.
    pub fn leg(direction: Direction, distance_meters: u32) -> Self {
        Self {
            direction,
            distance_meters,
            description: format!("{} {} meters", direction.text(), distance_meters),
        }
    }

    /// The zero-length instruction that closes every route.
    pub fn arrival(destination: &NamedLocation) -> Self {
        Self {
            direction: Direction::Arrived,
            distance_meters: 0,
            description: format!("Arrived at {}", destination.name),
        }
    }

    pub fn is_arrival(&self) -> bool {
        self.direction == Direction::Arrived
    }

    /// What gets spoken when the tracker reaches this instruction. The
    /// arrival instruction speaks its own description.
    pub fn announcement(&self) -> String {
        if self.is_arrival() {
            self.description.clone()
        } else {
            format!("{} for {} meters", self.direction.text(), self.distance_meters)
        }
    }
}

/// A synthesized route. Instructions are in traversal order and the last one
/// is always [`Direction::Arrived`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub start: NamedLocation,
    pub destination: NamedLocation,
    pub instructions: Vec<Instruction>,
    /// Straight-line distance before truncation to whole meters.
    pub total_distance: Meters,
}

impl Route {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Sum of the leg lengths, which is the total distance in whole meters.
    pub fn leg_total(&self) -> u32 {
        self.instructions.iter().map(|i| i.distance_meters).sum()
    }
}

/// Builds the route from `start` to `destination`.
///
/// Up to [`SPLIT_THRESHOLD_M`] whole meters the route is a single straight
/// leg. Past it, the first half is straight and the second half goes in the
/// direction of the bearing between the two points. Either way an arrival
/// instruction is appended.
pub fn synthesize(start: &NamedLocation, destination: &NamedLocation) -> Route {
    let distance = distance_meters(&start.coordinate, &destination.coordinate);
    let bearing = initial_bearing_degrees(&start.coordinate, &destination.coordinate);
    let direction = classify_bearing(bearing);

    // Haversine never returns a negative, so the cast only truncates.
    let whole_meters = distance.floor() as u32;

    let mut instructions = Vec::with_capacity(3);
    if whole_meters > SPLIT_THRESHOLD_M {
        let first_leg = whole_meters / 2;
        instructions.push(Instruction::leg(Direction::Straight, first_leg));
        instructions.push(Instruction::leg(direction, whole_meters - first_leg));
    } else {
        instructions.push(Instruction::leg(Direction::Straight, whole_meters));
    }
    instructions.push(Instruction::arrival(destination));

    debug!(
        "Route {} -> {}: {:.1} m, bearing {:.1}, {} instructions",
        start.id,
        destination.id,
        distance,
        bearing,
        instructions.len()
    );

    Route {
        start: start.clone(),
        destination: destination.clone(),
        instructions,
        total_distance: distance,
    }
}
