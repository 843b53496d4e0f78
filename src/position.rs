//! Where position fixes come from.
//!
//! The navigation engine never asks for a position. Something else produces
//! [`Fix`]es at whatever cadence it likes, and the caller forwards them. This
//! module holds the plumbing for that: a [`PositionSource`] trait, a
//! thread-safe [`FixBuffer`] to push fixes into from a reader thread, a
//! [`SimulatedWalk`] for demos and tests, and a [`FixAccumulator`] that
//! remembers the most recent fix.

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use crate::geodesy::{distance_meters, Coordinate, Meters, EARTH_RADIUS_M};

/// One reported position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Milliseconds since whatever epoch the producer uses.
    pub timestamp_ms: u64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: u64) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            timestamp_ms,
        }
    }
}

/// `PositionSource`
///
/// A clearable iterator that emits [`Fix`]es when iterated upon. Iteration
/// yields whatever is available right now; `None` means "nothing new", not
/// necessarily "never again".
pub trait PositionSource: Iterator<Item = Fix> {
    /// Drops any fixes that have not been consumed yet.
    fn clear(&mut self);
}

/// A [`PositionSource`] that simply acts as a thread-safe queue. Clones share
/// the same queue, so one clone can be handed to a producer thread.
#[derive(Debug, Clone, Default)]
pub struct FixBuffer {
    fixes: Arc<Mutex<VecDeque<Fix>>>,
}

impl FixBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fix behind the ones already waiting.
    pub fn push(&self, fix: Fix) {
        self.fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(fix);
    }

    pub fn pending(&self) -> usize {
        self.fixes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Iterator for FixBuffer {
    type Item = Fix;

    fn next(&mut self) -> Option<Self::Item> {
        self.fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl PositionSource for FixBuffer {
    fn clear(&mut self) {
        self.fixes.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Meters to degrees of latitude.
fn meters_to_latitude(meters: Meters) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

/// Meters to degrees of longitude at the given latitude.
fn meters_to_longitude(meters: Meters, latitude: f64) -> f64 {
    let scale = latitude.to_radians().cos().abs().max(1e-6);
    (meters / (EARTH_RADIUS_M * scale)).to_degrees()
}

/// A pretend pedestrian walking a straight line towards a target, one fix
/// per step. The walk ends with a fix on the target itself.
#[derive(Debug, Clone)]
pub struct SimulatedWalk {
    position: Coordinate,
    target: Coordinate,
    step: Meters,
    noise: Meters,
    interval_ms: u64,
    timestamp_ms: u64,
    finished: bool,
    rng: StdRng,
}

/// Builds a [`SimulatedWalk`].
#[derive(Debug, Clone)]
pub struct SimulatedWalkBuilder {
    from: Coordinate,
    to: Coordinate,
    step: Meters,
    noise: Meters,
    interval_ms: u64,
    seed: u64,
}

impl SimulatedWalkBuilder {
    /// Distance covered between two fixes. Defaults to 7 meters.
    pub fn step(mut self, step: Meters) -> Self {
        self.step = step;
        self
    }

    /// Uniform jitter applied to every reported fix, in meters. Defaults to 0.
    /// A non-finite value turns the jitter off.
    pub fn noise(mut self, noise: Meters) -> Self {
        self.noise = noise;
        self
    }

    /// Gap between fix timestamps. Defaults to 5000 ms.
    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> SimulatedWalk {
        SimulatedWalk {
            position: self.from,
            target: self.to,
            // A walk that never moves would never end.
            step: if self.step > 0.0 { self.step } else { 1.0 },
            noise: if self.noise.is_finite() {
                self.noise.abs()
            } else {
                0.0
            },
            interval_ms: self.interval_ms,
            timestamp_ms: 0,
            finished: false,
            rng: StdRng::seed_from_u64(self.seed),
        }
    }
}

impl SimulatedWalk {
    pub fn builder(from: Coordinate, to: Coordinate) -> SimulatedWalkBuilder {
        SimulatedWalkBuilder {
            from,
            to,
            step: 7.0,
            noise: 0.0,
            interval_ms: 5000,
            seed: 0,
        }
    }

    /// Where the walker really is, before noise.
    pub fn true_position(&self) -> Coordinate {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn jitter(&mut self, coordinate: Coordinate) -> Coordinate {
        if self.noise == 0.0 {
            return coordinate;
        }
        let north = self.rng.gen_range(-self.noise..=self.noise);
        let east = self.rng.gen_range(-self.noise..=self.noise);
        Coordinate::new(
            coordinate.latitude + meters_to_latitude(north),
            coordinate.longitude + meters_to_longitude(east, coordinate.latitude),
        )
    }
}

impl Iterator for SimulatedWalk {
    type Item = Fix;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let remaining = distance_meters(&self.position, &self.target);
        if remaining <= self.step {
            self.position = self.target;
            self.finished = true;
        } else {
            let fraction = self.step / remaining;
            self.position = Coordinate::new(
                self.position.latitude + (self.target.latitude - self.position.latitude) * fraction,
                self.position.longitude
                    + (self.target.longitude - self.position.longitude) * fraction,
            );
        }

        self.timestamp_ms += self.interval_ms;
        let coordinate = self.jitter(self.position);
        Some(Fix {
            coordinate,
            timestamp_ms: self.timestamp_ms,
        })
    }
}

impl PositionSource for SimulatedWalk {
    fn clear(&mut self) {}
}

/// The `FixAccumulator` consumes fixes from a [`PositionSource`] and keeps
/// the latest one.
#[derive(Debug)]
pub struct FixAccumulator<S>
where
    S: PositionSource,
{
    source: S,
    last: Option<Fix>,
    received: usize,
}

impl<S> FixAccumulator<S>
where
    S: PositionSource,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            last: None,
            received: 0,
        }
    }

    /// Drains the source and returns the most recent fix seen so far.
    pub fn latest(&mut self) -> Option<Fix> {
        for fix in self.source.by_ref() {
            self.last = Some(fix);
            self.received += 1;
        }
        debug!("{} fixes received so far", self.received);
        self.last
    }

    /// Pulls exactly one fix from the source, if it has one.
    pub fn poll_one(&mut self) -> Option<Fix> {
        let fix = self.source.next()?;
        self.last = Some(fix);
        self.received += 1;
        Some(fix)
    }

    pub fn has_location(&self) -> bool {
        self.last.is_some()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Forgets the latest fix and drops whatever is still queued in the
    /// source. The received count is kept.
    pub fn reset(&mut self) {
        self.source.clear();
        self.last = None;
    }
}
