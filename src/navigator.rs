//! The owned face of the engine: a [`Navigator`] holds the registry, the
//! most recent position fix and the current [`TrackerSession`], and exposes
//! start / fix / stop as plain method calls that return [`NavEvent`]s.
//!
//! All calls must come from one caller, in order. Nothing here locks.

use log::{debug, info, warn};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    mem,
    time::Duration,
};

use crate::component::{Component, ComponentError};
use crate::geodesy::format_distance;
use crate::position::Fix;
use crate::registry::{LocationRegistry, NamedLocation};
use crate::route::{synthesize, Route};
use crate::tracker::{NavEvent, TrackerSession};

/// How often a caller is expected to feed fixes while navigating.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Why navigation could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A required input was missing or empty; names the input.
    InvalidInput(&'static str),

    /// No position fix has been received yet.
    NoLocation,

    /// The registry has nothing to start the route from. [`Navigator::start`]
    /// only returns this for a registry whose `by_id` finds entries that
    /// `all` does not list.
    NoRoute,

    /// No registry entry has this id.
    UnknownLocation(String),
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use NavigationError as NE;
        let msg = match self {
            NE::InvalidInput(what) => Cow::from(format!("invalid input: missing {}", what)),
            NE::NoLocation => Cow::from("no location available"),
            NE::NoRoute => Cow::from("no route available"),
            NE::UnknownLocation(id) => Cow::from(format!("unknown location '{}'", id)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for NavigationError {}

/// Synthesizes a route once both ends are known.
pub fn plan_route(
    start: Option<&NamedLocation>,
    destination: Option<&NamedLocation>,
) -> Result<Route, NavigationError> {
    let start = start.ok_or(NavigationError::InvalidInput("start"))?;
    let destination = destination.ok_or(NavigationError::InvalidInput("destination"))?;
    Ok(synthesize(start, destination))
}

/// Drives one navigation at a time over a [`LocationRegistry`].
#[derive(Debug)]
pub struct Navigator<R>
where
    R: LocationRegistry,
{
    registry: R,
    session: TrackerSession,
    last_fix: Option<Fix>,
}

impl<R> Navigator<R>
where
    R: LocationRegistry,
{
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            session: TrackerSession::Idle,
            last_fix: None,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn session(&self) -> &TrackerSession {
        &self.session
    }

    pub fn last_fix(&self) -> Option<Fix> {
        self.last_fix
    }

    pub fn has_location(&self) -> bool {
        self.last_fix.is_some()
    }

    /// Starts navigating from the registry location nearest the latest fix
    /// to the location with id `destination_id`. Any route already in
    /// progress is replaced.
    pub fn start(&mut self, destination_id: &str) -> Result<Vec<NavEvent>, NavigationError> {
        let fix = self.last_fix.ok_or(NavigationError::NoLocation)?;

        let destination_id = destination_id.trim();
        if destination_id.is_empty() {
            return Err(NavigationError::InvalidInput("destination"));
        }
        let destination = self
            .registry
            .by_id(destination_id)
            .ok_or_else(|| NavigationError::UnknownLocation(destination_id.to_owned()))?;

        let start = self
            .registry
            .nearest(&fix.coordinate)
            .ok_or(NavigationError::NoRoute)?;

        let route = plan_route(Some(start), Some(destination))?;
        Ok(self.start_route(route))
    }

    /// Starts navigating an already synthesized route.
    pub fn start_route(&mut self, route: Route) -> Vec<NavEvent> {
        if self.session.is_active() {
            info!("Replacing the active route");
        }
        let (session, events) = TrackerSession::start(route);
        self.session = session;
        events
    }

    /// Records `fix` as the current position and, while navigating, checks
    /// progress against it.
    pub fn on_fix(&mut self, fix: Fix) -> Vec<NavEvent> {
        debug!("Fix at {} ({} ms)", fix.coordinate, fix.timestamp_ms);
        self.last_fix = Some(fix);

        let (session, events) = mem::take(&mut self.session).update(&fix.coordinate);
        self.session = session;
        events
    }

    /// Cancels navigation. Safe to call in any state.
    pub fn stop(&mut self) -> Vec<NavEvent> {
        let (session, events) = mem::take(&mut self.session).stop();
        self.session = session;
        events
    }

    /// "Current location: X (N m)" for the registry entry nearest the latest
    /// fix, if there is both a fix and a registry entry.
    pub fn status_line(&self) -> Option<String> {
        let fix = self.last_fix?;
        let nearest = self.registry.nearest(&fix.coordinate)?;
        let distance = nearest.coordinate.distance_to(&fix.coordinate);
        Some(format!(
            "Current location: {} ({})",
            nearest.name,
            format_distance(distance)
        ))
    }
}

impl<R> Display for Navigator<R>
where
    R: LocationRegistry,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Navigator")
    }
}

impl<R> Component for Navigator<R>
where
    R: LocationRegistry,
{
    type InData = Fix;
    type OutData = Vec<NavEvent>;

    fn convert(&mut self, input: Fix) -> Vec<NavEvent> {
        self.on_fix(input)
    }

    /// Stops a route still in progress. The feed is already closed, so the
    /// `Stopped` event is logged rather than delivered.
    fn finalize(&mut self) -> Result<(), ComponentError> {
        if let TrackerSession::Navigating { route, .. } = &self.session {
            let destination = route.destination.name.clone();
            warn!("Position feed ended before reaching {}", destination);
            for event in self.stop() {
                info!("{}", event);
            }
            return Err(ComponentError::StillNavigating(destination));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::run_component;
    use crate::geodesy::Coordinate;
    use crate::position::SimulatedWalk;
    use crate::registry::CampusRegistry;
    use crate::tracker::TrackerState;
    use std::sync::mpsc::channel;

    fn navigator() -> Navigator<CampusRegistry> {
        Navigator::new(CampusRegistry::builtin())
    }

    #[test]
    fn refuses_without_a_fix() {
        let mut nav = navigator();
        assert_eq!(nav.start("loc2"), Err(NavigationError::NoLocation));
        assert_eq!(nav.session().state(), TrackerState::Idle);
    }

    #[test]
    fn refuses_bad_destinations() {
        let mut nav = navigator();
        nav.on_fix(Fix::new(39.9042, 116.4074, 0));
        assert_eq!(
            nav.start("  "),
            Err(NavigationError::InvalidInput("destination"))
        );
        assert_eq!(
            nav.start("nowhere"),
            Err(NavigationError::UnknownLocation("nowhere".to_owned()))
        );
        assert!(!nav.session().is_active());
    }

    #[test]
    fn refuses_with_an_empty_registry() {
        let mut nav = Navigator::new(CampusRegistry::default());
        nav.on_fix(Fix::new(0.0, 0.0, 0));
        // The destination lookup fails first.
        assert_eq!(
            nav.start("loc1"),
            Err(NavigationError::UnknownLocation("loc1".to_owned()))
        );
        assert!(nav.status_line().is_none());
    }

    /// Knows a single location by id but lists nothing.
    struct HiddenRegistry(NamedLocation);

    impl LocationRegistry for HiddenRegistry {
        fn all(&self) -> Vec<&NamedLocation> {
            Vec::new()
        }

        fn by_id(&self, id: &str) -> Option<&NamedLocation> {
            (self.0.id == id).then_some(&self.0)
        }
    }

    #[test]
    fn refuses_when_nothing_to_start_from() {
        let library = NamedLocation::new(
            "loc3",
            "Library",
            Coordinate::new(39.9052, 116.4084),
            "",
            "",
        );
        let mut nav = Navigator::new(HiddenRegistry(library));
        nav.on_fix(Fix::new(39.9042, 116.4074, 0));
        assert_eq!(nav.start("loc3"), Err(NavigationError::NoRoute));
        assert_eq!(nav.session().state(), TrackerState::Idle);
    }

    #[test]
    fn plan_route_needs_both_ends() {
        let registry = CampusRegistry::builtin();
        let library = registry.by_id("loc3");
        assert_eq!(
            plan_route(None, library),
            Err(NavigationError::InvalidInput("start"))
        );
        assert_eq!(
            plan_route(library, None),
            Err(NavigationError::InvalidInput("destination"))
        );
        assert_eq!(plan_route(library, library).unwrap().len(), 2);
    }

    #[test]
    fn starts_from_nearest_location() {
        let mut nav = navigator();
        // A few meters from Teaching Building 1.
        nav.on_fix(Fix::new(39.90422, 116.40741, 0));
        let events = nav.start("loc3").unwrap();

        let route = nav.session().route().unwrap();
        assert_eq!(route.start.id, "loc1");
        assert_eq!(route.destination.id, "loc3");
        assert_eq!(
            events[0],
            NavEvent::Started {
                destination: "Library".to_owned()
            }
        );
        assert_eq!(
            events[1],
            NavEvent::Announce("Go straight for 140 meters".to_owned())
        );
        assert_eq!(
            nav.status_line().unwrap(),
            "Current location: Teaching Building 1 (2 m)"
        );
    }

    #[test]
    fn walks_to_the_library() {
        let mut nav = navigator();
        let registry = CampusRegistry::builtin();
        let from = registry.by_id("loc1").unwrap().coordinate;
        let to = registry.by_id("loc3").unwrap().coordinate;

        nav.on_fix(Fix {
            coordinate: from,
            timestamp_ms: 0,
        });
        nav.start("loc3").unwrap();

        let events: Vec<NavEvent> = SimulatedWalk::builder(from, to)
            .step(5.0)
            .build()
            .flat_map(|fix| nav.on_fix(fix))
            .collect();

        assert_eq!(
            events,
            vec![
                NavEvent::Announce("Go straight for 140 meters".to_owned()),
                NavEvent::Announce("Arrived at Library".to_owned()),
                NavEvent::Arrived {
                    destination: "Library".to_owned()
                },
            ]
        );
        assert_eq!(nav.session().state(), TrackerState::Arrived);
    }

    #[test]
    fn stop_then_fixes_are_quiet() {
        let mut nav = navigator();
        nav.on_fix(Fix::new(39.9042, 116.4074, 0));
        nav.start("loc8").unwrap();
        assert_eq!(nav.stop(), vec![NavEvent::Stopped]);
        assert_eq!(nav.stop(), vec![NavEvent::Stopped]);
        assert!(nav.on_fix(Fix::new(39.9112, 116.4144, 1)).is_empty());
        assert_eq!(nav.session().state(), TrackerState::Idle);
    }

    #[test]
    fn runs_as_a_component() {
        let mut nav = navigator();
        let start = Coordinate::new(39.9042, 116.4074);
        nav.on_fix(Fix {
            coordinate: start,
            timestamp_ms: 0,
        });
        nav.start("loc2").unwrap();

        let (fix_tx, fix_rx) = channel();
        let (event_tx, event_rx) = channel();
        let handle = run_component(Box::new(nav), fix_rx, event_tx);

        // About 28 m short: past half of the first leg, not yet arrived.
        fix_tx.send(Fix::new(39.9050, 116.4082, 5000)).unwrap();
        assert_eq!(event_rx.recv().unwrap().len(), 1);
        drop(fix_tx);

        let nav = handle.join().unwrap();
        // Finalizing an unfinished route stops it.
        assert_eq!(nav.session().state(), TrackerState::Idle);
    }

    #[test]
    fn finalize_after_arrival_is_clean() {
        let mut nav = navigator();
        nav.on_fix(Fix::new(39.9042, 116.4074, 0));
        nav.start("loc2").unwrap();
        nav.on_fix(Fix::new(39.9052, 116.4084, 1));
        assert_eq!(nav.finalize(), Ok(()));

        let mut nav = navigator();
        nav.on_fix(Fix::new(39.9042, 116.4074, 0));
        nav.start("loc2").unwrap();
        assert_eq!(
            nav.finalize(),
            Err(ComponentError::StillNavigating(
                "Teaching Building 2".to_owned()
            ))
        );
        assert_eq!(nav.session().state(), TrackerState::Idle);
        // Already stopped: finalizing again is clean.
        assert_eq!(nav.finalize(), Ok(()));
    }
}
