//! Read-only reference data: the named places a user can navigate between.
//!
//! A registry is loaded once, from a RON file or from the built-in campus,
//! and is never written by the navigation engine. Files look like this:
//!
//! ```text
//! (
//!     locations: [
//!         (id: "loc1", name: "Teaching Building 1",
//!          coordinate: (latitude: 39.9042, longitude: 116.4074),
//!          description: "Main teaching area", category: "teaching"),
//!     ],
//!     routes: [
//!         (start_id: "loc1", end_id: "loc2", distance: 140.1),
//!     ],
//! )
//! ```
//!
//! The `routes` table is optional. It is kept as reference data only; route
//! synthesis works from coordinates and never consults it.

use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    collections::HashSet,
    fmt::{self, Display},
    fs::File,
    io::Read,
    path::Path,
};

use crate::geodesy::{distance_meters, Coordinate, Meters};

/// A point of interest on campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl NamedLocation {
    pub fn new(
        id: &str,
        name: &str,
        coordinate: Coordinate,
        description: &str,
        category: &str,
    ) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            coordinate,
            description: description.to_owned(),
            category: category.to_owned(),
        }
    }
}

impl Display for NamedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A recorded distance between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub start_id: String,
    pub end_id: String,
    pub distance: Meters,
}

/// Read-only lookup over the known [`NamedLocation`]s.
pub trait LocationRegistry {
    /// Every location, ordered by display name.
    fn all(&self) -> Vec<&NamedLocation>;

    /// The location with the given id, if any.
    fn by_id(&self, id: &str) -> Option<&NamedLocation>;

    /// The location closest to `coordinate`. The first of several equally
    /// close locations wins. `None` only when the registry is empty.
    fn nearest(&self, coordinate: &Coordinate) -> Option<&NamedLocation> {
        let mut best: Option<(&NamedLocation, Meters)> = None;
        for location in self.all() {
            let distance = distance_meters(coordinate, &location.coordinate);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((location, distance)),
            }
        }
        best.map(|(location, _)| location)
    }
}

/// Everything that can go wrong while loading a registry file.
#[derive(Debug)]
pub enum RegistryError {
    /// Two locations share an id.
    DuplicateId(String),

    /// Returned when io fails when reading a registry file.
    IoError(std::io::Error),

    /// Returned when serializing the registry fails.
    RonError(ron::Error),

    /// Returned when the registry file is not valid RON for this schema.
    RonSpannedError(ron::de::SpannedError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use RegistryError as RE;
        let msg = match self {
            RE::DuplicateId(id) => Cow::from(format!("duplicate location id '{}'", id)),
            RE::IoError(error) => Cow::from(format!("io error: {}", error)),
            RE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            RE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RegistryFile {
    locations: Vec<NamedLocation>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
}

/// The in-memory [`LocationRegistry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampusRegistry {
    // Sorted by name at construction so `all()` is a plain borrow.
    locations: Vec<NamedLocation>,
    routes: Vec<RouteRecord>,
}

impl CampusRegistry {
    /// Builds a registry from a list of locations. Ids must be unique.
    pub fn new(locations: Vec<NamedLocation>) -> Result<Self, RegistryError> {
        Self::with_routes(locations, Vec::new())
    }

    fn with_routes(
        mut locations: Vec<NamedLocation>,
        routes: Vec<RouteRecord>,
    ) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for location in &locations {
            if !seen.insert(location.id.as_str()) {
                return Err(RegistryError::DuplicateId(location.id.clone()));
            }
        }
        // Stable, so equal names keep file order.
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { locations, routes })
    }

    /// The eight default campus points.
    pub fn builtin() -> Self {
        let seed = [
            ("loc1", "Teaching Building 1", "Main teaching area", "teaching"),
            ("loc2", "Teaching Building 2", "Science and engineering classes", "teaching"),
            ("loc3", "Library", "University library", "library"),
            ("loc4", "Cafeteria", "Student cafeteria", "cafeteria"),
            ("loc5", "Dormitory", "Student housing", "dormitory"),
            ("loc6", "Laboratory Building", "Laboratories", "laboratory"),
            ("loc7", "Gymnasium", "Sports center", "gym"),
            ("loc8", "Administration Building", "Administrative offices", "admin"),
        ];
        let locations = seed
            .iter()
            .enumerate()
            .map(|(i, (id, name, description, category))| {
                let step = i as f64 * 0.001;
                NamedLocation::new(
                    id,
                    name,
                    Coordinate::new(39.9042 + step, 116.4074 + step),
                    description,
                    category,
                )
            })
            .collect();

        // The seed ids are distinct literals.
        Self::with_routes(locations, Vec::new()).unwrap_or_default()
    }

    /// Parses a registry from RON text.
    pub fn from_ron(text: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = ron::de::from_str(text).map_err(RegistryError::RonSpannedError)?;
        Self::with_routes(file.locations, file.routes)
    }

    /// Read a registry from the path provided.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let mut handle = File::open(path).map_err(RegistryError::IoError)?;
        Self::from_file(&mut handle)
    }

    /// Read a registry from the [Read]able object provided.
    pub fn from_file(file: &mut impl Read) -> Result<Self, RegistryError> {
        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(RegistryError::IoError)?;
        Self::from_ron(&text)
    }

    /// Renders the registry back into the file format.
    pub fn to_ron(&self) -> Result<String, RegistryError> {
        let file = RegistryFile {
            locations: self.locations.clone(),
            routes: self.routes.clone(),
        };
        ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
            .map_err(RegistryError::RonError)
    }

    /// The recorded distances between locations, as found in the file.
    pub fn recorded_routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl LocationRegistry for CampusRegistry {
    fn all(&self) -> Vec<&NamedLocation> {
        self.locations.iter().collect()
    }

    fn by_id(&self, id: &str) -> Option<&NamedLocation> {
        self.locations.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_campus() {
        let registry = CampusRegistry::builtin();
        assert_eq!(registry.len(), 8);

        let library = registry.by_id("loc3").unwrap();
        assert_eq!(library.name, "Library");
        assert!((library.coordinate.latitude - 39.9062).abs() < 1e-9);
        assert!((library.coordinate.longitude - 116.4094).abs() < 1e-9);

        let names: Vec<_> = registry.all().iter().map(|l| l.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(registry.by_id("loc9").is_none());
    }

    #[test]
    fn nearest_location() {
        let registry = CampusRegistry::builtin();
        let near_library = Coordinate::new(39.90625, 116.40935);
        assert_eq!(registry.nearest(&near_library).unwrap().id, "loc3");

        let far_away = Coordinate::new(0.0, 0.0);
        assert_eq!(registry.nearest(&far_away).unwrap().id, "loc1");
    }

    #[test]
    fn nearest_tie_goes_to_first() {
        let registry = CampusRegistry::new(vec![
            NamedLocation::new("b", "Alpha", Coordinate::new(0.0, 0.001), "", ""),
            NamedLocation::new("a", "Beta", Coordinate::new(0.0, -0.001), "", ""),
        ])
        .unwrap();
        let nearest = registry.nearest(&Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(nearest.name, "Alpha");
    }

    #[test]
    fn empty_registry_has_no_nearest() {
        let registry = CampusRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.nearest(&Coordinate::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = CampusRegistry::new(vec![
            NamedLocation::new("x", "One", Coordinate::new(0.0, 0.0), "", ""),
            NamedLocation::new("x", "Two", Coordinate::new(1.0, 1.0), "", ""),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateId(id)) if id == "x"));
    }

    #[test]
    fn parses_ron_with_optional_fields() {
        let text = r#"(
            locations: [
                (id: "gate", name: "North Gate",
                 coordinate: (latitude: 10.0, longitude: 20.0)),
            ],
        )"#;
        let registry = CampusRegistry::from_ron(text).unwrap();
        let gate = registry.by_id("gate").unwrap();
        assert_eq!(gate.description, "");
        assert_eq!(gate.category, "");
        assert!(registry.recorded_routes().is_empty());
    }

    #[test]
    fn bad_ron_is_reported() {
        let result = CampusRegistry::from_ron("(locations: [(id: 3)])");
        assert!(matches!(result, Err(RegistryError::RonSpannedError(_))));
    }

    #[test]
    fn file_round_trip() {
        let original = CampusRegistry::with_routes(
            CampusRegistry::builtin().locations,
            vec![RouteRecord {
                start_id: "loc1".to_owned(),
                end_id: "loc2".to_owned(),
                distance: 140.1,
            }],
        )
        .unwrap();

        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(original.to_ron().unwrap().as_bytes())
            .unwrap();

        let loaded = CampusRegistry::from_path(tempfile.path()).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.recorded_routes().len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CampusRegistry::from_path("/definitely/not/here.ron");
        assert!(matches!(result, Err(RegistryError::IoError(_))));
    }
}
