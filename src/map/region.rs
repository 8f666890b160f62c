// src/map/region.rs
//! Map types, coordinates and visible regions

use serde::{Deserialize, Serialize};

/// Base layer shown under the overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Standard,
    Satellite,
    Hybrid,
    Terrain,
}

impl MapType {
    pub fn display_name(&self) -> &str {
        match self {
            MapType::Standard => "Map",
            MapType::Satellite => "Satellite",
            MapType::Hybrid => "Hybrid",
            MapType::Terrain => "Terrain",
        }
    }

    pub fn all() -> [MapType; 4] {
        [MapType::Standard, MapType::Satellite, MapType::Hybrid, MapType::Terrain]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Visible map window: a centre and the spans in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// Whole-archipelago view the screen opens with
    pub const INITIAL: Region = Region {
        latitude: 12.8797,
        longitude: 121.774,
        latitude_delta: 15.0,
        longitude_delta: 12.0,
    };

    /// A square region of `delta` degrees centred on a coordinate
    pub fn centered_on(center: Coordinate, delta: f64) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            latitude_delta: delta,
            longitude_delta: delta,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (point.latitude - self.latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.longitude).abs() <= self.longitude_delta / 2.0
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_region_contains_manila() {
        assert!(Region::INITIAL.contains(Coordinate::new(14.5995, 120.9842)));
        assert!(!Region::INITIAL.contains(Coordinate::new(35.6762, 139.6503)));
    }

    #[test]
    fn test_map_type_serde_is_lowercase() {
        let json = serde_json::to_string(&MapType::Satellite).unwrap();
        assert_eq!(json, "\"satellite\"");
        let parsed: MapType = serde_json::from_str("\"terrain\"").unwrap();
        assert_eq!(parsed, MapType::Terrain);
    }
}
