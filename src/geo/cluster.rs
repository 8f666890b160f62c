// src/geo/cluster.rs
//! Grid-based marker clustering

use super::marker::Marker;
use crate::error::{MapError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Edge length of a grid cell in degrees. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSize(f64);

impl GridSize {
    pub const DEFAULT_DEGREES: f64 = 2.0;

    pub fn new(degrees: f64) -> Result<Self> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(MapError::InvalidGridSize(degrees))
        }
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Grid cell containing the given coordinate.
    ///
    /// Longitude is not wrapped: +180 and -180 fall in different cells.
    pub fn key_for(&self, latitude: f64, longitude: f64) -> GridKey {
        GridKey {
            x: (longitude / self.0).floor() as i64,
            y: (latitude / self.0).floor() as i64,
        }
    }

    /// Bounds of a cell as ((min_lat, max_lat), (min_lng, max_lng))
    pub fn cell_bounds(&self, key: GridKey) -> ((f64, f64), (f64, f64)) {
        let lat_min = key.y as f64 * self.0;
        let lng_min = key.x as f64 * self.0;
        ((lat_min, lat_min + self.0), (lng_min, lng_min + self.0))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(Self::DEFAULT_DEGREES)
    }
}

/// Grid cell index: x from longitude, y from latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GridKey {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub key: GridKey,
    pub count: usize,
    pub lat: f64,
    pub lng: f64,
}

impl Cluster {
    fn seed(key: GridKey, marker: &Marker) -> Self {
        Self {
            key,
            count: 1,
            lat: marker.latitude,
            lng: marker.longitude,
        }
    }

    /// Fold another marker into the running centroid
    fn absorb(&mut self, marker: &Marker) {
        self.count += 1;
        let n = self.count as f64;
        self.lat = (self.lat * (n - 1.0) + marker.latitude) / n;
        self.lng = (self.lng * (n - 1.0) + marker.longitude) / n;
    }

    pub fn tier(&self) -> ClusterTier {
        ClusterTier::for_count(self.count)
    }
}

/// Density band used to colour cluster circles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterTier {
    Low,
    Medium,
    High,
}

impl ClusterTier {
    pub fn for_count(count: usize) -> Self {
        if count > 10 {
            ClusterTier::High
        } else if count > 5 {
            ClusterTier::Medium
        } else {
            ClusterTier::Low
        }
    }

    /// Translucent fill colour for map overlays
    pub fn fill_color(&self) -> &'static str {
        match self {
            ClusterTier::High => "rgba(255, 0, 0, 0.2)",
            ClusterTier::Medium => "rgba(255, 165, 0, 0.2)",
            ClusterTier::Low => "rgba(0, 255, 0, 0.2)",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ClusterTier::High => "High",
            ClusterTier::Medium => "Medium",
            ClusterTier::Low => "Low",
        }
    }
}

/// Group markers into one cluster per occupied grid cell.
///
/// Clusters come back ordered by grid key (x, then y).
pub fn cluster_markers(markers: &[Marker], grid: GridSize) -> Vec<Cluster> {
    let mut cells: BTreeMap<GridKey, Cluster> = BTreeMap::new();

    for marker in markers {
        let key = grid.key_for(marker.latitude, marker.longitude);
        cells
            .entry(key)
            .and_modify(|cluster| cluster.absorb(marker))
            .or_insert_with(|| Cluster::seed(key, marker));
    }

    cells.into_values().collect()
}
