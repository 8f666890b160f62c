// src/geo/mod.rs
//! Markers, clustering and distance math

pub mod cluster;
pub mod distance;
pub mod marker;

pub use cluster::{cluster_markers, Cluster, ClusterTier, GridKey, GridSize};
pub use distance::{distance_between, haversine_km, nearby, EARTH_RADIUS_KM};
pub use marker::{Marker, MarkerSet, NearbyResult};
