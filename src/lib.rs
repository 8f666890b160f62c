// src/lib.rs
//! Property Map Library
//!
//! Map-side logic for a property rental client: grid clustering of property
//! markers, haversine distances, nearby-property search and the map screen
//! state that ties them together.

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod geo;
pub mod map;

// Re-export main types for convenience
pub use config::{MapConfig, StoredConfig};
pub use error::{MapError, Result};
pub use geo::{cluster_markers, haversine_km, nearby, Cluster, GridSize, Marker, MarkerSet, NearbyResult};
pub use map::{MapScreen, MapType};
