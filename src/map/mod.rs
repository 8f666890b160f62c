// src/map/mod.rs
//! Map screen state, regions and overlays

mod overlay;
mod region;
mod screen;

pub use overlay::{build_overlays, Overlay};
pub use region::{Coordinate, MapType, Region};
pub use screen::{Callout, DistanceLine, MapScreen, NearbyPanel};
