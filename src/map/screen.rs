// src/map/screen.rs
//! Map screen state and interaction handling

use super::region::{Coordinate, MapType, Region};
use crate::{
    config::MapConfig,
    error::{MapError, Result},
    geo::{cluster_markers, distance_between, nearby, Cluster, GridSize, Marker, MarkerSet, NearbyResult},
};
use tracing::{debug, info};

const DEFAULT_SEARCH_RADIUS_KM: f64 = 1.0;
const CALLOUT_HINT: &str = "Tap to see nearby properties";

/// A measured pair of points, drawn as a dashed polyline
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceLine {
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_km: f64,
}

/// Info bubble for a marker
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub title: String,
    pub distance: Option<String>,
    pub hint: &'static str,
}

/// Bottom panel listing properties near the selection
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPanel {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

/// Owns everything the map view shows and recomputes it on interaction
#[derive(Debug, Clone)]
pub struct MapScreen {
    markers: MarkerSet,
    grid: GridSize,
    map_type: MapType,
    visible: bool,
    clusters: Vec<Cluster>,
    search_radius_km: f64,
    selected: Option<usize>,
    nearby: Vec<NearbyResult>,
    measuring: bool,
    distance_line: Option<DistanceLine>,
    region: Region,
    focus_delta: f64,
    cluster_circle_radius_m: f64,
}

impl MapScreen {
    pub fn new(markers: MarkerSet, config: &MapConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            markers,
            grid: config.grid()?,
            map_type: config.map_type,
            visible: false,
            clusters: Vec::new(),
            search_radius_km: config.search_radius_km,
            selected: None,
            nearby: Vec::new(),
            measuring: false,
            distance_line: None,
            region: Region::INITIAL,
            focus_delta: config.focus_delta,
            cluster_circle_radius_m: config.cluster_circle_radius_m,
        })
    }

    /// Screen gained focus: rebuild clusters from the marker list
    pub fn focus(&mut self) {
        self.visible = false;
        self.recompute_clusters();
        self.visible = true;
    }

    /// Screen lost focus
    pub fn blur(&mut self) {
        self.visible = false;
    }

    fn recompute_clusters(&mut self) {
        self.clusters = cluster_markers(self.markers.as_slice(), self.grid);
        info!(
            "Clustered {} markers into {} cells ({}° grid)",
            self.markers.len(),
            self.clusters.len(),
            self.grid.degrees()
        );
    }

    pub fn set_map_type(&mut self, map_type: MapType) {
        self.map_type = map_type;
    }

    /// Set the grid size; clusters are rebuilt on the next focus
    pub fn set_grid_size(&mut self, grid: GridSize) {
        self.grid = grid;
    }

    /// Set the search radius and refresh the nearby list for the selection
    pub fn set_search_radius(&mut self, km: f64) {
        self.search_radius_km = if km.is_finite() && km > 0.0 {
            km
        } else {
            DEFAULT_SEARCH_RADIUS_KM
        };
        if let Some(index) = self.selected {
            self.nearby = nearby(self.markers.as_slice(), index, self.search_radius_km);
        }
    }

    /// Parse radius text as typed by the user, falling back to 1 km
    pub fn set_search_radius_text(&mut self, text: &str) -> f64 {
        let km = text.trim().parse::<f64>().unwrap_or(DEFAULT_SEARCH_RADIUS_KM);
        self.set_search_radius(km);
        self.search_radius_km
    }

    /// Callout pressed: select the marker, list its neighbours and zoom in
    pub fn select(&mut self, index: usize) -> Result<()> {
        let marker = self.marker(index)?;
        let center = Coordinate::new(marker.latitude, marker.longitude);

        self.nearby = nearby(self.markers.as_slice(), index, self.search_radius_km);
        self.selected = Some(index);
        self.region = Region::centered_on(center, self.focus_delta);

        info!(
            "Selected '{}': {} nearby within {} km",
            self.markers.as_slice()[index].name,
            self.nearby.len(),
            self.search_radius_km
        );
        Ok(())
    }

    pub fn select_by_name(&mut self, name: &str) -> Result<()> {
        let index = self.markers.find(name)?;
        self.select(index)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.nearby.clear();
        self.distance_line = None;
        self.region = Region::INITIAL;
    }

    pub fn toggle_measuring(&mut self) -> bool {
        self.measuring = !self.measuring;
        debug!("Distance measurement {}", if self.measuring { "on" } else { "off" });
        self.measuring
    }

    /// Marker pressed: measure from the selection while measuring is on.
    ///
    /// Returns the new line, or `None` when nothing was measured by this tap.
    /// A line from an earlier tap stays on the map either way.
    pub fn tap(&mut self, index: usize) -> Result<Option<&DistanceLine>> {
        let target = self.marker(index)?;

        let (true, Some(selected)) = (self.measuring, self.selected) else {
            return Ok(None);
        };

        let origin = &self.markers.as_slice()[selected];
        let line = DistanceLine {
            start: Coordinate::new(origin.latitude, origin.longitude),
            end: Coordinate::new(target.latitude, target.longitude),
            distance_km: distance_between(origin, target),
        };
        debug!("Measured {:.2} km from '{}' to '{}'", line.distance_km, origin.name, target.name);
        self.distance_line = Some(line);

        Ok(self.distance_line.as_ref())
    }

    pub fn tap_by_name(&mut self, name: &str) -> Result<Option<&DistanceLine>> {
        let index = self.markers.find(name)?;
        self.tap(index)
    }

    pub fn callout(&self, index: usize) -> Result<Callout> {
        let marker = self.marker(index)?;
        let distance = match (&self.distance_line, self.selected) {
            (Some(line), Some(selected)) if selected == index => {
                Some(format!("Distance: {:.2} km", line.distance_km))
            }
            _ => None,
        };

        Ok(Callout {
            title: marker.name.clone(),
            distance,
            hint: CALLOUT_HINT,
        })
    }

    /// Nearby list, shown only when a selection has neighbours
    pub fn nearby_panel(&self) -> Option<NearbyPanel> {
        self.selected?;
        if self.nearby.is_empty() {
            return None;
        }

        Some(NearbyPanel {
            title: format!("Nearby Properties ({})", self.nearby.len()),
            rows: self
                .nearby
                .iter()
                .map(|r| (r.marker.name.clone(), r.format_distance()))
                .collect(),
        })
    }

    fn marker(&self, index: usize) -> Result<&Marker> {
        self.markers
            .get(index)
            .ok_or_else(|| MapError::MarkerNotFound(format!("#{}", index)))
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn search_radius_km(&self) -> f64 {
        self.search_radius_km
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selected.and_then(|i| self.markers.get(i))
    }

    pub fn nearby_results(&self) -> &[NearbyResult] {
        &self.nearby
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    pub fn distance_line(&self) -> Option<&DistanceLine> {
        self.distance_line.as_ref()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn cluster_circle_radius_m(&self) -> f64 {
        self.cluster_circle_radius_m
    }
}
