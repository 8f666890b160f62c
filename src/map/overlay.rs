// src/map/overlay.rs
//! Shapes drawn on top of the base map

use super::{region::Coordinate, screen::MapScreen};
use serde::Serialize;

const SEARCH_FILL: &str = "rgba(0, 128, 255, 0.1)";
const SEARCH_STROKE: &str = "rgba(0, 128, 255, 0.5)";
const LINE_STROKE: &str = "#000";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    ClusterCircle {
        center: Coordinate,
        radius_m: f64,
        count: usize,
        fill_color: &'static str,
    },
    SearchCircle {
        center: Coordinate,
        radius_m: f64,
        fill_color: &'static str,
        stroke_color: &'static str,
    },
    DistanceLine {
        start: Coordinate,
        end: Coordinate,
        distance_km: f64,
        stroke_color: &'static str,
        dash_pattern: [u8; 2],
    },
    Pin {
        index: usize,
        name: String,
        coordinate: Coordinate,
        selected: bool,
    },
}

impl Overlay {
    pub fn kind(&self) -> &str {
        match self {
            Overlay::ClusterCircle { .. } => "cluster_circle",
            Overlay::SearchCircle { .. } => "search_circle",
            Overlay::DistanceLine { .. } => "distance_line",
            Overlay::Pin { .. } => "pin",
        }
    }
}

/// Everything the screen currently draws, bottom layer first
pub fn build_overlays(screen: &MapScreen) -> Vec<Overlay> {
    let mut overlays: Vec<Overlay> = screen
        .clusters()
        .iter()
        .map(|cluster| Overlay::ClusterCircle {
            center: Coordinate::new(cluster.lat, cluster.lng),
            radius_m: screen.cluster_circle_radius_m(),
            count: cluster.count,
            fill_color: cluster.tier().fill_color(),
        })
        .collect();

    if let Some(selected) = screen.selected_marker() {
        overlays.push(Overlay::SearchCircle {
            center: Coordinate::new(selected.latitude, selected.longitude),
            radius_m: screen.search_radius_km() * 1000.0,
            fill_color: SEARCH_FILL,
            stroke_color: SEARCH_STROKE,
        });
    }

    if let Some(line) = screen.distance_line() {
        overlays.push(Overlay::DistanceLine {
            start: line.start,
            end: line.end,
            distance_km: line.distance_km,
            stroke_color: LINE_STROKE,
            dash_pattern: [5, 5],
        });
    }

    overlays.extend(screen.markers().iter().enumerate().map(|(index, marker)| Overlay::Pin {
        index,
        name: marker.name.clone(),
        coordinate: Coordinate::new(marker.latitude, marker.longitude),
        selected: screen.selected() == Some(index),
    }));

    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapConfig,
        geo::{Marker, MarkerSet},
    };

    fn screen() -> MapScreen {
        let markers = MarkerSet::new(vec![
            Marker::new("A", 14.5547, 121.0244).unwrap(),
            Marker::new("B", 14.5605, 121.0227).unwrap(),
        ])
        .unwrap();
        MapScreen::new(markers, &MapConfig::default()).unwrap()
    }

    #[test]
    fn test_overlays_before_selection() {
        let mut screen = screen();
        screen.focus();

        let overlays = build_overlays(&screen);
        let kinds: Vec<&str> = overlays.iter().map(|o| o.kind()).collect();
        assert_eq!(kinds, vec!["cluster_circle", "pin", "pin"]);
    }

    #[test]
    fn test_search_circle_uses_radius_in_metres() {
        let mut screen = screen();
        screen.focus();
        screen.set_search_radius(2.5);
        screen.select(0).unwrap();
        screen.toggle_measuring();
        screen.tap(1).unwrap();

        let overlays = build_overlays(&screen);
        let search = overlays
            .iter()
            .find_map(|o| match o {
                Overlay::SearchCircle { radius_m, .. } => Some(*radius_m),
                _ => None,
            })
            .unwrap();
        assert_eq!(search, 2500.0);
        assert!(overlays.iter().any(|o| o.kind() == "distance_line"));
        assert!(overlays
            .iter()
            .any(|o| matches!(o, Overlay::Pin { index: 0, selected: true, .. })));
    }

    #[test]
    fn test_cluster_circle_fill_follows_tier() {
        let mut screen = screen();
        screen.focus();

        let overlays = build_overlays(&screen);
        match &overlays[0] {
            Overlay::ClusterCircle { count, fill_color, radius_m, .. } => {
                assert_eq!(*count, 2);
                assert_eq!(*fill_color, "rgba(0, 255, 0, 0.2)");
                assert_eq!(*radius_m, 20_000.0);
            }
            other => panic!("unexpected overlay {:?}", other),
        }
    }
}
