// src/export.rs
//! Overlay export to GeoJSON, KML and CSV

use crate::error::{MapError, Result};
use crate::map::Overlay;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[value(name = "geojson")]
    GeoJSON,
    #[value(name = "kml")]
    KML,
    #[value(name = "csv")]
    CSV,
}

impl ExportFormat {
    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::GeoJSON => "geojson",
            ExportFormat::KML => "kml",
            ExportFormat::CSV => "csv",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ExportFormat::GeoJSON => "GeoJSON",
            ExportFormat::KML => "KML (Keyhole)",
            ExportFormat::CSV => "CSV",
        }
    }
}

pub struct OverlayExporter {
    overlays: Vec<Overlay>,
    generated: DateTime<Utc>,
}

impl OverlayExporter {
    pub fn new(overlays: Vec<Overlay>) -> Self {
        Self {
            overlays,
            generated: Utc::now(),
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn render(&self, format: ExportFormat) -> Result<String> {
        if self.overlays.is_empty() {
            return Err(MapError::Other("No overlays to export".to_string()));
        }

        match format {
            ExportFormat::GeoJSON => self.to_geojson(),
            ExportFormat::KML => Ok(self.to_kml()),
            ExportFormat::CSV => Ok(self.to_csv()),
        }
    }

    pub fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.render(format)?;

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;

        info!(
            "Exported {} overlays as {} to {}",
            self.overlays.len(),
            format.display_name(),
            path.display()
        );
        Ok(())
    }

    fn to_geojson(&self) -> Result<String> {
        let features: Vec<serde_json::Value> = self
            .overlays
            .iter()
            .map(|overlay| {
                let (geometry, mut properties) = match overlay {
                    Overlay::ClusterCircle { center, radius_m, count, fill_color } => (
                        serde_json::json!({
                            "type": "Point",
                            "coordinates": [center.longitude, center.latitude]
                        }),
                        serde_json::json!({
                            "radius_m": radius_m,
                            "count": count,
                            "fill": fill_color,
                        }),
                    ),
                    Overlay::SearchCircle { center, radius_m, fill_color, stroke_color } => (
                        serde_json::json!({
                            "type": "Point",
                            "coordinates": [center.longitude, center.latitude]
                        }),
                        serde_json::json!({
                            "radius_m": radius_m,
                            "fill": fill_color,
                            "stroke": stroke_color,
                        }),
                    ),
                    Overlay::DistanceLine { start, end, distance_km, stroke_color, dash_pattern } => (
                        serde_json::json!({
                            "type": "LineString",
                            "coordinates": [
                                [start.longitude, start.latitude],
                                [end.longitude, end.latitude]
                            ]
                        }),
                        serde_json::json!({
                            "distance_km": distance_km,
                            "stroke": stroke_color,
                            "dash_pattern": dash_pattern,
                        }),
                    ),
                    Overlay::Pin { index, name, coordinate, selected } => (
                        serde_json::json!({
                            "type": "Point",
                            "coordinates": [coordinate.longitude, coordinate.latitude]
                        }),
                        serde_json::json!({
                            "index": index,
                            "name": name,
                            "selected": selected,
                        }),
                    ),
                };
                properties["kind"] = serde_json::json!(overlay.kind());

                serde_json::json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": properties
                })
            })
            .collect();

        let feature_collection = serde_json::json!({
            "type": "FeatureCollection",
            "generated": self.generated.to_rfc3339(),
            "features": features
        });

        Ok(serde_json::to_string_pretty(&feature_collection)?)
    }

    fn to_kml(&self) -> String {
        let mut kml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Property Map Overlays</name>
"#,
        );
        kml.push_str(&format!(
            "    <description>Generated {}</description>\n",
            self.generated.to_rfc3339()
        ));

        for overlay in &self.overlays {
            kml.push_str("    <Placemark>\n");
            match overlay {
                Overlay::ClusterCircle { center, count, .. } => {
                    kml.push_str(&format!("      <name>Cluster ({})</name>\n", count));
                    kml.push_str(&Self::kml_point(center.longitude, center.latitude));
                }
                Overlay::SearchCircle { center, radius_m, .. } => {
                    kml.push_str(&format!(
                        "      <name>Search radius ({:.0} m)</name>\n",
                        radius_m
                    ));
                    kml.push_str(&Self::kml_point(center.longitude, center.latitude));
                }
                Overlay::DistanceLine { start, end, distance_km, .. } => {
                    kml.push_str(&format!("      <name>{:.2} km</name>\n", distance_km));
                    kml.push_str("      <LineString>\n");
                    kml.push_str(&format!(
                        "        <coordinates>{},{},0 {},{},0</coordinates>\n",
                        start.longitude, start.latitude, end.longitude, end.latitude
                    ));
                    kml.push_str("      </LineString>\n");
                }
                Overlay::Pin { name, coordinate, .. } => {
                    kml.push_str(&format!("      <name>{}</name>\n", Self::escape_xml(name)));
                    kml.push_str(&Self::kml_point(coordinate.longitude, coordinate.latitude));
                }
            }
            kml.push_str("    </Placemark>\n");
        }

        kml.push_str("  </Document>\n</kml>\n");
        kml
    }

    fn kml_point(longitude: f64, latitude: f64) -> String {
        format!(
            "      <Point>\n        <coordinates>{},{},0</coordinates>\n      </Point>\n",
            longitude, latitude
        )
    }

    fn to_csv(&self) -> String {
        let mut csv = String::from("kind,name,latitude,longitude,value\n");

        for overlay in &self.overlays {
            let (name, lat, lon, value) = match overlay {
                Overlay::ClusterCircle { center, count, .. } => {
                    (String::new(), center.latitude, center.longitude, count.to_string())
                }
                Overlay::SearchCircle { center, radius_m, .. } => {
                    (String::new(), center.latitude, center.longitude, radius_m.to_string())
                }
                Overlay::DistanceLine { start, distance_km, .. } => {
                    (String::new(), start.latitude, start.longitude, format!("{:.3}", distance_km))
                }
                Overlay::Pin { name, coordinate, selected, .. } => (
                    Self::escape_csv(name),
                    coordinate.latitude,
                    coordinate.longitude,
                    selected.to_string(),
                ),
            };
            csv.push_str(&format!("{},{},{},{},{}\n", overlay.kind(), name, lat, lon, value));
        }

        csv
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }

    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Coordinate;

    fn sample() -> OverlayExporter {
        OverlayExporter::new(vec![
            Overlay::ClusterCircle {
                center: Coordinate::new(14.56, 121.03),
                radius_m: 20_000.0,
                count: 7,
                fill_color: "rgba(255, 165, 0, 0.2)",
            },
            Overlay::DistanceLine {
                start: Coordinate::new(14.5547, 121.0244),
                end: Coordinate::new(10.3308, 123.9055),
                distance_km: 565.4,
                stroke_color: "#000",
                dash_pattern: [5, 5],
            },
            Overlay::Pin {
                index: 0,
                name: "Villa <Sea & Sky>, Cebu".to_string(),
                coordinate: Coordinate::new(10.3308, 123.9055),
                selected: true,
            },
        ])
    }

    #[test]
    fn test_empty_export_refused() {
        let exporter = OverlayExporter::new(Vec::new());
        assert!(exporter.render(ExportFormat::CSV).is_err());
    }

    #[test]
    fn test_geojson_export() {
        let json = sample().render(ExportFormat::GeoJSON).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["count"], 7);
        assert_eq!(features[1]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["geometry"]["coordinates"][0], 121.03);
    }

    #[test]
    fn test_kml_escapes_names() {
        let kml = sample().render(ExportFormat::KML).unwrap();
        assert!(kml.contains("<kml"));
        assert!(kml.contains("Villa &lt;Sea &amp; Sky&gt;, Cebu"));
        assert!(kml.contains("<LineString>"));
    }

    #[test]
    fn test_csv_export() {
        let csv = sample().render(ExportFormat::CSV).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "kind,name,latitude,longitude,value");
        assert_eq!(lines[1], "cluster_circle,,14.56,121.03,7");
        assert!(lines[3].starts_with("pin,\"Villa <Sea & Sky>, Cebu\","));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("property-map-export-{}.csv", std::process::id()));
        sample().export_to_file(&path, ExportFormat::CSV).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.starts_with("kind,name"));
    }
}
