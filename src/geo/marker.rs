// src/geo/marker.rs
//! Property markers and the marker catalogue

use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const BUNDLED_MARKERS: &str = include_str!("../../assets/markers.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Marker {
    /// Create a marker, rejecting non-finite or out-of-range coordinates
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let marker = Self {
            name: name.into(),
            latitude,
            longitude,
        };
        marker.validate()?;
        Ok(marker)
    }

    pub fn validate(&self) -> Result<()> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(MapError::InvalidCoordinate {
                name: self.name.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Format coordinates as "lat, lon" with 4 decimal places
    pub fn format_position(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A marker with its distance (km) from some reference marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyResult {
    pub index: usize,
    pub marker: Marker,
    pub distance_km: f64,
}

impl NearbyResult {
    pub fn format_distance(&self) -> String {
        format!("{:.2} km away", self.distance_km)
    }
}

/// Static list of property markers shown on the map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new(markers: Vec<Marker>) -> Result<Self> {
        for marker in &markers {
            marker.validate()?;
        }
        Ok(Self { markers })
    }

    /// The marker list shipped with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_MARKERS)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let markers: Vec<Marker> = serde_json::from_str(json)?;
        Self::new(markers)
    }

    /// Parse CSV with a `name,latitude,longitude` header
    pub fn from_csv_str(csv: &str) -> Result<Self> {
        let mut lines = csv.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| MapError::Csv {
            line: 1,
            message: "missing header".to_string(),
        })?;
        let columns: Vec<String> = split_csv_line(header)
            .into_iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        let column = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| MapError::Csv {
                line: 1,
                message: format!("missing '{}' column", name),
            })
        };
        let (name_col, lat_col, lon_col) = (column("name")?, column("latitude")?, column("longitude")?);

        let mut markers = Vec::new();
        for (idx, line) in lines {
            let line_no = idx + 1;
            let fields = split_csv_line(line);
            let field = |col: usize, label: &str| {
                fields.get(col).map(|f| f.trim().to_string()).ok_or_else(|| MapError::Csv {
                    line: line_no,
                    message: format!("missing {}", label),
                })
            };
            let number = |col: usize, label: &str| -> Result<f64> {
                let raw = field(col, label)?;
                raw.parse::<f64>().map_err(|_| MapError::Csv {
                    line: line_no,
                    message: format!("invalid {} '{}'", label, raw),
                })
            };

            markers.push(Marker::new(
                field(name_col, "name")?,
                number(lat_col, "latitude")?,
                number(lon_col, "longitude")?,
            )?);
        }

        Ok(Self { markers })
    }

    /// Load markers from a `.json` or `.csv` file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let set = match extension.as_deref() {
            Some("csv") => Self::from_csv_str(&contents)?,
            Some("json") | Some("geojson") | None => Self::from_json_str(&contents)?,
            Some(other) => {
                return Err(MapError::Other(format!(
                    "Unsupported marker file extension: .{}",
                    other
                )))
            }
        };

        info!("Loaded {} markers from {}", set.len(), path.display());
        Ok(set)
    }

    /// Find a marker index by name (case-insensitive)
    pub fn find(&self, name: &str) -> Result<usize> {
        let needle = name.trim().to_lowercase();
        let found = self
            .markers
            .iter()
            .position(|m| m.name.to_lowercase() == needle);

        debug!("Lookup '{}' -> {:?}", name, found);
        found.ok_or_else(|| MapError::MarkerNotFound(name.to_string()))
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }
}

/// Split one CSV line, honouring double-quoted fields with `""` escapes
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
