// src/config.rs
//! Configuration management with file-based storage

use crate::{
    error::{MapError, Result},
    geo::GridSize,
    map::MapType,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub grid_size: f64,              // degrees per cluster cell
    pub search_radius_km: f64,
    pub map_type: MapType,
    pub cluster_circle_radius_m: f64,
    pub focus_delta: f64,            // region span after selecting a marker
    pub markers_path: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid_size: GridSize::DEFAULT_DEGREES,
            search_radius_km: 1.0,
            map_type: MapType::Standard,
            cluster_circle_radius_m: 20_000.0,
            focus_delta: 0.05,
            markers_path: None,
        }
    }
}

impl MapConfig {
    /// Load from a config file, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| MapError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| MapError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MapError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| MapError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| MapError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Get config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| MapError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("property-map").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        GridSize::new(self.grid_size)?;

        if !(self.search_radius_km.is_finite() && self.search_radius_km > 0.0) {
            return Err(MapError::Config(format!(
                "search_radius_km must be positive, got {}",
                self.search_radius_km
            )));
        }
        if !(self.cluster_circle_radius_m.is_finite() && self.cluster_circle_radius_m > 0.0) {
            return Err(MapError::Config(format!(
                "cluster_circle_radius_m must be positive, got {}",
                self.cluster_circle_radius_m
            )));
        }
        if !(self.focus_delta.is_finite() && self.focus_delta > 0.0) {
            return Err(MapError::Config(format!(
                "focus_delta must be positive, got {}",
                self.focus_delta
            )));
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<GridSize> {
        GridSize::new(self.grid_size)
    }

    pub fn update_grid_size(&mut self, degrees: f64) -> Result<()> {
        GridSize::new(degrees)?;
        self.grid_size = degrees;
        Ok(())
    }

    pub fn update_search_radius(&mut self, km: f64) {
        self.search_radius_km = km;
    }

    pub fn update_map_type(&mut self, map_type: MapType) {
        self.map_type = map_type;
    }

    pub fn update_markers_path(&mut self, path: Option<PathBuf>) {
        self.markers_path = path;
    }
}

/// The config file on disk, and whether it could be read.
///
/// A file that fails to load is replaced by defaults for the run, but is
/// never written over.
#[derive(Debug)]
pub struct StoredConfig {
    path: PathBuf,
    config: MapConfig,
    load_error: Option<MapError>,
}

impl StoredConfig {
    /// Open the config file at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(MapConfig::get_config_path()?))
    }

    pub fn open_at(path: PathBuf) -> Self {
        match MapConfig::load_from(&path) {
            Ok(config) => Self { path, config, load_error: None },
            Err(e) => {
                warn!("Ignoring unreadable config: {}", e);
                Self { path, config: MapConfig::default(), load_error: Some(e) }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn load_error(&self) -> Option<&MapError> {
        self.load_error.as_ref()
    }

    pub fn save(&self, config: &MapConfig) -> Result<()> {
        if let Some(e) = &self.load_error {
            return Err(MapError::Config(format!(
                "Refusing to overwrite {} because it failed to load ({}); fix or remove it first",
                self.path.display(),
                e
            )));
        }
        config.save_to(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("property-map-test-{}-{}", tag, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = MapConfig::default();
        assert_eq!(config.grid_size, 2.0);
        assert_eq!(config.search_radius_km, 1.0);
        assert_eq!(config.map_type, MapType::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_config_path("missing");
        assert_eq!(MapConfig::load_from(&path).unwrap(), MapConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_config_path("roundtrip");
        let mut config = MapConfig::default();
        config.update_grid_size(0.5).unwrap();
        config.update_map_type(MapType::Satellite);
        config.update_markers_path(Some(PathBuf::from("/tmp/markers.csv")));

        config.save_to(&path).unwrap();
        let loaded = MapConfig::load_from(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_config_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "grid_size": 1.0 }"#).unwrap();

        let loaded = MapConfig::load_from(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded.grid_size, 1.0);
        assert_eq!(loaded.search_radius_km, 1.0);
    }

    #[test]
    fn test_bad_cluster_circle_radius_rejected() {
        for radius in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let config = MapConfig {
                cluster_circle_radius_m: radius,
                ..MapConfig::default()
            };
            assert!(matches!(config.validate(), Err(MapError::Config(_))), "radius {}", radius);
        }

        let path = temp_config_path("bad-radius");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "cluster_circle_radius_m": -5.0 }"#).unwrap();
        let loaded = MapConfig::load_from(&path);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        assert!(loaded.is_err());
    }

    #[test]
    fn test_malformed_file_is_not_overwritten() {
        let path = temp_config_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ grid_size: 1.0").unwrap();

        let stored = StoredConfig::open_at(path.clone());
        let saved = stored.save(&MapConfig::default());
        let on_disk = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert!(stored.load_error().is_some());
        assert_eq!(stored.config(), &MapConfig::default());
        assert!(matches!(saved, Err(MapError::Config(_))));
        assert_eq!(on_disk, "{ grid_size: 1.0");
    }

    #[test]
    fn test_stored_config_saves_when_readable() {
        let path = temp_config_path("stored");
        let stored = StoredConfig::open_at(path.clone());
        assert!(stored.load_error().is_none());

        let mut config = stored.config().clone();
        config.update_search_radius(3.0);
        stored.save(&config).unwrap();
        let reopened = StoredConfig::open_at(path.clone());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(reopened.config().search_radius_km, 3.0);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_update_grid_size_rejects_zero() {
        let mut config = MapConfig::default();
        assert!(config.update_grid_size(0.0).is_err());
        assert_eq!(config.grid_size, 2.0);
    }
}
