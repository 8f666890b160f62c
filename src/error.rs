// src/error.rs
//! Error types for the property map

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Invalid coordinate for '{name}': latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        name: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("Invalid grid size: {0} (must be a positive, finite number of degrees)")]
    InvalidGridSize(f64),

    #[error("Marker not found: {0}")]
    MarkerNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for MapError {
    fn from(error: anyhow::Error) -> Self {
        MapError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_error_mentions_line() {
        let err = MapError::Csv {
            line: 3,
            message: "missing longitude".to_string(),
        };
        assert_eq!(err.to_string(), "CSV error on line 3: missing longitude");
    }

    #[test]
    fn test_from_anyhow() {
        let err: MapError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, MapError::Other(ref msg) if msg == "boom"));
    }
}
