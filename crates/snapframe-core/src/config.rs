//! Designer configuration.

use crate::diagnostics::{Tracer, VIRTUALIZATION_TARGET};
use crate::error::{DesignerError, DesignerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the design surface. Every field has a default, so a partial
/// JSON document is enough to override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Maximum number of idle containers kept for reuse.
    pub pool_capacity: usize,
    /// Scene units of a dragged item that must stay inside the viewport.
    pub containment_margin: f64,
    /// Drag deltas below this (scene units, per axis) are ignored.
    pub jitter_threshold: f64,
    /// Smallest width/height a scale gesture may produce.
    pub min_item_size: f64,
    /// Rotation gestures under this many degrees are ignored.
    pub rotation_dead_zone: f64,
    /// Pixels a rubber-band drag must travel before it becomes active.
    pub rubberband_threshold: f64,
    /// Lower zoom clamp (percent).
    pub min_zoom: f64,
    /// Upper zoom clamp (percent).
    pub max_zoom: f64,
    /// Initial zoom (percent).
    pub initial_zoom: f64,
    /// External display scale (DPI factor) applied on top of zoom.
    pub display_scale: f64,
    /// Emit verbose virtualization diagnostics.
    pub trace_virtualization: bool,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 100,
            containment_margin: 50.0,
            jitter_threshold: 0.25,
            min_item_size: 10.0,
            rotation_dead_zone: 1.0,
            rubberband_threshold: 2.0,
            min_zoom: 0.1,
            max_zoom: 50000.0,
            initial_zoom: 100.0,
            display_scale: 1.0,
            trace_virtualization: false,
        }
    }
}

impl DesignerConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> DesignerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> DesignerResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded designer config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json(&self) -> DesignerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> DesignerResult<()> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(DesignerError::Config(format!(
                "zoom range {}..{} is invalid",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.initial_zoom >= self.min_zoom && self.initial_zoom <= self.max_zoom) {
            return Err(DesignerError::Config(format!(
                "initial zoom {} outside {}..{}",
                self.initial_zoom, self.min_zoom, self.max_zoom
            )));
        }
        if !(self.display_scale > 0.0) {
            return Err(DesignerError::Config("display scale must be positive".to_string()));
        }
        let non_negative = [
            ("containment_margin", self.containment_margin),
            ("jitter_threshold", self.jitter_threshold),
            ("min_item_size", self.min_item_size),
            ("rotation_dead_zone", self.rotation_dead_zone),
            ("rubberband_threshold", self.rubberband_threshold),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(DesignerError::Config(format!("{} must be >= 0, got {}", name, value)));
            }
        }
        Ok(())
    }

    /// Tracer for virtualization diagnostics as configured.
    pub fn tracer(&self) -> Tracer {
        Tracer::new(VIRTUALIZATION_TARGET, self.trace_virtualization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DesignerConfig::default();
        assert_eq!(config.pool_capacity, 100);
        assert!((config.containment_margin - 50.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DesignerConfig::from_json(r#"{ "pool_capacity": 8 }"#).unwrap();
        assert_eq!(config.pool_capacity, 8);
        assert!((config.min_item_size - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_zoom_range_rejected() {
        let result = DesignerConfig::from_json(r#"{ "min_zoom": 500.0, "max_zoom": 10.0 }"#);
        assert!(matches!(result, Err(DesignerError::Config(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = DesignerConfig::from_json("{ not json");
        assert!(matches!(result, Err(DesignerError::Serialization(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "trace_virtualization": true, "display_scale": 1.5 }}"#).unwrap();
        let config = DesignerConfig::load(file.path()).unwrap();
        assert!(config.trace_virtualization);
        assert!(config.tracer().is_enabled());
        assert!((config.display_scale - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DesignerConfig {
            pool_capacity: 3,
            ..DesignerConfig::default()
        };
        let parsed = DesignerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
