// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocwerkError, Result};

/// Processing settings shared by the dispatcher and the transformation library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Paper size for generated documents (text and image pages).
    pub paper_size: crate::PaperSize,
    /// Fixed delay applied before every transformation, in milliseconds.
    pub processing_delay_ms: u64,
    /// Appearance of watermark stamps.
    pub watermark: WatermarkStyle,
    /// Resolution assumed when placing raster images on a page.
    pub image_dpi: f32,
}

/// How watermark text is drawn onto pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Used when the request carries no watermark text.
    pub default_text: String,
    pub font_size: f32,
    /// Fill gray level, 0.0 (black) to 1.0 (white).
    pub gray: f32,
    /// Counter-clockwise angle of the text baseline.
    pub angle_degrees: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paper_size: crate::PaperSize::A4,
            processing_delay_ms: 1500,
            watermark: WatermarkStyle::default(),
            image_dpi: 150.0,
        }
    }
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            default_text: "CONFIDENTIAL".into(),
            font_size: 48.0,
            gray: 0.75,
            angle_degrees: 45.0,
        }
    }
}

impl AppConfig {
    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the document library cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.image_dpi.is_finite() && self.image_dpi > 0.0) {
            return Err(DocwerkError::InvalidParameter(format!(
                "image_dpi must be positive, got {}",
                self.image_dpi
            )));
        }
        if !(self.watermark.font_size.is_finite() && self.watermark.font_size > 0.0) {
            return Err(DocwerkError::InvalidParameter(format!(
                "watermark font_size must be positive, got {}",
                self.watermark.font_size
            )));
        }
        Ok(())
    }

    /// Read configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json_str(r#"{"processing_delay_ms": 0, "watermark": {"gray": 0.5}}"#)
                .unwrap();
        assert_eq!(config.processing_delay(), Duration::ZERO);
        assert_eq!(config.watermark.gray, 0.5);
        assert_eq!(config.watermark.default_text, "CONFIDENTIAL");
        assert_eq!(config.paper_size, crate::PaperSize::A4);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docwerk.json");
        std::fs::write(&path, r#"{"paper_size": "Letter", "image_dpi": 300.0}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.paper_size, crate::PaperSize::Letter);
        assert_eq!(config.image_dpi, 300.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocwerkError::Io(_)));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = AppConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DocwerkError::Serialization(_)));
    }

    #[test]
    fn zero_image_dpi_is_rejected() {
        let err = AppConfig::from_json_str(r#"{"image_dpi": 0}"#).unwrap_err();
        assert!(matches!(err, DocwerkError::InvalidParameter(_)));

        let config = AppConfig {
            image_dpi: -72.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
