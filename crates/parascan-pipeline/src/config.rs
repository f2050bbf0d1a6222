use std::path::Path;

use serde::{Deserialize, Serialize};

use parascan_core::{Result, SegmentError, StructuringElement};
use parascan_detect::{BlockParams, ColumnParams};
use parascan_preprocess::{BinarizeParams, TableParams};

/// Runtime configuration for page segmentation.
///
/// Every section falls back to its defaults, so a config file only needs to
/// name what it changes:
///
/// ```toml
/// [blocks]
/// iterations = 5
///
/// [tables]
/// enabled = false
/// ```
///
/// Defaults are tuned for single-spaced body text scanned at roughly
/// 150-300 DPI: Otsu binarization, 15px rule elements opened 4 times, a 5x5
/// block element dilated 7 times, bands one mean paragraph width wide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Ink/paper threshold selection.
    pub binarize: BinarizeParams,
    /// Table-rule detection and erasure.
    pub tables: TableParams,
    /// Paragraph blob dilation.
    pub blocks: BlockParams,
    /// Column band policy.
    pub columns: ColumnParams,
}

impl SegmentConfig {
    /// Load a config file. `.json` files are parsed as JSON, anything else
    /// as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&data)?
        } else {
            Self::from_toml_str(&data)?
        };
        tracing::debug!(path = %path.display(), "loaded segment config");
        Ok(config)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| SegmentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: Self = toml::from_str(data).map_err(|e| SegmentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stages cannot work with.
    ///
    /// Zero-sized elements and zero iterations are allowed: they turn the
    /// corresponding operation into a no-op.
    pub fn validate(&self) -> Result<()> {
        let scale = self.columns.band_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SegmentError::Config(format!(
                "columns.band_scale must be a positive number, got {scale}"
            )));
        }
        Ok(())
    }

    /// Preset for tightly set text (small type, narrow leading): fewer
    /// dilation passes so neighbouring paragraphs do not fuse.
    pub fn dense_text() -> Self {
        Self {
            blocks: BlockParams {
                element: StructuringElement::square(5),
                iterations: 4,
            },
            ..Self::default()
        }
    }

    /// Preset for airy layouts (large type, wide leading, high DPI scans):
    /// more dilation passes and longer rule elements.
    pub fn sparse_layout() -> Self {
        Self {
            tables: TableParams {
                vertical_element: StructuringElement::vertical(25),
                horizontal_element: StructuringElement::horizontal(25),
                ..TableParams::default()
            },
            blocks: BlockParams {
                element: StructuringElement::square(5),
                iterations: 12,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parascan_preprocess::ThresholdMethod;

    #[test]
    fn defaults_match_documented_values() {
        let c = SegmentConfig::default();
        assert_eq!(c.binarize.method, ThresholdMethod::Otsu);
        assert!(c.tables.enabled);
        assert_eq!(c.tables.vertical_element, StructuringElement::new(1, 15));
        assert_eq!(c.tables.horizontal_element, StructuringElement::new(15, 1));
        assert_eq!(c.tables.iterations, 4);
        assert_eq!(c.blocks.element, StructuringElement::new(5, 5));
        assert_eq!(c.blocks.iterations, 7);
        assert_eq!(c.columns.band_scale, 1.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let c = SegmentConfig::from_toml_str(
            r#"
            [blocks]
            iterations = 3

            [binarize.method]
            method = "fixed"
            level = 140
            "#,
        )
        .unwrap();
        assert_eq!(c.blocks.iterations, 3);
        assert_eq!(c.blocks.element, StructuringElement::square(5));
        assert_eq!(c.binarize.method, ThresholdMethod::Fixed { level: 140 });
        assert_eq!(c.tables, TableParams::default());
    }

    #[test]
    fn json_round_trip() {
        let original = SegmentConfig::sparse_layout();
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(SegmentConfig::from_json_str(&json).unwrap(), original);
    }

    #[test]
    fn empty_documents_are_defaults() {
        assert_eq!(SegmentConfig::from_json_str("{}").unwrap(), SegmentConfig::default());
        assert_eq!(SegmentConfig::from_toml_str("").unwrap(), SegmentConfig::default());
    }

    #[test]
    fn bad_band_scale_is_rejected() {
        let err = SegmentConfig::from_json_str(r#"{"columns": {"band_scale": 0.0}}"#).unwrap_err();
        assert!(matches!(err, SegmentError::Config(_)));
    }

    #[test]
    fn malformed_files_are_config_errors() {
        let err = SegmentConfig::from_toml_str("[blocks\niterations = ").unwrap_err();
        assert!(matches!(err, SegmentError::Config(_)));
        let err = SegmentConfig::from_json_str(r#"{"blocks": {"iterations": -1}}"#).unwrap_err();
        assert!(matches!(err, SegmentError::Config(_)));
    }

    #[test]
    fn loads_from_disk_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("segment.toml");
        std::fs::write(&toml_path, "[tables]\nenabled = false\n").unwrap();
        assert!(!SegmentConfig::from_path(&toml_path).unwrap().tables.enabled);

        let json_path = dir.path().join("segment.JSON");
        std::fs::write(&json_path, r#"{"blocks": {"iterations": 9}}"#).unwrap();
        assert_eq!(SegmentConfig::from_path(&json_path).unwrap().blocks.iterations, 9);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            SegmentConfig::from_path(&missing),
            Err(SegmentError::Io(_))
        ));
    }

    #[test]
    fn presets_are_valid() {
        assert!(SegmentConfig::dense_text().validate().is_ok());
        assert!(SegmentConfig::sparse_layout().validate().is_ok());
        assert!(SegmentConfig::dense_text().blocks.iterations < SegmentConfig::default().blocks.iterations);
    }
}
