//! TOML configuration adapter
//!
//! Loads an optional options preset from a TOML file. File settings sit
//! between built-in defaults and command-line flags in precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::options::{OptionsOverride, ThumbnailProcessingOptions};
use crate::error::{ConformError, ConformResult};

const DEFAULT_CONFIG_FILE: &str = "conform.toml";

/// On-disk configuration layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub options: OptionsOverride,
    pub thumbnail: ThumbnailProcessingOptions,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load configuration, looking the implicit default file up in the
    /// working directory
    pub async fn load(explicit_path: Option<&Path>) -> ConformResult<ConfigFile> {
        Self::load_from(explicit_path, Path::new(".")).await
    }

    /// Load configuration. An explicit path must exist; the implicit
    /// default file under `default_dir` is optional.
    pub async fn load_from(
        explicit_path: Option<&Path>,
        default_dir: &Path,
    ) -> ConformResult<ConfigFile> {
        let (path, required) = match explicit_path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_dir.join(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "no config file, using built-in defaults");
            return Ok(ConfigFile::default());
        }

        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ConformError::ConfigError {
                    message: format!("cannot read {}: {}", path.display(), e),
                })?;
        let config = Self::parse(&content).map_err(|e| ConformError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<ConfigFile, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::{Level, MetadataStrippingMode, ProcessingOptions};
    use crate::utils::format::ContainerFormat;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = TomlConfigAdapter::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        let merged = config.options.apply_to(&ProcessingOptions::default());
        assert_eq!(merged, ProcessingOptions::default());
    }

    #[test]
    fn test_partial_options_override_only_named_fields() {
        let config = TomlConfigAdapter::parse(
            r#"
            [options]
            video_quality = "high"
            metadata_stripping = "required"
            result_formats = ["mkv"]
            "#,
        )
        .unwrap();
        let merged = config.options.apply_to(&ProcessingOptions::default());
        assert_eq!(merged.video_quality, Level::High);
        assert_eq!(merged.metadata_stripping, MetadataStrippingMode::Required);
        assert_eq!(merged.result_formats, vec![ContainerFormat::Mkv]);
        // Untouched fields keep the preset values
        assert_eq!(merged.audio_quality, Level::Medium);
        assert!(merged.try_preserve_unrecognized_streams);
    }

    #[test]
    fn test_thumbnail_section_parsed() {
        let config = TomlConfigAdapter::parse(
            r#"
            [thumbnail]
            image_timestamp_fraction = 0.25
            force_square_pixels = true
            "#,
        )
        .unwrap();
        assert_eq!(config.thumbnail.image_timestamp_fraction, Some(0.25));
        assert!(config.thumbnail.force_square_pixels);
        assert!(config.thumbnail.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        assert!(TomlConfigAdapter::parse("[options\nbroken").is_err());
    }

    #[tokio::test]
    async fn test_missing_default_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = TomlConfigAdapter::load_from(None, dir.path()).await.unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[tokio::test]
    async fn test_default_file_picked_up_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("conform.toml"),
            "[options]\nvideo_quality = \"high\"\n",
        )
        .await
        .unwrap();
        let config = TomlConfigAdapter::load_from(None, dir.path()).await.unwrap();
        assert_eq!(config.options.video_quality, Some(Level::High));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TomlConfigAdapter::load(Some(&dir.path().join("nope.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConformError::ConfigError { .. }));
    }
}
