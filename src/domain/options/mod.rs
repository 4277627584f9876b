// Processing options - immutable target constraints with layered overrides

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::{AudioCodec, VideoCodec};
use crate::utils::format::ContainerFormat;

/// Ordered quality/effort level, Lowest through Highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Lowest,
    Low,
    Medium,
    High,
    Highest,
}

impl Level {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "lowest" => Ok(Level::Lowest),
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            "highest" => Ok(Level::Highest),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown level: {}. Valid levels: lowest, low, medium, high, highest",
                name
            ))),
        }
    }

    /// All levels in ascending order, for monotonicity checks
    pub fn all() -> [Level; 5] {
        [
            Level::Lowest,
            Level::Low,
            Level::Medium,
            Level::High,
            Level::Highest,
        ]
    }
}

/// When a stream kind may be re-encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReencodeMode {
    /// Copy even when a constraint would otherwise require a re-encode
    Never,
    /// Re-encode only when a constraint requires it
    IfNeeded,
    /// Re-encode even when no constraint requires it
    Always,
}

impl ReencodeMode {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "never" => Ok(ReencodeMode::Never),
            "if-needed" | "ifneeded" => Ok(ReencodeMode::IfNeeded),
            "always" => Ok(ReencodeMode::Always),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown reencode mode: {}. Valid modes: never, if-needed, always",
                name
            ))),
        }
    }
}

/// Container/stream metadata stripping policy.
/// Stream-level language tags and dispositions are preserved under every
/// mode; these policies govern container tags and embedded thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataStrippingMode {
    /// Preserve all metadata, carrying tags through re-encodes explicitly
    None,
    /// Strip only as a side effect of an already-required transform
    Preferred,
    /// Remove only embedded thumbnail/cover streams
    ThumbnailOnly,
    /// Always strip standard and custom tags; forces at least a remux
    Required,
}

impl MetadataStrippingMode {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "none" => Ok(MetadataStrippingMode::None),
            "preferred" => Ok(MetadataStrippingMode::Preferred),
            "thumbnail-only" | "thumbnailonly" => Ok(MetadataStrippingMode::ThumbnailOnly),
            "required" => Ok(MetadataStrippingMode::Required),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown metadata stripping mode: {}. Valid modes: none, preferred, thumbnail-only, required",
                name
            ))),
        }
    }
}

/// Resize behavior; only shrinks, never upscales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    FitDown,
}

/// Resolution ceiling for video streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    pub mode: ResizeMode,
    pub max_width: u32,
    pub max_height: u32,
}

impl ResizeOptions {
    pub fn fit_down(max_width: u32, max_height: u32) -> Result<Self, DomainError> {
        if max_width == 0 || max_height == 0 {
            return Err(DomainError::BadArgs(
                "Resize bounds cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            mode: ResizeMode::FitDown,
            max_width,
            max_height,
        })
    }
}

/// Desired output constraints for a processing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Acceptable output containers; first entry is the preferred target
    pub result_formats: Vec<ContainerFormat>,
    /// Acceptable video codecs; first entry is the preferred re-encode target
    pub result_video_codecs: Vec<VideoCodec>,
    /// Acceptable audio codecs; first entry is the preferred re-encode target
    pub result_audio_codecs: Vec<AudioCodec>,
    pub video_reencode_mode: ReencodeMode,
    pub audio_reencode_mode: ReencodeMode,
    pub video_quality: Level,
    pub video_compression_level: Level,
    pub audio_quality: Level,
    pub resize: Option<ResizeOptions>,
    pub metadata_stripping: MetadataStrippingMode,
    /// De-interlace any stream whose field order is not progressive
    pub force_progressive_frames: bool,
    /// Relocate structural metadata ahead of payload data
    pub force_progressive_download: bool,
    pub remove_audio_streams: bool,
    /// Downmix ceiling on audio channel count
    pub max_audio_channels: Option<u32>,
    /// Tone-map HDR transfer/primaries down to BT.709
    pub remap_hdr_to_sdr: bool,
    /// When false, attachment/unrecognized streams are dropped
    pub try_preserve_unrecognized_streams: bool,
    /// Diagnostic only; never changes output bytes
    pub force_validate_all_streams: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            result_formats: vec![ContainerFormat::Mp4],
            result_video_codecs: vec![VideoCodec::H264],
            result_audio_codecs: vec![AudioCodec::Aac],
            video_reencode_mode: ReencodeMode::IfNeeded,
            audio_reencode_mode: ReencodeMode::IfNeeded,
            video_quality: Level::Medium,
            video_compression_level: Level::Medium,
            audio_quality: Level::Medium,
            resize: None,
            metadata_stripping: MetadataStrippingMode::Preferred,
            force_progressive_frames: false,
            force_progressive_download: false,
            remove_audio_streams: false,
            max_audio_channels: None,
            remap_hdr_to_sdr: false,
            try_preserve_unrecognized_streams: true,
            force_validate_all_streams: false,
        }
    }
}

/// Partial options overlay. Only explicitly-set fields replace the base
/// value; everything else keeps the base preset's setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsOverride {
    pub result_formats: Option<Vec<ContainerFormat>>,
    pub result_video_codecs: Option<Vec<VideoCodec>>,
    pub result_audio_codecs: Option<Vec<AudioCodec>>,
    pub video_reencode_mode: Option<ReencodeMode>,
    pub audio_reencode_mode: Option<ReencodeMode>,
    pub video_quality: Option<Level>,
    pub video_compression_level: Option<Level>,
    pub audio_quality: Option<Level>,
    pub resize: Option<ResizeOptions>,
    pub metadata_stripping: Option<MetadataStrippingMode>,
    pub force_progressive_frames: Option<bool>,
    pub force_progressive_download: Option<bool>,
    pub remove_audio_streams: Option<bool>,
    pub max_audio_channels: Option<u32>,
    pub remap_hdr_to_sdr: Option<bool>,
    pub try_preserve_unrecognized_streams: Option<bool>,
    pub force_validate_all_streams: Option<bool>,
}

impl OptionsOverride {
    /// Overlay this override onto a base preset, returning a new value
    pub fn apply_to(&self, base: &ProcessingOptions) -> ProcessingOptions {
        let mut merged = base.clone();
        if let Some(v) = &self.result_formats {
            merged.result_formats = v.clone();
        }
        if let Some(v) = &self.result_video_codecs {
            merged.result_video_codecs = v.clone();
        }
        if let Some(v) = &self.result_audio_codecs {
            merged.result_audio_codecs = v.clone();
        }
        if let Some(v) = self.video_reencode_mode {
            merged.video_reencode_mode = v;
        }
        if let Some(v) = self.audio_reencode_mode {
            merged.audio_reencode_mode = v;
        }
        if let Some(v) = self.video_quality {
            merged.video_quality = v;
        }
        if let Some(v) = self.video_compression_level {
            merged.video_compression_level = v;
        }
        if let Some(v) = self.audio_quality {
            merged.audio_quality = v;
        }
        if let Some(v) = self.resize {
            merged.resize = Some(v);
        }
        if let Some(v) = self.metadata_stripping {
            merged.metadata_stripping = v;
        }
        if let Some(v) = self.force_progressive_frames {
            merged.force_progressive_frames = v;
        }
        if let Some(v) = self.force_progressive_download {
            merged.force_progressive_download = v;
        }
        if let Some(v) = self.remove_audio_streams {
            merged.remove_audio_streams = v;
        }
        if let Some(v) = self.max_audio_channels {
            merged.max_audio_channels = Some(v);
        }
        if let Some(v) = self.remap_hdr_to_sdr {
            merged.remap_hdr_to_sdr = v;
        }
        if let Some(v) = self.try_preserve_unrecognized_streams {
            merged.try_preserve_unrecognized_streams = v;
        }
        if let Some(v) = self.force_validate_all_streams {
            merged.force_validate_all_streams = v;
        }
        merged
    }
}

/// Options for the single-frame thumbnail read path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailProcessingOptions {
    /// Absolute timestamp in seconds
    pub image_timestamp: Option<f64>,
    /// Fraction of total duration, 0..=1
    pub image_timestamp_fraction: Option<f64>,
    /// Allow embedded thumbnail/cover streams as a direct source
    pub include_thumbnail_video_streams: bool,
    pub remap_hdr_to_sdr: bool,
    /// Correct non-square pixels by scaling one dimension by the SAR
    pub force_square_pixels: bool,
}

impl ThumbnailProcessingOptions {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(ts) = self.image_timestamp {
            if ts < 0.0 {
                return Err(DomainError::BadArgs(
                    "Timestamp cannot be negative".to_string(),
                ));
            }
        }
        if let Some(fraction) = self.image_timestamp_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DomainError::BadArgs(format!(
                    "Timestamp fraction must be within 0..=1, got {}",
                    fraction
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
