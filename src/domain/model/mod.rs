// Domain models - probed media structure

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::utils::format::ContainerFormat;

/// Kind of an input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Attachment,
    Other,
}

impl StreamKind {
    /// Whether the engine has codec/quality policy for this kind
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            StreamKind::Video | StreamKind::Audio | StreamKind::Subtitle
        )
    }
}

/// Interlacing field order of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldOrder {
    Progressive,
    TopFirst,
    BottomFirst,
}

impl FieldOrder {
    /// Parse ffprobe's `field_order` value
    pub fn from_probe_name(name: &str) -> Self {
        match name {
            "tt" | "tb" => FieldOrder::TopFirst,
            "bb" | "bt" => FieldOrder::BottomFirst,
            _ => FieldOrder::Progressive,
        }
    }

    pub fn is_interlaced(&self) -> bool {
        !matches!(self, FieldOrder::Progressive)
    }
}

/// Video codecs the engine can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Hevc,
    Vp9,
    Av1,
}

impl VideoCodec {
    /// Whether a probed codec name is this codec
    pub fn matches_name(&self, codec_name: &str) -> bool {
        match self {
            VideoCodec::H264 => matches!(codec_name, "h264" | "avc" | "avc1"),
            VideoCodec::Hevc => matches!(codec_name, "hevc" | "h265"),
            VideoCodec::Vp9 => codec_name == "vp9",
            VideoCodec::Av1 => codec_name == "av1",
        }
    }

    /// Encoder name handed to the external worker
    pub fn encoder_name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::Hevc => "libx265",
            VideoCodec::Vp9 => "libvpx-vp9",
            VideoCodec::Av1 => "libaom-av1",
        }
    }

    /// Parse a user-supplied codec name
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "h264" | "avc" => Ok(VideoCodec::H264),
            "hevc" | "h265" => Ok(VideoCodec::Hevc),
            "vp9" => Ok(VideoCodec::Vp9),
            "av1" => Ok(VideoCodec::Av1),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown video codec: {}. Valid codecs: h264, hevc, vp9, av1",
                name
            ))),
        }
    }
}

/// Audio codecs the engine can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Opus,
    Mp3,
    Flac,
    Ac3,
}

impl AudioCodec {
    /// Whether a probed codec name is this codec
    pub fn matches_name(&self, codec_name: &str) -> bool {
        match self {
            AudioCodec::Aac => codec_name == "aac",
            AudioCodec::Opus => codec_name == "opus",
            AudioCodec::Mp3 => matches!(codec_name, "mp3" | "mp3float"),
            AudioCodec::Flac => codec_name == "flac",
            AudioCodec::Ac3 => codec_name == "ac3",
        }
    }

    /// Encoder name handed to the external worker
    pub fn encoder_name(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Opus => "libopus",
            AudioCodec::Mp3 => "libmp3lame",
            AudioCodec::Flac => "flac",
            AudioCodec::Ac3 => "ac3",
        }
    }

    /// Parse a user-supplied codec name
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "aac" => Ok(AudioCodec::Aac),
            "opus" => Ok(AudioCodec::Opus),
            "mp3" => Ok(AudioCodec::Mp3),
            "flac" => Ok(AudioCodec::Flac),
            "ac3" => Ok(AudioCodec::Ac3),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown audio codec: {}. Valid codecs: aac, opus, mp3, flac, ac3",
                name
            ))),
        }
    }
}

/// Video-specific stream properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    /// Sample aspect ratio as (num, den); (1, 1) means square pixels
    pub sample_aspect_ratio: (u32, u32),
    pub pixel_format: String,
    pub bit_depth: u8,
    pub color_primaries: Option<String>,
    pub color_transfer: Option<String>,
    pub color_space: Option<String>,
    pub field_order: FieldOrder,
    /// Rotation-correction metadata in degrees, never baked into pixels
    pub rotation_degrees: Option<i32>,
    /// Embedded thumbnail/cover art stream (attached picture)
    pub is_thumbnail: bool,
}

impl VideoProperties {
    /// Create video properties with validation; remaining fields start at
    /// plain SDR progressive defaults
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs(
                "Video dimensions cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            sample_aspect_ratio: (1, 1),
            pixel_format: "yuv420p".to_string(),
            bit_depth: 8,
            color_primaries: None,
            color_transfer: None,
            color_space: None,
            field_order: FieldOrder::Progressive,
            rotation_degrees: None,
            is_thumbnail: false,
        })
    }

    /// Display aspect ratio accounting for non-square pixels
    pub fn display_aspect_ratio(&self) -> f64 {
        let (num, den) = self.sample_aspect_ratio;
        if den == 0 {
            return self.width as f64 / self.height as f64;
        }
        (self.width as f64 * num as f64 / den as f64) / self.height as f64
    }

    pub fn has_square_pixels(&self) -> bool {
        let (num, den) = self.sample_aspect_ratio;
        num == den || num == 0 || den == 0
    }
}

/// Audio-specific stream properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioProperties {
    pub channels: u32,
    pub sample_rate: u32,
    pub channel_layout: Option<String>,
}

impl AudioProperties {
    pub fn new(channels: u32, sample_rate: u32) -> Result<Self, DomainError> {
        if channels == 0 {
            return Err(DomainError::BadArgs(
                "Channel count cannot be zero".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(DomainError::BadArgs(
                "Sample rate cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
            channel_layout: None,
        })
    }
}

/// One probed input stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Original position in the container; the only stable cross-reference
    /// between input and output streams
    pub index: u32,
    pub kind: StreamKind,
    /// Probed codec name as reported by the inspection tool
    pub codec: String,
    /// Three-letter language tag, or None when untagged
    pub language: Option<String>,
    /// Player-preferred stream among same-kind alternatives
    pub disposition_default: bool,
    pub video: Option<VideoProperties>,
    pub audio: Option<AudioProperties>,
}

impl StreamDescriptor {
    pub fn video(index: u32, codec: impl Into<String>, properties: VideoProperties) -> Self {
        Self {
            index,
            kind: StreamKind::Video,
            codec: codec.into(),
            language: None,
            disposition_default: false,
            video: Some(properties),
            audio: None,
        }
    }

    pub fn audio(index: u32, codec: impl Into<String>, properties: AudioProperties) -> Self {
        Self {
            index,
            kind: StreamKind::Audio,
            codec: codec.into(),
            language: None,
            disposition_default: false,
            video: None,
            audio: Some(properties),
        }
    }

    pub fn subtitle(index: u32, codec: impl Into<String>) -> Self {
        Self {
            index,
            kind: StreamKind::Subtitle,
            codec: codec.into(),
            language: None,
            disposition_default: false,
            video: None,
            audio: None,
        }
    }

    pub fn attachment(index: u32, codec: impl Into<String>) -> Self {
        Self {
            index,
            kind: StreamKind::Attachment,
            codec: codec.into(),
            language: None,
            disposition_default: false,
            video: None,
            audio: None,
        }
    }

    pub fn other(index: u32, codec: impl Into<String>) -> Self {
        Self {
            index,
            kind: StreamKind::Other,
            codec: codec.into(),
            language: None,
            disposition_default: false,
            video: None,
            audio: None,
        }
    }

    /// Embedded thumbnail/cover art stream
    pub fn is_thumbnail_stream(&self) -> bool {
        self.kind == StreamKind::Video
            && self.video.as_ref().map(|v| v.is_thumbnail).unwrap_or(false)
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {:?} ({})", self.index, self.kind, self.codec)
    }
}

/// Complete probed description of one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// True container format from probing, never the file-name extension
    pub container: ContainerFormat,
    /// All streams in original container order
    pub streams: Vec<StreamDescriptor>,
    pub duration_seconds: f64,
    /// Non-zero when the timeline does not begin at zero
    pub start_time_offset: f64,
    /// Whether structural index data precedes payload data (moov-first)
    pub structural_metadata_first: bool,
    /// Container-level tags (title, encoder, custom keys)
    pub custom_tags: HashMap<String, String>,
}

impl MediaDescriptor {
    /// Create a descriptor with validation. Stream indices must be unique
    /// and preserve original ordering.
    pub fn new(
        container: ContainerFormat,
        streams: Vec<StreamDescriptor>,
        duration_seconds: f64,
    ) -> Result<Self, DomainError> {
        for pair in streams.windows(2) {
            if pair[1].index <= pair[0].index {
                return Err(DomainError::BadArgs(format!(
                    "Stream indices must be unique and ascending (found {} after {})",
                    pair[1].index, pair[0].index
                )));
            }
        }
        if duration_seconds < 0.0 {
            return Err(DomainError::BadArgs(
                "Duration cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            container,
            streams,
            duration_seconds,
            start_time_offset: 0.0,
            structural_metadata_first: true,
            custom_tags: HashMap::new(),
        })
    }

    pub fn stream(&self, index: u32) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.index == index)
    }

    pub fn video_streams(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(|s| s.kind == StreamKind::Video)
    }

    pub fn audio_streams(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(|s| s.kind == StreamKind::Audio)
    }

    pub fn total_streams(&self) -> usize {
        self.streams.len()
    }
}
