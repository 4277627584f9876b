//! Decision planning - per-stream actions, container action, thumbnail source

use serde::{Deserialize, Serialize};

use crate::domain::model::{AudioCodec, StreamKind, VideoCodec};
use crate::utils::format::ContainerFormat;

pub mod container;
pub mod stream;
pub mod thumbnail;

pub use container::ContainerDecision;
pub use stream::resolve;
pub use thumbnail::{select_thumbnail_source, ThumbnailSource};

/// What happens to the container as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerAction {
    /// Output is a byte-identical copy of the input
    NoOp,
    /// Repackage streams without re-encoding any of them
    Remux,
    /// At least one stream is re-encoded; the container rewrite rides along
    Transcode,
}

/// Video filter applied during a re-encode, in chain order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoFilter {
    Deinterlace { parity: String },
    Scale { width: u32, height: u32 },
    /// Tone-map HDR down to BT.709 primaries/transfer
    TonemapSdr,
}

/// Concrete video re-encode parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEncodeParams {
    pub codec: VideoCodec,
    pub crf: u8,
    pub preset: String,
    pub filters: Vec<VideoFilter>,
}

/// Concrete audio re-encode parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEncodeParams {
    pub codec: AudioCodec,
    pub bitrate_kbps: u32,
    /// Downmix ceiling; None keeps the source channel count
    pub downmix_channels: Option<u32>,
}

/// Action resolved for one input stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamAction {
    /// Stream is not mapped to the output
    Drop { rule: String },
    /// Stream bytes carried to the output unchanged
    Copy,
    ReencodeVideo(VideoEncodeParams),
    ReencodeAudio(AudioEncodeParams),
}

impl StreamAction {
    pub fn is_drop(&self) -> bool {
        matches!(self, StreamAction::Drop { .. })
    }

    pub fn is_reencode(&self) -> bool {
        matches!(
            self,
            StreamAction::ReencodeVideo(_) | StreamAction::ReencodeAudio(_)
        )
    }
}

/// Decision for one input stream, including the stream-level metadata that
/// is carried to the output under every stripping mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDecision {
    pub input_index: u32,
    pub kind: StreamKind,
    pub action: StreamAction,
    pub language: Option<String>,
    pub disposition_default: bool,
    /// Rotation-correction metadata copied verbatim; None when absent or
    /// stripped under the Required mode
    pub rotation_degrees: Option<i32>,
}

/// Complete resolved plan for one processing request. Created fresh per
/// request, never mutated after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPlan {
    pub container_action: ContainerAction,
    pub target_format: ContainerFormat,
    /// Move structural index data ahead of payload data
    pub relocate_structural_metadata: bool,
    /// Drop standard and custom container tags
    pub strip_container_metadata: bool,
    /// Carry container tags through the transform explicitly
    pub carry_metadata_explicitly: bool,
    /// Keep the non-zero timeline start offset on the output
    pub preserve_start_offset: bool,
    pub start_time_offset: f64,
    pub streams: Vec<StreamDecision>,
}

impl DecisionPlan {
    /// Whether the output is a byte-identical copy of the input
    pub fn is_noop(&self) -> bool {
        self.container_action == ContainerAction::NoOp
    }

    /// Streams mapped to the output, in original index order
    pub fn kept_streams(&self) -> impl Iterator<Item = &StreamDecision> {
        self.streams.iter().filter(|s| !s.action.is_drop())
    }

    pub fn has_reencode(&self) -> bool {
        self.streams.iter().any(|s| s.action.is_reencode())
    }
}
