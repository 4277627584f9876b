//! Thumbnail stream/timestamp selector
//!
//! A specialized read path that picks one video stream and one timestamp,
//! independent of the multi-stream transcode path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaDescriptor, StreamDescriptor};
use crate::domain::options::ThumbnailProcessingOptions;
use crate::domain::rules;

const NO_STREAM_MESSAGE: &str = "no suitable video stream for thumbnail extraction";

/// Resolved single-frame extraction source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSource {
    pub stream_index: u32,
    pub timestamp_seconds: f64,
    /// Embedded thumbnail stream emitted as-is rather than sampled from a
    /// timeline position
    pub direct_frame: bool,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub tonemap_sdr: bool,
}

/// Pick one video stream and one timestamp for thumbnail extraction
pub fn select_thumbnail_source(
    media: &MediaDescriptor,
    options: &ThumbnailProcessingOptions,
) -> Result<ThumbnailSource, DomainError> {
    options.validate()?;

    let stream = select_stream(media, options)?;
    let props = stream
        .video
        .as_ref()
        .ok_or_else(|| DomainError::ProbeFail("video stream without video properties".into()))?;

    let direct_frame = stream.is_thumbnail_stream();
    let timestamp_seconds = if direct_frame {
        0.0
    } else {
        resolve_timestamp(options, media.duration_seconds)?
    };

    // Cap first, then square-pixel correction on the already-capped
    // dimensions.
    let (mut width, mut height) = rules::cap_thumbnail_dimensions(props.width, props.height);
    if options.force_square_pixels && !props.has_square_pixels() {
        let corrected = rules::square_pixel_dimensions(width, height, props.sample_aspect_ratio);
        width = corrected.0;
        height = corrected.1;
    }

    let source = ThumbnailSource {
        stream_index: stream.index,
        timestamp_seconds,
        direct_frame,
        width,
        height,
        bit_depth: rules::thumbnail_bit_depth(props.bit_depth),
        tonemap_sdr: options.remap_hdr_to_sdr && rules::is_hdr(props),
    };
    debug!(
        stream = source.stream_index,
        timestamp = source.timestamp_seconds,
        direct = source.direct_frame,
        "thumbnail source selected"
    );
    Ok(source)
}

/// Stream precedence: an embedded thumbnail stream (when included) is the
/// direct source; otherwise the disposition-default eligible stream, then
/// the first eligible stream in original index order.
fn select_stream<'a>(
    media: &'a MediaDescriptor,
    options: &ThumbnailProcessingOptions,
) -> Result<&'a StreamDescriptor, DomainError> {
    if options.include_thumbnail_video_streams {
        if let Some(thumbnail) = media.video_streams().find(|s| s.is_thumbnail_stream()) {
            return Ok(thumbnail);
        }
    }

    let mut eligible = media
        .video_streams()
        .filter(|s| !s.is_thumbnail_stream())
        .peekable();
    if eligible.peek().is_none() {
        return Err(DomainError::NoEligibleStream(NO_STREAM_MESSAGE.to_string()));
    }

    let eligible: Vec<&StreamDescriptor> = eligible.collect();
    Ok(eligible
        .iter()
        .find(|s| s.disposition_default)
        .copied()
        .unwrap_or(eligible[0]))
}

/// When both an absolute and a fractional timestamp are supplied, the
/// earlier resolved point wins. A timestamp past the end of the timeline
/// is a terminal, user-correctable error.
fn resolve_timestamp(
    options: &ThumbnailProcessingOptions,
    duration_seconds: f64,
) -> Result<f64, DomainError> {
    let fractional = options
        .image_timestamp_fraction
        .map(|fraction| fraction * duration_seconds);
    let resolved = match (options.image_timestamp, fractional) {
        (Some(absolute), Some(fractional)) => absolute.min(fractional),
        (Some(absolute), None) => absolute,
        (None, Some(fractional)) => fractional,
        (None, None) => 0.0,
    };
    if resolved > duration_seconds {
        return Err(DomainError::TimestampBeyondEnd {
            requested: resolved,
            duration: duration_seconds,
        });
    }
    Ok(resolved)
}
