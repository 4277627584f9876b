//! ffprobe probing adapter
//!
//! Shells out to ffprobe for stream-level inspection and reads the
//! container's own box layout to learn whether structural metadata
//! precedes payload data.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::model::{
    AudioProperties, FieldOrder, MediaDescriptor, StreamDescriptor, StreamKind, VideoProperties,
};
use crate::domain::rules;
use crate::error::{ConformError, ConformResult};
use crate::ports::ProbePort;
use crate::utils::format::ContainerFormat;

/// ffprobe-based probe adapter
pub struct FfprobeAdapter {
    program: String,
}

impl FfprobeAdapter {
    pub fn new() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> ConformResult<MediaDescriptor> {
        let output = Command::new(&self.program)
            .arg("-hide_banner")
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(file_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ConformError::ProbeError {
                message: format!("failed to launch {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConformError::UnsupportedInput {
                message: format!(
                    "probe of {} failed: {}",
                    file_path.display(),
                    stderr.trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let mut media = parse_probe_output(&text)?;

        // Box order is only meaningful for MP4-family containers.
        if media.container.supports_faststart() {
            match moov_precedes_mdat(file_path).await {
                Ok(Some(moov_first)) => media.structural_metadata_first = moov_first,
                Ok(None) => {
                    debug!(path = %file_path.display(), "no structural boxes found, assuming metadata-first");
                }
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "box-order scan failed, assuming metadata-first");
                }
            }
        }

        debug!(
            path = %file_path.display(),
            container = %media.container,
            streams = media.total_streams(),
            duration = media.duration_seconds,
            "probe complete"
        );
        Ok(media)
    }
}

/// Parse ffprobe's JSON report into a media descriptor
pub fn parse_probe_output(text: &str) -> ConformResult<MediaDescriptor> {
    let root: Value = serde_json::from_str(text).map_err(|e| ConformError::ProbeError {
        message: format!("malformed probe report: {}", e),
    })?;

    let format = root.get("format").ok_or_else(|| ConformError::ProbeError {
        message: "probe report has no format section".to_string(),
    })?;

    let format_name = format
        .get("format_name")
        .and_then(Value::as_str)
        .unwrap_or("");
    let container =
        ContainerFormat::from_probe_name(format_name).ok_or_else(|| {
            ConformError::UnsupportedInput {
                message: format!("unrecognized container format: {}", format_name),
            }
        })?;

    let duration_seconds = parse_numeric_field(format, "duration").unwrap_or(0.0);
    let mut start_time_offset = parse_numeric_field(format, "start_time").unwrap_or(0.0);
    if start_time_offset.abs() < 0.001 {
        start_time_offset = 0.0;
    }

    let mut streams = Vec::new();
    if let Some(raw_streams) = root.get("streams").and_then(Value::as_array) {
        for raw in raw_streams {
            streams.push(parse_stream(raw)?);
        }
    }
    let container = refine_container(container, &streams);

    let mut media =
        MediaDescriptor::new(container, streams, duration_seconds).map_err(|e| {
            ConformError::ProbeError {
                message: e.to_string(),
            }
        })?;
    media.start_time_offset = start_time_offset;

    if let Some(tags) = format.get("tags").and_then(Value::as_object) {
        for (key, value) in tags {
            if let Some(value) = value.as_str() {
                media.custom_tags.insert(key.clone(), value.to_string());
            }
        }
    }
    Ok(media)
}

/// matroska and webm share a demuxer, so the probe reports both names for
/// either container. A file whose streams all fit the webm codec profile
/// is identified as webm; anything else stays mkv.
fn refine_container(container: ContainerFormat, streams: &[StreamDescriptor]) -> ContainerFormat {
    if container != ContainerFormat::Mkv || streams.is_empty() {
        return container;
    }
    let webm_profile = streams.iter().all(|s| match s.kind {
        StreamKind::Video => matches!(s.codec.as_str(), "vp8" | "vp9" | "av1"),
        StreamKind::Audio => matches!(s.codec.as_str(), "opus" | "vorbis"),
        StreamKind::Subtitle => s.codec == "webvtt",
        _ => false,
    });
    if webm_profile {
        ContainerFormat::WebM
    } else {
        container
    }
}

fn parse_stream(raw: &Value) -> ConformResult<StreamDescriptor> {
    let index = raw
        .get("index")
        .and_then(Value::as_u64)
        .ok_or_else(|| ConformError::ProbeError {
            message: "stream without an index".to_string(),
        })? as u32;
    let codec = raw
        .get("codec_name")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let codec_type = raw.get("codec_type").and_then(Value::as_str).unwrap_or("");

    let mut stream = match codec_type {
        "video" => {
            let properties = parse_video_properties(raw)?;
            StreamDescriptor::video(index, codec, properties)
        }
        "audio" => {
            let properties = parse_audio_properties(raw)?;
            StreamDescriptor::audio(index, codec, properties)
        }
        "subtitle" => StreamDescriptor::subtitle(index, codec),
        "attachment" => StreamDescriptor::attachment(index, codec),
        _ => StreamDescriptor::other(index, codec),
    };

    if let Some(language) = raw
        .get("tags")
        .and_then(|t| t.get("language"))
        .and_then(Value::as_str)
    {
        if language != "und" {
            stream.language = Some(language.to_string());
        }
    }
    stream.disposition_default = raw
        .get("disposition")
        .and_then(|d| d.get("default"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
        != 0;
    Ok(stream)
}

fn parse_video_properties(raw: &Value) -> ConformResult<VideoProperties> {
    let width = raw.get("width").and_then(Value::as_u64).unwrap_or(0) as u32;
    let height = raw.get("height").and_then(Value::as_u64).unwrap_or(0) as u32;
    let mut props =
        VideoProperties::new(width, height).map_err(|e| ConformError::ProbeError {
            message: e.to_string(),
        })?;

    if let Some(sar) = raw.get("sample_aspect_ratio").and_then(Value::as_str) {
        if let Some(parsed) = rules::parse_aspect_ratio(sar) {
            props.sample_aspect_ratio = parsed;
        }
    }
    if let Some(pix_fmt) = raw.get("pix_fmt").and_then(Value::as_str) {
        props.pixel_format = pix_fmt.to_string();
        props.bit_depth = rules::detect_bit_depth(pix_fmt);
    }
    if let Some(bits) = raw
        .get("bits_per_raw_sample")
        .and_then(Value::as_str)
        .and_then(|b| b.parse::<u8>().ok())
    {
        props.bit_depth = bits;
    }
    props.color_primaries = color_field(raw, "color_primaries");
    props.color_transfer = color_field(raw, "color_transfer");
    props.color_space = color_field(raw, "color_space");
    if let Some(field_order) = raw.get("field_order").and_then(Value::as_str) {
        props.field_order = FieldOrder::from_probe_name(field_order);
    }
    props.rotation_degrees = parse_rotation(raw);
    props.is_thumbnail = raw
        .get("disposition")
        .and_then(|d| d.get("attached_pic"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
        != 0;
    Ok(props)
}

fn parse_audio_properties(raw: &Value) -> ConformResult<AudioProperties> {
    let channels = raw.get("channels").and_then(Value::as_u64).unwrap_or(0) as u32;
    let sample_rate = raw
        .get("sample_rate")
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<u32>().ok())
        .unwrap_or(0);
    let mut props =
        AudioProperties::new(channels, sample_rate).map_err(|e| ConformError::ProbeError {
            message: e.to_string(),
        })?;
    props.channel_layout = raw
        .get("channel_layout")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(props)
}

fn color_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|v| *v != "unknown" && *v != "unspecified")
        .map(str::to_string)
}

/// Rotation lives either in legacy stream tags or in display-matrix side
/// data, depending on the muxer. Values are normalized to 0..360.
fn parse_rotation(raw: &Value) -> Option<i32> {
    let tagged = raw
        .get("tags")
        .and_then(|t| t.get("rotate"))
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<i32>().ok());
    let side_data = raw
        .get("side_data_list")
        .and_then(Value::as_array)
        .and_then(|list| {
            list.iter().find_map(|entry| {
                entry
                    .get("rotation")
                    .and_then(Value::as_f64)
                    .map(|r| r as i32)
            })
        });
    tagged
        .or(side_data)
        .map(|degrees| degrees.rem_euclid(360))
        .filter(|degrees| *degrees != 0)
}

fn parse_numeric_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Scan top-level MP4 boxes and report whether the moov box precedes the
/// mdat box. Returns None when either box is missing.
async fn moov_precedes_mdat(file_path: &Path) -> ConformResult<Option<bool>> {
    let mut file = tokio::fs::File::open(file_path).await?;
    let len = file.metadata().await?.len();
    let mut offset: u64 = 0;
    let mut header = [0u8; 16];

    while offset + 8 <= len {
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        let read = file.read(&mut header).await?;
        if read < 8 {
            break;
        }
        match classify_box(&header[..read], len - offset) {
            BoxScan::Moov => return Ok(Some(true)),
            BoxScan::Mdat => return Ok(Some(false)),
            BoxScan::Skip(size) => offset += size,
            BoxScan::Stop => break,
        }
    }
    Ok(None)
}

enum BoxScan {
    Moov,
    Mdat,
    Skip(u64),
    Stop,
}

/// Classify one box header. `remaining` bounds the largest size a valid
/// box can claim.
fn classify_box(header: &[u8], remaining: u64) -> BoxScan {
    if header.len() < 8 {
        return BoxScan::Stop;
    }
    let size32 = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let kind = &header[4..8];
    let size = match size32 {
        0 => remaining,
        1 => {
            // 64-bit largesize in the following 8 bytes
            if header.len() < 16 {
                return BoxScan::Stop;
            }
            u64::from_be_bytes([
                header[8], header[9], header[10], header[11], header[12], header[13],
                header[14], header[15],
            ])
        }
        _ => size32 as u64,
    };
    if size < 8 || size > remaining {
        return BoxScan::Stop;
    }
    match kind {
        b"moov" => BoxScan::Moov,
        b"mdat" => BoxScan::Mdat,
        _ => BoxScan::Skip(size),
    }
}
