//! Container format identification
//!
//! Output extension and muxer choice always follow the probed container
//! format, never the file-name extension of the input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Canonical container formats the engine can reason about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mov,
    Mkv,
    WebM,
    Avi,
    MpegTs,
    Ogg,
}

impl ContainerFormat {
    /// Resolve ffprobe's `format_name` (a comma-separated demuxer alias
    /// list, e.g. `mov,mp4,m4a,3gp,3g2,mj2`) to one canonical format.
    pub fn from_probe_name(format_name: &str) -> Option<Self> {
        let names: Vec<&str> = format_name.split(',').map(|s| s.trim()).collect();
        if names.contains(&"mp4") {
            return Some(ContainerFormat::Mp4);
        }
        if names.contains(&"mov") {
            return Some(ContainerFormat::Mov);
        }
        if names.contains(&"webm") || names.contains(&"matroska") {
            // matroska and webm share a demuxer; treat both as mkv
            return Some(ContainerFormat::Mkv);
        }
        if names.contains(&"avi") {
            return Some(ContainerFormat::Avi);
        }
        if names.contains(&"mpegts") {
            return Some(ContainerFormat::MpegTs);
        }
        if names.contains(&"ogg") {
            return Some(ContainerFormat::Ogg);
        }
        None
    }

    /// Parse a user-supplied format name
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_lowercase().as_str() {
            "mp4" | "m4v" => Ok(ContainerFormat::Mp4),
            "mov" => Ok(ContainerFormat::Mov),
            "mkv" | "matroska" => Ok(ContainerFormat::Mkv),
            "webm" => Ok(ContainerFormat::WebM),
            "avi" => Ok(ContainerFormat::Avi),
            "ts" | "mpegts" => Ok(ContainerFormat::MpegTs),
            "ogg" => Ok(ContainerFormat::Ogg),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown container format: {}. Valid formats: mp4, mov, mkv, webm, avi, ts, ogg",
                name
            ))),
        }
    }

    /// Preferred file-name extension for output artifacts
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::WebM => "webm",
            ContainerFormat::Avi => "avi",
            ContainerFormat::MpegTs => "ts",
            ContainerFormat::Ogg => "ogg",
        }
    }

    /// Muxer name handed to the external worker
    pub fn muxer_name(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Mkv => "matroska",
            ContainerFormat::WebM => "webm",
            ContainerFormat::Avi => "avi",
            ContainerFormat::MpegTs => "mpegts",
            ContainerFormat::Ogg => "ogg",
        }
    }

    /// Whether the container keeps structural index data in a movable
    /// header (the progressive-download relocation applies only here)
    pub fn supports_faststart(&self) -> bool {
        matches!(self, ContainerFormat::Mp4 | ContainerFormat::Mov)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
