//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the convert command. Constraint flags have no clap
/// defaults; an absent flag leaves the config-file or built-in value in
/// force.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input media file path
    pub input: PathBuf,

    /// Output file path (default: input stem with the target extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Acceptable output containers, first is preferred (mp4, mov, mkv, ...)
    #[arg(long = "format", value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Acceptable video codecs, first is the re-encode target
    #[arg(long = "video-codec", value_delimiter = ',')]
    pub video_codecs: Option<Vec<String>>,

    /// Acceptable audio codecs, first is the re-encode target
    #[arg(long = "audio-codec", value_delimiter = ',')]
    pub audio_codecs: Option<Vec<String>>,

    /// Video re-encode policy (never, if-needed, always)
    #[arg(long)]
    pub video_reencode: Option<String>,

    /// Audio re-encode policy (never, if-needed, always)
    #[arg(long)]
    pub audio_reencode: Option<String>,

    /// Video quality level (lowest, low, medium, high, highest)
    #[arg(long)]
    pub video_quality: Option<String>,

    /// Encoder effort level (lowest, low, medium, high, highest)
    #[arg(long)]
    pub compression: Option<String>,

    /// Audio quality level (lowest, low, medium, high, highest)
    #[arg(long)]
    pub audio_quality: Option<String>,

    /// Shrink video to fit within this width (requires --max-height)
    #[arg(long, requires = "max_height")]
    pub max_width: Option<u32>,

    /// Shrink video to fit within this height (requires --max-width)
    #[arg(long, requires = "max_width")]
    pub max_height: Option<u32>,

    /// Metadata stripping policy (none, preferred, thumbnail-only, required)
    #[arg(long)]
    pub strip_metadata: Option<String>,

    /// De-interlace any interlaced video stream
    #[arg(long)]
    pub deinterlace: bool,

    /// Place structural metadata ahead of payload data
    #[arg(long)]
    pub faststart: bool,

    /// Remove all audio streams
    #[arg(long)]
    pub no_audio: bool,

    /// Downmix ceiling on audio channel count
    #[arg(long)]
    pub max_audio_channels: Option<u32>,

    /// Tone-map HDR video down to SDR
    #[arg(long)]
    pub hdr_to_sdr: bool,

    /// Drop attachment and unrecognized streams
    #[arg(long)]
    pub drop_unrecognized: bool,

    /// Log a validation line for every probed stream
    #[arg(long)]
    pub validate_streams: bool,

    /// Resolve and print the plan without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the thumbnail command
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Input media file path
    pub input: PathBuf,

    /// Output PNG path (default: input stem with .png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Absolute timestamp in seconds
    #[arg(long)]
    pub timestamp: Option<f64>,

    /// Fraction of total duration, 0..=1 (the earlier of the two wins)
    #[arg(long)]
    pub fraction: Option<f64>,

    /// Use an embedded cover image as the source when present
    #[arg(long)]
    pub include_covers: bool,

    /// Tone-map HDR sources down to SDR
    #[arg(long)]
    pub hdr_to_sdr: bool,

    /// Correct non-square pixels to square-pixel dimensions
    #[arg(long)]
    pub square_pixels: bool,

    /// Resolve and print the extraction plan without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input media file path
    pub input: PathBuf,

    /// Also report the plan the current options would resolve to
    #[arg(long)]
    pub plan: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
