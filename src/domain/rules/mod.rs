// Domain rules - codec, color, and geometry policy tables

use crate::domain::model::{FieldOrder, VideoProperties};
use crate::domain::options::Level;

/// Hard ceiling on thumbnail output dimensions, per axis
pub const MAX_THUMBNAIL_AXIS: u32 = 32767;

/// HDR detection from probed color metadata. Transfer characteristics are
/// authoritative; BT.2020 primaries alone also count.
pub fn is_hdr(props: &VideoProperties) -> bool {
    if let Some(transfer) = &props.color_transfer {
        if matches!(transfer.as_str(), "smpte2084" | "arib-std-b67") {
            return true;
        }
    }
    if let Some(primaries) = &props.color_primaries {
        if primaries == "bt2020" {
            return true;
        }
    }
    false
}

/// Map quality level to encoder CRF. Lower CRF means higher quality and a
/// larger representative size, so the mapping is strictly decreasing.
pub fn video_crf(quality: Level) -> u8 {
    match quality {
        Level::Lowest => 33,
        Level::Low => 28,
        Level::Medium => 23,
        Level::High => 18,
        Level::Highest => 13,
    }
}

/// Map compression level to encoder preset. Slower presets spend more
/// effort and never increase expected size for a fixed quality.
pub fn encoder_preset(compression: Level) -> &'static str {
    match compression {
        Level::Lowest => "ultrafast",
        Level::Low => "fast",
        Level::Medium => "medium",
        Level::High => "slow",
        Level::Highest => "veryslow",
    }
}

/// Relative effort rank of a preset; used to audit the preset ordering
pub fn preset_effort_rank(preset: &str) -> u8 {
    match preset {
        "ultrafast" => 0,
        "fast" => 1,
        "medium" => 2,
        "slow" => 3,
        "veryslow" => 4,
        _ => 2,
    }
}

/// Map audio quality level to target bitrate, strictly increasing
pub fn audio_bitrate_kbps(quality: Level) -> u32 {
    match quality {
        Level::Lowest => 64,
        Level::Low => 96,
        Level::Medium => 128,
        Level::High => 192,
        Level::Highest => 256,
    }
}

/// De-interlace field parity matching the detected field order
pub fn deinterlace_parity(field_order: FieldOrder) -> Option<&'static str> {
    match field_order {
        FieldOrder::Progressive => None,
        FieldOrder::TopFirst => Some("tff"),
        FieldOrder::BottomFirst => Some("bff"),
    }
}

/// FitDown scaling: returns target dimensions when the source exceeds
/// either bound, preserving aspect ratio and only ever shrinking.
/// Dimensions are rounded to even values for subsampled pixel formats.
pub fn fit_down(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> Option<(u32, u32)> {
    if width <= max_width && height <= max_height {
        return None;
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let target_w = even_dimension((width as f64 * scale).round() as u32);
    let target_h = even_dimension((height as f64 * scale).round() as u32);
    Some((target_w, target_h))
}

fn even_dimension(value: u32) -> u32 {
    let even = value - value % 2;
    even.max(2)
}

/// Proportional cap on thumbnail dimensions: when either axis exceeds the
/// ceiling, both axes scale down so the larger axis lands exactly on it.
pub fn cap_thumbnail_dimensions(width: u32, height: u32) -> (u32, u32) {
    let larger = width.max(height);
    if larger <= MAX_THUMBNAIL_AXIS {
        return (width, height);
    }
    let scale = MAX_THUMBNAIL_AXIS as f64 / larger as f64;
    let capped_w = ((width as f64 * scale).round() as u32).max(1);
    let capped_h = ((height as f64 * scale).round() as u32).max(1);
    (capped_w, capped_h)
}

/// Square-pixel correction: scale one dimension by the sample aspect
/// ratio, rounding to the nearest integer pixel.
pub fn square_pixel_dimensions(width: u32, height: u32, sar: (u32, u32)) -> (u32, u32) {
    let (num, den) = sar;
    if num == den || num == 0 || den == 0 {
        return (width, height);
    }
    if num > den {
        // Wide pixels: stretch horizontally
        let corrected = (width as f64 * num as f64 / den as f64).round() as u32;
        (corrected.max(1), height)
    } else {
        // Tall pixels: stretch vertically
        let corrected = (height as f64 * den as f64 / num as f64).round() as u32;
        (width, corrected.max(1))
    }
}

/// Thumbnail output bit depth mirrors the source: 8-bit stays 8-bit,
/// anything deeper widens to 16-bit. A lossless property of the pixel
/// path, not a quality option.
pub fn thumbnail_bit_depth(source_bit_depth: u8) -> u8 {
    if source_bit_depth <= 8 {
        8
    } else {
        16
    }
}

/// Bit depth inferred from a pixel format name
pub fn detect_bit_depth(pix_fmt: &str) -> u8 {
    if pix_fmt.contains("16le")
        || pix_fmt.contains("16be")
        || pix_fmt.contains("48le")
        || pix_fmt.contains("48be")
        || pix_fmt.contains("64le")
        || pix_fmt.contains("64be")
    {
        return 16;
    }
    if pix_fmt.contains("12le") || pix_fmt.contains("12be") {
        return 12;
    }
    if pix_fmt.contains("10le")
        || pix_fmt.contains("10be")
        || pix_fmt.contains("p010")
        || pix_fmt.contains("p210")
        || pix_fmt.contains("p410")
    {
        return 10;
    }
    8
}

/// Parse an aspect-ratio string like "16:9" into (num, den)
pub fn parse_aspect_ratio(value: &str) -> Option<(u32, u32)> {
    let (num, den) = value.split_once(':')?;
    let num = num.trim().parse::<u32>().ok()?;
    let den = den.trim().parse::<u32>().ok()?;
    if den == 0 {
        return None;
    }
    Some((num, den))
}
