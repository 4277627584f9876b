// Unit tests for option defaults and override merging

use super::*;
use crate::domain::model::{AudioCodec, VideoCodec};
use crate::utils::format::ContainerFormat;

#[test]
fn test_defaults() {
    let options = ProcessingOptions::default();
    assert_eq!(options.result_formats, vec![ContainerFormat::Mp4]);
    assert_eq!(options.result_video_codecs, vec![VideoCodec::H264]);
    assert_eq!(options.result_audio_codecs, vec![AudioCodec::Aac]);
    assert_eq!(options.video_reencode_mode, ReencodeMode::IfNeeded);
    assert_eq!(options.metadata_stripping, MetadataStrippingMode::Preferred);
    assert!(options.try_preserve_unrecognized_streams);
    assert!(options.resize.is_none());
}

#[test]
fn test_override_replaces_only_named_fields() {
    let base = ProcessingOptions::default();
    let ovr = OptionsOverride {
        video_quality: Some(Level::Highest),
        remove_audio_streams: Some(true),
        ..Default::default()
    };
    let merged = ovr.apply_to(&base);
    assert_eq!(merged.video_quality, Level::Highest);
    assert!(merged.remove_audio_streams);
    // Unspecified fields keep the base preset's value
    assert_eq!(merged.video_compression_level, base.video_compression_level);
    assert_eq!(merged.result_formats, base.result_formats);
    assert_eq!(merged.metadata_stripping, base.metadata_stripping);
}

#[test]
fn test_override_is_pure() {
    let base = ProcessingOptions::default();
    let ovr = OptionsOverride {
        metadata_stripping: Some(MetadataStrippingMode::Required),
        ..Default::default()
    };
    let _ = ovr.apply_to(&base);
    assert_eq!(base.metadata_stripping, MetadataStrippingMode::Preferred);
}

#[test]
fn test_layered_overrides_stack() {
    let base = ProcessingOptions::default();
    let file_preset = OptionsOverride {
        video_quality: Some(Level::High),
        force_progressive_download: Some(true),
        ..Default::default()
    };
    let cli = OptionsOverride {
        video_quality: Some(Level::Low),
        ..Default::default()
    };
    let merged = cli.apply_to(&file_preset.apply_to(&base));
    // Later override wins on named fields, earlier layer survives elsewhere
    assert_eq!(merged.video_quality, Level::Low);
    assert!(merged.force_progressive_download);
}

#[test]
fn test_level_ordering() {
    let all = Level::all();
    for pair in all.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_level_parse() {
    assert_eq!(Level::parse("HIGHEST").unwrap(), Level::Highest);
    assert!(Level::parse("ultra").is_err());
}

#[test]
fn test_mode_parsing() {
    assert_eq!(
        ReencodeMode::parse("if-needed").unwrap(),
        ReencodeMode::IfNeeded
    );
    assert_eq!(
        MetadataStrippingMode::parse("thumbnail-only").unwrap(),
        MetadataStrippingMode::ThumbnailOnly
    );
    assert!(ReencodeMode::parse("maybe").is_err());
    assert!(MetadataStrippingMode::parse("all").is_err());
}

#[test]
fn test_thumbnail_options_validation() {
    let mut options = ThumbnailProcessingOptions::default();
    assert!(options.validate().is_ok());

    options.image_timestamp_fraction = Some(1.5);
    assert!(options.validate().is_err());

    options.image_timestamp_fraction = Some(0.5);
    options.image_timestamp = Some(-1.0);
    assert!(options.validate().is_err());
}

#[test]
fn test_resize_options_validation() {
    assert!(ResizeOptions::fit_down(1920, 0).is_err());
    let resize = ResizeOptions::fit_down(1280, 720).unwrap();
    assert_eq!(resize.mode, ResizeMode::FitDown);
}
