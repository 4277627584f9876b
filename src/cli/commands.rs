//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::ConfigFile;
use crate::app::{AppContainer, ConvertRequest, InspectRequest, ThumbnailRequest};
use crate::cli::args::{ConvertArgs, InspectArgs, ThumbnailArgs};
use crate::domain::errors::DomainError;
use crate::domain::model::{AudioCodec, VideoCodec};
use crate::domain::options::{
    Level, MetadataStrippingMode, OptionsOverride, ProcessingOptions, ReencodeMode,
    ResizeOptions, ThumbnailProcessingOptions,
};
use crate::planner::ContainerAction;
use crate::utils::format::ContainerFormat;

/// Execute the convert command
pub async fn convert(
    args: ConvertArgs,
    config: &ConfigFile,
    container: &dyn AppContainer,
) -> Result<()> {
    let options = resolve_options(&args, config)?;
    let response = container
        .convert_interactor()
        .execute(ConvertRequest {
            input: args.input.clone(),
            output: args.output.clone(),
            options,
            dry_run: args.dry_run,
        })
        .await
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&response.plan)?);
        if let Some(directive) = &response.directive {
            println!("{}", directive.command_line());
        } else {
            println!("no-op: output would be a byte-identical copy");
        }
        return Ok(());
    }

    match response.plan.container_action {
        ContainerAction::NoOp => {
            println!("copied (already conformant): {}", response.output.display())
        }
        ContainerAction::Remux => println!("remuxed: {}", response.output.display()),
        ContainerAction::Transcode => println!("transcoded: {}", response.output.display()),
    }
    Ok(())
}

/// Execute the thumbnail command
pub async fn thumbnail(
    args: ThumbnailArgs,
    config: &ConfigFile,
    container: &dyn AppContainer,
) -> Result<()> {
    let options = resolve_thumbnail_options(&args, config);
    let response = container
        .thumbnail_interactor()
        .execute(ThumbnailRequest {
            input: args.input.clone(),
            output: args.output.clone(),
            options,
            dry_run: args.dry_run,
        })
        .await
        .with_context(|| format!("failed to extract thumbnail from {}", args.input.display()))?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&response.source)?);
        println!("{}", response.directive.command_line());
        return Ok(());
    }
    println!(
        "thumbnail ({}x{}, stream {}): {}",
        response.source.width,
        response.source.height,
        response.source.stream_index,
        response.output.display()
    );
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(
    args: InspectArgs,
    config: &ConfigFile,
    container: &dyn AppContainer,
) -> Result<()> {
    let options = if args.plan {
        Some(config.options.apply_to(&ProcessingOptions::default()))
    } else {
        None
    };
    let response = container
        .inspect_interactor()
        .execute(InspectRequest {
            input: args.input.clone(),
            options,
        })
        .await
        .with_context(|| format!("failed to inspect {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let media = &response.media;
    println!(
        "{}: {} ({:.2}s, {} streams)",
        args.input.display(),
        media.container,
        media.duration_seconds,
        media.total_streams()
    );
    for stream in &media.streams {
        println!("  {}", stream);
    }
    if let Some(plan) = &response.plan {
        println!("plan: {:?} -> {}", plan.container_action, plan.target_format);
        info!(noop = plan.is_noop(), "plan preview resolved");
    }
    Ok(())
}

/// Layer command-line flags over the config file over built-in defaults
fn resolve_options(args: &ConvertArgs, config: &ConfigFile) -> Result<ProcessingOptions> {
    let cli_override = build_override(args)?;
    let from_file = config.options.apply_to(&ProcessingOptions::default());
    Ok(cli_override.apply_to(&from_file))
}

/// Translate passed flags into a partial override. Absent flags stay None
/// so lower layers keep their values.
fn build_override(args: &ConvertArgs) -> Result<OptionsOverride, DomainError> {
    let mut over = OptionsOverride::default();

    if let Some(formats) = &args.formats {
        over.result_formats = Some(
            formats
                .iter()
                .map(|f| ContainerFormat::parse(f))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    if let Some(codecs) = &args.video_codecs {
        over.result_video_codecs = Some(
            codecs
                .iter()
                .map(|c| VideoCodec::parse(c))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    if let Some(codecs) = &args.audio_codecs {
        over.result_audio_codecs = Some(
            codecs
                .iter()
                .map(|c| AudioCodec::parse(c))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    if let Some(mode) = &args.video_reencode {
        over.video_reencode_mode = Some(ReencodeMode::parse(mode)?);
    }
    if let Some(mode) = &args.audio_reencode {
        over.audio_reencode_mode = Some(ReencodeMode::parse(mode)?);
    }
    if let Some(level) = &args.video_quality {
        over.video_quality = Some(Level::parse(level)?);
    }
    if let Some(level) = &args.compression {
        over.video_compression_level = Some(Level::parse(level)?);
    }
    if let Some(level) = &args.audio_quality {
        over.audio_quality = Some(Level::parse(level)?);
    }
    if let (Some(width), Some(height)) = (args.max_width, args.max_height) {
        over.resize = Some(ResizeOptions::fit_down(width, height)?);
    }
    if let Some(mode) = &args.strip_metadata {
        over.metadata_stripping = Some(MetadataStrippingMode::parse(mode)?);
    }
    if args.deinterlace {
        over.force_progressive_frames = Some(true);
    }
    if args.faststart {
        over.force_progressive_download = Some(true);
    }
    if args.no_audio {
        over.remove_audio_streams = Some(true);
    }
    if let Some(channels) = args.max_audio_channels {
        over.max_audio_channels = Some(channels);
    }
    if args.hdr_to_sdr {
        over.remap_hdr_to_sdr = Some(true);
    }
    if args.drop_unrecognized {
        over.try_preserve_unrecognized_streams = Some(false);
    }
    if args.validate_streams {
        over.force_validate_all_streams = Some(true);
    }
    Ok(over)
}

fn resolve_thumbnail_options(
    args: &ThumbnailArgs,
    config: &ConfigFile,
) -> ThumbnailProcessingOptions {
    let mut options = config.thumbnail.clone();
    if args.timestamp.is_some() {
        options.image_timestamp = args.timestamp;
    }
    if args.fraction.is_some() {
        options.image_timestamp_fraction = args.fraction;
    }
    if args.include_covers {
        options.include_thumbnail_video_streams = true;
    }
    if args.hdr_to_sdr {
        options.remap_hdr_to_sdr = true;
    }
    if args.square_pixels {
        options.force_square_pixels = true;
    }
    options
}
