//! Execution plan emitter
//!
//! Converts a resolved decision plan into one ordered external-tool
//! invocation and classifies the tool's outcome. All stream decisions are
//! batched into a single pass; the emitter never produces more than one
//! invocation per processing request.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::model::StreamKind;
use crate::error::ConformError;
use crate::planner::{DecisionPlan, StreamAction, ThumbnailSource, VideoFilter};

/// One external-tool invocation. The final output path is appended by the
/// executor (which writes to a temporary path and renames on success).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub program: String,
    pub args: Vec<String>,
    /// Intended final artifact path
    pub output: PathBuf,
}

impl Directive {
    /// Full argument vector with the given output path substituted in
    pub fn argv_for(&self, output: &Path) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push(output.to_string_lossy().into_owned());
        argv
    }

    /// Human-readable command line, for logs and dry runs
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in self.argv_for(&self.output) {
            line.push(' ');
            if arg.contains(' ') {
                let _ = write!(line, "\"{}\"", arg);
            } else {
                line.push_str(&arg);
            }
        }
        line
    }
}

/// Emit the single transcode/remux invocation for a decision plan.
/// Must not be called for a no-op plan; byte-identical copies bypass the
/// worker entirely.
pub fn emit(plan: &DecisionPlan, input: &Path, output: &Path) -> Directive {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
    ];

    for decision in plan.kept_streams() {
        args.push("-map".into());
        args.push(format!("0:{}", decision.input_index));
    }

    if plan.strip_container_metadata {
        args.push("-map_metadata".into());
        args.push("-1".into());
    } else if plan.carry_metadata_explicitly {
        args.push("-map_metadata".into());
        args.push("0".into());
    }

    // Per-kind output ordinals for the re-encode specifiers
    let mut video_ordinal = 0usize;
    let mut audio_ordinal = 0usize;

    for (out_index, decision) in plan.kept_streams().enumerate() {
        match &decision.action {
            StreamAction::Drop { .. } => continue,
            StreamAction::Copy => {
                // Flat output index works for every stream kind
                match decision.kind {
                    StreamKind::Video => video_ordinal += 1,
                    StreamKind::Audio => audio_ordinal += 1,
                    _ => {}
                }
                args.push(format!("-c:{}", out_index));
                args.push("copy".into());
            }
            StreamAction::ReencodeVideo(params) => {
                let spec = format!("v:{}", video_ordinal);
                video_ordinal += 1;
                args.push(format!("-c:{}", spec));
                args.push(params.codec.encoder_name().into());
                args.push(format!("-crf:{}", spec));
                args.push(params.crf.to_string());
                args.push(format!("-preset:{}", spec));
                args.push(params.preset.clone());
                if let Some(filter) = video_filter_chain(&params.filters) {
                    args.push(format!("-filter:{}", spec));
                    args.push(filter);
                }
            }
            StreamAction::ReencodeAudio(params) => {
                let spec = format!("a:{}", audio_ordinal);
                audio_ordinal += 1;
                args.push(format!("-c:{}", spec));
                args.push(params.codec.encoder_name().into());
                args.push(format!("-b:{}", spec));
                args.push(format!("{}k", params.bitrate_kbps));
                if let Some(channels) = params.downmix_channels {
                    args.push(format!("-ac:{}", spec));
                    args.push(channels.to_string());
                }
            }
        }

        // Stream-level metadata is re-applied explicitly so it survives
        // every stripping mode on both copy and re-encode paths.
        if let Some(language) = &decision.language {
            args.push(format!("-metadata:s:{}", out_index));
            args.push(format!("language={}", language));
        }
        args.push(format!("-disposition:{}", out_index));
        args.push(if decision.disposition_default {
            "default".into()
        } else {
            "0".into()
        });
        if let Some(rotation) = decision.rotation_degrees {
            args.push(format!("-metadata:s:{}", out_index));
            args.push(format!("rotate={}", rotation));
        }
    }

    if plan.preserve_start_offset {
        args.push("-output_ts_offset".into());
        args.push(format!("{:.6}", plan.start_time_offset));
    }

    if plan.relocate_structural_metadata {
        args.push("-movflags".into());
        args.push("+faststart".into());
    }

    args.push("-f".into());
    args.push(plan.target_format.muxer_name().into());

    Directive {
        program: "ffmpeg".into(),
        args,
        output: output.to_path_buf(),
    }
}

/// Render the resolved filters as one chain, in decision order
fn video_filter_chain(filters: &[VideoFilter]) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    let parts: Vec<String> = filters
        .iter()
        .map(|filter| match filter {
            VideoFilter::Deinterlace { parity } => {
                format!("yadif=deint=all:parity={}", parity)
            }
            VideoFilter::Scale { width, height } => {
                format!("scale={}:{}:flags=lanczos", width, height)
            }
            VideoFilter::TonemapSdr => {
                // Tone-map down to BT.709 primaries/transfer
                "zscale=t=linear:npl=100,tonemap=hable:desat=0,\
                 zscale=p=bt709:t=bt709:m=bt709:r=tv,format=yuv420p"
                    .to_string()
            }
        })
        .collect();
    Some(parts.join(","))
}

/// Emit the single-frame thumbnail extraction invocation
pub fn emit_thumbnail(source: &ThumbnailSource, input: &Path, output: &Path) -> Directive {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-nostdin".into(), "-y".into()];

    if !source.direct_frame && source.timestamp_seconds > 0.0 {
        args.push("-ss".into());
        args.push(format!("{:.6}", source.timestamp_seconds));
    }
    args.push("-i".into());
    args.push(input.to_string_lossy().into_owned());
    args.push("-map".into());
    args.push(format!("0:{}", source.stream_index));
    args.push("-frames:v".into());
    args.push("1".into());

    let mut filters = vec![format!(
        "scale={}:{}:flags=lanczos",
        source.width, source.height
    )];
    if source.tonemap_sdr {
        filters.push(
            "zscale=t=linear:npl=100,tonemap=hable:desat=0,\
             zscale=p=bt709:t=bt709:m=bt709:r=tv"
                .to_string(),
        );
    }
    args.push("-vf".into());
    args.push(filters.join(","));

    args.push("-pix_fmt".into());
    args.push(if source.bit_depth > 8 { "rgb48be" } else { "rgb24" }.into());
    args.push("-c:v".into());
    args.push("png".into());
    args.push("-f".into());
    args.push("image2".into());

    Directive {
        program: "ffmpeg".into(),
        args,
        output: output.to_path_buf(),
    }
}

/// Classify a non-zero worker exit into the error taxonomy. Expected
/// "no suitable stream" and malformed-input failures are distinguished
/// from unexpected tool failures; diagnostic text is always attached.
pub fn classify_failure(exit_code: Option<i32>, stderr: &str) -> ConformError {
    let diagnostic = stderr.trim();
    if diagnostic.contains("matches no streams")
        || diagnostic.contains("does not contain any stream")
        || diagnostic.contains("Output file is empty")
    {
        return ConformError::NoEligibleStream {
            message: format!("no suitable stream in input: {}", diagnostic),
        };
    }
    if diagnostic.contains("Invalid data found when processing input")
        || diagnostic.contains("moov atom not found")
        || diagnostic.contains("Invalid data found")
    {
        return ConformError::UnsupportedInput {
            message: diagnostic.to_string(),
        };
    }
    ConformError::WorkerFailure {
        exit_code,
        stderr: diagnostic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AudioProperties, MediaDescriptor, StreamDescriptor, VideoProperties,
    };
    use crate::domain::options::{MetadataStrippingMode, ProcessingOptions, ReencodeMode};
    use crate::planner::resolve;
    use crate::utils::format::ContainerFormat;

    fn plan_for(media: &MediaDescriptor, options: &ProcessingOptions) -> Directive {
        let plan = resolve(media, options);
        emit(&plan, Path::new("in.mkv"), Path::new("out.mp4"))
    }

    fn mkv_media() -> MediaDescriptor {
        let mut video =
            StreamDescriptor::video(0, "h264", VideoProperties::new(1920, 1080).unwrap());
        video.language = Some("eng".to_string());
        video.disposition_default = true;
        let audio = StreamDescriptor::audio(1, "aac", AudioProperties::new(2, 48000).unwrap());
        MediaDescriptor::new(ContainerFormat::Mkv, vec![video, audio], 60.0).unwrap()
    }

    #[test]
    fn test_single_invocation_with_one_input() {
        let directive = plan_for(&mkv_media(), &ProcessingOptions::default());
        assert_eq!(directive.program, "ffmpeg");
        let input_flags = directive.args.iter().filter(|a| a.as_str() == "-i").count();
        assert_eq!(input_flags, 1);
    }

    #[test]
    fn test_remux_maps_all_streams_as_copy() {
        let directive = plan_for(&mkv_media(), &ProcessingOptions::default());
        let args = directive.args.join(" ");
        assert!(args.contains("-map 0:0"));
        assert!(args.contains("-map 0:1"));
        assert!(args.contains("-c:0 copy"));
        assert!(args.contains("-c:1 copy"));
        assert!(args.contains("-f mp4"));
    }

    #[test]
    fn test_language_and_disposition_present_under_required_stripping() {
        let options = ProcessingOptions {
            metadata_stripping: MetadataStrippingMode::Required,
            ..Default::default()
        };
        let directive = plan_for(&mkv_media(), &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-map_metadata -1"));
        assert!(args.contains("-metadata:s:0 language=eng"));
        assert!(args.contains("-disposition:0 default"));
    }

    #[test]
    fn test_metadata_carried_explicitly_under_none_stripping() {
        let options = ProcessingOptions {
            metadata_stripping: MetadataStrippingMode::None,
            ..Default::default()
        };
        let directive = plan_for(&mkv_media(), &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-map_metadata 0"));
        assert!(!args.contains("-map_metadata -1"));
    }

    #[test]
    fn test_reencode_args_include_quality_and_filters() {
        let mut props = VideoProperties::new(3840, 2160).unwrap();
        props.field_order = crate::domain::model::FieldOrder::TopFirst;
        let media = MediaDescriptor::new(
            ContainerFormat::Mkv,
            vec![StreamDescriptor::video(0, "mpeg2video", props)],
            60.0,
        )
        .unwrap();
        let options = ProcessingOptions {
            force_progressive_frames: true,
            ..Default::default()
        };
        let directive = plan_for(&media, &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-c:v:0 libx264"));
        assert!(args.contains("-crf:v:0 23"));
        assert!(args.contains("-preset:v:0 medium"));
        assert!(args.contains("yadif=deint=all:parity=tff"));
    }

    #[test]
    fn test_rotation_metadata_emitted_verbatim() {
        let mut props = VideoProperties::new(1080, 1920).unwrap();
        props.rotation_degrees = Some(90);
        let media = MediaDescriptor::new(
            ContainerFormat::Mkv,
            vec![StreamDescriptor::video(0, "h264", props)],
            60.0,
        )
        .unwrap();
        let directive = plan_for(&media, &ProcessingOptions::default());
        let args = directive.args.join(" ");
        assert!(args.contains("-metadata:s:0 rotate=90"));
    }

    #[test]
    fn test_faststart_flag_for_progressive_download() {
        let mut media = mkv_media();
        media.structural_metadata_first = false;
        let options = ProcessingOptions {
            force_progressive_download: true,
            ..Default::default()
        };
        let directive = plan_for(&media, &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-movflags +faststart"));
    }

    #[test]
    fn test_dropped_streams_not_mapped() {
        let options = ProcessingOptions {
            remove_audio_streams: true,
            ..Default::default()
        };
        let directive = plan_for(&mkv_media(), &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-map 0:0"));
        assert!(!args.contains("-map 0:1"));
    }

    #[test]
    fn test_start_offset_preserved_on_remux() {
        let mut media = mkv_media();
        media.start_time_offset = 0.75;
        let directive = plan_for(&media, &ProcessingOptions::default());
        let args = directive.args.join(" ");
        assert!(args.contains("-output_ts_offset 0.750000"));
    }

    #[test]
    fn test_downmix_channel_argument() {
        let media = MediaDescriptor::new(
            ContainerFormat::Mkv,
            vec![StreamDescriptor::audio(
                0,
                "aac",
                AudioProperties::new(6, 48000).unwrap(),
            )],
            60.0,
        )
        .unwrap();
        let options = ProcessingOptions {
            max_audio_channels: Some(2),
            audio_reencode_mode: ReencodeMode::IfNeeded,
            ..Default::default()
        };
        let directive = plan_for(&media, &options);
        let args = directive.args.join(" ");
        assert!(args.contains("-c:a:0 aac"));
        assert!(args.contains("-b:a:0 128k"));
        assert!(args.contains("-ac:a:0 2"));
    }

    #[test]
    fn test_thumbnail_directive_seeks_and_takes_one_frame() {
        let source = ThumbnailSource {
            stream_index: 1,
            timestamp_seconds: 10.0,
            direct_frame: false,
            width: 1920,
            height: 1080,
            bit_depth: 8,
            tonemap_sdr: false,
        };
        let directive = emit_thumbnail(&source, Path::new("in.mp4"), Path::new("thumb.png"));
        let args = directive.args.join(" ");
        assert!(args.contains("-ss 10.000000"));
        assert!(args.contains("-map 0:1"));
        assert!(args.contains("-frames:v 1"));
        assert!(args.contains("-pix_fmt rgb24"));
    }

    #[test]
    fn test_thumbnail_direct_frame_does_not_seek() {
        let source = ThumbnailSource {
            stream_index: 2,
            timestamp_seconds: 0.0,
            direct_frame: true,
            width: 600,
            height: 600,
            bit_depth: 8,
            tonemap_sdr: false,
        };
        let directive = emit_thumbnail(&source, Path::new("in.mp4"), Path::new("thumb.png"));
        assert!(!directive.args.iter().any(|a| a == "-ss"));
    }

    #[test]
    fn test_thumbnail_high_bit_depth_widens_to_16() {
        let source = ThumbnailSource {
            stream_index: 0,
            timestamp_seconds: 0.0,
            direct_frame: false,
            width: 3840,
            height: 2160,
            bit_depth: 16,
            tonemap_sdr: true,
        };
        let directive = emit_thumbnail(&source, Path::new("in.mp4"), Path::new("thumb.png"));
        let args = directive.args.join(" ");
        assert!(args.contains("-pix_fmt rgb48be"));
        assert!(args.contains("tonemap=hable"));
    }

    #[test]
    fn test_classify_no_stream_failure() {
        let err = classify_failure(Some(1), "Stream map '0:v:0' matches no streams.");
        assert!(matches!(err, ConformError::NoEligibleStream { .. }));
    }

    #[test]
    fn test_classify_malformed_input_failure() {
        let err = classify_failure(Some(1), "in.mp4: Invalid data found when processing input");
        assert!(matches!(err, ConformError::UnsupportedInput { .. }));
    }

    #[test]
    fn test_classify_unexpected_failure_keeps_diagnostics() {
        let err = classify_failure(Some(137), "Conversion failed!");
        match err {
            ConformError::WorkerFailure { exit_code, stderr } => {
                assert_eq!(exit_code, Some(137));
                assert!(stderr.contains("Conversion failed!"));
            }
            other => panic!("expected worker failure, got {:?}", other),
        }
    }

    #[test]
    fn test_command_line_rendering() {
        let directive = plan_for(&mkv_media(), &ProcessingOptions::default());
        let line = directive.command_line();
        assert!(line.starts_with("ffmpeg "));
        assert!(line.ends_with("out.mp4"));
    }
}
