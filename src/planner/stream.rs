//! Per-stream decision engine
//!
//! The central policy resolver: for every input stream, determine drop /
//! copy / re-encode and, when re-encoding, the concrete target parameters.
//! Pure function of the descriptor and options; no hidden state.
//!
//! Rule precedence: drop rules evaluate top-down and the first match wins.
//! Re-encode triggers evaluate top-down and accumulate, so a stream that is
//! both oversized and interlaced gets one re-encode carrying both filters.
//! The forced-mode rule applies last; otherwise the stream is copied.

use tracing::debug;

use crate::domain::model::{
    AudioCodec, MediaDescriptor, StreamDescriptor, StreamKind, VideoCodec,
};
use crate::domain::options::{MetadataStrippingMode, ProcessingOptions, ReencodeMode};
use crate::domain::rules;
use crate::planner::{
    container, AudioEncodeParams, DecisionPlan, StreamAction, StreamDecision, VideoEncodeParams,
    VideoFilter,
};

/// Resolve a complete decision plan for one processing request
pub fn resolve(media: &MediaDescriptor, options: &ProcessingOptions) -> DecisionPlan {
    let decisions: Vec<StreamDecision> = media
        .streams
        .iter()
        .map(|stream| decide_stream(stream, options))
        .collect();

    let container = container::decide(media, options, &decisions);

    for decision in &decisions {
        debug!(
            index = decision.input_index,
            kind = ?decision.kind,
            action = ?decision.action,
            "stream decision"
        );
    }
    debug!(
        action = ?container.action,
        format = %container.target_format,
        "container decision"
    );

    DecisionPlan {
        container_action: container.action,
        target_format: container.target_format,
        relocate_structural_metadata: container.relocate_structural_metadata,
        strip_container_metadata: container.strip_container_metadata,
        carry_metadata_explicitly: container.carry_metadata_explicitly,
        preserve_start_offset: container.preserve_start_offset,
        start_time_offset: media.start_time_offset,
        streams: decisions,
    }
}

/// Ordered drop rules; first match wins
struct DropRule {
    name: &'static str,
    applies: fn(&StreamDescriptor, &ProcessingOptions) -> bool,
}

const DROP_RULES: &[DropRule] = &[
    DropRule {
        name: "unrecognized-stream",
        applies: drop_unrecognized,
    },
    DropRule {
        name: "audio-removal",
        applies: drop_removed_audio,
    },
    DropRule {
        name: "thumbnail-strip",
        applies: drop_stripped_thumbnail,
    },
];

fn drop_unrecognized(stream: &StreamDescriptor, options: &ProcessingOptions) -> bool {
    !stream.kind.is_recognized() && !options.try_preserve_unrecognized_streams
}

fn drop_removed_audio(stream: &StreamDescriptor, options: &ProcessingOptions) -> bool {
    stream.kind == StreamKind::Audio && options.remove_audio_streams
}

fn drop_stripped_thumbnail(stream: &StreamDescriptor, options: &ProcessingOptions) -> bool {
    stream.is_thumbnail_stream()
        && matches!(
            options.metadata_stripping,
            MetadataStrippingMode::ThumbnailOnly | MetadataStrippingMode::Required
        )
}

fn decide_stream(stream: &StreamDescriptor, options: &ProcessingOptions) -> StreamDecision {
    let action = decide_action(stream, options);

    // Stream-level metadata is carried to the mapped output stream under
    // every stripping mode; rotation alone is removed under Required.
    let rotation_degrees = stream
        .video
        .as_ref()
        .and_then(|v| v.rotation_degrees)
        .filter(|_| options.metadata_stripping != MetadataStrippingMode::Required);

    StreamDecision {
        input_index: stream.index,
        kind: stream.kind,
        action,
        language: stream.language.clone(),
        disposition_default: stream.disposition_default,
        rotation_degrees,
    }
}

fn decide_action(stream: &StreamDescriptor, options: &ProcessingOptions) -> StreamAction {
    for rule in DROP_RULES {
        if (rule.applies)(stream, options) {
            return StreamAction::Drop {
                rule: rule.name.to_string(),
            };
        }
    }

    match stream.kind {
        StreamKind::Video => decide_video(stream, options),
        StreamKind::Audio => decide_audio(stream, options),
        // Subtitles and preserved auxiliary streams pass through
        _ => StreamAction::Copy,
    }
}

fn decide_video(stream: &StreamDescriptor, options: &ProcessingOptions) -> StreamAction {
    let props = match &stream.video {
        Some(props) => props,
        None => return StreamAction::Copy,
    };
    if options.video_reencode_mode == ReencodeMode::Never {
        return StreamAction::Copy;
    }

    let mut triggers: Vec<&'static str> = Vec::new();
    let mut filters: Vec<VideoFilter> = Vec::new();

    let codec_permitted = options.result_video_codecs.is_empty()
        || options
            .result_video_codecs
            .iter()
            .any(|c| c.matches_name(&stream.codec));
    if !codec_permitted {
        triggers.push("codec-constraint");
    }

    if options.force_progressive_frames {
        if let Some(parity) = rules::deinterlace_parity(props.field_order) {
            triggers.push("deinterlace");
            filters.push(VideoFilter::Deinterlace {
                parity: parity.to_string(),
            });
        }
    }

    if let Some(resize) = &options.resize {
        if let Some((width, height)) =
            rules::fit_down(props.width, props.height, resize.max_width, resize.max_height)
        {
            triggers.push("resize");
            filters.push(VideoFilter::Scale { width, height });
        }
    }

    if options.remap_hdr_to_sdr && rules::is_hdr(props) {
        triggers.push("hdr-to-sdr");
        filters.push(VideoFilter::TonemapSdr);
    }

    let forced = options.video_reencode_mode == ReencodeMode::Always;
    if triggers.is_empty() && !forced {
        return StreamAction::Copy;
    }

    debug!(
        index = stream.index,
        triggers = ?triggers,
        forced,
        "video re-encode"
    );

    StreamAction::ReencodeVideo(VideoEncodeParams {
        codec: target_video_codec(&stream.codec, options),
        crf: rules::video_crf(options.video_quality),
        preset: rules::encoder_preset(options.video_compression_level).to_string(),
        filters,
    })
}

fn decide_audio(stream: &StreamDescriptor, options: &ProcessingOptions) -> StreamAction {
    let props = match &stream.audio {
        Some(props) => props,
        None => return StreamAction::Copy,
    };
    if options.audio_reencode_mode == ReencodeMode::Never {
        return StreamAction::Copy;
    }

    let codec_permitted = options.result_audio_codecs.is_empty()
        || options
            .result_audio_codecs
            .iter()
            .any(|c| c.matches_name(&stream.codec));

    let downmix_channels = options
        .max_audio_channels
        .filter(|&max| props.channels > max);

    let forced = options.audio_reencode_mode == ReencodeMode::Always;
    if codec_permitted && downmix_channels.is_none() && !forced {
        return StreamAction::Copy;
    }

    StreamAction::ReencodeAudio(AudioEncodeParams {
        codec: target_audio_codec(&stream.codec, options),
        bitrate_kbps: rules::audio_bitrate_kbps(options.audio_quality),
        downmix_channels,
    })
}

/// Re-encode target: keep the current codec when it is in the permitted
/// set, otherwise the first (preferred) permitted codec
fn target_video_codec(codec_name: &str, options: &ProcessingOptions) -> VideoCodec {
    options
        .result_video_codecs
        .iter()
        .find(|c| c.matches_name(codec_name))
        .or_else(|| options.result_video_codecs.first())
        .copied()
        .unwrap_or(VideoCodec::H264)
}

fn target_audio_codec(codec_name: &str, options: &ProcessingOptions) -> AudioCodec {
    options
        .result_audio_codecs
        .iter()
        .find(|c| c.matches_name(codec_name))
        .or_else(|| options.result_audio_codecs.first())
        .copied()
        .unwrap_or(AudioCodec::Aac)
}
