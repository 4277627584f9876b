//! Container-level decision
//!
//! Given the per-stream action set, decide whether the container as a whole
//! is untouched, remuxed, or rewritten as part of a re-encode pass. File
//! identity always follows the probed container format, never the
//! file-name extension.

use tracing::debug;

use crate::domain::model::MediaDescriptor;
use crate::domain::options::{MetadataStrippingMode, ProcessingOptions};
use crate::planner::{ContainerAction, StreamDecision};
use crate::utils::format::ContainerFormat;

/// Resolved container-level outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDecision {
    pub action: ContainerAction,
    pub target_format: ContainerFormat,
    pub relocate_structural_metadata: bool,
    pub strip_container_metadata: bool,
    pub carry_metadata_explicitly: bool,
    pub preserve_start_offset: bool,
}

pub fn decide(
    media: &MediaDescriptor,
    options: &ProcessingOptions,
    streams: &[StreamDecision],
) -> ContainerDecision {
    let format_acceptable = options.result_formats.contains(&media.container);
    let target_format = if format_acceptable {
        media.container
    } else {
        options
            .result_formats
            .first()
            .copied()
            .unwrap_or(ContainerFormat::Mp4)
    };

    let any_reencode = streams.iter().any(|s| s.action.is_reencode());
    let any_drop = streams.iter().any(|s| s.action.is_drop());

    let mut action = if any_reencode {
        ContainerAction::Transcode
    } else if !format_acceptable
        || any_drop
        || options.metadata_stripping == MetadataStrippingMode::Required
    {
        ContainerAction::Remux
    } else {
        ContainerAction::NoOp
    };

    // Progressive-download layout is additive: it rides along with any
    // rewrite, and on an otherwise untouched file it forces a remux only
    // when the structural metadata is not already up front.
    let relocate_structural_metadata = options.force_progressive_download
        && target_format.supports_faststart()
        && (action != ContainerAction::NoOp || !media.structural_metadata_first);
    if relocate_structural_metadata && action == ContainerAction::NoOp {
        action = ContainerAction::Remux;
        debug!("structural-metadata relocation upgraded container action to remux");
    }

    let strip_container_metadata = match options.metadata_stripping {
        MetadataStrippingMode::Required => true,
        MetadataStrippingMode::Preferred => action != ContainerAction::NoOp,
        MetadataStrippingMode::None | MetadataStrippingMode::ThumbnailOnly => false,
    };

    let preserve_start_offset = media.start_time_offset != 0.0
        && options.metadata_stripping != MetadataStrippingMode::Required;

    ContainerDecision {
        action,
        target_format,
        relocate_structural_metadata,
        strip_container_metadata,
        carry_metadata_explicitly: options.metadata_stripping == MetadataStrippingMode::None,
        preserve_start_offset,
    }
}
