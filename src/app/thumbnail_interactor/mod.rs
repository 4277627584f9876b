// Thumbnail interactor - single-frame extraction use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::directive::{emit_thumbnail, Directive};
use crate::domain::options::ThumbnailProcessingOptions;
use crate::error::ConformResult;
use crate::planner::{select_thumbnail_source, ThumbnailSource};
use crate::ports::{ProbePort, TransformPort};

/// Request to extract one representative frame
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub options: ThumbnailProcessingOptions,
    pub dry_run: bool,
}

/// Outcome of a thumbnail request
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailResponse {
    pub source: ThumbnailSource,
    pub output: PathBuf,
    pub directive: Directive,
    pub executed: bool,
}

/// Interactor for the thumbnail use case
pub struct ThumbnailInteractor {
    probe_port: Arc<dyn ProbePort>,
    transform_port: Arc<dyn TransformPort>,
}

impl ThumbnailInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, transform_port: Arc<dyn TransformPort>) -> Self {
        Self {
            probe_port,
            transform_port,
        }
    }

    pub async fn execute(&self, request: ThumbnailRequest) -> ConformResult<ThumbnailResponse> {
        let media = self.probe_port.probe_media(&request.input).await?;
        let source = select_thumbnail_source(&media, &request.options)?;

        let output = request
            .output
            .clone()
            .unwrap_or_else(|| derive_output_path(&request.input));
        let directive = emit_thumbnail(&source, &request.input, &output);
        info!(
            input = %request.input.display(),
            stream = source.stream_index,
            timestamp = source.timestamp_seconds,
            dimensions = format!("{}x{}", source.width, source.height),
            "thumbnail source resolved"
        );

        if request.dry_run {
            return Ok(ThumbnailResponse {
                source,
                output,
                directive,
                executed: false,
            });
        }

        let report = self.transform_port.run(&directive).await?;
        Ok(ThumbnailResponse {
            source,
            output: report.output,
            directive,
            executed: true,
        })
    }
}

fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::model::{MediaDescriptor, StreamDescriptor, VideoProperties};
    use crate::error::ConformError;
    use crate::ports::TransformReport;
    use crate::utils::format::ContainerFormat;

    struct FixedProbe(MediaDescriptor);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_media(&self, _file_path: &Path) -> ConformResult<MediaDescriptor> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingTransform {
        runs: Mutex<Vec<Directive>>,
    }

    #[async_trait]
    impl TransformPort for RecordingTransform {
        async fn run(&self, directive: &Directive) -> ConformResult<TransformReport> {
            self.runs.lock().unwrap().push(directive.clone());
            Ok(TransformReport {
                output: directive.output.clone(),
                output_size_bytes: 0,
            })
        }
    }

    fn media() -> MediaDescriptor {
        MediaDescriptor::new(
            ContainerFormat::Mp4,
            vec![StreamDescriptor::video(
                0,
                "h264",
                VideoProperties::new(1920, 1080).unwrap(),
            )],
            20.0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_extraction_runs_worker_once() {
        let transform = Arc::new(RecordingTransform::default());
        let interactor = ThumbnailInteractor::new(
            Arc::new(FixedProbe(media())),
            Arc::clone(&transform) as Arc<dyn TransformPort>,
        );
        let response = interactor
            .execute(ThumbnailRequest {
                input: PathBuf::from("movie.mp4"),
                output: None,
                options: ThumbnailProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap();

        assert_eq!(response.output, PathBuf::from("movie.png"));
        assert_eq!(response.source.stream_index, 0);
        assert_eq!(transform.runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_selection_error_surfaces_before_worker() {
        let transform = Arc::new(RecordingTransform::default());
        let interactor = ThumbnailInteractor::new(
            Arc::new(FixedProbe(media())),
            Arc::clone(&transform) as Arc<dyn TransformPort>,
        );
        let err = interactor
            .execute(ThumbnailRequest {
                input: PathBuf::from("movie.mp4"),
                output: None,
                options: ThumbnailProcessingOptions {
                    image_timestamp: Some(90.0),
                    ..Default::default()
                },
                dry_run: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConformError::TimestampBeyondEnd { .. }));
        assert!(transform.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_has_no_side_effects() {
        let transform = Arc::new(RecordingTransform::default());
        let interactor = ThumbnailInteractor::new(
            Arc::new(FixedProbe(media())),
            Arc::clone(&transform) as Arc<dyn TransformPort>,
        );
        let response = interactor
            .execute(ThumbnailRequest {
                input: PathBuf::from("movie.mp4"),
                output: Some(PathBuf::from("cover.png")),
                options: ThumbnailProcessingOptions::default(),
                dry_run: true,
            })
            .await
            .unwrap();
        assert!(!response.executed);
        assert_eq!(response.output, PathBuf::from("cover.png"));
        assert!(transform.runs.lock().unwrap().is_empty());
    }
}
