// Convert interactor - orchestrates the normalization use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::directive::{emit, Directive};
use crate::domain::options::ProcessingOptions;
use crate::error::{ConformError, ConformResult};
use crate::planner::{resolve, ContainerAction, DecisionPlan};
use crate::ports::{ProbePort, TransformPort};

/// Request to normalize one input file
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    /// Explicit output path; derived from the input when absent
    pub output: Option<PathBuf>,
    pub options: ProcessingOptions,
    /// Plan without touching the filesystem
    pub dry_run: bool,
}

/// Outcome of a normalization request
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub plan: DecisionPlan,
    pub output: PathBuf,
    /// The planned worker invocation; absent for byte-identical copies
    pub directive: Option<Directive>,
    pub executed: bool,
}

/// Interactor for the normalization use case
pub struct ConvertInteractor {
    probe_port: Arc<dyn ProbePort>,
    transform_port: Arc<dyn TransformPort>,
}

impl ConvertInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, transform_port: Arc<dyn TransformPort>) -> Self {
        Self {
            probe_port,
            transform_port,
        }
    }

    pub async fn execute(&self, request: ConvertRequest) -> ConformResult<ConvertResponse> {
        let media = self.probe_port.probe_media(&request.input).await?;

        if request.options.force_validate_all_streams {
            for stream in &media.streams {
                info!(stream = %stream, "validated stream");
            }
        }

        let plan = resolve(&media, &request.options);
        let output = match &request.output {
            Some(path) => path.clone(),
            None => derive_output_path(&request.input, plan.target_format.extension()),
        };

        // Rejected before any write path, including the no-op byte copy:
        // copying a file onto itself truncates it before reading.
        if output == request.input {
            return Err(ConformError::ConfigError {
                message: format!(
                    "output path {} would overwrite the input",
                    output.display()
                ),
            });
        }

        if plan.is_noop() {
            info!(
                input = %request.input.display(),
                output = %output.display(),
                "input already conforms, copying bytes"
            );
            if !request.dry_run {
                if same_file(&request.input, &output).await {
                    return Err(ConformError::ConfigError {
                        message: format!(
                            "output path {} resolves to the input file",
                            output.display()
                        ),
                    });
                }
                tokio::fs::copy(&request.input, &output).await?;
            }
            return Ok(ConvertResponse {
                plan,
                output,
                directive: None,
                executed: !request.dry_run,
            });
        }

        let directive = emit(&plan, &request.input, &output);
        info!(
            input = %request.input.display(),
            action = ?plan.container_action,
            target = %plan.target_format,
            reencodes = plan.streams.iter().filter(|s| s.action.is_reencode()).count(),
            "plan resolved"
        );
        if plan.container_action == ContainerAction::Transcode {
            warn!("re-encoding is lossy; prefer remux where constraints allow");
        }

        if request.dry_run {
            return Ok(ConvertResponse {
                plan,
                output,
                directive: Some(directive),
                executed: false,
            });
        }

        let report = self.transform_port.run(&directive).await?;
        Ok(ConvertResponse {
            plan,
            output: report.output,
            directive: Some(directive),
            executed: true,
        })
    }
}

/// Whether two paths alias the same existing file through relative
/// segments or links. Unresolvable paths (typically a not-yet-created
/// output) cannot alias the input.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Default output path: input stem with the target extension. When that
/// collides with the input itself, an infix keeps the two distinct.
fn derive_output_path(input: &Path, extension: &str) -> PathBuf {
    let candidate = input.with_extension(extension);
    if candidate != input {
        return candidate;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}.conform.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::model::{MediaDescriptor, StreamDescriptor, VideoProperties};
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

    fn media(container: ContainerFormat) -> MediaDescriptor {
        MediaDescriptor::new(
            container,
            vec![StreamDescriptor::video(
                0,
                "h264",
                VideoProperties::new(1280, 720).unwrap(),
            )],
            30.0,
        )
        .unwrap()
    }

    fn interactor(
        media: MediaDescriptor,
    ) -> (ConvertInteractor, Arc<RecordingTransform>) {
        let transform = Arc::new(RecordingTransform::default());
        let interactor = ConvertInteractor::new(
            Arc::new(FixedProbe(media)),
            Arc::clone(&transform) as Arc<dyn TransformPort>,
        );
        (interactor, transform)
    }

    #[tokio::test]
    async fn test_noop_copies_bytes_without_worker() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"already conformant").await.unwrap();
        let output = dir.path().join("out.mp4");

        let (interactor, transform) = interactor(media(ContainerFormat::Mp4));
        let response = interactor
            .execute(ConvertRequest {
                input: input.clone(),
                output: Some(output.clone()),
                options: ProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap();

        assert!(response.plan.is_noop());
        assert!(response.directive.is_none());
        assert!(transform.runs.lock().unwrap().is_empty());
        assert_eq!(
            tokio::fs::read(&output).await.unwrap(),
            b"already conformant"
        );
    }

    #[tokio::test]
    async fn test_remux_runs_worker_once() {
        let (interactor, transform) = interactor(media(ContainerFormat::Mkv));
        let response = interactor
            .execute(ConvertRequest {
                input: PathBuf::from("movie.mkv"),
                output: None,
                options: ProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap();

        assert_eq!(response.plan.container_action, ContainerAction::Remux);
        assert_eq!(response.output, PathBuf::from("movie.mp4"));
        assert_eq!(transform.runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_emits_plan_without_side_effects() {
        let (interactor, transform) = interactor(media(ContainerFormat::Mkv));
        let response = interactor
            .execute(ConvertRequest {
                input: PathBuf::from("movie.mkv"),
                output: None,
                options: ProcessingOptions::default(),
                dry_run: true,
            })
            .await
            .unwrap();

        assert!(!response.executed);
        assert!(response.directive.is_some());
        assert!(transform.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_noop_output_equal_to_input_keeps_input_intact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"keep these bytes").await.unwrap();

        let (interactor, transform) = interactor(media(ContainerFormat::Mp4));
        let err = interactor
            .execute(ConvertRequest {
                input: input.clone(),
                output: Some(input.clone()),
                options: ProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConformError::ConfigError { .. }));
        assert!(transform.runs.lock().unwrap().is_empty());
        assert_eq!(tokio::fs::read(&input).await.unwrap(), b"keep these bytes");
    }

    #[tokio::test]
    async fn test_noop_aliased_output_path_keeps_input_intact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"keep these bytes").await.unwrap();
        // Same file, different spelling
        let alias = dir.path().join(".").join("in.mp4");
        assert_ne!(alias, input);

        let (interactor, _) = interactor(media(ContainerFormat::Mp4));
        let err = interactor
            .execute(ConvertRequest {
                input: input.clone(),
                output: Some(alias),
                options: ProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConformError::ConfigError { .. }));
        assert_eq!(tokio::fs::read(&input).await.unwrap(), b"keep these bytes");
    }

    #[tokio::test]
    async fn test_output_collision_rejected() {
        let (interactor, _) = interactor(media(ContainerFormat::Mkv));
        let err = interactor
            .execute(ConvertRequest {
                input: PathBuf::from("movie.mkv"),
                output: Some(PathBuf::from("movie.mkv")),
                options: ProcessingOptions::default(),
                dry_run: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConformError::ConfigError { .. }));
    }

    #[test]
    fn test_derived_path_keeps_stem() {
        assert_eq!(
            derive_output_path(Path::new("clips/movie.mkv"), "mp4"),
            PathBuf::from("clips/movie.mp4")
        );
    }

    #[test]
    fn test_derived_path_collision_gets_infix() {
        assert_eq!(
            derive_output_path(Path::new("movie.mp4"), "mp4"),
            PathBuf::from("movie.conform.mp4")
        );
    }
}
