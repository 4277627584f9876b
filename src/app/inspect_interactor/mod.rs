// Inspect interactor - probe reporting use case

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::model::MediaDescriptor;
use crate::domain::options::ProcessingOptions;
use crate::error::ConformResult;
use crate::planner::{resolve, DecisionPlan};
use crate::ports::ProbePort;

/// Request to report what probing and planning would see
#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub input: PathBuf,
    /// When set, include the plan these options would resolve to
    pub options: Option<ProcessingOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse {
    pub media: MediaDescriptor,
    pub plan: Option<DecisionPlan>,
}

/// Interactor for the inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    pub async fn execute(&self, request: InspectRequest) -> ConformResult<InspectResponse> {
        let media = self.probe_port.probe_media(&request.input).await?;
        let plan = request.options.as_ref().map(|o| resolve(&media, o));
        Ok(InspectResponse { media, plan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    use crate::domain::model::{StreamDescriptor, VideoProperties};
    use crate::planner::ContainerAction;
    use crate::utils::format::ContainerFormat;

    struct FixedProbe(MediaDescriptor);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_media(&self, _file_path: &Path) -> ConformResult<MediaDescriptor> {
            Ok(self.0.clone())
        }
    }

    fn media() -> MediaDescriptor {
        MediaDescriptor::new(
            ContainerFormat::Mkv,
            vec![StreamDescriptor::video(
                0,
                "h264",
                VideoProperties::new(1280, 720).unwrap(),
            )],
            42.0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_inspect_without_options_reports_media_only() {
        let interactor = InspectInteractor::new(Arc::new(FixedProbe(media())));
        let response = interactor
            .execute(InspectRequest {
                input: PathBuf::from("movie.mkv"),
                options: None,
            })
            .await
            .unwrap();
        assert_eq!(response.media.container, ContainerFormat::Mkv);
        assert!(response.plan.is_none());
    }

    #[tokio::test]
    async fn test_inspect_with_options_previews_plan() {
        let interactor = InspectInteractor::new(Arc::new(FixedProbe(media())));
        let response = interactor
            .execute(InspectRequest {
                input: PathBuf::from("movie.mkv"),
                options: Some(ProcessingOptions::default()),
            })
            .await
            .unwrap();
        let plan = response.plan.unwrap();
        assert_eq!(plan.container_action, ContainerAction::Remux);
    }
}
