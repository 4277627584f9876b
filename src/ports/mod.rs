// Ports - interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::directive::Directive;
use crate::domain::model::MediaDescriptor;
use crate::error::ConformResult;

/// Port for media file probing and analysis
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a media file and return its full stream-level description
    async fn probe_media(&self, file_path: &Path) -> ConformResult<MediaDescriptor>;
}

/// Port for running an emitted transform invocation
#[async_trait]
pub trait TransformPort: Send + Sync {
    /// Run one invocation to completion. The final artifact must only
    /// appear at the directive's output path on success; failures leave no
    /// partial file behind.
    async fn run(&self, directive: &Directive) -> ConformResult<TransformReport>;
}

/// Outcome of a completed transform invocation
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub output: PathBuf,
    pub output_size_bytes: u64,
}
