//! ffmpeg execution adapter
//!
//! Runs one emitted invocation to completion. The worker writes into a
//! temporary file next to the final output and the result is renamed into
//! place only on success, so a failed run never leaves a partial artifact
//! at the output path.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::directive::{classify_failure, Directive};
use crate::error::{ConformError, ConformResult};
use crate::ports::{TransformPort, TransformReport};

/// ffmpeg-based transform adapter
pub struct FfmpegAdapter {
    program: Option<String>,
}

impl FfmpegAdapter {
    pub fn new() -> Self {
        Self { program: None }
    }

    /// Override the worker binary, for tests and unusual installs
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }
}

impl Default for FfmpegAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransformPort for FfmpegAdapter {
    async fn run(&self, directive: &Directive) -> ConformResult<TransformReport> {
        let parent = directive
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        tokio::fs::create_dir_all(&parent).await?;

        let suffix = directive
            .output
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let temp = tempfile::Builder::new()
            .prefix(".conform-")
            .suffix(&suffix)
            .tempfile_in(&parent)?;
        let temp_path = temp.path().to_path_buf();

        let program = self.program.as_deref().unwrap_or(&directive.program);
        debug!(command = %directive.command_line(), temp = %temp_path.display(), "running transform");

        let output = Command::new(program)
            .args(directive.argv_for(&temp_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ConformError::WorkerFailure {
                exit_code: None,
                stderr: format!("failed to launch {}: {}", program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Temp file is dropped here, taking the partial write with it.
            return Err(classify_failure(output.status.code(), &stderr));
        }

        let output_size_bytes = tokio::fs::metadata(&temp_path).await?.len();
        temp.persist(&directive.output)
            .map_err(|e| ConformError::IoError(e.error))?;
        info!(
            output = %directive.output.display(),
            bytes = output_size_bytes,
            "transform complete"
        );
        Ok(TransformReport {
            output: directive.output.clone(),
            output_size_bytes,
        })
    }
}
