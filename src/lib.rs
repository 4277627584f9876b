//! Media normalization engine
//!
//! Probes media files, plans the least destructive transform that satisfies
//! a set of container/codec/quality constraints, and drives a single
//! external worker pass. The planner prefers, in order: a byte-identical
//! copy, a remux, and only then a re-encode of the streams that need one.
//!
//! # Usage
//!
//! ```bash
//! conform convert movie.mkv
//! conform convert movie.avi --format mp4 --video-quality high --faststart
//! conform thumbnail movie.mp4 --fraction 0.5
//! conform inspect movie.mp4 --json
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod directive;
pub mod domain;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::MediaDescriptor;
pub use domain::options::{ProcessingOptions, ThumbnailProcessingOptions};
pub use error::{ConformError, ConformResult};
pub use planner::{resolve, select_thumbnail_source, DecisionPlan};
