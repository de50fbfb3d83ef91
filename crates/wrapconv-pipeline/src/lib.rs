#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Builder-style configuration of the streaming pipeline.
pub mod config;

/// Error types for the pipeline.
pub mod error;

/// Items, failures and the summary produced by a pipeline run.
pub mod report;

/// Synchronous one-image-at-a-time pipeline.
pub mod sequential;

/// Bounded asynchronous pipeline built on tokio.
pub mod streaming;

mod gauge;

pub use crate::config::PipelineConfig;
pub use crate::error::PipelineError;
pub use crate::report::{collect_image_paths, output_path, ItemFailure, PipelineItem, PipelineReport};
pub use crate::sequential::run_sequential_pipeline;
pub use crate::streaming::run_streaming_pipeline;
