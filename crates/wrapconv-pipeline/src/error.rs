use wrapconv_imgproc::filter::FilterError;
use wrapconv_io::IoError;

/// An error type for the pipeline module.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error reading, writing or decoding an image.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Error validating the filter or running the convolution.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The pipeline configuration is not usable.
    #[error("Invalid pipeline configuration. {0}")]
    InvalidConfig(String),

    /// Failed to build the convolution thread pool.
    #[error("Failed to build the thread pool. {0}")]
    ThreadPool(String),

    /// A pipeline task panicked or was cancelled.
    #[error("Pipeline task failed. {0}")]
    Task(String),
}
