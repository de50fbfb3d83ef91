use std::path::{Path, PathBuf};

use tokio::sync::Semaphore;

use crate::error::PipelineError;

/// Default number of decoded images waiting for a convolution worker.
pub const DEFAULT_BUFFER_CAPACITY: usize = 5;

/// Default number of images convolved or written at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration of the streaming pipeline.
///
/// # Example
///
/// ```
/// use wrapconv_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .with_buffer_capacity(2)
///     .with_concurrency(4)
///     .with_output_dir("results");
///
/// assert_eq!(config.buffer_capacity, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of the channel between the read and the convolve stages.
    pub buffer_capacity: usize,
    /// Maximum number of images in the convolve and write stages.
    pub concurrency: usize,
    /// Number of threads of the convolution pool. `None` uses the available parallelism.
    pub num_threads: Option<usize>,
    /// Directory receiving the output images.
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Creates a new PipelineConfig object with default values.
    ///
    /// Note: The default buffer capacity is 5, the default concurrency is 8, the thread pool
    /// follows the available parallelism and the output directory is `output`.
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            concurrency: DEFAULT_CONCURRENCY,
            num_threads: None,
            output_dir: PathBuf::from("output"),
        }
    }

    /// Sets the capacity of the read buffer.
    ///
    /// # Arguments
    ///
    /// * `buffer_capacity` - The number of decoded images that may wait for a worker
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    /// Sets the maximum number of images processed at the same time.
    ///
    /// # Arguments
    ///
    /// * `concurrency` - The number of convolution workers
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the number of threads of the convolution pool.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Sets the directory receiving the output images.
    pub fn with_output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    /// Number of threads the convolution pool will be built with.
    pub fn resolved_num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check that every capacity of the configuration is positive and fits a tokio semaphore.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first capacity that is zero or above
    /// [`Semaphore::MAX_PERMITS`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.buffer_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "buffer_capacity must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(PipelineError::InvalidConfig(
                "concurrency must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("buffer_capacity", self.buffer_capacity),
            ("concurrency", self.concurrency),
        ] {
            if value > Semaphore::MAX_PERMITS {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be at most {}, got {value}",
                    Semaphore::MAX_PERMITS
                )));
            }
        }
        if self.num_threads == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "num_threads must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
