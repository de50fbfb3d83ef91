use wrapconv_image::ImageError;

/// Errors raised while building or applying a filter.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel does not have odd dimensions.
    #[error("kernel must have odd dimensions, got {0}x{1}")]
    InvalidKernelSize(usize, usize),

    /// A size or shape argument is not valid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The filter name is not part of the preset catalog.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// The mode descriptor could not be parsed.
    #[error("unknown convolution mode: {0}")]
    UnknownMode(String),

    /// Failed to allocate the output image.
    #[error(transparent)]
    ImageError(#[from] ImageError),
}
