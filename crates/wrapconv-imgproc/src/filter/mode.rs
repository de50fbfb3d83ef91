use std::{fmt, str::FromStr};

use wrapconv_image::Image;

use super::{
    convolve_parallel_cols, convolve_parallel_pixels, convolve_parallel_rows,
    convolve_parallel_tiles, convolve_sequential, Filter, FilterError,
};

/// Controls how a convolution is spread over the thread pool.
///
/// Every mode produces exactly the same output; only the partition of the output pixels into
/// tasks changes. The `Display` implementation renders the descriptor used in output file names.
///
/// # Example
///
/// ```
/// use wrapconv_imgproc::filter::ConvolutionMode;
///
/// let mode: ConvolutionMode = "par_tiles_32x16".parse().unwrap();
/// assert_eq!(
///     mode,
///     ConvolutionMode::ParallelTiles {
///         tile_width: 32,
///         tile_height: 16
///     }
/// );
/// assert_eq!(mode.to_string(), "par_tiles_32x16");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvolutionMode {
    /// Run on the calling thread.
    #[default]
    Sequential,

    /// One task per output pixel.
    ParallelPixels,

    /// One task per batch of `batch_size` consecutive rows.
    ParallelRows {
        /// Rows per task.
        batch_size: usize,
    },

    /// One task per batch of `batch_size` consecutive columns.
    ParallelCols {
        /// Columns per task.
        batch_size: usize,
    },

    /// One task per `tile_width x tile_height` tile.
    ParallelTiles {
        /// Tile width in pixels.
        tile_width: usize,
        /// Tile height in pixels.
        tile_height: usize,
    },
}

impl ConvolutionMode {
    /// Check the partition parameters of the mode.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if a batch size or tile side is zero.
    pub fn validate(&self) -> Result<(), FilterError> {
        let has_zero = match *self {
            ConvolutionMode::Sequential | ConvolutionMode::ParallelPixels => false,
            ConvolutionMode::ParallelRows { batch_size }
            | ConvolutionMode::ParallelCols { batch_size } => batch_size == 0,
            ConvolutionMode::ParallelTiles {
                tile_width,
                tile_height,
            } => tile_width == 0 || tile_height == 0,
        };
        if has_zero {
            return Err(FilterError::InvalidArgument(format!(
                "mode {self} has an empty partition"
            )));
        }
        Ok(())
    }

    /// Convolve `src` with `filter` using this mode, see [`convolve_with_mode`].
    pub fn convolve(
        &self,
        src: &Image<u8, 1>,
        filter: &Filter,
    ) -> Result<Image<u8, 1>, FilterError> {
        convolve_with_mode(src, filter, *self)
    }
}

/// Convolve an image with the strategy selected by `mode`.
///
/// The strategies run on the rayon pool of the caller, so wrapping the call in
/// `ThreadPool::install` bounds the threads used for a single image.
///
/// # Arguments
///
/// * `src` - The source grayscale image.
/// * `filter` - The filter to apply.
/// * `mode` - The decomposition strategy.
///
/// # Returns
///
/// A new image with the same size as `src`.
///
/// # Errors
///
/// The filter and the mode parameters are checked before any task is spawned; see
/// [`FilterError::InvalidKernelSize`] and [`FilterError::InvalidArgument`].
pub fn convolve_with_mode(
    src: &Image<u8, 1>,
    filter: &Filter,
    mode: ConvolutionMode,
) -> Result<Image<u8, 1>, FilterError> {
    log::debug!("convolving {} image with mode {mode}", src.size());

    match mode {
        ConvolutionMode::Sequential => convolve_sequential(src, filter),
        ConvolutionMode::ParallelPixels => convolve_parallel_pixels(src, filter),
        ConvolutionMode::ParallelRows { batch_size } => {
            convolve_parallel_rows(src, filter, batch_size)
        }
        ConvolutionMode::ParallelCols { batch_size } => {
            convolve_parallel_cols(src, filter, batch_size)
        }
        ConvolutionMode::ParallelTiles {
            tile_width,
            tile_height,
        } => convolve_parallel_tiles(src, filter, tile_width, tile_height),
    }
}

impl fmt::Display for ConvolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvolutionMode::Sequential => write!(f, "seq"),
            ConvolutionMode::ParallelPixels => write!(f, "par_pixels"),
            ConvolutionMode::ParallelRows { batch_size } => write!(f, "par_rows_{batch_size}"),
            ConvolutionMode::ParallelCols { batch_size } => write!(f, "par_cols_{batch_size}"),
            ConvolutionMode::ParallelTiles {
                tile_width,
                tile_height,
            } => write!(f, "par_tiles_{tile_width}x{tile_height}"),
        }
    }
}

impl FromStr for ConvolutionMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FilterError::UnknownMode(s.to_string());
        let parse = |value: &str| value.parse::<usize>().map_err(|_| unknown());

        let mode = match s {
            "seq" => ConvolutionMode::Sequential,
            "par_pixels" => ConvolutionMode::ParallelPixels,
            _ => {
                if let Some(batch) = s.strip_prefix("par_rows_") {
                    ConvolutionMode::ParallelRows {
                        batch_size: parse(batch)?,
                    }
                } else if let Some(batch) = s.strip_prefix("par_cols_") {
                    ConvolutionMode::ParallelCols {
                        batch_size: parse(batch)?,
                    }
                } else if let Some(tile) = s.strip_prefix("par_tiles_") {
                    let (width, height) = tile.split_once('x').ok_or_else(unknown)?;
                    ConvolutionMode::ParallelTiles {
                        tile_width: parse(width)?,
                        tile_height: parse(height)?,
                    }
                } else {
                    return Err(unknown());
                }
            }
        };

        Ok(mode)
    }
}
