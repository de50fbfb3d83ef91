use std::path::{Path, PathBuf};

use wrapconv_image::Image;
use wrapconv_imgproc::filter::ConvolutionMode;
use wrapconv_io::IoError;

use crate::error::PipelineError;

const IMAGE_EXTENSIONS: [&str; 4] = ["bmp", "jpeg", "jpg", "png"];

/// A decoded image travelling through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineItem {
    /// File name of the source image.
    pub name: String,
    /// The grayscale pixels.
    pub image: Image<u8, 1>,
}

impl PipelineItem {
    /// Wrap an image decoded from `path`.
    pub fn new(path: &Path, image: Image<u8, 1>) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, image }
    }
}

/// An image that could not be read, convolved or written.
#[derive(Debug)]
pub struct ItemFailure {
    /// Path of the source image.
    pub path: PathBuf,
    /// What went wrong.
    pub error: PipelineError,
}

/// Summary of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Output files written, in completion order.
    pub written: Vec<PathBuf>,
    /// Items that failed. A failure never stops the other items.
    pub failures: Vec<ItemFailure>,
    /// Largest number of decoded images held in memory at the same time.
    pub peak_in_memory: usize,
}

impl PipelineReport {
    /// Number of images written.
    pub fn processed(&self) -> usize {
        self.written.len()
    }

    /// Number of images that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn record_failure(&mut self, failure: ItemFailure) {
        log::warn!(
            "failed to process {}: {}",
            failure.path.display(),
            failure.error
        );
        self.failures.push(failure);
    }

    pub(crate) fn record_written(&mut self, path: PathBuf) {
        log::info!("wrote {}", path.display());
        self.written.push(path);
    }
}

/// Derive the output path of an image.
///
/// The file is named `<base>_<filter>_<mode>.bmp`, where `base` is `name` without its extension
/// and `mode` is the descriptor of the convolution mode.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use wrapconv_imgproc::filter::ConvolutionMode;
/// use wrapconv_pipeline::output_path;
///
/// let path = output_path(
///     Path::new("output"),
///     "lena.png",
///     "sharpen",
///     ConvolutionMode::ParallelRows { batch_size: 16 },
/// );
/// assert_eq!(path, PathBuf::from("output/lena_sharpen_par_rows_16.bmp"));
/// ```
pub fn output_path(
    output_dir: &Path,
    name: &str,
    filter_name: &str,
    mode: ConvolutionMode,
) -> PathBuf {
    let base = Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    output_dir.join(format!("{base}_{filter_name}_{mode}.bmp"))
}

/// List the image files of a directory, sorted by file name.
///
/// Only regular files with a `bmp`, `jpeg`, `jpg` or `png` extension are kept.
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] if `dir` is missing and [`IoError::FileError`] if it
/// cannot be listed.
pub fn collect_image_paths(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, PipelineError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(IoError::FileDoesNotExist(dir.to_path_buf()).into());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(IoError::from)? {
        let path = entry.map_err(IoError::from)?.path();
        let is_image = path.extension().is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
        if path.is_file() && is_image {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths)
}
