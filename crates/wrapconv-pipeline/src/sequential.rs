use std::path::{Path, PathBuf};

use wrapconv_imgproc::filter::{convolve_with_mode, ConvolutionMode, Filter};
use wrapconv_io::{
    functional::{read_image_any_gray8, write_image_bmp_gray8},
    IoError,
};

use crate::{
    error::PipelineError,
    gauge::InFlightGauge,
    report::{output_path, ItemFailure, PipelineItem, PipelineReport},
};

/// Convolve a batch of images one at a time on the calling thread.
///
/// Every image is read, convolved with `mode` and written before the next one is read, so at most
/// one decoded image is in memory. Failures follow the same policy as
/// [`crate::run_streaming_pipeline`]: they are recorded in the report and the batch continues.
///
/// # Errors
///
/// An invalid filter or mode, or an output directory that cannot be created.
pub fn run_sequential_pipeline(
    paths: &[PathBuf],
    filter: &Filter,
    filter_name: &str,
    mode: ConvolutionMode,
    output_dir: impl AsRef<Path>,
) -> Result<PipelineReport, PipelineError> {
    filter.validate()?;
    mode.validate()?;

    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(IoError::from)?;

    log::info!(
        "processing {} images one by one with filter {filter_name} and mode {mode}",
        paths.len()
    );

    let gauge = InFlightGauge::new();
    let mut report = PipelineReport::default();

    for path in paths {
        let _ticket = gauge.acquire();
        let processed = read_image_any_gray8(path)
            .map_err(PipelineError::from)
            .and_then(|image| {
                let item = PipelineItem::new(path, image);
                let convolved = convolve_with_mode(&item.image, filter, mode)?;
                let output = output_path(output_dir, &item.name, filter_name, mode);
                write_image_bmp_gray8(&output, &convolved)?;
                Ok(output)
            });

        match processed {
            Ok(output) => report.record_written(output),
            Err(error) => report.record_failure(ItemFailure {
                path: path.clone(),
                error,
            }),
        }
    }

    report.peak_in_memory = gauge.peak();

    log::info!(
        "sequential done: {} written, {} failed",
        report.processed(),
        report.failed()
    );

    Ok(report)
}
