use std::{path::PathBuf, sync::Arc};

use tokio::{
    sync::{mpsc, OwnedSemaphorePermit, Semaphore},
    task::JoinSet,
};
use wrapconv_image::Image;
use wrapconv_imgproc::filter::{convolve_with_mode, ConvolutionMode, Filter};
use wrapconv_io::functional::{read_image_any_gray8, write_image_bmp_gray8};

use crate::{
    config::PipelineConfig,
    error::PipelineError,
    gauge::{InFlightGauge, InFlightTicket},
    report::{output_path, ItemFailure, PipelineItem, PipelineReport},
};

/// A decoded image waiting in the read buffer.
struct Decoded {
    path: PathBuf,
    item: PipelineItem,
    ticket: InFlightTicket,
}

/// A convolved image waiting to be written.
///
/// The permit and the ticket are released once the image is on disk.
struct Convolved {
    path: PathBuf,
    output: PathBuf,
    image: Image<u8, 1>,
    _permit: OwnedSemaphorePermit,
    _ticket: InFlightTicket,
}

/// Convolve a batch of images with a bounded number of images in memory.
///
/// The run is split in three stages connected by bounded channels:
///
/// * read: decodes the images in `paths` order into a buffer of
///   [`PipelineConfig::buffer_capacity`] slots. A slot is reserved before decoding, so the reader
///   stalls while the buffer is full.
/// * convolve: takes a permit out of [`PipelineConfig::concurrency`] before pulling an image and
///   runs [`convolve_with_mode`] on a rayon pool of [`PipelineConfig::num_threads`] threads shared
///   by the whole run.
/// * write: stores every result as `<output_dir>/<base>_<filter_name>_<mode>.bmp` and only then
///   gives the permit back.
///
/// At most `buffer_capacity + concurrency` decoded images exist at once. Outputs are written in
/// completion order.
///
/// # Arguments
///
/// * `paths` - The source images.
/// * `filter` - The filter applied to every image.
/// * `filter_name` - The filter name used in the output file names.
/// * `mode` - The decomposition strategy used for every image.
/// * `config` - The pipeline configuration.
///
/// # Returns
///
/// A report listing the written files, the failed items and the peak number of images in memory.
///
/// # Errors
///
/// The filter, the mode and the configuration are validated, the output directory is created and
/// the thread pool is built before any image is read; a failure there is returned as an error.
/// Failures of individual images are recorded in [`PipelineReport::failures`] instead.
pub async fn run_streaming_pipeline(
    paths: Vec<PathBuf>,
    filter: Filter,
    filter_name: &str,
    mode: ConvolutionMode,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    filter.validate()?;
    mode.validate()?;
    config.validate()?;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(wrapconv_io::IoError::from)?;

    let num_threads = config.resolved_num_threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("wrapconv-conv-{i}"))
        .build()
        .map_err(|e| PipelineError::ThreadPool(e.to_string()))?;

    log::info!(
        "streaming {} images with filter {filter_name} and mode {mode} \
         (buffer: {}, concurrency: {}, threads: {num_threads})",
        paths.len(),
        config.buffer_capacity,
        config.concurrency,
    );

    let gauge = InFlightGauge::new();
    let (read_tx, read_rx) = mpsc::channel(config.buffer_capacity);
    let (write_tx, mut write_rx) = mpsc::channel(config.concurrency);

    let read_task = tokio::spawn(read_stage(paths, read_tx, gauge.clone()));

    let convolve_task = tokio::spawn(convolve_stage(
        read_rx,
        write_tx,
        ConvolveContext {
            pool: Arc::new(pool),
            permits: Arc::new(Semaphore::new(config.concurrency)),
            filter: Arc::new(filter),
            filter_name: filter_name.to_string(),
            mode,
            output_dir: config.output_dir.clone(),
        },
    ));

    // write stage
    let mut report = PipelineReport::default();
    while let Some(message) = write_rx.recv().await {
        let convolved = match message {
            Ok(convolved) => convolved,
            Err(failure) => {
                report.record_failure(failure);
                continue;
            }
        };

        let Convolved {
            path,
            output,
            image,
            _permit,
            _ticket,
        } = convolved;

        let written = tokio::task::spawn_blocking({
            let output = output.clone();
            move || write_image_bmp_gray8(&output, &image)
        })
        .await;

        match written {
            Ok(Ok(())) => report.record_written(output),
            Ok(Err(err)) => report.record_failure(ItemFailure {
                path,
                error: err.into(),
            }),
            Err(err) => report.record_failure(ItemFailure {
                path,
                error: PipelineError::Task(err.to_string()),
            }),
        }
    }

    read_task
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?;
    convolve_task
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;

    report.peak_in_memory = gauge.peak();

    log::info!(
        "streaming done: {} written, {} failed, peak in memory: {}",
        report.processed(),
        report.failed(),
        report.peak_in_memory
    );

    Ok(report)
}

async fn read_stage(
    paths: Vec<PathBuf>,
    read_tx: mpsc::Sender<Result<Decoded, ItemFailure>>,
    gauge: Arc<InFlightGauge>,
) {
    for path in paths {
        // reserve the buffer slot before the image exists
        let Ok(slot) = read_tx.reserve().await else {
            log::warn!("convolve stage closed, stop reading");
            break;
        };

        let ticket = gauge.acquire();
        let decoded = tokio::task::spawn_blocking({
            let path = path.clone();
            move || read_image_any_gray8(&path)
        })
        .await;

        let message = match decoded {
            Ok(Ok(image)) => {
                log::debug!(
                    "read {} ({} images in memory)",
                    path.display(),
                    gauge.current()
                );
                Ok(Decoded {
                    item: PipelineItem::new(&path, image),
                    path,
                    ticket,
                })
            }
            Ok(Err(err)) => Err(ItemFailure {
                path,
                error: err.into(),
            }),
            Err(err) => Err(ItemFailure {
                path,
                error: PipelineError::Task(err.to_string()),
            }),
        };

        slot.send(message);
    }
}

/// Everything a convolution worker shares with its siblings.
struct ConvolveContext {
    pool: Arc<rayon::ThreadPool>,
    permits: Arc<Semaphore>,
    filter: Arc<Filter>,
    filter_name: String,
    mode: ConvolutionMode,
    output_dir: PathBuf,
}

async fn convolve_stage(
    mut read_rx: mpsc::Receiver<Result<Decoded, ItemFailure>>,
    write_tx: mpsc::Sender<Result<Convolved, ItemFailure>>,
    ctx: ConvolveContext,
) -> Result<(), PipelineError> {
    let mut workers = JoinSet::new();

    loop {
        // the permit is taken before the item so a full stage leaves images in the buffer
        let permit = ctx
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?;

        let Some(message) = read_rx.recv().await else {
            break;
        };

        let decoded = match message {
            Ok(decoded) => decoded,
            Err(failure) => {
                // nothing to hold for a failed read
                drop(permit);
                if write_tx.send(Err(failure)).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let pool = ctx.pool.clone();
        let filter = ctx.filter.clone();
        let mode = ctx.mode;
        let write_tx = write_tx.clone();
        let Decoded { path, item, ticket } = decoded;
        let output = output_path(&ctx.output_dir, &item.name, &ctx.filter_name, mode);

        workers.spawn(async move {
            let image = item.image;
            let convolved = tokio::task::spawn_blocking(move || {
                pool.install(|| convolve_with_mode(&image, &filter, mode))
            })
            .await;

            let message = match convolved {
                Ok(Ok(image)) => Ok(Convolved {
                    path,
                    output,
                    image,
                    _permit: permit,
                    _ticket: ticket,
                }),
                Ok(Err(err)) => Err(ItemFailure {
                    path,
                    error: err.into(),
                }),
                Err(err) => Err(ItemFailure {
                    path,
                    error: PipelineError::Task(err.to_string()),
                }),
            };

            if write_tx.send(message).await.is_err() {
                log::warn!("write stage closed, dropping result");
            }
        });

        // reap the workers that are already done
        while workers.try_join_next().is_some() {}
    }

    // close our side so the write stage ends with the last worker
    drop(write_tx);

    while let Some(joined) = workers.join_next().await {
        joined.map_err(|e| PipelineError::Task(e.to_string()))?;
    }

    Ok(())
}
