use argh::FromArgs;
use std::{path::PathBuf, time::Instant};

use wrapconv::{
    imgproc::filter::{presets, ConvolutionMode},
    io::functional::{read_image_any_gray8, write_image_bmp_gray8},
    pipeline::{
        collect_image_paths, output_path, run_sequential_pipeline, run_streaming_pipeline,
        PipelineConfig, PipelineItem, PipelineReport,
    },
};

/// Convolve grayscale images with a preset filter on a toroidal grid
#[derive(Debug, FromArgs)]
struct Args {
    /// path to an image file or to a directory of images
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// name of the preset filter, see --list-filters
    #[argh(option, short = 'f')]
    filter: Option<String>,

    /// convolution mode: seq, pixels, rows, cols, tiles or a full descriptor like par_rows_16
    #[argh(option, short = 'm', default = "String::from(\"seq\")")]
    mode: String,

    /// rows or columns per task for the rows and cols modes
    #[argh(option, default = "32")]
    batch_size: usize,

    /// tile width for the tiles mode
    #[argh(option, default = "64")]
    tile_width: usize,

    /// tile height for the tiles mode
    #[argh(option, default = "64")]
    tile_height: usize,

    /// maximum number of images convolved at the same time
    #[argh(option, default = "8")]
    concurrency: usize,

    /// number of decoded images waiting for a worker
    #[argh(option, default = "5")]
    buffer: usize,

    /// threads of the convolution pool, defaults to the available parallelism
    #[argh(option)]
    threads: Option<usize>,

    /// directory receiving the output images
    #[argh(option, short = 'o', default = "PathBuf::from(\"output\")")]
    output: PathBuf,

    /// process a directory one image at a time instead of streaming
    #[argh(switch)]
    sequential_pipeline: bool,

    /// print the preset filter names and exit
    #[argh(switch)]
    list_filters: bool,
}

fn to_mode(args: &Args) -> Result<ConvolutionMode, String> {
    let mode = match args.mode.as_str() {
        "seq" => ConvolutionMode::Sequential,
        "pixels" => ConvolutionMode::ParallelPixels,
        "rows" => ConvolutionMode::ParallelRows {
            batch_size: args.batch_size,
        },
        "cols" => ConvolutionMode::ParallelCols {
            batch_size: args.batch_size,
        },
        "tiles" => ConvolutionMode::ParallelTiles {
            tile_width: args.tile_width,
            tile_height: args.tile_height,
        },
        descriptor => descriptor.parse().map_err(|e| format!("{e}"))?,
    };
    Ok(mode)
}

fn log_report(report: &PipelineReport) {
    for failure in &report.failures {
        log::error!("{}: {}", failure.path.display(), failure.error);
    }
    log::info!(
        "{} images written, {} failed, at most {} images in memory",
        report.processed(),
        report.failed(),
        report.peak_in_memory
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    if args.list_filters {
        for name in presets::PRESET_NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let (Some(input), Some(filter_name)) = (args.input.as_ref(), args.filter.as_ref()) else {
        return Err("both --input and --filter are required".into());
    };

    let filter = presets::preset(filter_name)?;
    let mode = to_mode(&args)?;
    mode.validate()?;

    if input.is_dir() {
        let paths = collect_image_paths(input)?;
        log::info!("found {} images in {}", paths.len(), input.display());

        let start = Instant::now();
        let report = if args.sequential_pipeline {
            run_sequential_pipeline(&paths, &filter, filter_name, mode, &args.output)?
        } else {
            let mut config = PipelineConfig::new()
                .with_buffer_capacity(args.buffer)
                .with_concurrency(args.concurrency)
                .with_output_dir(&args.output);
            if let Some(threads) = args.threads {
                config = config.with_num_threads(threads);
            }
            run_streaming_pipeline(paths, filter, filter_name, mode, &config).await?
        };
        log_report(&report);
        log::info!("batch finished in {:?}", start.elapsed());

        return Ok(());
    }

    // single image
    let item = PipelineItem::new(input, read_image_any_gray8(input)?);
    log::info!("loaded {} ({})", item.name, item.image.size());

    let start = Instant::now();
    let convolved = mode.convolve(&item.image, &filter)?;
    log::info!("{filter_name} with {mode} took {:?}", start.elapsed());

    std::fs::create_dir_all(&args.output)?;
    let output = output_path(&args.output, &item.name, filter_name, mode);
    write_image_bmp_gray8(&output, &convolved)?;
    log::info!("wrote {}", output.display());

    Ok(())
}
