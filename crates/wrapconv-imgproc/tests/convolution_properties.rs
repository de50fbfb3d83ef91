use rand::{rngs::StdRng, Rng, SeedableRng};

use wrapconv_image::{Image, ImageSize};
use wrapconv_imgproc::filter::{
    compose, convolve_sequential, convolve_with_mode, pad_with_zeros, presets, ConvolutionMode,
    Filter, FilterError, Kernel,
};

const IMAGE_SIZE_BOUND: usize = 96;
const FILTER_SIZE_BOUND: usize = 9;

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> Image<u8, 1> {
    let data = (0..width * height).map(|_| rng.random::<u8>()).collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn random_size(rng: &mut StdRng) -> ImageSize {
    ImageSize {
        width: rng.random_range(1..IMAGE_SIZE_BOUND),
        height: rng.random_range(1..IMAGE_SIZE_BOUND),
    }
}

/// An odd kernel side in `3..=FILTER_SIZE_BOUND`.
fn random_odd_size(rng: &mut StdRng) -> usize {
    let size = rng.random_range(3..FILTER_SIZE_BOUND);
    size + (size + 1) % 2
}

/// A positive kernel normalized to sum to one, scaled by a random factor in `[0, 1)`.
fn random_filter(rng: &mut StdRng, size: usize) -> Filter {
    let mut data = (0..size * size)
        .map(|_| rng.random_range(0.0001..10.0))
        .collect::<Vec<f64>>();
    let sum = data.iter().sum::<f64>();
    data.iter_mut().for_each(|w| *w /= sum);

    Filter::new(Kernel::new(size, size, data).unwrap()).with_factor(rng.random::<f64>())
}

fn max_abs_diff(a: &Image<u8, 1>, b: &Image<u8, 1>) -> u8 {
    assert_eq!(a.size(), b.size());
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

#[test]
fn parallel_modes_match_sequential_with_random_sizes() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..4 {
        let size = random_size(&mut rng);
        let image = random_image(&mut rng, size.width, size.height);
        let filter_size = random_odd_size(&mut rng);
        let filter = random_filter(&mut rng, filter_size);
        let unit = rng.random_range(1..=size.width.min(size.height));

        let expected = convolve_sequential(&image, &filter)?;
        for mode in [
            ConvolutionMode::ParallelPixels,
            ConvolutionMode::ParallelRows { batch_size: unit },
            ConvolutionMode::ParallelCols { batch_size: unit },
            ConvolutionMode::ParallelTiles {
                tile_width: unit,
                tile_height: unit,
            },
        ] {
            let actual = convolve_with_mode(&image, &filter, mode)?;
            assert_eq!(actual, expected, "mode {mode} on {}", image.size());
        }
    }
    Ok(())
}

#[test]
fn parallel_modes_match_sequential_with_fixed_sizes() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(128);
    let image = random_image(&mut rng, 128, 128);
    let filter_size = random_odd_size(&mut rng);
    let filter = random_filter(&mut rng, filter_size);

    let expected = convolve_sequential(&image, &filter)?;
    let modes = [
        ConvolutionMode::ParallelPixels,
        ConvolutionMode::ParallelRows { batch_size: 1 },
        ConvolutionMode::ParallelCols { batch_size: 1 },
        ConvolutionMode::ParallelTiles {
            tile_width: 1,
            tile_height: 1,
        },
        ConvolutionMode::ParallelRows { batch_size: 32 },
        ConvolutionMode::ParallelCols { batch_size: 32 },
        ConvolutionMode::ParallelTiles {
            tile_width: 32,
            tile_height: 32,
        },
        ConvolutionMode::ParallelRows { batch_size: 64 },
        ConvolutionMode::ParallelCols { batch_size: 64 },
        ConvolutionMode::ParallelTiles {
            tile_width: 64,
            tile_height: 64,
        },
        ConvolutionMode::ParallelTiles {
            tile_width: 32,
            tile_height: 64,
        },
        ConvolutionMode::ParallelTiles {
            tile_width: 64,
            tile_height: 16,
        },
        // larger than the image
        ConvolutionMode::ParallelRows { batch_size: 500 },
        ConvolutionMode::ParallelCols { batch_size: 500 },
        ConvolutionMode::ParallelTiles {
            tile_width: 500,
            tile_height: 300,
        },
    ];

    for mode in modes {
        assert_eq!(
            convolve_with_mode(&image, &filter, mode)?,
            expected,
            "mode {mode}"
        );
    }
    Ok(())
}

#[test]
fn parallel_modes_match_sequential_on_non_square_image() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(7);
    let image = random_image(&mut rng, 37, 11);

    for name in presets::PRESET_NAMES {
        let filter = presets::preset(name)?;
        let expected = convolve_sequential(&image, &filter)?;
        for mode in [
            ConvolutionMode::ParallelPixels,
            ConvolutionMode::ParallelRows { batch_size: 3 },
            ConvolutionMode::ParallelCols { batch_size: 5 },
            ConvolutionMode::ParallelTiles {
                tile_width: 8,
                tile_height: 4,
            },
        ] {
            assert_eq!(
                convolve_with_mode(&image, &filter, mode)?,
                expected,
                "filter {name}, mode {mode}"
            );
        }
    }
    Ok(())
}

#[test]
fn identity_filter_returns_same_image() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(1);
    let size = random_size(&mut rng);
    let image = random_image(&mut rng, size.width, size.height);

    let identity = presets::preset("identity")?;
    assert_eq!(convolve_sequential(&image, &identity)?, image);
    Ok(())
}

#[test]
fn zero_kernel_returns_black_image() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(2);
    let size = random_size(&mut rng);
    let image = random_image(&mut rng, size.width, size.height);

    for kernel_size in [1, 3, 5, 7, 9] {
        let zero = Filter::new(Kernel::zeros(kernel_size, kernel_size));
        let output = convolve_sequential(&image, &zero)?;
        assert!(output.as_slice().iter().all(|&v| v == 0));
    }
    Ok(())
}

#[test]
fn shift_left_then_right_is_identity() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(3);
    let size = random_size(&mut rng);
    let image = random_image(&mut rng, size.width, size.height);

    let shift_left = Filter::new(Kernel::from_rows(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
    ])?);
    let shift_right = Filter::new(Kernel::from_rows(&[
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0],
    ])?);

    let shifted = convolve_sequential(&image, &shift_left)?;
    let restored = convolve_sequential(&shifted, &shift_right)?;
    assert_eq!(restored, image);
    Ok(())
}

#[test]
fn zero_padding_does_not_change_result() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(4);
    let size = random_size(&mut rng);
    let image = random_image(&mut rng, size.width, size.height);

    let filter = random_filter(&mut rng, 5);
    let padded = pad_with_zeros(&filter, FILTER_SIZE_BOUND)?;

    assert_eq!(
        convolve_sequential(&image, &filter)?,
        convolve_sequential(&image, &padded)?
    );
    Ok(())
}

#[test]
fn composition_matches_sequential_application() -> Result<(), FilterError> {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..3 {
        let size = random_size(&mut rng);
        let image = random_image(&mut rng, size.width, size.height);
        let size1 = random_odd_size(&mut rng);
        let size2 = random_odd_size(&mut rng);
        let filter1 = random_filter(&mut rng, size1);
        let filter2 = random_filter(&mut rng, size2);

        let composed = compose(&filter1, &filter2)?;
        let two_passes = convolve_sequential(&convolve_sequential(&image, &filter1)?, &filter2)?;
        let one_pass = convolve_sequential(&image, &composed)?;

        assert!(max_abs_diff(&two_passes, &one_pass) <= 1);
    }
    Ok(())
}

#[test]
fn even_kernel_is_rejected_by_every_mode() -> Result<(), FilterError> {
    let image = Image::<u8, 1>::from_size_val([8, 8].into(), 10)?;
    let even = Filter::new(Kernel::zeros(4, 4));

    for mode in [
        ConvolutionMode::Sequential,
        ConvolutionMode::ParallelPixels,
        ConvolutionMode::ParallelRows { batch_size: 2 },
        ConvolutionMode::ParallelCols { batch_size: 2 },
        ConvolutionMode::ParallelTiles {
            tile_width: 2,
            tile_height: 2,
        },
    ] {
        assert_eq!(
            convolve_with_mode(&image, &even, mode),
            Err(FilterError::InvalidKernelSize(4, 4))
        );
    }
    Ok(())
}
