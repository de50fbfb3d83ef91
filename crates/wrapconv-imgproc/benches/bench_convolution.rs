use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use wrapconv_image::Image;
use wrapconv_imgproc::filter::{convolve_with_mode, presets, ConvolutionMode};

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolution");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for filter_name in ["blur_3x3", "gaussian_blur_5x5", "motion_blur"].iter() {
            let filter = presets::preset(filter_name).unwrap();
            let kernel_size = filter.kernel().rows();

            group.throughput(criterion::Throughput::Elements(
                (*width * *height * kernel_size * kernel_size) as u64,
            ));

            let image_data = (0..width * height).map(|i| (i % 251) as u8).collect();
            let image = Image::<u8, 1>::new([*width, *height].into(), image_data).unwrap();

            let modes = [
                ConvolutionMode::Sequential,
                ConvolutionMode::ParallelPixels,
                ConvolutionMode::ParallelRows { batch_size: 16 },
                ConvolutionMode::ParallelCols { batch_size: 16 },
                ConvolutionMode::ParallelTiles {
                    tile_width: 64,
                    tile_height: 64,
                },
            ];

            for mode in modes {
                let parameter_string = format!("{}x{}_{}", width, height, filter_name);
                group.bench_with_input(
                    BenchmarkId::new(mode.to_string(), &parameter_string),
                    &(&image, &filter),
                    |b, i| {
                        let (src, filter) = (i.0, i.1);
                        b.iter(|| black_box(convolve_with_mode(src, filter, mode)))
                    },
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_convolution);
criterion_main!(benches);
