use wrapconv_image::Image;

use super::{Filter, FilterError};

/// Compute one output pixel of the toroidal convolution.
///
/// Neighbours falling outside the image wrap around to the opposite edge, so
/// `((y + ky) mod H, (x + kx) mod W)` is always a valid coordinate. The weighted sum is
/// accumulated in `f64` with `ky` as the outer loop, then scaled, offset, rounded and clamped
/// to a byte.
///
/// Every strategy calls this function, which keeps their outputs bit-identical.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `filter` - The filter to apply.
/// * `x` - The column of the output pixel.
/// * `y` - The row of the output pixel.
///
/// PRECONDITION: `x < src.width()`, `y < src.height()` and the filter passed [`super::validate`].
pub fn convolve_pixel(src: &Image<u8, 1>, filter: &Filter, x: usize, y: usize) -> u8 {
    let kernel = filter.kernel();
    let data = src.as_slice();
    let weights = kernel.as_slice();

    let width = src.width();
    let radius_y = (kernel.rows() / 2) as isize;
    let radius_x = (kernel.cols() / 2) as isize;

    let mut sum = 0.0f64;
    for ky in -radius_y..=radius_y {
        let sy = (y as isize + ky).rem_euclid(src.height() as isize) as usize;
        let src_row = &data[sy * width..(sy + 1) * width];
        let kernel_row = &weights[(ky + radius_y) as usize * kernel.cols()..];
        for kx in -radius_x..=radius_x {
            let sx = (x as isize + kx).rem_euclid(width as isize) as usize;
            sum += src_row[sx] as f64 * kernel_row[(kx + radius_x) as usize];
        }
    }

    (sum * filter.factor() + filter.bias())
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Convolve an image on the current thread.
///
/// This is the reference implementation every parallel strategy must match byte for byte.
///
/// # Arguments
///
/// * `src` - The source grayscale image.
/// * `filter` - The filter to apply.
///
/// # Returns
///
/// A new image with the same size as `src`.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] if the kernel has an even dimension.
///
/// # Example
///
/// ```
/// use wrapconv_image::Image;
/// use wrapconv_imgproc::filter::{convolve_sequential, presets};
///
/// let image = Image::<u8, 1>::new([3, 2].into(), vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let identity = presets::preset("identity").unwrap();
///
/// let output = convolve_sequential(&image, &identity).unwrap();
/// assert_eq!(output.as_slice(), image.as_slice());
/// ```
pub fn convolve_sequential(
    src: &Image<u8, 1>,
    filter: &Filter,
) -> Result<Image<u8, 1>, FilterError> {
    filter.validate()?;

    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    let width = src.width();
    if width == 0 {
        return Ok(dst);
    }

    for (y, dst_row) in dst.as_slice_mut().chunks_exact_mut(width).enumerate() {
        for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
            *dst_pixel = convolve_pixel(src, filter, x, y);
        }
    }

    Ok(dst)
}
