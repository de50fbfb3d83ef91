use std::ops::Range;

use rayon::prelude::*;
use wrapconv_image::Image;

use super::{convolve_pixel, Filter, FilterError};
use crate::parallel::DisjointSlice;

/// Convolve an image with one task per output pixel.
///
/// Every pixel is its own unit of work, which measures the scheduling overhead of the pool at
/// its limit.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] if the kernel has an even dimension.
pub fn convolve_parallel_pixels(
    src: &Image<u8, 1>,
    filter: &Filter,
) -> Result<Image<u8, 1>, FilterError> {
    filter.validate()?;

    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    let width = src.width();

    dst.as_slice_mut()
        .par_iter_mut()
        .enumerate()
        .with_max_len(1)
        .for_each(|(idx, dst_pixel)| {
            *dst_pixel = convolve_pixel(src, filter, idx % width, idx / width);
        });

    Ok(dst)
}

/// Convolve an image with one task per batch of consecutive rows.
///
/// The last batch may be shorter than `batch_size`. A batch size larger than the image height
/// gives a single task.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] for an even kernel and
/// [`FilterError::InvalidArgument`] for a zero batch size.
pub fn convolve_parallel_rows(
    src: &Image<u8, 1>,
    filter: &Filter,
    batch_size: usize,
) -> Result<Image<u8, 1>, FilterError> {
    filter.validate()?;
    check_unit_size("batch_size", batch_size)?;

    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    let width = src.width();
    if width == 0 {
        return Ok(dst);
    }

    // each batch owns a contiguous run of rows in the output buffer
    dst.as_slice_mut()
        .par_chunks_mut(batch_size.saturating_mul(width))
        .enumerate()
        .with_max_len(1)
        .for_each(|(batch, dst_chunk)| {
            let start_row = batch * batch_size;
            for (dy, dst_row) in dst_chunk.chunks_exact_mut(width).enumerate() {
                for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
                    *dst_pixel = convolve_pixel(src, filter, x, start_row + dy);
                }
            }
        });

    Ok(dst)
}

/// Convolve an image with one task per batch of consecutive columns.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] for an even kernel and
/// [`FilterError::InvalidArgument`] for a zero batch size.
pub fn convolve_parallel_cols(
    src: &Image<u8, 1>,
    filter: &Filter,
    batch_size: usize,
) -> Result<Image<u8, 1>, FilterError> {
    filter.validate()?;
    check_unit_size("batch_size", batch_size)?;

    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    let num_batches = src.width().div_ceil(batch_size);

    {
        let out = DisjointSlice::new(dst.as_slice_mut());
        (0..num_batches)
            .into_par_iter()
            .with_max_len(1)
            .for_each(|batch| {
                let cols = clipped_range(batch, batch_size, src.width());
                convolve_region(src, filter, &out, cols, 0..src.height());
            });
    }

    Ok(dst)
}

/// Convolve an image with one task per rectangular tile.
///
/// Tiles are laid out on a grid starting at the top-left corner. Tiles on the right and bottom
/// borders are clipped to the image, so the tile size does not need to divide the image size.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] for an even kernel and
/// [`FilterError::InvalidArgument`] for a zero tile side.
pub fn convolve_parallel_tiles(
    src: &Image<u8, 1>,
    filter: &Filter,
    tile_width: usize,
    tile_height: usize,
) -> Result<Image<u8, 1>, FilterError> {
    filter.validate()?;
    check_unit_size("tile_width", tile_width)?;
    check_unit_size("tile_height", tile_height)?;

    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    let tiles_x = src.width().div_ceil(tile_width);
    let tiles_y = src.height().div_ceil(tile_height);

    {
        let out = DisjointSlice::new(dst.as_slice_mut());
        (0..tiles_x * tiles_y)
            .into_par_iter()
            .with_max_len(1)
            .for_each(|tile| {
                let cols = clipped_range(tile % tiles_x, tile_width, src.width());
                let rows = clipped_range(tile / tiles_x, tile_height, src.height());
                convolve_region(src, filter, &out, cols, rows);
            });
    }

    Ok(dst)
}

fn check_unit_size(name: &str, size: usize) -> Result<(), FilterError> {
    if size == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(())
}

/// The `index`-th run of `size` elements, clipped to `len`.
fn clipped_range(index: usize, size: usize, len: usize) -> Range<usize> {
    let start = index.saturating_mul(size).min(len);
    let end = start.saturating_add(size).min(len);
    start..end
}

/// Fill the output pixels of a rectangle, row by row.
///
/// PRECONDITION: no other task writes inside `cols x rows` while this runs.
fn convolve_region(
    src: &Image<u8, 1>,
    filter: &Filter,
    out: &DisjointSlice<'_, u8>,
    cols: Range<usize>,
    rows: Range<usize>,
) {
    let width = src.width();
    for y in rows {
        for x in cols.clone() {
            let value = convolve_pixel(src, filter, x, y);
            // SAFETY: regions handed out by the callers never overlap
            unsafe { out.write(y * width + x, value) };
        }
    }
}
