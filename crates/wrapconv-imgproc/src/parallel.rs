use std::cell::UnsafeCell;

use rayon::prelude::*;

use wrapconv_image::Image;

/// Apply a function to each pixel in the image in parallel, one row per task.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// A shared view over a mutable slice that concurrent tasks write through.
///
/// Used where the pieces owned by each task are not contiguous in memory (column batches,
/// tiles), so the slice cannot be split with `par_chunks_mut`.
#[derive(Debug, Clone, Copy)]
pub struct DisjointSlice<'a, T> {
    slice: &'a [UnsafeCell<T>],
}

unsafe impl<T: Send + Sync> Send for DisjointSlice<'_, T> {}

unsafe impl<T: Send + Sync> Sync for DisjointSlice<'_, T> {}

impl<'a, T> DisjointSlice<'a, T> {
    /// Wrap a mutable slice. The slice stays borrowed for the lifetime of the view.
    pub fn new(slice: &'a mut [T]) -> Self {
        let ptr = slice as *mut [T] as *const [UnsafeCell<T>];
        Self {
            // SAFETY: UnsafeCell<T> has the same layout as T and we hold the unique borrow
            slice: unsafe { &*ptr },
        }
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Write `value` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Safety
    ///
    /// No other task may access `index` while the view is shared.
    #[inline(always)]
    pub unsafe fn write(&self, index: usize, value: T) {
        *self.slice[index].get() = value;
    }
}
