use super::FilterError;

/// A dense matrix of convolution weights stored row-major.
///
/// Construction only checks that the data fills the matrix. Use [`validate`] before convolving
/// to make sure both dimensions are odd.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `rows` - The number of kernel rows.
    /// * `cols` - The number of kernel columns.
    /// * `data` - The weights, `rows * cols` values.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if the data length does not match.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, FilterError> {
        if data.len() != rows * cols {
            return Err(FilterError::InvalidArgument(format!(
                "kernel data length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if the rows have different lengths.
    ///
    /// # Example
    ///
    /// ```
    /// use wrapconv_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::from_rows(&[
    ///     [0.0, -1.0, 0.0],
    ///     [-1.0, 5.0, -1.0],
    ///     [0.0, -1.0, 0.0],
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(kernel.rows(), 3);
    /// assert_eq!(kernel.get(1, 1), 5.0);
    /// ```
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, FilterError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(FilterError::InvalidArgument(format!(
                    "kernel row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), cols, data)
    }

    /// Create a kernel filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of kernel rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of kernel columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the kernel has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The weights as a row-major slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The weight at `(row, col)`.
    ///
    /// PRECONDITION: `row < rows()` and `col < cols()`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }
}

/// A kernel together with the scale and offset applied to its weighted sum.
///
/// The output of a pixel is `round(sum * factor + bias)` clamped to `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    kernel: Kernel,
    factor: f64,
    bias: f64,
}

impl Filter {
    /// Create a plain weighted-sum filter (`factor = 1`, `bias = 0`).
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            factor: 1.0,
            bias: 0.0,
        }
    }

    /// Set the scale applied to the weighted sum.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Set the offset added after scaling.
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// The filter kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The scale applied to the weighted sum.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// The offset added after scaling.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Check that the kernel can be centered on a pixel, see [`validate`].
    pub fn validate(&self) -> Result<(), FilterError> {
        validate(self)
    }
}

/// Check that both kernel dimensions are odd.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernelSize`] otherwise.
pub fn validate(filter: &Filter) -> Result<(), FilterError> {
    let kernel = filter.kernel();
    if kernel.rows() % 2 == 0 || kernel.cols() % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kernel.rows(), kernel.cols()));
    }
    Ok(())
}

/// Embed the kernel, centered, inside a larger all-zero square kernel.
///
/// The padded filter keeps `factor` and `bias` and produces the same output as the unpadded filter.
///
/// # Arguments
///
/// * `filter` - A filter with a square kernel.
/// * `new_size` - The odd side of the padded kernel, at least the current side.
///
/// # Errors
///
/// Returns [`FilterError::InvalidArgument`] if the kernel is not square, `new_size` is even or
/// `new_size` is smaller than the kernel.
pub fn pad_with_zeros(filter: &Filter, new_size: usize) -> Result<Filter, FilterError> {
    let kernel = filter.kernel();
    if !kernel.is_square() {
        return Err(FilterError::InvalidArgument(format!(
            "padding requires a square kernel, got {}x{}",
            kernel.rows(),
            kernel.cols()
        )));
    }
    if new_size % 2 == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "padded kernel size must be odd, got {new_size}"
        )));
    }
    let old_size = kernel.rows();
    if new_size < old_size {
        return Err(FilterError::InvalidArgument(format!(
            "padded kernel size {new_size} is smaller than {old_size}"
        )));
    }

    // NOTE: an even old size cannot be centered; validate() rejects it later anyway
    let pad = (new_size - old_size) / 2;
    let mut padded = Kernel::zeros(new_size, new_size);
    for row in 0..old_size {
        for col in 0..old_size {
            padded.set(row + pad, col + pad, kernel.get(row, col));
        }
    }

    Ok(Filter {
        kernel: padded,
        factor: filter.factor,
        bias: filter.bias,
    })
}

/// Build the filter equivalent to applying `first` and then `second`.
///
/// The kernels are combined with a full 2-D discrete convolution, so the result has side
/// `size1 + size2 - 1`. The scale is `factor1 * factor2` and the offset `bias1 * factor2 + bias2`.
///
/// # Errors
///
/// Returns [`FilterError::InvalidArgument`] if either kernel is not square.
///
/// # Example
///
/// ```
/// use wrapconv_imgproc::filter::{compose, Filter, Kernel};
///
/// let blur = Filter::new(Kernel::from_rows(&[[1.0; 3]; 3]).unwrap()).with_factor(1.0 / 9.0);
/// let twice = compose(&blur, &blur).unwrap();
///
/// assert_eq!(twice.kernel().rows(), 5);
/// assert_eq!(twice.kernel().get(2, 2), 9.0);
/// ```
pub fn compose(first: &Filter, second: &Filter) -> Result<Filter, FilterError> {
    let (k1, k2) = (first.kernel(), second.kernel());
    if !k1.is_square() || !k2.is_square() {
        return Err(FilterError::InvalidArgument(format!(
            "composition requires square kernels, got {}x{} and {}x{}",
            k1.rows(),
            k1.cols(),
            k2.rows(),
            k2.cols()
        )));
    }

    let (size1, size2) = (k1.rows(), k2.rows());
    if size1 == 0 || size2 == 0 {
        return Err(FilterError::InvalidArgument(
            "composition requires non-empty kernels".to_string(),
        ));
    }

    let mut composed = Kernel::zeros(size1 + size2 - 1, size1 + size2 - 1);
    for r1 in 0..size1 {
        for c1 in 0..size1 {
            let w1 = k1.get(r1, c1);
            for r2 in 0..size2 {
                for c2 in 0..size2 {
                    let (row, col) = (r1 + r2, c1 + c2);
                    let acc = composed.get(row, col) + w1 * k2.get(r2, c2);
                    composed.set(row, col, acc);
                }
            }
        }
    }

    Ok(Filter {
        kernel: composed,
        factor: first.factor * second.factor,
        bias: first.bias * second.factor + second.bias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_from_rows() -> Result<(), FilterError> {
        let kernel = Kernel::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
        assert_eq!(kernel.rows(), 2);
        assert_eq!(kernel.cols(), 3);
        assert_eq!(kernel.get(1, 0), 4.0);
        assert!(!kernel.is_square());
        Ok(())
    }

    #[test]
    fn test_kernel_ragged_rows() {
        let res = Kernel::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0]]);
        assert!(matches!(res, Err(FilterError::InvalidArgument(_))));
    }

    #[test]
    fn test_kernel_bad_length() {
        let res = Kernel::new(3, 3, vec![0.0; 8]);
        assert!(matches!(res, Err(FilterError::InvalidArgument(_))));
    }

    #[test]
    fn test_filter_defaults() {
        let filter = Filter::new(Kernel::zeros(3, 3));
        assert_eq!(filter.factor(), 1.0);
        assert_eq!(filter.bias(), 0.0);

        let filter = filter.with_factor(0.5).with_bias(128.0);
        assert_eq!(filter.factor(), 0.5);
        assert_eq!(filter.bias(), 128.0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(&Filter::new(Kernel::zeros(3, 3))), Ok(()));
        assert_eq!(validate(&Filter::new(Kernel::zeros(1, 5))), Ok(()));
        assert_eq!(
            validate(&Filter::new(Kernel::zeros(4, 4))),
            Err(FilterError::InvalidKernelSize(4, 4))
        );
        assert_eq!(
            validate(&Filter::new(Kernel::zeros(3, 2))),
            Err(FilterError::InvalidKernelSize(3, 2))
        );
        assert_eq!(
            validate(&Filter::new(Kernel::zeros(0, 0))),
            Err(FilterError::InvalidKernelSize(0, 0))
        );
    }

    #[test]
    fn test_pad_with_zeros() -> Result<(), FilterError> {
        let filter = Filter::new(Kernel::from_rows(&[
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0],
        ])?)
        .with_factor(0.25)
        .with_bias(3.0);

        let padded = pad_with_zeros(&filter, 7)?;
        assert_eq!(padded.kernel().rows(), 7);
        assert_eq!(padded.kernel().cols(), 7);
        assert_eq!(padded.factor(), 0.25);
        assert_eq!(padded.bias(), 3.0);
        assert_eq!(padded.kernel().get(2, 2), 1.0);
        assert_eq!(padded.kernel().get(3, 3), 5.0);
        assert_eq!(padded.kernel().get(4, 4), 9.0);
        assert_eq!(padded.kernel().as_slice().iter().sum::<f64>(), 45.0);

        let same = pad_with_zeros(&filter, 3)?;
        assert_eq!(same, filter);
        Ok(())
    }

    #[test]
    fn test_pad_with_zeros_invalid() {
        let filter = Filter::new(Kernel::zeros(5, 5));
        assert!(matches!(
            pad_with_zeros(&filter, 3),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            pad_with_zeros(&filter, 8),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            pad_with_zeros(&Filter::new(Kernel::zeros(3, 5)), 7),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_compose() -> Result<(), FilterError> {
        let identity = Filter::new(Kernel::from_rows(&[
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ])?)
        .with_factor(2.0)
        .with_bias(1.0);
        let shift = Filter::new(Kernel::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        ])?)
        .with_factor(0.5)
        .with_bias(4.0);

        let composed = compose(&identity, &shift)?;
        assert_eq!(composed.kernel().rows(), 5);
        assert_eq!(composed.factor(), 1.0);
        assert_eq!(composed.bias(), 1.0 * 0.5 + 4.0);

        // the only non-zero weight is one step left of the center
        assert_eq!(composed.kernel().get(2, 1), 1.0);
        assert_eq!(composed.kernel().as_slice().iter().sum::<f64>(), 1.0);
        Ok(())
    }

    #[test]
    fn test_compose_not_square() {
        let square = Filter::new(Kernel::zeros(3, 3));
        let wide = Filter::new(Kernel::zeros(1, 3));
        assert!(matches!(
            compose(&square, &wide),
            Err(FilterError::InvalidArgument(_))
        ));
    }
}
