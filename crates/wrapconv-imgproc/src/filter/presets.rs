//! Catalog of named preset filters.

use super::{Filter, FilterError, Kernel};

/// Names of the preset filters, in catalog order.
pub const PRESET_NAMES: [&str; 9] = [
    "blur_3x3",
    "blur_5x5",
    "identity",
    "sharpen",
    "edge_detect",
    "motion_blur",
    "gaussian_blur_3x3",
    "gaussian_blur_5x5",
    "emboss",
];

/// Look up a preset filter by name.
///
/// # Errors
///
/// Returns [`FilterError::UnknownFilter`] if `name` is not in [`PRESET_NAMES`].
///
/// # Example
///
/// ```
/// use wrapconv_imgproc::filter::presets;
///
/// let gaussian = presets::preset("gaussian_blur_3x3").unwrap();
/// assert_eq!(gaussian.factor(), 1.0 / 16.0);
/// assert!(presets::preset("unknown").is_err());
/// ```
pub fn preset(name: &str) -> Result<Filter, FilterError> {
    let filter = match name {
        "blur_3x3" => Filter::new(Kernel::new(3, 3, vec![1.0 / 9.0; 9])?),
        "blur_5x5" => Filter::new(Kernel::new(5, 5, vec![1.0 / 25.0; 25])?),
        "identity" => Filter::new(Kernel::from_rows(&[
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ])?),
        "sharpen" => Filter::new(Kernel::from_rows(&[
            [0.0, -1.0, 0.0],
            [-1.0, 5.0, -1.0],
            [0.0, -1.0, 0.0],
        ])?),
        "edge_detect" => Filter::new(Kernel::from_rows(&[
            [-1.0, -1.0, -1.0],
            [-1.0, 8.0, -1.0],
            [-1.0, -1.0, -1.0],
        ])?),
        "motion_blur" => Filter::new(diagonal_kernel(9, 1.0 / 9.0)?),
        "gaussian_blur_3x3" => Filter::new(Kernel::from_rows(&[
            [1.0, 2.0, 1.0],
            [2.0, 4.0, 2.0],
            [1.0, 2.0, 1.0],
        ])?)
        .with_factor(1.0 / 16.0),
        "gaussian_blur_5x5" => Filter::new(Kernel::from_rows(&[
            [1.0, 4.0, 6.0, 4.0, 1.0],
            [4.0, 16.0, 24.0, 16.0, 4.0],
            [6.0, 24.0, 36.0, 24.0, 6.0],
            [4.0, 16.0, 24.0, 16.0, 4.0],
            [1.0, 4.0, 6.0, 4.0, 1.0],
        ])?)
        .with_factor(1.0 / 256.0),
        "emboss" => Filter::new(Kernel::from_rows(&[
            [-1.0, -1.0, -1.0, -1.0, 0.0],
            [-1.0, -1.0, -1.0, 0.0, 1.0],
            [-1.0, -1.0, 0.0, 1.0, 1.0],
            [-1.0, 0.0, 1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0, 1.0, 1.0],
        ])?)
        .with_bias(128.0),
        _ => return Err(FilterError::UnknownFilter(name.to_string())),
    };

    Ok(filter)
}

fn diagonal_kernel(size: usize, weight: f64) -> Result<Kernel, FilterError> {
    let mut data = vec![0.0; size * size];
    data.iter_mut().step_by(size + 1).for_each(|w| *w = weight);
    Kernel::new(size, size, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_are_valid() -> Result<(), FilterError> {
        for name in PRESET_NAMES {
            preset(name)?.validate()?;
        }
        Ok(())
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            preset("blur_7x7"),
            Err(FilterError::UnknownFilter("blur_7x7".to_string()))
        );
    }

    #[test]
    fn test_motion_blur_diagonal() -> Result<(), FilterError> {
        let motion = preset("motion_blur")?;
        let kernel = motion.kernel();
        assert_eq!(kernel.rows(), 9);
        for row in 0..9 {
            for col in 0..9 {
                let expected = if row == col { 1.0 / 9.0 } else { 0.0 };
                assert_eq!(kernel.get(row, col), expected);
            }
        }
        Ok(())
    }

    #[test]
    fn test_emboss_bias() -> Result<(), FilterError> {
        let emboss = preset("emboss")?;
        assert_eq!(emboss.bias(), 128.0);
        assert_eq!(emboss.kernel().as_slice().iter().sum::<f64>(), 0.0);
        Ok(())
    }
}
