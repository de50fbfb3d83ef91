use std::path::Path;

use wrapconv_image::{Image, ImageSize};
use wrapconv_imgproc::color::gray_from_rgb_u8;

use crate::error::IoError;

/// Decode any image format supported by the image crate.
fn decode_any(file_path: &Path) -> Result<image::DynamicImage, IoError> {
    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()
        .map_err(IoError::ImageDecodeError)
}

/// Reads an RGB8 image from the given file path.
///
/// The method tries to read from any image format supported by the image crate. Images with
/// other color types are converted to RGB8.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
///
/// # Errors
///
/// [`IoError::FileDoesNotExist`] if the path is missing and [`IoError::ImageDecodeError`] if the
/// file content cannot be decoded.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Reads a single channel image from the given file path.
///
/// Grayscale sources are taken as they are; any other color type is converted to RGB8 and
/// reduced with [`gray_from_rgb_u8`].
///
/// # Example
///
/// ```no_run
/// use wrapconv_io::functional as F;
///
/// let image = F::read_image_any_gray8("images/lena.png").unwrap();
/// assert_eq!(image.num_channels(), 1);
/// ```
pub fn read_image_any_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = match img.color() {
        image::ColorType::L8 => Image::new(size, img.into_luma8().into_raw())?,
        _ => {
            let rgb = Image::<u8, 3>::new(size, img.into_rgb8().into_raw())?;
            let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
            gray_from_rgb_u8(&rgb, &mut gray)?;
            gray
        }
    };

    Ok(image)
}

/// Writes a single channel image to the given file path as BMP.
///
/// # Arguments
///
/// * `file_path` - The destination path. Its parent directory must exist.
/// * `image` - The grayscale image to encode.
///
/// # Errors
///
/// [`IoError::FileError`] if the destination cannot be created and
/// [`IoError::ImageEncodeError`] if the encoder fails.
pub fn write_image_bmp_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        image::ColorType::L8,
        image::ImageFormat::Bmp,
    )
    .map_err(|err| match err {
        image::ImageError::IoError(err) => IoError::FileError(err),
        err => IoError::ImageEncodeError(err),
    })
}
