//! Image conversion utilities between `image` buffers and ndarray grids.
//!
//! The estimators work on `Array2<u8>` indexed `[row, col]`; decoding and
//! encoding goes through the `image` crate.

use crate::{utils::safe_cast::{u32_to_usize, usize_to_u32}, Error, Result};
use image::GrayImage;
use ndarray::{Array2, ArrayView2};
use std::path::Path;

/// Convert a grayscale image into an `Array2<u8>` with shape (height, width)
///
/// # Errors
/// * Returns error if the image dimensions do not fit in `usize`
pub fn gray_image_to_array(image: &GrayImage) -> Result<Array2<u8>> {
    let height = u32_to_usize(image.height())?;
    let width = u32_to_usize(image.width())?;

    Array2::from_shape_vec((height, width), image.as_raw().clone())
        .map_err(|e| Error::InvalidInput(format!("Failed to create array from image: {e}")))
}

/// Convert an `Array2<u8>` with shape (height, width) into a grayscale image
///
/// # Errors
/// * Returns error if the array dimensions do not fit in `u32`
pub fn array_to_gray_image(array: &ArrayView2<u8>) -> Result<GrayImage> {
    let (height, width) = array.dim();
    let data: Vec<u8> = array.iter().copied().collect();

    GrayImage::from_raw(usize_to_u32(width)?, usize_to_u32(height)?, data).ok_or_else(|| {
        Error::InvalidInput(format!("Buffer does not match {width}x{height} image"))
    })
}

/// Load an image file from disk and convert it to grayscale
///
/// # Errors
/// * Returns error if the file cannot be opened or decoded
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Array2<u8>> {
    let image = image::open(path.as_ref())?.to_luma8();
    gray_image_to_array(&image)
}
