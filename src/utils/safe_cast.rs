//! Safe casting utilities for image indices and threshold averages

use crate::{Error, Result};

/// Safely convert usize to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Safely convert usize to u32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds u32::MAX
pub fn usize_to_u32(value: usize) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in u32")))
}

/// Safely convert u32 to usize
///
/// # Errors
///
/// Returns an error on targets where usize is narrower than u32
pub fn u32_to_usize(value: u32) -> Result<usize> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in usize")))
}

/// Truncate a finite f64 into the u8 range
///
/// # Errors
///
/// Returns an error if the value is not finite or outside `[0, 255]`
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is intended
#[allow(clippy::cast_sign_loss)] // Negative values are rejected above
pub fn f64_to_u8(value: f64) -> Result<u8> {
    if value.is_finite() && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to u8"
        )))
    }
}
