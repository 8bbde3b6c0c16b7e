//! Eye crops and the eye-region extractor seam.
//!
//! Cropping and the eye-aspect (blinking) measurement live outside this crate;
//! the tracker only consumes what an [`EyeRegionExtractor`] hands back.

use crate::{landmarks::Landmarks, Result};
use ndarray::{Array2, ArrayView2};

/// Which eye an extractor should crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EyeSide {
    /// Selector 0
    Left,
    /// Selector 1
    Right,
}

impl EyeSide {
    /// Both sides in selector order
    pub const BOTH: [EyeSide; 2] = [EyeSide::Left, EyeSide::Right];

    /// 0/1 selector used by landmark-based croppers
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            EyeSide::Left => 0,
            EyeSide::Right => 1,
        }
    }
}

/// A single eye cut out of the frame
#[derive(Debug, Clone, PartialEq)]
pub struct EyeCrop {
    /// Grayscale pixels indexed `[row, col]`
    pub image: Array2<u8>,
    /// Frame coordinates of the crop's top-left pixel
    pub origin: (i32, i32),
    /// Eye width over eye height; grows as the eye closes
    pub blinking_ratio: f64,
}

impl EyeCrop {
    /// Create a new eye crop
    #[must_use]
    pub fn new(image: Array2<u8>, origin: (i32, i32), blinking_ratio: f64) -> Self {
        Self {
            image,
            origin,
            blinking_ratio,
        }
    }

    /// Borrow the pixels
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.image.view()
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> usize {
        self.image.ncols()
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> usize {
        self.image.nrows()
    }

    /// Center of the crop in crop coordinates
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Eye crops are small
    pub fn center(&self) -> (f64, f64) {
        (self.width() as f64 / 2.0, self.height() as f64 / 2.0)
    }
}

/// Eye cropping and blink measurement, implemented outside this crate
pub trait EyeRegionExtractor {
    /// Cut one eye out of the frame; `None` when it cannot be isolated
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced unchanged by the tracker
    fn extract(&mut self, frame: &ArrayView2<u8>, landmarks: &Landmarks, side: EyeSide) -> Result<Option<EyeCrop>>;
}
