//! Pupil localization on a single eye crop.
//!
//! The pupil is taken to be the darkest column and the darkest row of the
//! (binarized) eye crop. [`binarize`] is the image-processing step shared with
//! calibration; [`Preprocessor`] is the cleanup hook applied before the search.

use crate::{constants::BINARY_MAX, Error, Result};
use ndarray::{Array2, ArrayView2, Axis};

/// Binarize an eye crop: `255` where `pixel > threshold`, `0` elsewhere
///
/// Dark (iris) pixels end up as zero.
#[must_use]
pub fn binarize(eye: &ArrayView2<u8>, threshold: u8) -> Array2<u8> {
    eye.mapv(|pixel| if pixel > threshold { BINARY_MAX } else { 0 })
}

/// Image cleanup applied to an eye crop before the pupil search
pub trait Preprocessor: Send + Sync {
    /// Produce the image the pupil search runs on
    fn preprocess(&self, eye: &ArrayView2<u8>) -> Array2<u8>;

    /// Get preprocessor name
    fn name(&self) -> &str;
}

/// Pass-through preprocessing; returns an unmodified copy
pub struct IdentityPreprocessor;

impl Preprocessor for IdentityPreprocessor {
    fn preprocess(&self, eye: &ArrayView2<u8>) -> Array2<u8> {
        eye.to_owned()
    }

    fn name(&self) -> &str {
        "IdentityPreprocessor"
    }
}

/// Caps intensities at `level` so bright glare does not dominate the sums
pub struct TruncatePreprocessor {
    level: u8,
}

impl TruncatePreprocessor {
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self { level }
    }
}

impl Preprocessor for TruncatePreprocessor {
    fn preprocess(&self, eye: &ArrayView2<u8>) -> Array2<u8> {
        eye.mapv(|pixel| pixel.min(self.level))
    }

    fn name(&self) -> &str {
        "TruncatePreprocessor"
    }
}

/// Create a preprocessor by type name
///
/// Accepts `identity` (alias `none`) and `truncate:<level>`.
///
/// # Errors
///
/// Returns an error for an unknown name or an unparsable level
pub fn create_preprocessor(name: &str) -> Result<Box<dyn Preprocessor>> {
    let lowered = name.to_lowercase();
    let mut parts = lowered.splitn(2, ':');
    let kind = parts.next().unwrap_or_default();
    let argument = parts.next();

    match (kind, argument) {
        ("identity" | "none", None) => Ok(Box::new(IdentityPreprocessor)),
        ("truncate", Some(level)) => {
            let level = level.trim().parse::<u8>().map_err(|_| {
                Error::InvalidInput(format!("Truncate level must be 0-255, got {level}"))
            })?;
            Ok(Box::new(TruncatePreprocessor::new(level)))
        }
        _ => Err(Error::InvalidInput(format!("Unknown preprocessor: {name}"))),
    }
}

/// Located pupil, in eye-crop pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pupil {
    /// Column of the darkest aggregate intensity
    pub x: usize,
    /// Row of the darkest aggregate intensity
    pub y: usize,
    width: usize,
    height: usize,
}

impl Pupil {
    /// Width of the image the pupil was located in
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the image the pupil was located in
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `x / width - 0.5`; zero at the image center
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Eye crops are small
    pub fn horizontal_ratio(&self) -> f64 {
        self.x as f64 / self.width as f64 - 0.5
    }

    /// `y / height - 0.5`; zero at the image center
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Eye crops are small
    pub fn vertical_ratio(&self) -> f64 {
        self.y as f64 / self.height as f64 - 0.5
    }
}

/// Darkest-region pupil locator
pub struct PupilLocator {
    preprocessor: Box<dyn Preprocessor>,
}

impl PupilLocator {
    /// Create a locator with pass-through preprocessing
    #[must_use]
    pub fn new() -> Self {
        Self::with_preprocessor(Box::new(IdentityPreprocessor))
    }

    /// Create a locator with a custom preprocessing step
    #[must_use]
    pub fn with_preprocessor(preprocessor: Box<dyn Preprocessor>) -> Self {
        log::info!("Initializing PupilLocator with {}", preprocessor.name());
        Self { preprocessor }
    }

    /// Name of the active preprocessing step
    #[must_use]
    pub fn preprocessor_name(&self) -> &str {
        self.preprocessor.name()
    }

    /// Locate the pupil in an eye crop
    ///
    /// Each coordinate is the first index of the minimum intensity sum along the
    /// other axis. A uniform crop has no true minimum and yields `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the crop has zero width or height
    pub fn locate(&self, eye: &ArrayView2<u8>) -> Result<Pupil> {
        let (height, width) = eye.dim();
        if height == 0 || width == 0 {
            return Err(Error::InvalidInput(format!(
                "Cannot locate a pupil in a {width}x{height} eye crop"
            )));
        }

        let frame = self.preprocessor.preprocess(eye);
        let (height, width) = frame.dim();

        Ok(Pupil {
            x: min_index(&frame, Axis(0)),
            y: min_index(&frame, Axis(1)),
            width,
            height,
        })
    }
}

impl Default for PupilLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// First index of the smallest intensity sum after collapsing `axis`
fn min_index(frame: &Array2<u8>, axis: Axis) -> usize {
    let sums = frame.mapv(u64::from).sum_axis(axis);

    let mut best = (0, u64::MAX);
    for (index, &sum) in sums.iter().enumerate() {
        if sum < best.1 {
            best = (index, sum);
        }
    }
    best.0
}
