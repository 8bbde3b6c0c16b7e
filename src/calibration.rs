//! Adaptive binarization threshold calibration.
//!
//! Each eye keeps a sliding window of the thresholds that best isolated the
//! iris on recent frames. The search is anchored to the fraction of the eye
//! crop a typical iris covers, so lighting and camera differences are absorbed
//! without manual tuning.

use crate::{
    config::CalibrationConfig,
    constants::{
        DEFAULT_CALIBRATION_WINDOW, DEFAULT_TARGET_IRIS_FRACTION, IRIS_MARGIN, THRESHOLD_SEARCH_END,
        THRESHOLD_SEARCH_START, THRESHOLD_SEARCH_STEP,
    },
    pupil::binarize,
    utils::safe_cast::f64_to_u8,
    Error, Result,
};
use ndarray::{s, ArrayView2};
use std::collections::VecDeque;

/// Candidate binarization thresholds, in search order
pub fn threshold_candidates() -> impl Iterator<Item = u8> {
    (THRESHOLD_SEARCH_START..THRESHOLD_SEARCH_END).step_by(THRESHOLD_SEARCH_STEP)
}

/// Threshold calibration for a single eye
#[derive(Debug, Clone)]
pub struct Calibration {
    window_size: usize,
    target_iris_fraction: f64,
    history: VecDeque<u8>,
}

impl Calibration {
    /// Create a calibration keeping `window_size` thresholds
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or the target fraction is
    /// outside `[0, 1]`
    pub fn new(window_size: usize, target_iris_fraction: f64) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidInput(
                "Calibration window size must be greater than 0".to_string(),
            ));
        }
        check_fraction(target_iris_fraction)?;

        Ok(Self {
            window_size,
            target_iris_fraction,
            history: VecDeque::with_capacity(window_size),
        })
    }

    /// Create a calibration from configuration
    ///
    /// # Errors
    ///
    /// Same conditions as [`Calibration::new`]
    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Self::new(config.window_size, config.target_iris_fraction)
    }

    /// Improve the calibration with one more eye crop
    pub fn evaluate(&mut self, eye: &ArrayView2<u8>) {
        let threshold = self.find_best_threshold(eye);

        if self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back(threshold);
    }

    /// Threshold whose iris fraction lands closest to the target
    ///
    /// Ties go to the smallest candidate.
    #[must_use]
    pub fn find_best_threshold(&self, eye: &ArrayView2<u8>) -> u8 {
        let mut best = (THRESHOLD_SEARCH_START, f64::INFINITY);

        for threshold in threshold_candidates() {
            let iris_frame = binarize(eye, threshold);
            let distance = (Self::iris_size(&iris_frame.view()) - self.target_iris_fraction).abs();
            log::trace!("threshold {threshold}: distance {distance:.4}");

            if distance < best.1 {
                best = (threshold, distance);
            }
        }
        best.0
    }

    /// Integer mean of the thresholds in the window
    ///
    /// # Errors
    ///
    /// Returns [`Error::CalibrationIncomplete`] before the first `evaluate`
    #[allow(clippy::cast_precision_loss)] // Window sizes are small
    pub fn threshold(&self) -> Result<u8> {
        if self.history.is_empty() {
            return Err(Error::CalibrationIncomplete);
        }

        let sum: u32 = self.history.iter().map(|&t| u32::from(t)).sum();
        f64_to_u8(f64::from(sum) / self.history.len() as f64)
    }

    /// Whether this eye's window is full
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.history.len() >= self.window_size
    }

    /// Fraction of the margin-trimmed crop that is dark after binarization
    ///
    /// Crops with no pixels left after trimming report 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Pixel counts of eye crops fit easily
    pub fn iris_size(binarized: &ArrayView2<u8>) -> f64 {
        let (height, width) = binarized.dim();
        if height <= 2 * IRIS_MARGIN || width <= 2 * IRIS_MARGIN {
            return 0.0;
        }

        let inner = binarized.slice(s![IRIS_MARGIN..height - IRIS_MARGIN, IRIS_MARGIN..width - IRIS_MARGIN]);
        let total = inner.len();
        let dark = inner.iter().filter(|&&pixel| pixel == 0).count();

        dark as f64 / total as f64
    }

    /// Expected iris share of the eye crop
    #[must_use]
    pub fn target_iris_fraction(&self) -> f64 {
        self.target_iris_fraction
    }

    /// Change the expected iris share
    ///
    /// A different value invalidates and clears the threshold history; the
    /// current value leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `[0, 1]`
    #[allow(clippy::float_cmp)] // Only an exact repeat is a no-op
    pub fn set_target_iris_fraction(&mut self, value: f64) -> Result<()> {
        check_fraction(value)?;
        if self.target_iris_fraction == value {
            return Ok(());
        }

        log::debug!(
            "Target iris fraction {} -> {}, clearing {} thresholds",
            self.target_iris_fraction,
            value,
            self.history.len()
        );
        self.target_iris_fraction = value;
        self.history.clear();
        Ok(())
    }

    /// Thresholds currently in the window, oldest first
    pub fn history(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        self.history.iter().copied()
    }

    /// Maximum number of thresholds kept
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Forget every threshold
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CALIBRATION_WINDOW,
            target_iris_fraction: DEFAULT_TARGET_IRIS_FRACTION,
            history: VecDeque::with_capacity(DEFAULT_CALIBRATION_WINDOW),
        }
    }
}

/// The two per-eye calibrations of one tracked face
#[derive(Debug, Clone, Default)]
pub struct CalibrationPair {
    /// Calibration of the eye reported as left
    pub left: Calibration,
    /// Calibration of the eye reported as right
    pub right: Calibration,
}

impl CalibrationPair {
    /// Two calibrations with identical settings
    ///
    /// # Errors
    ///
    /// Same conditions as [`Calibration::new`]
    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Ok(Self {
            left: Calibration::from_config(config)?,
            right: Calibration::from_config(config)?,
        })
    }

    /// True once both eyes have filled their windows
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.left.is_full() && self.right.is_full()
    }

    /// Expected iris share, as held by the left eye
    #[must_use]
    pub fn target_iris_fraction(&self) -> f64 {
        self.left.target_iris_fraction()
    }

    /// Change the expected iris share on both eyes
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `[0, 1]`; neither eye is changed
    pub fn set_target_iris_fraction(&mut self, value: f64) -> Result<()> {
        check_fraction(value)?;
        self.left.set_target_iris_fraction(value)?;
        self.right.set_target_iris_fraction(value)
    }

    /// Forget both eyes' thresholds
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

fn check_fraction(value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Target iris fraction must be between 0.0 and 1.0, got {value}"
        )))
    }
}
