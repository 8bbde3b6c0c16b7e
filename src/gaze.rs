//! Per-frame orchestration of head orientation, calibration and pupil search.
//!
//! The tracker owns the estimator state for one face. Face landmarks and eye
//! crops come from collaborators passed into each refresh, so the tracker
//! depends only on the [`LandmarkProvider`] and [`EyeRegionExtractor`] traits.

use crate::{
    calibration::{Calibration, CalibrationPair},
    config::{Config, GazeConfig},
    eye::{EyeCrop, EyeRegionExtractor, EyeSide},
    head_orientation::HeadOrientation,
    landmarks::{LandmarkProvider, Landmarks},
    pupil::{binarize, Pupil, PupilLocator},
    utils::safe_cast::usize_to_i32,
    Error, Result,
};
use log::debug;
use ndarray::ArrayView2;

/// One eye's results for the latest frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedEye {
    /// Pupil in eye-crop coordinates
    pub pupil: Pupil,
    /// Pupil in frame coordinates
    pub frame_coords: (i32, i32),
    /// Center of the eye crop, in crop coordinates
    pub center: (f64, f64),
    /// Eye width over eye height reported with the crop
    pub blinking_ratio: f64,
    /// Binarization threshold the pupil was located with
    pub threshold: u8,
}

/// Gaze, blink and head-orientation tracker for one face
pub struct GazeTracker {
    calibration: CalibrationPair,
    locator: PupilLocator,
    head: HeadOrientation,
    config: GazeConfig,
    landmarks: Option<Landmarks>,
    eyes: [Option<TrackedEye>; 2],
}

impl GazeTracker {
    /// Assemble a tracker from its estimators
    #[must_use]
    pub fn new(
        calibration: CalibrationPair,
        locator: PupilLocator,
        head: HeadOrientation,
        config: GazeConfig,
    ) -> Self {
        log::info!(
            "Initializing GazeTracker (window {}, target iris {}, blink threshold {})",
            calibration.left.window_size(),
            calibration.target_iris_fraction(),
            config.blink_threshold
        );
        Self {
            calibration,
            locator,
            head,
            config,
            landmarks: None,
            eyes: [None, None],
        }
    }

    /// Build every estimator from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(
            CalibrationPair::from_config(&config.calibration)?,
            PupilLocator::with_preprocessor(config.create_preprocessor()?),
            HeadOrientation::new(config.head.clone()),
            config.gaze.clone(),
        ))
    }

    /// Analyze a new grayscale frame
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors and pupil search failures
    pub fn refresh<P, E>(&mut self, frame: &ArrayView2<u8>, provider: &mut P, extractor: &mut E) -> Result<()>
    where
        P: LandmarkProvider + ?Sized,
        E: EyeRegionExtractor + ?Sized,
    {
        let landmarks = provider.landmarks(frame)?;
        self.refresh_with_landmarks(frame, landmarks, extractor)
    }

    /// Analyze a frame whose landmarks were already predicted
    ///
    /// `None` marks a frame without a face: the head becomes unknown and both
    /// eyes are cleared. On error the tracker keeps the previous frame's state,
    /// calibration included.
    ///
    /// # Errors
    ///
    /// Propagates extractor errors and pupil search failures
    pub fn refresh_with_landmarks<E>(
        &mut self,
        frame: &ArrayView2<u8>,
        landmarks: Option<Landmarks>,
        extractor: &mut E,
    ) -> Result<()>
    where
        E: EyeRegionExtractor + ?Sized,
    {
        let mut head = self.head.clone();
        head.refresh(landmarks.as_ref());
        let mut calibration = self.calibration.clone();
        let mut eyes = [None, None];

        if let Some(landmarks) = &landmarks {
            for side in EyeSide::BOTH {
                eyes[side.index()] = match extractor.extract(frame, landmarks, side)? {
                    Some(crop) => track_eye(&mut calibration, &self.locator, side, &crop)?,
                    None => {
                        debug!("No {:?} eye crop this frame", side);
                        None
                    }
                };
            }
        } else {
            debug!("No face this frame");
        }

        self.head = head;
        self.calibration = calibration;
        self.eyes = eyes;
        self.landmarks = landmarks;
        Ok(())
    }

    fn both_eyes(&self) -> Option<(&TrackedEye, &TrackedEye)> {
        match &self.eyes {
            [Some(left), Some(right)] => Some((left, right)),
            _ => None,
        }
    }

    /// Whether both pupils were located on the latest frame
    #[must_use]
    pub fn pupils_located(&self) -> bool {
        self.both_eyes().is_some()
    }

    /// Left pupil in frame coordinates
    #[must_use]
    pub fn pupil_left_coords(&self) -> Option<(i32, i32)> {
        self.both_eyes().map(|(left, _)| left.frame_coords)
    }

    /// Right pupil in frame coordinates
    #[must_use]
    pub fn pupil_right_coords(&self) -> Option<(i32, i32)> {
        self.both_eyes().map(|(_, right)| right.frame_coords)
    }

    /// Horizontal gaze: 0.0 extreme right, 0.5 center, 1.0 extreme left
    ///
    /// `offset` widens the normalizing span of each eye.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Eye crops are small
    pub fn horizontal_ratio(&self, offset: f64) -> Option<f64> {
        self.both_eyes().map(|(left, right)| {
            let ratio = |eye: &TrackedEye| eye.pupil.x as f64 / (eye.center.0 * 2.0 + offset);
            (ratio(left) + ratio(right)) / 2.0
        })
    }

    /// Vertical gaze: 0.0 extreme top, 0.5 center, 1.0 extreme bottom
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Eye crops are small
    pub fn vertical_ratio(&self, offset: f64) -> Option<f64> {
        self.both_eyes().map(|(left, right)| {
            let ratio = |eye: &TrackedEye| eye.pupil.y as f64 / (eye.center.1 * 2.0 + offset);
            (ratio(left) + ratio(right)) / 2.0
        })
    }

    /// Whether the eyes are closed, judged by the mean blinking ratio
    #[must_use]
    pub fn is_blinking(&self) -> Option<bool> {
        self.both_eyes().map(|(left, right)| {
            (left.blinking_ratio + right.blinking_ratio) / 2.0 > self.config.blink_threshold
        })
    }

    /// Latest left-eye results
    #[must_use]
    pub fn left_eye(&self) -> Option<&TrackedEye> {
        self.eyes[EyeSide::Left.index()].as_ref()
    }

    /// Latest right-eye results
    #[must_use]
    pub fn right_eye(&self) -> Option<&TrackedEye> {
        self.eyes[EyeSide::Right.index()].as_ref()
    }

    /// Expected iris share of the eye crops
    #[must_use]
    pub fn target_iris_fraction(&self) -> f64 {
        self.calibration.target_iris_fraction()
    }

    /// Change the expected iris share for both eyes; a new value restarts calibration
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `[0, 1]`
    pub fn set_target_iris_fraction(&mut self, value: f64) -> Result<()> {
        self.calibration.set_target_iris_fraction(value)
    }

    /// Whether both eyes have a full threshold window
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_complete()
    }

    /// Name of the pupil preprocessing step
    #[must_use]
    pub fn preprocessor_name(&self) -> &str {
        self.locator.preprocessor_name()
    }

    /// Per-eye calibration state
    #[must_use]
    pub fn calibration(&self) -> &CalibrationPair {
        &self.calibration
    }

    /// Head orientation state
    #[must_use]
    pub fn head(&self) -> &HeadOrientation {
        &self.head
    }

    /// Landmarks of the latest frame
    #[must_use]
    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.landmarks.as_ref()
    }
}

fn track_eye(
    calibration: &mut CalibrationPair,
    locator: &PupilLocator,
    side: EyeSide,
    crop: &EyeCrop,
) -> Result<Option<TrackedEye>> {
    if crop.width() == 0 || crop.height() == 0 {
        debug!("Skipping empty {:?} eye crop", side);
        return Ok(None);
    }

    let eye = crop.view();
    if !calibration.is_complete() {
        calibration_for_mut(calibration, side).evaluate(&eye);
    }

    let threshold = calibration_for(calibration, side).threshold()?;
    let binarized = binarize(&eye, threshold);
    let pupil = locator.locate(&binarized.view())?;
    let frame_coords = (
        to_frame_coordinate(crop.origin.0, pupil.x)?,
        to_frame_coordinate(crop.origin.1, pupil.y)?,
    );
    debug!(
        "{:?} eye: threshold {}, pupil ({}, {}) -> frame {:?}",
        side, threshold, pupil.x, pupil.y, frame_coords
    );

    Ok(Some(TrackedEye {
        pupil,
        frame_coords,
        center: crop.center(),
        blinking_ratio: crop.blinking_ratio,
        threshold,
    }))
}

/// Crop origin plus an offset inside the crop, checked for overflow
fn to_frame_coordinate(origin: i32, offset: usize) -> Result<i32> {
    origin
        .checked_add(usize_to_i32(offset)?)
        .ok_or_else(|| Error::InvalidInput(format!("Frame coordinate {origin} + {offset} overflows i32")))
}

fn calibration_for(calibration: &CalibrationPair, side: EyeSide) -> &Calibration {
    match side {
        EyeSide::Left => &calibration.left,
        EyeSide::Right => &calibration.right,
    }
}

fn calibration_for_mut(calibration: &mut CalibrationPair, side: EyeSide) -> &mut Calibration {
    match side {
        EyeSide::Left => &mut calibration.left,
        EyeSide::Right => &mut calibration.right,
    }
}
