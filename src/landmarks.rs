//! Facial landmarks, the named point-group table, and the landmark provider seam.
//!
//! Landmarks follow the 68-point iBUG convention by default
//! (ref: <https://ibug.doc.ic.ac.uk/resources/facial-point-annotations/>).
//! Geometry code addresses points only through [`LandmarkLayout`], so an
//! alternate convention is a matter of loading a different table.

use crate::{constants::NUM_FACIAL_LANDMARKS, Error, Result};
use nalgebra::Point2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// One detected face's landmark points in frame pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: Vec<Point2<f64>>,
}

impl Landmarks {
    /// Create a landmark set following the default 68-point convention
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not exactly 68
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        Self::with_count(points, NUM_FACIAL_LANDMARKS)
    }

    /// Create a landmark set for a convention with `expected` points
    ///
    /// # Errors
    ///
    /// Returns an error if `points.len() != expected`
    pub fn with_count(points: Vec<Point2<f64>>, expected: usize) -> Result<Self> {
        if points.len() != expected {
            return Err(Error::InvalidInput(format!(
                "Expected {} landmarks, got {}",
                expected,
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Build from integer pixel coordinates, as produced by landmark predictors
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not exactly 68
    pub fn from_pixels(pixels: &[(i32, i32)]) -> Result<Self> {
        Self::new(
            pixels
                .iter()
                .map(|&(x, y)| Point2::new(f64::from(x), f64::from(y)))
                .collect(),
        )
    }

    /// Build from floating point coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not exactly 68
    pub fn from_tuples(points: &[(f32, f32)]) -> Result<Self> {
        Self::new(
            points
                .iter()
                .map(|&(x, y)| Point2::new(f64::from(x), f64::from(y)))
                .collect(),
        )
    }

    /// Point at `index`, if the set has one
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Point2<f64>> {
        self.points.get(index).copied()
    }

    /// All points in index order
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Number of points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Centroid of the points at `indices`
    ///
    /// `None` for an empty group or when any index is missing from the set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Group sizes are tiny
    pub fn mean_of(&self, indices: &[usize]) -> Option<Point2<f64>> {
        if indices.is_empty() {
            return None;
        }

        let mut sum = nalgebra::Vector2::<f64>::zeros();
        for &index in indices {
            sum += self.point(index)?.coords;
        }
        Some(Point2::from(sum / indices.len() as f64))
    }
}

/// Named landmark groups used by the head and eye geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkLayout {
    /// Number of points the convention defines
    pub point_count: usize,

    /// Top of the nose bridge (tilt reference)
    pub nose_bridge_top: usize,

    /// Bottom of the chin (tilt reference)
    pub chin_point: usize,

    /// Single jaw point on the image-left cheek (pitch reference)
    pub left_cheek_point: usize,

    /// Single jaw point on the image-right cheek (pitch reference)
    pub right_cheek_point: usize,

    /// Jaw points outlining the image-left cheek
    pub left_cheek: Vec<usize>,

    /// Jaw points outlining the image-right cheek
    pub right_cheek: Vec<usize>,

    /// Jaw points around the chin
    pub chin: Vec<usize>,

    /// Nose bridge points
    pub nose_bridge: Vec<usize>,

    /// Lower nose points
    pub nostrils: Vec<usize>,

    /// Contour of the eye passed as [`crate::eye::EyeSide::Left`]
    pub left_eye: Vec<usize>,

    /// Contour of the eye passed as [`crate::eye::EyeSide::Right`]
    pub right_eye: Vec<usize>,
}

impl LandmarkLayout {
    /// The 68-point iBUG layout
    ///
    /// Jaw line 0-16, nose bridge 27-30, lower nose 31-35, eyes 36-41 and 42-47.
    #[must_use]
    pub fn ibug_68() -> Self {
        Self {
            point_count: NUM_FACIAL_LANDMARKS,
            nose_bridge_top: 27,
            chin_point: 8,
            left_cheek_point: 2,
            right_cheek_point: 14,
            left_cheek: vec![1, 2, 3],
            right_cheek: vec![13, 14, 15],
            chin: vec![7, 8, 9],
            nose_bridge: (27..=30).collect(),
            nostrils: (31..=35).collect(),
            left_eye: (36..=41).collect(),
            right_eye: (42..=47).collect(),
        }
    }

    /// Every index referenced by the layout, single points first
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        [
            self.nose_bridge_top,
            self.chin_point,
            self.left_cheek_point,
            self.right_cheek_point,
        ]
        .into_iter()
        .chain(self.left_cheek.iter().copied())
        .chain(self.right_cheek.iter().copied())
        .chain(self.chin.iter().copied())
        .chain(self.nose_bridge.iter().copied())
        .chain(self.nostrils.iter().copied())
        .chain(self.left_eye.iter().copied())
        .chain(self.right_eye.iter().copied())
    }

    /// Check that every index fits inside `point_count`
    ///
    /// Empty groups are accepted; the estimators resolve them to a 0 fallback.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range index
    pub fn validate(&self) -> Result<()> {
        if self.point_count == 0 {
            return Err(Error::LandmarkError("Layout defines no points".to_string()));
        }
        if let Some(index) = self.indices().find(|&i| i >= self.point_count) {
            return Err(Error::LandmarkError(format!(
                "Layout index {} outside a {}-point convention",
                index, self.point_count
            )));
        }
        Ok(())
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::ibug_68()
    }
}

/// Rectangle around a detected face, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FaceRegion {
    /// Create a new face region
    #[must_use]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Face detector and landmark predictor, implemented outside this crate
pub trait LandmarkProvider {
    /// Find the first face in a grayscale frame
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced unchanged by the tracker
    fn detect(&mut self, frame: &ArrayView2<u8>) -> Result<Option<FaceRegion>>;

    /// Predict the landmark points of a detected face
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced unchanged by the tracker
    fn predict(&mut self, frame: &ArrayView2<u8>, face: &FaceRegion) -> Result<Landmarks>;

    /// Detect then predict; `None` when no face is present
    ///
    /// # Errors
    ///
    /// Propagates errors from `detect` or `predict`
    fn landmarks(&mut self, frame: &ArrayView2<u8>) -> Result<Option<Landmarks>> {
        match self.detect(frame)? {
            Some(face) => self.predict(frame, &face).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_landmarks() -> Landmarks {
        let pixels: Vec<(i32, i32)> = (0..68).map(|i| (i, i * 2)).collect();
        Landmarks::from_pixels(&pixels).unwrap()
    }

    #[test]
    fn test_landmark_count_is_enforced() {
        let short: Vec<(i32, i32)> = (0..67).map(|i| (i, i)).collect();
        assert!(Landmarks::from_pixels(&short).is_err());

        let long: Vec<(f32, f32)> = (0..69).map(|i| (i as f32, i as f32)).collect();
        assert!(Landmarks::from_tuples(&long).is_err());

        assert_eq!(grid_landmarks().len(), NUM_FACIAL_LANDMARKS);
    }

    #[test]
    fn test_mean_of_group() {
        let landmarks = grid_landmarks();
        let mean = landmarks.mean_of(&[1, 2, 3]).unwrap();
        assert_eq!(mean, Point2::new(2.0, 4.0));
    }

    #[test]
    fn test_mean_of_degenerate_groups() {
        let landmarks = grid_landmarks();
        assert!(landmarks.mean_of(&[]).is_none());
        assert!(landmarks.mean_of(&[3, 90]).is_none());
    }

    #[test]
    fn test_ibug_layout_indices() {
        let layout = LandmarkLayout::ibug_68();
        assert_eq!(layout.nose_bridge_top, 27);
        assert_eq!(layout.chin_point, 8);
        assert_eq!(layout.nostrils, vec![31, 32, 33, 34, 35]);
        assert_eq!(layout.left_eye.len(), 6);
        assert_eq!(layout.right_eye.len(), 6);
        assert!(layout.validate().is_ok());
        assert_eq!(layout.indices().max(), Some(47));
    }

    #[test]
    fn test_layout_rejects_out_of_range_index() {
        let mut layout = LandmarkLayout::ibug_68();
        layout.nostrils.push(68);
        assert!(matches!(layout.validate(), Err(Error::LandmarkError(_))));

        let mut smaller = LandmarkLayout::ibug_68();
        smaller.point_count = 0;
        assert!(smaller.validate().is_err());
    }

    struct SingleFace {
        found: bool,
    }

    impl LandmarkProvider for SingleFace {
        fn detect(&mut self, _frame: &ArrayView2<u8>) -> Result<Option<FaceRegion>> {
            Ok(self.found.then(|| FaceRegion::new(0, 0, 10, 10)))
        }

        fn predict(&mut self, _frame: &ArrayView2<u8>, _face: &FaceRegion) -> Result<Landmarks> {
            Ok(grid_landmarks())
        }
    }

    #[test]
    fn test_provider_chains_detect_and_predict() {
        let frame = ndarray::Array2::<u8>::zeros((4, 4));

        let mut present = SingleFace { found: true };
        assert!(present.landmarks(&frame.view()).unwrap().is_some());

        let mut absent = SingleFace { found: false };
        assert!(absent.landmarks(&frame.view()).unwrap().is_none());
    }
}
