//! Recorded sessions: landmarks and eye crops captured earlier, replayed
//! through the tracker without a live face model.
//!
//! A session file is YAML:
//!
//! ```yaml
//! frames:
//!   - landmarks: [[x0, y0], [x1, y1], ...]   # 68 points, or omitted
//!     left_eye:  { image: left_0001.png,  origin: [210, 180], blinking_ratio: 3.1 }
//!     right_eye: { image: right_0001.png, origin: [290, 182], blinking_ratio: 3.0 }
//!   - {}                                      # no face
//! ```
//!
//! Image paths are resolved relative to the session file.

use crate::{
    eye::{EyeCrop, EyeRegionExtractor, EyeSide},
    landmarks::{FaceRegion, LandmarkProvider, Landmarks},
    utils::image_conversion::load_grayscale,
    Error, Result,
};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A recorded sequence of frames
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Frames in capture order
    #[serde(default)]
    pub frames: Vec<SessionFrame>,
}

/// One recorded frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFrame {
    /// Landmark points, absent when no face was found
    #[serde(default)]
    pub landmarks: Option<Vec<[i32; 2]>>,

    /// Crop of the eye reported as left
    #[serde(default)]
    pub left_eye: Option<RecordedEye>,

    /// Crop of the eye reported as right
    #[serde(default)]
    pub right_eye: Option<RecordedEye>,
}

/// An eye crop stored as an image file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEye {
    /// Image path
    pub image: PathBuf,

    /// Frame coordinates of the crop's top-left pixel
    #[serde(default)]
    pub origin: [i32; 2],

    /// Eye width over eye height
    #[serde(default)]
    pub blinking_ratio: f64,
}

impl Session {
    /// Load a session and resolve its image paths against the file's directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        let mut session = Self::from_yaml(&content)?;

        if let Some(base) = path.parent() {
            session.resolve_paths(base);
        }
        Ok(session)
    }

    /// Parse a session from YAML text without touching paths
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid session
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse session: {}", e)))
    }

    fn resolve_paths(&mut self, base: &Path) {
        for frame in &mut self.frames {
            for eye in [&mut frame.left_eye, &mut frame.right_eye].into_iter().flatten() {
                if eye.image.is_relative() {
                    eye.image = base.join(&eye.image);
                }
            }
        }
    }
}

impl SessionFrame {
    /// Landmarks of this frame
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded point count is wrong
    pub fn landmarks(&self) -> Result<Option<Landmarks>> {
        self.landmarks
            .as_ref()
            .map(|points| {
                let pixels: Vec<(i32, i32)> = points.iter().map(|&[x, y]| (x, y)).collect();
                Landmarks::from_pixels(&pixels)
            })
            .transpose()
    }

    /// Load both eye crops from disk
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be decoded
    pub fn load_eyes(&self) -> Result<RecordedEyes> {
        let load = |eye: &Option<RecordedEye>| -> Result<Option<EyeCrop>> {
            eye.as_ref()
                .map(|eye| -> Result<EyeCrop> {
                    let image = load_grayscale(&eye.image)?;
                    Ok(EyeCrop::new(image, (eye.origin[0], eye.origin[1]), eye.blinking_ratio))
                })
                .transpose()
        };

        Ok(RecordedEyes {
            crops: [load(&self.left_eye)?, load(&self.right_eye)?],
        })
    }
}

/// Landmark provider answering with one recorded landmark set
pub struct RecordedFace {
    landmarks: Option<Landmarks>,
}

impl RecordedFace {
    #[must_use]
    pub fn new(landmarks: Option<Landmarks>) -> Self {
        Self { landmarks }
    }
}

impl LandmarkProvider for RecordedFace {
    #[allow(clippy::cast_possible_truncation)] // Bounding box of pixel coordinates
    #[allow(clippy::cast_sign_loss)] // Widths are non-negative
    fn detect(&mut self, _frame: &ArrayView2<u8>) -> Result<Option<FaceRegion>> {
        Ok(self.landmarks.as_ref().map(|landmarks| {
            let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
            let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for p in landmarks.points() {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            FaceRegion::new(
                min_x as i32,
                min_y as i32,
                (max_x - min_x) as u32,
                (max_y - min_y) as u32,
            )
        }))
    }

    fn predict(&mut self, _frame: &ArrayView2<u8>, _face: &FaceRegion) -> Result<Landmarks> {
        self.landmarks
            .clone()
            .ok_or_else(|| Error::ProviderError("No recorded landmarks for this frame".to_string()))
    }
}

/// Eye-region extractor handing back recorded crops
pub struct RecordedEyes {
    crops: [Option<EyeCrop>; 2],
}

impl RecordedEyes {
    #[must_use]
    pub fn new(left: Option<EyeCrop>, right: Option<EyeCrop>) -> Self {
        Self { crops: [left, right] }
    }
}

impl EyeRegionExtractor for RecordedEyes {
    fn extract(&mut self, _frame: &ArrayView2<u8>, _landmarks: &Landmarks, side: EyeSide) -> Result<Option<EyeCrop>> {
        Ok(self.crops[side.index()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn landmark_yaml() -> String {
        let points: Vec<String> = (0..68).map(|i| format!("[{}, {}]", i, i + 1)).collect();
        format!("[{}]", points.join(", "))
    }

    #[test]
    fn test_parse_session() {
        let yaml = format!(
            "frames:\n  - landmarks: {}\n    left_eye: {{ image: l.png, origin: [3, 4], blinking_ratio: 3.5 }}\n  - {{}}\n",
            landmark_yaml()
        );
        let session = Session::from_yaml(&yaml).unwrap();

        assert_eq!(session.frames.len(), 2);
        let first = &session.frames[0];
        assert_eq!(first.landmarks().unwrap().map(|l| l.len()), Some(68));
        let left = first.left_eye.as_ref().unwrap();
        assert_eq!(left.origin, [3, 4]);
        assert_eq!(left.blinking_ratio, 3.5);
        assert!(first.right_eye.is_none());

        assert!(session.frames[1].landmarks().unwrap().is_none());
    }

    #[test]
    fn test_wrong_landmark_count() {
        let session = Session::from_yaml("frames:\n  - landmarks: [[1, 2], [3, 4]]\n").unwrap();
        assert!(session.frames[0].landmarks().is_err());
    }

    #[test]
    fn test_paths_resolved_against_session_dir() {
        let mut session = Session::from_yaml(
            "frames:\n  - left_eye: { image: eyes/l.png }\n    right_eye: { image: /abs/r.png }\n",
        )
        .unwrap();
        session.resolve_paths(Path::new("/data/run1"));

        let frame = &session.frames[0];
        assert_eq!(frame.left_eye.as_ref().unwrap().image, PathBuf::from("/data/run1/eyes/l.png"));
        assert_eq!(frame.right_eye.as_ref().unwrap().image, PathBuf::from("/abs/r.png"));
    }

    #[test]
    fn test_recorded_face_bounding_box() {
        let pixels: Vec<(i32, i32)> = (0..68).map(|i| (10 + i, 20 + 2 * i)).collect();
        let mut face = RecordedFace::new(Some(Landmarks::from_pixels(&pixels).unwrap()));
        let frame = Array2::<u8>::zeros((1, 1));

        let region = face.detect(&frame.view()).unwrap().unwrap();
        assert_eq!(region, FaceRegion::new(10, 20, 67, 134));
        assert!(face.landmarks(&frame.view()).unwrap().is_some());

        let mut empty = RecordedFace::new(None);
        assert!(empty.landmarks(&frame.view()).unwrap().is_none());
    }

    #[test]
    fn test_recorded_eyes_by_side() {
        let left = EyeCrop::new(Array2::zeros((2, 3)), (1, 1), 3.0);
        let mut eyes = RecordedEyes::new(Some(left.clone()), None);
        let pixels: Vec<(i32, i32)> = (0..68).map(|i| (i, i)).collect();
        let landmarks = Landmarks::from_pixels(&pixels).unwrap();
        let frame = Array2::<u8>::zeros((1, 1));

        assert_eq!(eyes.extract(&frame.view(), &landmarks, EyeSide::Left).unwrap(), Some(left));
        assert!(eyes.extract(&frame.view(), &landmarks, EyeSide::Right).unwrap().is_none());
    }
}
