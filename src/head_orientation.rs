//! Head orientation from 2D landmark geometry.
//!
//! Tilt (roll), twist (yaw) and pitch are each read off fixed landmark groups
//! without a 3D face model, so they are approximations: true depth is unknown.

use crate::{
    config::HeadOrientationConfig,
    constants::{QUARTER_TURN_DEGREES, TILT_OFFSET_DEGREES},
    landmarks::{LandmarkLayout, Landmarks},
    utils::{clamp, inverse_lerp},
};
use std::f64::consts::PI;

/// Snapshot of the three head angles, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadAngles {
    /// In-plane rotation; 90 for a level head
    pub tilt: f64,
    /// Up/down rotation; unclamped
    pub pitch: f64,
    /// Left/right rotation; within the configured twist range
    pub twist: f64,
}

/// Per-head orientation state
///
/// `known` is false until landmarks arrive and whenever a frame has none; the
/// angles then keep their last computed values.
#[derive(Debug, Clone)]
pub struct HeadOrientation {
    config: HeadOrientationConfig,
    angles: HeadAngles,
    known: bool,
}

impl HeadOrientation {
    /// Create an estimator in the unknown state
    #[must_use]
    pub fn new(config: HeadOrientationConfig) -> Self {
        log::info!(
            "Initializing HeadOrientation with look ratio {} and twist range {}",
            config.look_ratio,
            config.twist_range_degrees
        );
        Self {
            config,
            angles: HeadAngles::default(),
            known: false,
        }
    }

    /// Update from the current frame's landmarks
    pub fn refresh(&mut self, landmarks: Option<&Landmarks>) {
        let Some(landmarks) = landmarks else {
            self.known = false;
            return;
        };

        let layout = &self.config.layout;
        let tilt = Self::estimate_tilt(layout, landmarks);
        let twist = Self::estimate_twist(layout, landmarks, self.config.twist_range_degrees);
        let pitch = Self::estimate_pitch(layout, landmarks, self.config.look_ratio);

        self.angles = HeadAngles { tilt, pitch, twist };
        self.known = true;
    }

    /// Whether the angles belong to the latest frame
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// Roll in degrees, 90 when level
    #[must_use]
    pub fn tilt(&self) -> f64 {
        self.angles.tilt
    }

    /// Up/down rotation in degrees
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.angles.pitch
    }

    /// Left/right rotation in degrees
    #[must_use]
    pub fn twist(&self) -> f64 {
        self.angles.twist
    }

    /// Angles of the latest frame, `None` when unknown
    #[must_use]
    pub fn angles(&self) -> Option<HeadAngles> {
        self.known.then_some(self.angles)
    }

    /// Angles as last computed, regardless of `known`
    #[must_use]
    pub fn last_angles(&self) -> HeadAngles {
        self.angles
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &HeadOrientationConfig {
        &self.config
    }

    /// Roll from the nose-bridge to chin axis
    ///
    /// The raw angle is measured from image-up, positive when the nose bridge
    /// sits right of the chin, then offset by 90. Missing points give 0.
    #[must_use]
    pub fn estimate_tilt(layout: &LandmarkLayout, landmarks: &Landmarks) -> f64 {
        let (Some(top), Some(bottom)) = (
            landmarks.point(layout.nose_bridge_top),
            landmarks.point(layout.chin_point),
        ) else {
            return 0.0;
        };

        let difference = top - bottom;
        // Image y grows downward
        let radians = clamp(difference.x.atan2(-difference.y), -PI, PI);
        radians.to_degrees() + TILT_OFFSET_DEGREES
    }

    /// Yaw from where the chin/nose midline falls between the cheeks
    ///
    /// 0 for a symmetric face, `+range` at the right cheek, `-range` at the left.
    #[must_use]
    pub fn estimate_twist(layout: &LandmarkLayout, landmarks: &Landmarks, range_degrees: f64) -> f64 {
        let (Some(left), Some(right), Some(chin), Some(nose)) = (
            landmarks.mean_of(&layout.left_cheek),
            landmarks.mean_of(&layout.right_cheek),
            landmarks.mean_of(&layout.chin),
            landmarks.mean_of(&layout.nose_bridge),
        ) else {
            return 0.0;
        };

        let mid_x = (chin.x + nose.x) / 2.0;
        let x = inverse_lerp(right.x, left.x, mid_x);
        (0.5 - x) * 2.0 * range_degrees
    }

    /// Pitch from the nostril height relative to the cheeks, scaled by face width
    ///
    /// Unclamped. Coincident cheek points give 0.
    #[must_use]
    pub fn estimate_pitch(layout: &LandmarkLayout, landmarks: &Landmarks, look_ratio: f64) -> f64 {
        let (Some(nostrils), Some(left), Some(right)) = (
            landmarks.mean_of(&layout.nostrils),
            landmarks.point(layout.left_cheek_point),
            landmarks.point(layout.right_cheek_point),
        ) else {
            return 0.0;
        };

        let face_width = (left.x - right.x).abs();
        if face_width == 0.0 {
            return 0.0;
        }

        let cheek_y = (left.y + right.y) / 2.0;
        (nostrils.y - cheek_y) / face_width * look_ratio * QUARTER_TURN_DEGREES
    }
}

impl Default for HeadOrientation {
    fn default() -> Self {
        Self::new(HeadOrientationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Symmetric, level, frontal face
    fn frontal() -> Vec<(i32, i32)> {
        let mut points = vec![(100, 100); 68];
        for (i, y) in [(1, 90), (2, 100), (3, 110)] {
            points[i] = (40, y);
            points[i + 12] = (160, y);
        }
        points[7] = (95, 158);
        points[8] = (100, 160);
        points[9] = (105, 158);
        for (offset, i) in (27..=30).enumerate() {
            points[i] = (100, 60 + 10 * offset as i32);
        }
        for (offset, i) in (31..=35).enumerate() {
            points[i] = (90 + 5 * offset as i32, 100);
        }
        points
    }

    fn landmarks(points: &[(i32, i32)]) -> Landmarks {
        Landmarks::from_pixels(points).unwrap()
    }

    #[test]
    fn test_frontal_face() {
        let mut head = HeadOrientation::default();
        head.refresh(Some(&landmarks(&frontal())));

        assert!(head.is_known());
        assert!((head.tilt() - 90.0).abs() < 1e-9);
        assert!(head.twist().abs() < 1e-9);
        assert!(head.pitch().abs() < 1e-9);
    }

    #[test]
    fn test_tilt_horizontal_axes() {
        let layout = LandmarkLayout::default();

        let mut points = frontal();
        points[27] = (50, 160);
        assert!(HeadOrientation::estimate_tilt(&layout, &landmarks(&points)).abs() < 1e-9);

        points[27] = (150, 160);
        assert!((HeadOrientation::estimate_tilt(&layout, &landmarks(&points)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_tilt_diagonal() {
        let layout = LandmarkLayout::default();
        let mut points = frontal();
        // Nose bridge up and to the right of the chin at 45 degrees
        points[27] = (150, 110);
        assert!((HeadOrientation::estimate_tilt(&layout, &landmarks(&points)) - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_twist_extremes() {
        let layout = LandmarkLayout::default();
        let mut points = frontal();

        // Midline on the right cheek
        for i in [7, 8, 9, 27, 28, 29, 30] {
            points[i].0 = 160;
        }
        assert!((HeadOrientation::estimate_twist(&layout, &landmarks(&points), 90.0) - 90.0).abs() < 1e-9);

        // Midline beyond the left cheek is clamped
        for i in [7, 8, 9, 27, 28, 29, 30] {
            points[i].0 = 10;
        }
        assert!((HeadOrientation::estimate_twist(&layout, &landmarks(&points), 90.0) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_twist_coincident_cheeks() {
        let layout = LandmarkLayout::default();
        let mut points = frontal();
        for i in [1, 2, 3, 13, 14, 15] {
            points[i].0 = 100;
        }
        // inverse_lerp falls back to 0, i.e. the right-cheek end
        assert!((HeadOrientation::estimate_twist(&layout, &landmarks(&points), 90.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_sign_and_scale() {
        let layout = LandmarkLayout::default();
        let mut points = frontal();
        for i in 31..=35 {
            points[i].1 = 112;
        }
        // (112 - 100) / 120 * 3 * 90 = 27
        assert!((HeadOrientation::estimate_pitch(&layout, &landmarks(&points), 3.0) - 27.0).abs() < 1e-9);

        for i in 31..=35 {
            points[i].1 = 88;
        }
        assert!((HeadOrientation::estimate_pitch(&layout, &landmarks(&points), 3.0) + 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_is_scale_invariant() {
        let layout = LandmarkLayout::default();
        let mut near = frontal();
        for i in 31..=35 {
            near[i].1 = 112;
        }
        let far: Vec<(i32, i32)> = near.iter().map(|&(x, y)| (x * 2, y * 2)).collect();

        let a = HeadOrientation::estimate_pitch(&layout, &landmarks(&near), 3.0);
        let b = HeadOrientation::estimate_pitch(&layout, &landmarks(&far), 3.0);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_zero_width_face() {
        let layout = LandmarkLayout::default();
        let mut points = frontal();
        points[2].0 = 100;
        points[14].0 = 100;
        assert_eq!(HeadOrientation::estimate_pitch(&layout, &landmarks(&points), 3.0), 0.0);
    }

    #[test]
    fn test_empty_groups_fall_back_to_zero() {
        let mut layout = LandmarkLayout::default();
        layout.nostrils.clear();
        layout.chin.clear();

        let points = landmarks(&frontal());
        assert_eq!(HeadOrientation::estimate_pitch(&layout, &points, 3.0), 0.0);
        assert_eq!(HeadOrientation::estimate_twist(&layout, &points, 90.0), 0.0);
    }

    #[test]
    fn test_refresh_none_keeps_angles() {
        let mut head = HeadOrientation::default();
        let mut points = frontal();
        points[27] = (150, 110);
        head.refresh(Some(&landmarks(&points)));
        let before = head.last_angles();

        head.refresh(None);
        assert!(!head.is_known());
        assert!(head.angles().is_none());
        assert_eq!(head.last_angles(), before);
    }
}
