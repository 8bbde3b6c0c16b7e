//! Configuration management for the gaze tracker

use crate::{
    constants::{
        DEFAULT_BLINK_THRESHOLD, DEFAULT_CALIBRATION_WINDOW, DEFAULT_LOOK_RATIO, DEFAULT_TARGET_IRIS_FRACTION,
        DEFAULT_TWIST_RANGE_DEGREES,
    },
    landmarks::LandmarkLayout,
    pupil::{create_preprocessor, Preprocessor},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Library configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threshold calibration configuration
    pub calibration: CalibrationConfig,

    /// Pupil search configuration
    pub pupil: PupilConfig,

    /// Head orientation configuration
    pub head: HeadOrientationConfig,

    /// Gaze metric configuration
    pub gaze: GazeConfig,
}

/// Per-eye threshold calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of recent thresholds averaged per eye
    pub window_size: usize,

    /// Expected fraction of the eye crop covered by the iris (0.0-1.0)
    pub target_iris_fraction: f64,
}

/// Pupil search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PupilConfig {
    /// Preprocessing applied before the darkest-region search
    /// (`identity` or `truncate:<level>`)
    pub preprocessor: String,
}

/// Head orientation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadOrientationConfig {
    /// Empirical pitch scale
    pub look_ratio: f64,

    /// Twist reported at full deflection toward either cheek, in degrees
    pub twist_range_degrees: f64,

    /// Landmark point groups
    pub layout: LandmarkLayout,
}

/// Gaze metric parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Mean eye width/height ratio above which the eyes count as closed
    pub blink_threshold: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CALIBRATION_WINDOW,
            target_iris_fraction: DEFAULT_TARGET_IRIS_FRACTION,
        }
    }
}

impl Default for PupilConfig {
    fn default() -> Self {
        Self {
            preprocessor: "identity".to_string(),
        }
    }
}

impl Default for HeadOrientationConfig {
    fn default() -> Self {
        Self {
            look_ratio: DEFAULT_LOOK_RATIO,
            twist_range_degrees: DEFAULT_TWIST_RANGE_DEGREES,
            layout: LandmarkLayout::default(),
        }
    }
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Create the pupil preprocessor from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the preprocessor name is unknown
    pub fn create_preprocessor(&self) -> Result<Box<dyn Preprocessor>> {
        create_preprocessor(&self.pupil.preprocessor)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        // Validate calibration
        if self.calibration.window_size == 0 {
            return Err(Error::ConfigError(
                "Calibration window size must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.calibration.target_iris_fraction) {
            return Err(Error::ConfigError(
                "Target iris fraction must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Validate pupil preprocessing
        create_preprocessor(&self.pupil.preprocessor)
            .map_err(|e| Error::ConfigError(format!("Invalid pupil preprocessor: {}", e)))?;

        // Validate head orientation
        if !(self.head.look_ratio > 0.0 && self.head.look_ratio.is_finite()) {
            return Err(Error::ConfigError("Look ratio must be greater than 0".to_string()));
        }
        if !(self.head.twist_range_degrees > 0.0 && self.head.twist_range_degrees <= 180.0) {
            return Err(Error::ConfigError(
                "Twist range must be in (0, 180] degrees".to_string(),
            ));
        }
        self.head
            .layout
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid landmark layout: {}", e)))?;

        // Validate gaze metrics
        if !(self.gaze.blink_threshold > 0.0 && self.gaze.blink_threshold.is_finite()) {
            return Err(Error::ConfigError(
                "Blink threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Tracking Configuration

# Per-eye threshold calibration
calibration:
  window_size: 20
  target_iris_fraction: 0.48

# Pupil search
pupil:
  preprocessor: "identity"

# Head orientation
head:
  look_ratio: 3.0
  twist_range_degrees: 90.0
  layout:
    point_count: 68
    nose_bridge_top: 27
    chin_point: 8
    left_cheek_point: 2
    right_cheek_point: 14
    left_cheek: [1, 2, 3]
    right_cheek: [13, 14, 15]
    chin: [7, 8, 9]
    nose_bridge: [27, 28, 29, 30]
    nostrils: [31, 32, 33, 34, 35]
    left_eye: [36, 37, 38, 39, 40, 41]
    right_eye: [42, 43, 44, 45, 46, 47]

# Gaze metrics
gaze:
  blink_threshold: 3.8
"#;
