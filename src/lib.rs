//! Gaze, blink and head-orientation estimation from facial landmarks.
//!
//! The library turns per-frame pixel and landmark data into normalized
//! metrics:
//! - Adaptive per-eye binarization threshold calibration
//! - Darkest-region pupil localization on eye crops
//! - Tilt, pitch and twist estimation from 68-point landmark geometry
//!
//! Face detection, landmark prediction and eye cropping are supplied by the
//! caller through the [`landmarks::LandmarkProvider`] and
//! [`eye::EyeRegionExtractor`] traits.
//!
//! # Examples
//!
//! ## Calibrating and locating a pupil
//!
//! ```
//! use gaze_tracking::{calibration::Calibration, pupil::{binarize, PupilLocator}};
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Bright eye crop with a dark iris block
//! let mut eye = Array2::<u8>::from_elem((24, 40), 210);
//! eye.slice_mut(ndarray::s![6..18, 14..26]).fill(30);
//!
//! let mut calibration = Calibration::default();
//! calibration.evaluate(&eye.view());
//! let threshold = calibration.threshold()?;
//!
//! let pupil = PupilLocator::new().locate(&binarize(&eye.view(), threshold).view())?;
//! println!("Pupil at ({}, {}), ratio {:.2}", pupil.x, pupil.y, pupil.horizontal_ratio());
//! # Ok(())
//! # }
//! ```
//!
//! ## Head orientation
//!
//! ```
//! use gaze_tracking::{head_orientation::HeadOrientation, landmarks::Landmarks};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pixels: Vec<(i32, i32)> = (0..68).map(|i| (100 + i % 9, 100 + i)).collect();
//! let landmarks = Landmarks::from_pixels(&pixels)?;
//!
//! let mut head = HeadOrientation::default();
//! head.refresh(Some(&landmarks));
//! if let Some(angles) = head.angles() {
//!     println!("Tilt {:.1}°, pitch {:.1}°, twist {:.1}°", angles.tilt, angles.pitch, angles.twist);
//! }
//!
//! // A frame without a face keeps the angles but marks them stale
//! head.refresh(None);
//! assert!(!head.is_known());
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete tracker
//!
//! ```no_run
//! use gaze_tracking::{
//!     config::Config,
//!     gaze::GazeTracker,
//!     replay::{RecordedFace, Session},
//! };
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = GazeTracker::from_config(&Config::default())?;
//! let session = Session::from_file("session.yaml")?;
//! let frame = Array2::<u8>::zeros((0, 0));
//!
//! for recorded in &session.frames {
//!     let mut face = RecordedFace::new(recorded.landmarks()?);
//!     let mut eyes = recorded.load_eyes()?;
//!     tracker.refresh(&frame.view(), &mut face, &mut eyes)?;
//!
//!     if let Some(ratio) = tracker.horizontal_ratio(0.0) {
//!         println!("Horizontal gaze {:.2}, blinking {:?}", ratio, tracker.is_blinking());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Adaptive binarization threshold calibration
pub mod calibration;

/// Pupil localization on eye crops
pub mod pupil;

/// Head orientation from landmark geometry
pub mod head_orientation;

/// Landmark sets, point-group layout and the landmark provider trait
pub mod landmarks;

/// Eye crops and the eye-region extractor trait
pub mod eye;

/// Per-frame gaze tracker
pub mod gaze;

/// Recorded session replay
pub mod replay;

/// Numeric helpers, safe casts and image conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
