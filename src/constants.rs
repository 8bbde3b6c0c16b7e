//! Constants used throughout the library

/// Number of facial landmarks for full face
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// Default number of thresholds kept per eye
pub const DEFAULT_CALIBRATION_WINDOW: usize = 20;

/// Default fraction of the eye crop expected to be covered by the iris
pub const DEFAULT_TARGET_IRIS_FRACTION: f64 = 0.48;

/// Pixels trimmed from every edge before measuring the iris fraction
pub const IRIS_MARGIN: usize = 5;

/// Binarization threshold search range, `[start, end)` stepped by `step`
pub const THRESHOLD_SEARCH_START: u8 = 5;
pub const THRESHOLD_SEARCH_END: u8 = 100;
pub const THRESHOLD_SEARCH_STEP: usize = 5;

/// Value written for pixels brighter than the binarization threshold
pub const BINARY_MAX: u8 = 255;

/// Pitch scale tuned empirically
pub const DEFAULT_LOOK_RATIO: f64 = 3.0;

/// Twist maps the cheek-relative midpoint onto `[-range, range]` degrees
pub const DEFAULT_TWIST_RANGE_DEGREES: f64 = 90.0;

/// Offset applied to the raw tilt so a level head reads 90 degrees
pub const TILT_OFFSET_DEGREES: f64 = 90.0;

/// Quarter turn used to scale normalized pitch into degrees
pub const QUARTER_TURN_DEGREES: f64 = 90.0;

/// Mean eye width/height ratio above which the eyes count as closed
pub const DEFAULT_BLINK_THRESHOLD: f64 = 3.8;
