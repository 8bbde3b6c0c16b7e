//! Configuration loading, saving and validation


use gaze_tracking::{
    config::{Config, EXAMPLE_CONFIG},
    Error,
};

use test_helpers::ScratchDir;

#[test]
fn test_file_round_trip() {
    let dir = ScratchDir::new("config_round_trip");
    let path = dir.join("config.yaml");

    let mut config = Config::default();
    config.calibration.window_size = 7;
    config.calibration.target_iris_fraction = 0.4;
    config.pupil.preprocessor = "truncate:90".to_string();
    config.head.look_ratio = 2.5;
    config.head.layout.nostrils = vec![30, 33];
    config.gaze.blink_threshold = 4.1;

    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.calibration.window_size, 7);
    assert_eq!(loaded.calibration.target_iris_fraction, 0.4);
    assert_eq!(loaded.pupil.preprocessor, "truncate:90");
    assert_eq!(loaded.head.look_ratio, 2.5);
    assert_eq!(loaded.head.layout, config.head.layout);
    assert_eq!(loaded.gaze.blink_threshold, 4.1);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_example_config_is_valid() {
    let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file() {
    let result = Config::from_file(ScratchDir::new("config_missing").join("config.yaml"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_malformed_yaml() {
    let result = Config::from_yaml("calibration: [not, a, map]");
    assert!(matches!(result, Err(Error::ConfigError(_))));

    let result = Config::from_yaml("calibration:\n  window_size: -3\n");
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_partial_layout_keeps_defaults() {
    let config = Config::from_yaml("head:\n  layout:\n    chin_point: 9\n").unwrap();
    assert_eq!(config.head.layout.chin_point, 9);
    assert_eq!(config.head.layout.nose_bridge_top, 27);
    assert_eq!(config.head.layout.point_count, 68);
    assert_eq!(config.head.look_ratio, 3.0);
}

#[test]
fn test_validation_failures() {
    let cases: [(&str, fn(&mut Config)); 12] = [
        ("window", |c: &mut Config| c.calibration.window_size = 0),
        ("fraction high", |c: &mut Config| c.calibration.target_iris_fraction = 1.2),
        ("fraction negative", |c: &mut Config| c.calibration.target_iris_fraction = -0.1),
        ("preprocessor", |c: &mut Config| c.pupil.preprocessor = "sharpen".to_string()),
        ("look ratio", |c: &mut Config| c.head.look_ratio = 0.0),
        ("look ratio nan", |c: &mut Config| c.head.look_ratio = f64::NAN),
        ("twist zero", |c: &mut Config| c.head.twist_range_degrees = 0.0),
        ("twist wide", |c: &mut Config| c.head.twist_range_degrees = 270.0),
        ("layout index", |c: &mut Config| c.head.layout.chin_point = 68),
        ("layout group", |c: &mut Config| c.head.layout.left_eye = vec![36, 99]),
        ("layout empty", |c: &mut Config| c.head.layout.point_count = 0),
        ("blink", |c: &mut Config| c.gaze.blink_threshold = -1.0),
    ];

    for (name, mutate) in cases {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(
            matches!(config.validate(), Err(Error::ConfigError(_))),
            "{name} should fail validation"
        );
    }
}

#[test]
fn test_smaller_convention_validates() {
    let yaml = r#"
head:
  layout:
    point_count: 10
    nose_bridge_top: 0
    chin_point: 1
    left_cheek_point: 2
    right_cheek_point: 3
    left_cheek: [2]
    right_cheek: [3]
    chin: [1]
    nose_bridge: [0, 4]
    nostrils: [5, 6]
    left_eye: [7]
    right_eye: [8, 9]
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert!(config.validate().is_ok());
}
