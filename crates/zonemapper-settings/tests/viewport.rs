use serde_json::json;
use zonemapper_settings::{CardConfig, CardSettings};

fn resolve(value: serde_json::Value) -> CardSettings {
    let config = CardConfig::from_value(value).expect("config decodes");
    CardSettings::from_config(&config).expect("config resolves")
}

#[test]
fn swapped_x_bounds_are_corrected() {
    let settings = resolve(json!({
        "location": "Office",
        "grid": {"x_min": 5000, "x_max": -5000}
    }));
    assert_eq!(settings.bounds.x_min, -5000.0);
    assert_eq!(settings.bounds.x_max, 5000.0);
}

#[test]
fn degenerate_x_bounds_are_widened() {
    let settings = resolve(json!({
        "location": "Office",
        "grid": {"x_min": 0, "x_max": 0}
    }));
    assert_eq!(settings.bounds.x_min, 0.0);
    assert_eq!(settings.bounds.x_max, 1.0);
}

#[test]
fn cone_angle_beyond_range_is_clamped() {
    let settings = resolve(json!({
        "location": "Office",
        "cone": {"angle_deg": 270}
    }));
    assert_eq!(settings.cone.angle_deg, 180.0);
    assert_eq!(settings.default_cone_angle, 180.0);
}

#[test]
fn fov_is_clamped() {
    let settings = resolve(json!({
        "location": "Office",
        "cone": {"fov_deg": 0}
    }));
    assert_eq!(settings.cone.fov_deg, 1.0);

    let settings = resolve(json!({
        "location": "Office",
        "cone": {"fov_deg": 720}
    }));
    assert_eq!(settings.cone.fov_deg, 360.0);
}

#[test]
fn imperial_grid_units_convert_to_millimeters() {
    let settings = resolve(json!({
        "location": "Office",
        "grid_units": "feet",
        "input_units": "INCHES",
        "grid": {"x_min": -10, "x_max": 10, "y_min": 0, "y_max": 20}
    }));
    assert!((settings.bounds.x_min + 3048.0).abs() < 1e-9);
    assert!((settings.bounds.y_max - 6096.0).abs() < 1e-9);
    assert_eq!(settings.input_units.label(), "in");
}
