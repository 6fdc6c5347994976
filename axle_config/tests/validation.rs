use axle_config::{ConfigError, load_path, load_str};
use rstest::rstest;
use std::io::Write;

fn full_toml() -> String {
    r#"
[model]
d_angle_d_speed = 171600
d_angle_d_current = 715820000
d_angle_d_voltage = 1789560000
d_angle_d_torque = -2147000
d_speed_d_speed = 867
d_speed_d_current = 1432
d_speed_d_voltage = 17895600
d_speed_d_torque = -42940
d_current_d_speed = -858000
d_current_d_current = 143164
d_current_d_voltage = 1789560
d_current_d_torque = 2147000000
d_torque_d_speed = 5720
d_torque_d_acceleration = 42900
d_voltage_d_torque = 85880
d_torque_d_voltage = 4474
torque_friction = 30000

[observer]
stall_speed_limit = 20000
stall_time = 200
feedback_gain = 1500
"#
    .to_string()
}

#[test]
fn loads_full_model_file() {
    let cfg = load_str(&full_toml()).expect("full model file should load");
    assert_eq!(cfg.model.d_speed_d_torque, -42940);
    assert_eq!(cfg.observer.feedback_gain, 1500);
}

#[test]
fn loads_from_path() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(full_toml().as_bytes()).expect("write");
    let cfg = load_path(f.path()).expect("load from path");
    assert_eq!(cfg.model.torque_friction, 30000);
}

#[test]
fn missing_field_is_a_parse_error() {
    let text = full_toml().replace("d_torque_d_voltage = 4474\n", "");
    let err = load_str(&text).expect_err("missing coefficient");
    assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
}

#[rstest]
#[case("d_angle_d_speed = 171600", "d_angle_d_speed = 0")]
#[case("d_current_d_current = 143164", "d_current_d_current = 0")]
#[case("d_voltage_d_torque = 85880", "d_voltage_d_torque = 0")]
fn zero_denominators_rejected(#[case] from: &str, #[case] to: &str) {
    let text = full_toml().replace(from, to);
    let err = load_str(&text).expect_err("zero divisor");
    assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
}

#[rstest]
#[case("torque_friction = 30000", "torque_friction = -1")]
#[case("stall_speed_limit = 20000", "stall_speed_limit = 0")]
#[case("stall_time = 200", "stall_time = 0")]
#[case("feedback_gain = 1500", "feedback_gain = -5")]
fn out_of_range_settings_rejected(#[case] from: &str, #[case] to: &str) {
    let text = full_toml().replace(from, to);
    let err = load_str(&text).expect_err("invalid setting");
    assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
}
