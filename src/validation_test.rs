use super::validation::*;
use crate::api::Quantity;
use crate::api::RuntimeOverrides;
use crate::ValidationError;

fn overrides() -> RuntimeOverrides {
    RuntimeOverrides::default()
}

#[test]
fn test_empty_override_set_is_valid() {
    assert_eq!(validate_overrides(&overrides()), Ok(()));
}

#[test]
fn test_pids_limit_bounds() {
    let mut o = overrides();
    o.pids_limit = 19;
    assert_eq!(validate_overrides(&o), Err(ValidationError::PidsLimit(19)));

    o.pids_limit = 20;
    assert!(validate_overrides(&o).is_ok());

    o.pids_limit = -1;
    assert!(validate_overrides(&o).is_ok());
}

#[test]
fn test_log_size_max_must_exceed_8k() {
    let mut o = overrides();
    o.log_size_max = Quantity::from("8Ki");
    let err = validate_overrides(&o).unwrap_err();
    assert!(err.to_string().contains("cannot be less than 8kB"));

    o.log_size_max = Quantity::from("8193");
    assert!(validate_overrides(&o).is_ok());

    o.log_size_max = Quantity::from("-1");
    assert!(validate_overrides(&o).is_ok());
}

#[test]
fn test_log_level_must_be_known() {
    let mut o = overrides();
    for level in ["error", "fatal", "panic", "warn", "info", "debug"] {
        o.log_level = level.to_string();
        assert!(validate_overrides(&o).is_ok(), "{level} should be accepted");
    }

    o.log_level = "trace".to_string();
    assert_eq!(
        validate_overrides(&o),
        Err(ValidationError::LogLevel("trace".to_string()))
    );
}

#[test]
fn test_overlay_size_checks() {
    let mut o = overrides();
    o.overlay_size = Quantity::from("-10G");
    assert!(matches!(validate_overrides(&o), Err(ValidationError::OverlaySize(_))));

    o.overlay_size = Quantity::from("ten gigs");
    assert!(matches!(
        validate_overrides(&o),
        Err(ValidationError::Quantity { field: "overlaySize", .. })
    ));

    o.overlay_size = Quantity::from("10G");
    assert!(validate_overrides(&o).is_ok());
}

#[test]
fn test_out_of_range_exponent_is_a_validation_error() {
    let mut o = overrides();
    o.overlay_size = Quantity::from("1.5e-2147483648");
    assert!(matches!(
        validate_overrides(&o),
        Err(ValidationError::Quantity { field: "overlaySize", .. })
    ));
}
