use super::quantity::*;

fn value(s: &str) -> i64 {
    Quantity::from(s).value().unwrap()
}

#[test]
fn test_plain_integers() {
    assert_eq!(value("0"), 0);
    assert_eq!(value("8192"), 8192);
    assert_eq!(value("+20"), 20);
    assert_eq!(value("-1"), -1);
}

#[test]
fn test_decimal_suffixes() {
    assert_eq!(value("8k"), 8_000);
    assert_eq!(value("10G"), 10_000_000_000);
    assert_eq!(value("1.5M"), 1_500_000);
}

#[test]
fn test_binary_suffixes() {
    assert_eq!(value("8Ki"), 8192);
    assert_eq!(value("512Mi"), 536_870_912);
    assert_eq!(value("1.5Gi"), 1_610_612_736);
}

#[test]
fn test_exponents() {
    assert_eq!(value("1e3"), 1000);
    assert_eq!(value("2E6"), 2_000_000);
}

#[test]
fn test_fractions_round_up() {
    assert_eq!(value("100m"), 1);
    assert_eq!(value("0.1"), 1);
    assert_eq!(value("-100m"), 0);
}

#[test]
fn test_invalid_quantities_are_rejected() {
    for bad in ["", "   ", "abc", "10X", "1.2.3", "Gi", "1e", "99999999999999999999Ei"] {
        assert!(Quantity::from(bad).value().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn test_quantity_serializes_as_plain_string() {
    let q = Quantity::from("10G");
    assert_eq!(serde_json::to_string(&q).unwrap(), "\"10G\"");
    let back: Quantity = serde_json::from_str("\"512Mi\"").unwrap();
    assert_eq!(back.as_str(), "512Mi");
    assert!(Quantity::default().is_empty());
}

#[test]
fn test_extreme_exponents_are_out_of_range() {
    for extreme in ["1.5e-2147483648", "1e2147483647", "1e-2147483648", "0.5e-2147483648"] {
        let err = Quantity::from(extreme).value().unwrap_err();
        assert!(err.contains("out of range"), "{extreme:?}: {err}");
    }
}

#[test]
fn test_zero_detection() {
    for zero in ["", "0", "0Gi", "0.0", "+0", "0e9"] {
        assert!(Quantity::from(zero).is_zero(), "{zero:?} should be zero");
    }
    for nonzero in ["1", "100m", "10G", "-1", "abc"] {
        assert!(!Quantity::from(nonzero).is_zero(), "{nonzero:?} should not be zero");
    }
}
