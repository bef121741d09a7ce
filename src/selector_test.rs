use std::collections::BTreeMap;

use super::selector::*;
use crate::api::LabelSelector;
use crate::api::LabelSelectorRequirement;
use crate::SelectorError;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn expr(
    key: &str,
    operator: &str,
    values: &[&str],
) -> LabelSelectorRequirement {
    LabelSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

#[test]
fn test_nil_and_empty_selectors_match_nothing() {
    let nil = Selector::parse(None).unwrap();
    assert!(nil.is_empty());
    assert!(!nil.matches(&labels(&[("role", "worker")])));

    let empty = Selector::parse(Some(&LabelSelector::default())).unwrap();
    assert!(!empty.matches(&labels(&[])));
    assert!(!empty.matches(&labels(&[("role", "worker")])));
}

#[test]
fn test_match_labels_requires_every_pair() {
    let mut selector = LabelSelector::default();
    selector.match_labels.insert("pools.ctrcfg.io/worker".into(), String::new());
    selector.match_labels.insert("tier".into(), "gold".into());
    let selector = Selector::parse(Some(&selector)).unwrap();

    assert!(selector.matches(&labels(&[("pools.ctrcfg.io/worker", ""), ("tier", "gold")])));
    assert!(!selector.matches(&labels(&[("pools.ctrcfg.io/worker", "")])));
    assert!(!selector.matches(&labels(&[("pools.ctrcfg.io/worker", ""), ("tier", "silver")])));
}

#[test]
fn test_match_expressions() {
    let selector = LabelSelector {
        match_labels: BTreeMap::new(),
        match_expressions: vec![
            expr("role", "In", &["worker", "infra"]),
            expr("tier", "NotIn", &["bronze"]),
            expr("managed", "Exists", &[]),
            expr("legacy", "DoesNotExist", &[]),
        ],
    };
    let selector = Selector::parse(Some(&selector)).unwrap();

    assert!(selector.matches(&labels(&[("role", "infra"), ("managed", "true")])));
    assert!(selector.matches(&labels(&[("role", "worker"), ("tier", "gold"), ("managed", "")])));
    assert!(!selector.matches(&labels(&[("role", "master"), ("managed", "true")])));
    assert!(!selector.matches(&labels(&[("role", "worker"), ("tier", "bronze"), ("managed", "")])));
    assert!(!selector.matches(&labels(&[("role", "worker")])));
    assert!(!selector.matches(&labels(&[("role", "worker"), ("managed", ""), ("legacy", "1")])));
}

#[test]
fn test_invalid_selectors_are_rejected() {
    let with = |e: LabelSelectorRequirement| LabelSelector {
        match_labels: BTreeMap::new(),
        match_expressions: vec![e],
    };

    assert!(matches!(
        Selector::parse(Some(&with(expr("role", "In", &[])))),
        Err(SelectorError::MissingValues { .. })
    ));
    assert!(matches!(
        Selector::parse(Some(&with(expr("role", "Exists", &["x"])))),
        Err(SelectorError::UnexpectedValues { .. })
    ));
    assert!(matches!(
        Selector::parse(Some(&with(expr("role", "Matches", &["x"])))),
        Err(SelectorError::UnknownOperator(_))
    ));
    assert!(matches!(
        Selector::parse(Some(&with(expr("-role", "Exists", &[])))),
        Err(SelectorError::InvalidKey(_))
    ));
    assert!(matches!(
        Selector::parse(Some(&with(expr("Bad_Prefix/role", "Exists", &[])))),
        Err(SelectorError::InvalidKey(_))
    ));

    let mut bad_value = LabelSelector::default();
    bad_value.match_labels.insert("role".into(), "not a value".into());
    assert!(matches!(
        Selector::parse(Some(&bad_value)),
        Err(SelectorError::InvalidValue { .. })
    ));
}
