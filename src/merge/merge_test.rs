use toml::Table;

use super::*;
use crate::api::Quantity;
use crate::api::RegistrySources;
use crate::api::RuntimeOverrides;
use crate::MergeError;

const STORAGE_BASELINE: &str = r#"
[storage]
driver = "overlay"
runroot = "/var/run/containers/storage"

[storage.options]
additionalimagestores = []
size = ""
"#;

const CRIO_BASELINE: &str = r#"
[crio]
root = "/var/lib/containers/storage"

[crio.runtime]
conmon = "/usr/libexec/crio/conmon"
log_level = "error"
pids_limit = 1024
log_size_max = -1

[crio.image]
pause_image = "quay.io/openshift/origin-pod:latest"
"#;

const REGISTRIES_BASELINE: &str = r#"
[registries.search]
registries = ["registry.access.redhat.com", "docker.io"]

[registries.insecure]
registries = []

[registries.block]
registries = []
"#;

fn parsed(bytes: &[u8]) -> Table {
    std::str::from_utf8(bytes).unwrap().parse().unwrap()
}

fn get<'a>(
    table: &'a Table,
    path: &[&str],
) -> &'a toml::Value {
    let (last, parents) = path.split_last().unwrap();
    let mut current = table;
    for segment in parents {
        current = current[*segment].as_table().unwrap();
    }
    &current[*last]
}

#[test]
fn test_storage_overlay_size_is_merged() {
    let overrides = RuntimeOverrides {
        overlay_size: Quantity::from("10G"),
        ..Default::default()
    };

    let merged = update_storage_config(STORAGE_BASELINE.as_bytes(), &overrides).unwrap();
    let table = parsed(&merged);

    assert_eq!(get(&table, &["storage", "options", "size"]).as_str(), Some("10G"));
    assert_eq!(get(&table, &["storage", "driver"]).as_str(), Some("overlay"));
    assert!(get(&table, &["storage", "options", "additionalimagestores"]).is_array());
}

#[test]
fn test_storage_without_override_keeps_baseline_values() {
    let merged = update_storage_config(STORAGE_BASELINE.as_bytes(), &RuntimeOverrides::default()).unwrap();
    let table = parsed(&merged);
    assert_eq!(get(&table, &["storage", "options", "size"]).as_str(), Some(""));
}

#[test]
fn test_runtime_overrides_are_merged() {
    let overrides = RuntimeOverrides {
        pids_limit: 2048,
        log_size_max: Quantity::from("64Ki"),
        log_level: "debug".to_string(),
        ..Default::default()
    };

    let merged = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    let table = parsed(&merged);

    assert_eq!(get(&table, &["crio", "runtime", "pids_limit"]).as_integer(), Some(2048));
    assert_eq!(get(&table, &["crio", "runtime", "log_size_max"]).as_integer(), Some(65536));
    assert_eq!(get(&table, &["crio", "runtime", "log_level"]).as_str(), Some("debug"));
    assert_eq!(
        get(&table, &["crio", "runtime", "conmon"]).as_str(),
        Some("/usr/libexec/crio/conmon")
    );
    assert_eq!(
        get(&table, &["crio", "image", "pause_image"]).as_str(),
        Some("quay.io/openshift/origin-pod:latest")
    );
}

#[test]
fn test_unset_runtime_fields_leave_baseline_untouched() {
    let overrides = RuntimeOverrides {
        log_level: "info".to_string(),
        ..Default::default()
    };

    let merged = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    let table = parsed(&merged);

    assert_eq!(get(&table, &["crio", "runtime", "log_level"]).as_str(), Some("info"));
    assert_eq!(get(&table, &["crio", "runtime", "pids_limit"]).as_integer(), Some(1024));
    assert_eq!(get(&table, &["crio", "runtime", "log_size_max"]).as_integer(), Some(-1));
}

#[test]
fn test_runtime_tables_are_created_when_missing() {
    let overrides = RuntimeOverrides {
        pids_limit: 100,
        ..Default::default()
    };
    let merged = update_runtime_config(b"", &overrides).unwrap();
    assert_eq!(get(&parsed(&merged), &["crio", "runtime", "pids_limit"]).as_integer(), Some(100));
}

#[test]
fn test_registries_lists_replace_baseline() {
    let sources = RegistrySources {
        insecure_registries: vec!["repo.example.com:5000".to_string()],
        blocked_registries: vec!["bad.example.com".to_string(), "worse.example.com".to_string()],
    };

    let merged = update_registries_config(REGISTRIES_BASELINE.as_bytes(), &sources).unwrap();
    let table = parsed(&merged);

    let insecure = get(&table, &["registries", "insecure", "registries"]).as_array().unwrap();
    assert_eq!(insecure.len(), 1);
    assert_eq!(insecure[0].as_str(), Some("repo.example.com:5000"));
    let blocked = get(&table, &["registries", "block", "registries"]).as_array().unwrap();
    assert_eq!(blocked.len(), 2);
    let search = get(&table, &["registries", "search", "registries"]).as_array().unwrap();
    assert_eq!(search.len(), 2);
}

#[test]
fn test_empty_registry_list_is_a_no_op() {
    let sources = RegistrySources {
        insecure_registries: vec![],
        blocked_registries: vec!["bad.example.com".to_string()],
    };
    let merged = update_registries_config(REGISTRIES_BASELINE.as_bytes(), &sources).unwrap();
    let table = parsed(&merged);
    assert!(get(&table, &["registries", "insecure", "registries"])
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_merge_is_deterministic_and_order_independent() {
    let overrides = RuntimeOverrides {
        pids_limit: 4096,
        log_level: "warn".to_string(),
        ..Default::default()
    };
    let reordered = r#"
[crio]
root = "/var/lib/containers/storage"

[crio.image]
pause_image = "quay.io/openshift/origin-pod:latest"

[crio.runtime]
pids_limit = 1024
log_size_max = -1
log_level = "error"
conmon = "/usr/libexec/crio/conmon"
"#;

    let first = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    let second = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    let third = update_runtime_config(reordered.as_bytes(), &overrides).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn test_malformed_baseline_is_reported() {
    let overrides = RuntimeOverrides {
        pids_limit: 100,
        ..Default::default()
    };
    let result = update_runtime_config(b"[crio\nbroken", &overrides);
    assert!(matches!(result, Err(MergeError::Toml(_))));

    let result = update_runtime_config(b"crio = 1", &overrides);
    assert!(matches!(result, Err(MergeError::NotATable(path)) if path == "crio"));
}

#[test]
fn test_zero_quantities_leave_baseline_untouched() {
    let overrides = RuntimeOverrides {
        overlay_size: Quantity::from("0"),
        log_size_max: Quantity::from("0Gi"),
        ..Default::default()
    };
    assert!(!overrides.touches_storage());
    assert!(!overrides.touches_runtime());

    let storage = update_storage_config(STORAGE_BASELINE.as_bytes(), &overrides).unwrap();
    assert_eq!(get(&parsed(&storage), &["storage", "options", "size"]).as_str(), Some(""));

    let crio = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    assert_eq!(get(&parsed(&crio), &["crio", "runtime", "log_size_max"]).as_integer(), Some(-1));
}

#[test]
fn test_zero_log_size_max_is_skipped_alongside_other_overrides() {
    let overrides = RuntimeOverrides {
        log_size_max: Quantity::from("0"),
        log_level: "debug".to_string(),
        ..Default::default()
    };
    let crio = update_runtime_config(CRIO_BASELINE.as_bytes(), &overrides).unwrap();
    let table = parsed(&crio);
    assert_eq!(get(&table, &["crio", "runtime", "log_level"]).as_str(), Some("debug"));
    assert_eq!(get(&table, &["crio", "runtime", "log_size_max"]).as_integer(), Some(-1));
}

#[test]
fn test_non_utf8_baseline_is_reported() {
    let overrides = RuntimeOverrides {
        pids_limit: 100,
        ..Default::default()
    };
    let result = update_runtime_config(b"[crio]\nx = \"\xff\"\n", &overrides);
    assert!(matches!(result, Err(MergeError::Utf8(_))));

    let sources = RegistrySources {
        insecure_registries: vec!["repo.example.com".to_string()],
        blocked_registries: vec![],
    };
    assert!(matches!(
        update_registries_config(b"\xfe\xff", &sources),
        Err(MergeError::Utf8(_))
    ));
}
