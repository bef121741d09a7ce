use super::*;

fn create_test_registry() -> Registry {
    let registry = Registry::new_custom(Some("test".to_string()), None).unwrap();
    register_custom_metrics(&registry).unwrap();
    registry
}

#[test]
fn test_custom_registry() {
    let registry = create_test_registry();

    QUEUE_ADDS.with_label_values(&["runtime-config"]).inc();
    SYNC_RESULTS.with_label_values(&["runtime-config", "success"]).inc();
    let metrics = registry.gather();

    let metric_names: Vec<_> = metrics.iter().map(|m| m.get_name()).collect();
    assert!(metric_names.contains(&"test_ctrcfg_queue_adds_total"));
    assert!(metric_names.contains(&"test_ctrcfg_sync_results_total"));
}

#[test]
fn test_counter_increment() {
    ARTIFACT_WRITES.with_label_values(&["unit", "create"]).reset();

    ARTIFACT_WRITES.with_label_values(&["unit", "create"]).inc();
    ARTIFACT_WRITES.with_label_values(&["unit", "create"]).inc();

    assert_eq!(ARTIFACT_WRITES.with_label_values(&["unit", "create"]).get(), 2);
}

#[test]
fn test_gather_text_contains_registered_metrics() {
    let registry = create_test_registry();
    QUEUE_DEPTH.with_label_values(&["image-config"]).set(3);

    let text = gather_text(&registry);
    assert!(text.contains("test_ctrcfg_queue_depth"));
}
