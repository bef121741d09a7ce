use std::sync::Arc;

use serde_json::json;

use super::finalizer::*;
use crate::api::ObjectMeta;
use crate::api::RuntimeConfigRequest;
use crate::config::BackoffPolicy;
use crate::store::MockStoreClient;
use crate::Error;
use crate::StoreError;

fn policy() -> BackoffPolicy {
    BackoffPolicy {
        max_retries: 3,
        base_delay_ms: 1,
        max_delay_ms: 1,
        jitter: 0.0,
    }
}

fn request(finalizers: &[&str]) -> RuntimeConfigRequest {
    let mut metadata = ObjectMeta::named("r");
    metadata.uid = "R".to_string();
    metadata.resource_version = "5".to_string();
    metadata.finalizers = finalizers.iter().map(|f| f.to_string()).collect();
    RuntimeConfigRequest {
        metadata,
        ..Default::default()
    }
}

fn patched(
    finalizers: &[&str],
    rv: &str,
) -> RuntimeConfigRequest {
    let mut r = request(finalizers);
    r.metadata.resource_version = rv.to_string();
    r
}

fn not_found(name: &str) -> Error {
    StoreError::NotFound {
        kind: "RenderedArtifact",
        name: name.to_string(),
    }
    .into()
}

#[tokio::test]
async fn test_cascade_delete_drains_first_finalizer_only() {
    let mut store = MockStoreClient::new();
    store
        .expect_delete_artifact()
        .withf(|name| name == "99-worker-R")
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_patch_runtime_config()
        .withf(|key, patch| key == "r" && *patch == json!({"metadata": {"finalizers": ["99-infra-R"]}}))
        .times(1)
        .returning(|_, _| Ok(patched(&["99-infra-R"], "6")));

    let manager = FinalizerManager::new(Arc::new(store), policy());
    manager
        .cascade_delete(&request(&["99-worker-R", "99-infra-R"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cascade_delete_last_finalizer_nulls_the_list() {
    let mut store = MockStoreClient::new();
    store.expect_delete_artifact().times(1).returning(|_| Ok(()));
    store
        .expect_patch_runtime_config()
        .withf(|_, patch| *patch == json!({"metadata": {"finalizers": null}}))
        .times(1)
        .returning(|_, _| Ok(patched(&[], "6")));

    let manager = FinalizerManager::new(Arc::new(store), policy());
    manager.cascade_delete(&request(&["99-worker-R"])).await.unwrap();
}

#[tokio::test]
async fn test_cascade_delete_without_finalizers_is_a_no_op() {
    let store = MockStoreClient::new();
    let manager = FinalizerManager::new(Arc::new(store), policy());
    manager.cascade_delete(&request(&[])).await.unwrap();
}

#[tokio::test]
async fn test_cascade_delete_tolerates_missing_artifact_and_request() {
    let mut store = MockStoreClient::new();
    store
        .expect_delete_artifact()
        .times(1)
        .returning(|name| Err(not_found(name)));
    store
        .expect_patch_runtime_config()
        .times(1)
        .returning(|key, _| Err(not_found(key)));

    let manager = FinalizerManager::new(Arc::new(store), policy());
    manager.cascade_delete(&request(&["99-worker-R"])).await.unwrap();
}

#[tokio::test]
async fn test_cascade_delete_stops_on_delete_failure() {
    let mut store = MockStoreClient::new();
    store
        .expect_delete_artifact()
        .times(1)
        .returning(|_| Err(StoreError::Transport("timeout".to_string()).into()));
    store.expect_patch_runtime_config().times(0);

    let manager = FinalizerManager::new(Arc::new(store), policy());
    assert!(manager.cascade_delete(&request(&["99-worker-R"])).await.is_err());
}

#[tokio::test]
async fn test_add_finalizer_patches_and_refreshes_request() {
    let mut store = MockStoreClient::new();
    store
        .expect_patch_runtime_config()
        .withf(|_, patch| *patch == json!({"metadata": {"finalizers": ["99-worker-R", "99-infra-R"]}}))
        .times(1)
        .returning(|_, _| Ok(patched(&["99-worker-R", "99-infra-R"], "9")));

    let manager = FinalizerManager::new(Arc::new(store), policy());
    let mut r = request(&["99-worker-R"]);
    manager.add_finalizer(&mut r, "99-infra-R").await.unwrap();

    assert_eq!(r.metadata.finalizers, vec!["99-worker-R", "99-infra-R"]);
    assert_eq!(r.metadata.resource_version, "9");
}

#[tokio::test]
async fn test_add_finalizer_is_idempotent() {
    let mut store = MockStoreClient::new();
    store.expect_patch_runtime_config().times(0);

    let manager = FinalizerManager::new(Arc::new(store), policy());
    let mut r = request(&["99-worker-R"]);
    manager.add_finalizer(&mut r, "99-worker-R").await.unwrap();
    assert_eq!(r.metadata.resource_version, "5");
}

#[tokio::test]
async fn test_add_finalizer_retries_conflicts() {
    let mut store = MockStoreClient::new();
    let mut calls = 0;
    store.expect_patch_runtime_config().times(2).returning(move |key, _| {
        calls += 1;
        if calls == 1 {
            Err(StoreError::Conflict {
                kind: "RuntimeConfigRequest",
                name: key.to_string(),
            }
            .into())
        } else {
            Ok(patched(&["99-worker-R"], "7"))
        }
    });

    let manager = FinalizerManager::new(Arc::new(store), policy());
    let mut r = request(&[]);
    manager.add_finalizer(&mut r, "99-worker-R").await.unwrap();
    assert_eq!(r.metadata.resource_version, "7");
}
