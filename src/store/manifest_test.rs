use std::io::Write;

use super::*;
use crate::Error;

const MANIFEST: &str = r#"{
  "controllerConfig": {"metadata": {"name": "machine-config-controller"}, "spec": {"platform": "aws"}},
  "pools": [
    {"metadata": {"name": "worker", "labels": {"role": "worker"}}},
    {"metadata": {"name": "master", "labels": {"role": "master"}}}
  ],
  "image": {"metadata": {"name": "cluster"}, "spec": {"registrySources": {"blockedRegistries": ["bad.io"]}}},
  "runtimeConfigs": [
    {
      "metadata": {"name": "r", "uid": "R"},
      "spec": {
        "poolSelector": {"matchLabels": {"role": "worker"}},
        "overrides": {"overlaySize": "10G", "pidsLimit": 2048}
      }
    }
  ]
}"#;

#[tokio::test]
async fn test_manifest_seeds_every_kind() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = ClusterManifest::load(file.path()).unwrap();
    assert_eq!(manifest.pools.len(), 2);
    let store = MemoryStore::from_manifest(manifest);

    let request = store.runtime_config("r").unwrap();
    assert_eq!(request.metadata.uid, "R");
    assert_eq!(request.metadata.generation, 1);
    assert_eq!(request.spec.overrides.pids_limit, 2048);
    assert_eq!(request.spec.overrides.overlay_size.as_str(), "10G");

    let mut pools = store.watch_pools();
    assert!(matches!(pools.recv().await, Some(WatchEvent::Added(p)) if p.metadata.name == "master"));

    let mut images = store.watch_image_configs();
    match images.recv().await {
        Some(WatchEvent::Added(image)) => {
            assert_eq!(image.spec.registry_sources.blocked_registries, vec!["bad.io".to_string()])
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_unreadable_manifest_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = ClusterManifest::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(Error::InvalidConfig(_))));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert!(matches!(ClusterManifest::load(file.path()), Err(Error::InvalidConfig(_))));
}
