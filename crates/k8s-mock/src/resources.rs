//! The API collection served by the mock.

use serde_json::Value;

/// Collection path of the cluster-scoped PersistentVolumes.
pub const PERSISTENT_VOLUMES_PATH: &str = "/api/v1/persistentvolumes";

/// Whether `manifest` is a named core `v1` PersistentVolume.
pub fn is_persistent_volume(manifest: &Value) -> bool {
	manifest.get("apiVersion").and_then(Value::as_str) == Some("v1")
		&& manifest.get("kind").and_then(Value::as_str) == Some("PersistentVolume")
		&& manifest.pointer("/metadata/name").and_then(Value::as_str).is_some()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_persistent_volume_is_served() {
		let pv = json!({
			"apiVersion": "v1",
			"kind": "PersistentVolume",
			"metadata": {"name": "pv-1"}
		});
		assert!(is_persistent_volume(&pv));
	}

	#[test]
	fn test_other_manifests_are_skipped() {
		let pvc = json!({
			"apiVersion": "v1",
			"kind": "PersistentVolumeClaim",
			"metadata": {"name": "data", "namespace": "db"}
		});
		let unnamed = json!({"apiVersion": "v1", "kind": "PersistentVolume", "metadata": {}});
		let deploy = json!({
			"apiVersion": "apps/v1",
			"kind": "Deployment",
			"metadata": {"name": "web"}
		});

		assert!(!is_persistent_volume(&pvc));
		assert!(!is_persistent_volume(&unnamed));
		assert!(!is_persistent_volume(&deploy));
	}
}
