//! Builders for the PersistentVolume manifests served by the mock.

use serde_json::{json, Value};

/// Backing storage of a mock PersistentVolume.
#[derive(Debug, Clone, Copy)]
pub enum VolumeSource<'a> {
	Nfs { server: &'a str, path: &'a str },
	Csi { driver: &'a str, handle: &'a str },
	HostPath(&'a str),
}

/// Build a PersistentVolume manifest.
///
/// `claim` is `namespace:name` of the bound claim, if any.
pub fn persistent_volume(
	name: &str,
	phase: &str,
	claim: Option<&str>,
	source: VolumeSource<'_>,
) -> Value {
	let mut spec = json!({
		"capacity": {"storage": "1Gi"},
		"accessModes": ["ReadWriteMany"],
		"persistentVolumeReclaimPolicy": "Retain",
	});

	let (key, value) = match source {
		VolumeSource::Nfs { server, path } => ("nfs", json!({"server": server, "path": path})),
		VolumeSource::Csi { driver, handle } => {
			("csi", json!({"driver": driver, "volumeHandle": handle}))
		}
		VolumeSource::HostPath(path) => ("hostPath", json!({"path": path})),
	};
	spec[key] = value;

	if let Some((namespace, claim_name)) = claim.and_then(|c| c.split_once(':')) {
		spec["claimRef"] = json!({
			"apiVersion": "v1",
			"kind": "PersistentVolumeClaim",
			"namespace": namespace,
			"name": claim_name,
		});
	}

	json!({
		"apiVersion": "v1",
		"kind": "PersistentVolume",
		"metadata": {"name": name},
		"spec": spec,
		"status": {"phase": phase},
	})
}

/// A bound PersistentVolume on an NFS export.
pub fn bound_nfs(name: &str, claim: &str, path: &str) -> Value {
	persistent_volume(
		name,
		"Bound",
		Some(claim),
		VolumeSource::Nfs {
			server: "nfs.example.com",
			path,
		},
	)
}

/// A bound PersistentVolume provisioned by the Ceph RBD CSI driver.
pub fn bound_csi(name: &str, claim: &str, handle: &str) -> Value {
	persistent_volume(
		name,
		"Bound",
		Some(claim),
		VolumeSource::Csi {
			driver: "rbd.csi.ceph.com",
			handle,
		},
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bound_nfs_manifest() {
		let pv = bound_nfs("pv-web", "default:web", "/data/web");
		assert_eq!(pv["status"]["phase"], "Bound");
		assert_eq!(pv["spec"]["nfs"]["path"], "/data/web");
		assert_eq!(pv["spec"]["claimRef"]["namespace"], "default");
		assert_eq!(pv["spec"]["claimRef"]["name"], "web");
	}

	#[test]
	fn test_unclaimed_volume_has_no_claim_ref() {
		let pv = persistent_volume("pv-free", "Available", None, VolumeSource::HostPath("/tmp"));
		assert!(pv["spec"].get("claimRef").is_none());
		assert_eq!(pv["spec"]["hostPath"]["path"], "/tmp");
	}
}
