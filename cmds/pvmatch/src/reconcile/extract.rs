//! Projection of live PersistentVolume objects into [`VolumeRecord`]s.

use std::fmt;

use k8s_openapi::api::core::v1::PersistentVolume;
use tracing::warn;

use super::ClaimRef;

/// Placeholder used for any identifying field missing from a PV.
pub const NOT_DEFINED: &str = "not defined";

/// The only phase considered for matching.
pub const BOUND_PHASE: &str = "Bound";

/// Storage backend a volume's data lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
	/// NFS export; the data location is the exported path.
	Nfs,
	/// CSI volume (Ceph RBD in practice); the data location is the volume handle.
	Csi,
	/// Neither an NFS nor a CSI source is set.
	Unknown,
}

impl VolumeKind {
	/// Label used when describing where the data of this kind lives.
	pub fn location_label(self) -> &'static str {
		match self {
			VolumeKind::Nfs => "NFS datadir:",
			VolumeKind::Csi => "Ceph volume:",
			VolumeKind::Unknown => "Unknown location:",
		}
	}
}

impl fmt::Display for VolumeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VolumeKind::Nfs => write!(f, "NFS"),
			VolumeKind::Csi => write!(f, "CephRDB"),
			VolumeKind::Unknown => write!(f, "unknown"),
		}
	}
}

/// The parts of a bound PV needed to pair it with another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRecord {
	/// PV name.
	pub name: String,
	/// Claim the PV is bound to.
	pub claim: ClaimRef,
	/// NFS path or CSI volume handle.
	pub location: String,
	pub kind: VolumeKind,
}

impl VolumeRecord {
	/// Project a PV, returning `None` unless its phase is `Bound`.
	pub fn from_bound(pv: &PersistentVolume) -> Option<Self> {
		let phase = pv.status.as_ref()?.phase.as_deref()?;
		if phase != BOUND_PHASE {
			return None;
		}

		let name = pv
			.metadata
			.name
			.clone()
			.unwrap_or_else(|| NOT_DEFINED.to_string());
		let spec = pv.spec.as_ref();
		let claim_ref = spec.and_then(|s| s.claim_ref.as_ref());
		let claim = ClaimRef::new(
			claim_ref
				.and_then(|c| c.namespace.clone())
				.unwrap_or_else(|| NOT_DEFINED.to_string()),
			claim_ref
				.and_then(|c| c.name.clone())
				.unwrap_or_else(|| NOT_DEFINED.to_string()),
		);

		let (kind, location) = match (
			spec.and_then(|s| s.nfs.as_ref()),
			spec.and_then(|s| s.csi.as_ref()),
		) {
			(Some(nfs), _) => (VolumeKind::Nfs, nfs.path.clone()),
			(None, Some(csi)) => (VolumeKind::Csi, csi.volume_handle.clone()),
			(None, None) => {
				warn!(volume = %name, "bound volume has neither an NFS nor a CSI source");
				(VolumeKind::Unknown, NOT_DEFINED.to_string())
			}
		};

		Some(Self {
			name,
			claim,
			location,
			kind,
		})
	}
}

/// Keep only bound volumes, in the order the cluster returned them.
pub fn extract_bound(volumes: &[PersistentVolume]) -> Vec<VolumeRecord> {
	volumes.iter().filter_map(VolumeRecord::from_bound).collect()
}

/// Claims of the given records, in record order.
pub fn bound_claims(records: &[VolumeRecord]) -> Vec<ClaimRef> {
	records.iter().map(|r| r.claim.clone()).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
	use k8s_openapi::{
		api::core::v1::{
			CSIPersistentVolumeSource, NFSVolumeSource, ObjectReference, PersistentVolume,
			PersistentVolumeSpec, PersistentVolumeStatus,
		},
		apimachinery::pkg::apis::meta::v1::ObjectMeta,
	};

	fn pv(name: &str, claim: &str, phase: &str) -> PersistentVolume {
		let (namespace, claim_name) = claim.split_once(':').expect("claim must be ns:name");
		PersistentVolume {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				..ObjectMeta::default()
			},
			spec: Some(PersistentVolumeSpec {
				claim_ref: Some(ObjectReference {
					namespace: Some(namespace.to_string()),
					name: Some(claim_name.to_string()),
					..ObjectReference::default()
				}),
				..PersistentVolumeSpec::default()
			}),
			status: Some(PersistentVolumeStatus {
				phase: Some(phase.to_string()),
				..PersistentVolumeStatus::default()
			}),
		}
	}

	/// A PV backed by an NFS export.
	pub fn nfs_pv(name: &str, claim: &str, path: &str, phase: &str) -> PersistentVolume {
		let mut pv = pv(name, claim, phase);
		if let Some(spec) = pv.spec.as_mut() {
			spec.nfs = Some(NFSVolumeSource {
				path: path.to_string(),
				server: "nfs.example.com".to_string(),
				..NFSVolumeSource::default()
			});
		}
		pv
	}

	/// A PV backed by a CSI volume.
	pub fn csi_pv(name: &str, claim: &str, handle: &str, phase: &str) -> PersistentVolume {
		let mut pv = pv(name, claim, phase);
		if let Some(spec) = pv.spec.as_mut() {
			spec.csi = Some(CSIPersistentVolumeSource {
				driver: "rbd.csi.ceph.com".to_string(),
				volume_handle: handle.to_string(),
				..CSIPersistentVolumeSource::default()
			});
		}
		pv
	}
}
