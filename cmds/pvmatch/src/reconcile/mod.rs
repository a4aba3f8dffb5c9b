//! Reconciliation of bound PersistentVolumes between a source and a target cluster.
//!
//! The flow is always the same: PV objects listed from each context are
//! projected into [`VolumeRecord`]s by [`extract`], then paired either
//! automatically by claim ([`matching`]) or through an operator-supplied
//! mapping file ([`mapping`]).

use std::{fmt, str::FromStr};

use thiserror::Error;

pub mod extract;
pub mod mapping;
pub mod matching;

pub use extract::{bound_claims, extract_bound, VolumeKind, VolumeRecord};
pub use mapping::{CheckedMapping, MappingEntry, MappingFile, ResolvedMapping, VerifiedMapping};
pub use matching::{match_by_claim, MatchedPair};

/// Errors produced while pairing volumes.
///
/// Every variant aborts the whole run; there are no partial results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
	#[error("no bound PersistentVolumes were found in context `{0}`")]
	NoVolumesFound(String),

	#[error(
		"PVCs in source and target cluster are not identical. \
		 Please supply a mapping file using the --mapping-file parameter instead"
	)]
	NoMatchesFound,

	#[error(
		"error found in line {0} in mapping file. Lines should consist of \
		 namespace:pvc-name,namespace:pvc-name only, and namespaces and PVC names \
		 should adhere to Kubernetes naming conventions"
	)]
	MalformedMappingLine(usize),

	#[error("source PVC `{0}` from mapping file was not found in the source cluster")]
	UnknownSourcePvc(String),

	#[error("target PVC `{0}` from mapping file was not found in the target cluster")]
	UnknownTargetPvc(String),

	#[error("no bound PersistentVolume found for mapping `{0}`")]
	UnresolvedMappingEntry(String),
}

/// Reference to a PVC as `namespace:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimRef {
	pub namespace: String,
	pub name: String,
}

impl ClaimRef {
	pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			name: name.into(),
		}
	}
}

impl fmt::Display for ClaimRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.namespace, self.name)
	}
}

/// Error returned when a string is not of the form `namespace:name`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected `namespace:name`, got `{0}`")]
pub struct ParseClaimRefError(String);

impl FromStr for ClaimRef {
	type Err = ParseClaimRefError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.split_once(':') {
			Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
				Ok(Self::new(namespace, name))
			}
			_ => Err(ParseClaimRefError(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_claim_ref_display_and_parse() {
		let claim: ClaimRef = "default:web".parse().expect("valid claim ref");
		assert_eq!(claim, ClaimRef::new("default", "web"));
		assert_eq!(claim.to_string(), "default:web");
	}

	#[test]
	fn test_claim_ref_rejects_missing_half() {
		assert_matches!("default".parse::<ClaimRef>(), Err(ParseClaimRefError(s)) if s == "default");
		assert_matches!(":web".parse::<ClaimRef>(), Err(_));
	}
}
