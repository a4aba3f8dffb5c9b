//! Automatic pairing of volumes whose claims are identical on both sides.

use super::{ReconcileError, VolumeRecord};

/// A source volume and the target volume it was paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair<'a> {
	pub source: &'a VolumeRecord,
	pub target: &'a VolumeRecord,
}

/// Pair every source record with the first target record bound to the same
/// `namespace:name` claim.
///
/// Source records without a counterpart are dropped. Duplicate claims on the
/// target side are not detected; the first one in cluster order wins.
pub fn match_by_claim<'a>(
	source: &'a [VolumeRecord],
	target: &'a [VolumeRecord],
) -> Result<Vec<MatchedPair<'a>>, ReconcileError> {
	let pairs: Vec<_> = source
		.iter()
		.filter_map(|s| {
			target
				.iter()
				.find(|t| t.claim == s.claim)
				.map(|t| MatchedPair {
					source: s,
					target: t,
				})
		})
		.collect();

	if pairs.is_empty() {
		return Err(ReconcileError::NoMatchesFound);
	}
	tracing::debug!(
		matched = pairs.len(),
		unmatched = source.len() - pairs.len(),
		"paired volumes by claim"
	);
	Ok(pairs)
}
