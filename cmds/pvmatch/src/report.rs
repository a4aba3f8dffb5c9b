//! Console output for paired volumes.

use std::io::{self, Write};

use crate::reconcile::{MatchedPair, ResolvedMapping, VolumeRecord};

/// Write the pairs found by automatic matching, two lines per pair.
pub fn write_matches<W: Write>(writer: &mut W, pairs: &[MatchedPair]) -> io::Result<()> {
	for pair in pairs {
		writeln!(
			writer,
			"Source PV called {} matches with target PV called {}",
			pair.source.name, pair.target.name
		)?;
		writeln!(
			writer,
			"Data dirs: {} {}",
			pair.source.location, pair.target.location
		)?;
	}
	Ok(())
}

/// Write every resolved mapping line with the data location of both sides.
pub fn write_resolved<W: Write>(writer: &mut W, resolved: &[ResolvedMapping]) -> io::Result<()> {
	for mapping in resolved {
		writeln!(
			writer,
			"Matched source PV of type {} for PVC {} with target PV of type {} for PVC {}",
			mapping.source.kind, mapping.entry.source, mapping.target.kind, mapping.entry.target
		)?;
		write_location(writer, "Source", mapping.source)?;
		write_location(writer, "Target", mapping.target)?;
	}
	Ok(())
}

fn write_location<W: Write>(writer: &mut W, side: &str, record: &VolumeRecord) -> io::Result<()> {
	writeln!(
		writer,
		"{side} {} {}",
		record.kind.location_label(),
		record.location
	)
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;
	use crate::reconcile::{
		extract::fixtures::*, extract_bound, match_by_claim, ClaimRef, MappingEntry,
	};

	#[test]
	fn test_write_matches() {
		let source = extract_bound(&[nfs_pv("pv-src", "default:web", "/data/web", "Bound")]);
		let target = extract_bound(&[nfs_pv("pv-dst", "default:web", "/mnt/web", "Bound")]);
		let pairs = match_by_claim(&source, &target).expect("one pair");

		let mut out = Vec::new();
		write_matches(&mut out, &pairs).expect("write to vec");

		assert_eq!(
			String::from_utf8(out).expect("utf8"),
			indoc! {"
				Source PV called pv-src matches with target PV called pv-dst
				Data dirs: /data/web /mnt/web
			"}
		);
	}

	#[test]
	fn test_write_resolved() {
		let source = extract_bound(&[csi_pv("pv-src", "ns1:a", "vol-123", "Bound")]);
		let target = extract_bound(&[nfs_pv("pv-dst", "ns2:b", "/mnt/b", "Bound")]);
		let resolved = vec![ResolvedMapping {
			entry: MappingEntry {
				line: 1,
				source: ClaimRef::new("ns1", "a"),
				target: ClaimRef::new("ns2", "b"),
			},
			source: &source[0],
			target: &target[0],
		}];

		let mut out = Vec::new();
		write_resolved(&mut out, &resolved).expect("write to vec");

		assert_eq!(
			String::from_utf8(out).expect("utf8"),
			indoc! {"
				Matched source PV of type CephRDB for PVC ns1:a with target PV of type NFS for PVC ns2:b
				Source Ceph volume: vol-123
				Target NFS datadir: /mnt/b
			"}
		);
	}
}
