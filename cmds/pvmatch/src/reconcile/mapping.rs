//! Operator-supplied mapping files.
//!
//! A mapping file pairs PVCs explicitly, one `namespace:pvc,namespace:pvc`
//! line per pair with the source claim first. Before anything is resolved the
//! file goes through two checks, each represented by its own type:
//!
//! ```text
//! MappingFile --check_pattern--> CheckedMapping --check_membership--> VerifiedMapping --resolve--> [ResolvedMapping]
//! ```
//!
//! The first failing check aborts the run.

use std::{fmt, fs, io, path::Path, sync::OnceLock};

use regex::Regex;

use super::{ClaimRef, ReconcileError, VolumeRecord};

/// A Kubernetes object name: lowercase alphanumerics and inner hyphens.
const NAME_PATTERN: &str = "[a-z0-9](?:[-a-z0-9]*[a-z0-9])?";

static MAPPING_LINE: OnceLock<Regex> = OnceLock::new();

fn mapping_line() -> &'static Regex {
	MAPPING_LINE.get_or_init(|| {
		let pattern = format!(
			"^(?P<source_ns>{n}):(?P<source_name>{n}),(?P<target_ns>{n}):(?P<target_name>{n})$",
			n = NAME_PATTERN
		);
		Regex::new(&pattern).expect("mapping line pattern is a valid regex")
	})
}

/// One `source,target` pair from a mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
	/// 1-based line number in the mapping file.
	pub line: usize,
	pub source: ClaimRef,
	pub target: ClaimRef,
}

impl MappingEntry {
	/// Parse a single line, returning `None` if it does not follow the pattern.
	pub fn parse(line: usize, text: &str) -> Option<Self> {
		let caps = mapping_line().captures(text.trim())?;
		Some(Self {
			line,
			source: ClaimRef::new(&caps["source_ns"], &caps["source_name"]),
			target: ClaimRef::new(&caps["target_ns"], &caps["target_name"]),
		})
	}
}

impl fmt::Display for MappingEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{}", self.source, self.target)
	}
}

/// Raw, unvalidated mapping file contents.
#[derive(Debug, Clone)]
pub struct MappingFile {
	contents: String,
}

impl MappingFile {
	pub fn new(contents: impl Into<String>) -> Self {
		Self {
			contents: contents.into(),
		}
	}

	pub fn read(path: &Path) -> io::Result<Self> {
		fs::read_to_string(path).map(Self::new)
	}

	/// Check that every non-empty line is `namespace:pvc,namespace:pvc`.
	pub fn check_pattern(&self) -> Result<CheckedMapping, ReconcileError> {
		let mut entries = Vec::new();
		for (idx, text) in self.contents.lines().enumerate() {
			if text.trim().is_empty() {
				continue;
			}
			let entry = MappingEntry::parse(idx + 1, text)
				.ok_or(ReconcileError::MalformedMappingLine(idx + 1))?;
			entries.push(entry);
		}
		Ok(CheckedMapping { entries })
	}
}

/// Mapping whose lines are all well-formed.
#[derive(Debug, Clone)]
pub struct CheckedMapping {
	entries: Vec<MappingEntry>,
}

impl CheckedMapping {
	pub fn entries(&self) -> &[MappingEntry] {
		&self.entries
	}

	/// Check every claim against the bound claims of its cluster.
	///
	/// All source claims are checked before any target claim.
	pub fn check_membership(
		self,
		source_bound: &[ClaimRef],
		target_bound: &[ClaimRef],
	) -> Result<VerifiedMapping, ReconcileError> {
		if let Some(entry) = self
			.entries
			.iter()
			.find(|e| !source_bound.contains(&e.source))
		{
			return Err(ReconcileError::UnknownSourcePvc(entry.source.to_string()));
		}
		if let Some(entry) = self
			.entries
			.iter()
			.find(|e| !target_bound.contains(&e.target))
		{
			return Err(ReconcileError::UnknownTargetPvc(entry.target.to_string()));
		}
		Ok(VerifiedMapping {
			entries: self.entries,
		})
	}
}

/// Mapping whose claims all exist in their cluster.
#[derive(Debug, Clone)]
pub struct VerifiedMapping {
	entries: Vec<MappingEntry>,
}

/// A mapping line together with the volumes it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping<'a> {
	pub entry: MappingEntry,
	pub source: &'a VolumeRecord,
	pub target: &'a VolumeRecord,
}

impl VerifiedMapping {
	/// Look up the volume bound to each side of every line.
	pub fn resolve<'a>(
		self,
		source: &'a [VolumeRecord],
		target: &'a [VolumeRecord],
	) -> Result<Vec<ResolvedMapping<'a>>, ReconcileError> {
		self.entries
			.into_iter()
			.map(|entry| {
				match (
					select_by_claim(source, &entry.source),
					select_by_claim(target, &entry.target),
				) {
					(Some(source), Some(target)) => Ok(ResolvedMapping {
						entry,
						source,
						target,
					}),
					_ => Err(ReconcileError::UnresolvedMappingEntry(entry.to_string())),
				}
			})
			.collect()
	}
}

/// First record bound to `claim`.
fn select_by_claim<'a>(records: &'a [VolumeRecord], claim: &ClaimRef) -> Option<&'a VolumeRecord> {
	records.iter().find(|r| &r.claim == claim)
}
