//! PVC listing files.
//!
//! A listing file holds every bound PVC of one cluster as `namespace:name`,
//! one per line, below a header naming the context. Operators use them as a
//! starting point when writing a mapping file.

use std::{
	fmt,
	fs::File,
	io::{self, BufWriter, Write},
	path::{Path, PathBuf},
};

use clap::ValueEnum;

use crate::reconcile::ClaimRef;

/// One of the two clusters taking part in a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	Source,
	Target,
}

impl Side {
	/// Name of the listing file written for this side.
	pub fn listing_file_name(self) -> &'static str {
		match self {
			Side::Source => "source_pvcs.txt",
			Side::Target => "target_pvcs.txt",
		}
	}
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Side::Source => write!(f, "source"),
			Side::Target => write!(f, "target"),
		}
	}
}

/// Which clusters to write listing files for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingSelection {
	Source,
	Target,
	Both,
}

impl ListingSelection {
	pub fn sides(self) -> &'static [Side] {
		match self {
			ListingSelection::Source => &[Side::Source],
			ListingSelection::Target => &[Side::Target],
			ListingSelection::Both => &[Side::Source, Side::Target],
		}
	}

	/// Whether the selection needs a target context.
	pub fn needs_target(self) -> bool {
		self.sides().contains(&Side::Target)
	}
}

/// Write the listing in its textual form.
pub fn write_listing_to<W: Write>(
	writer: &mut W,
	side: Side,
	context: &str,
	claims: &[ClaimRef],
) -> io::Result<()> {
	writeln!(writer, "PVCs for {side}-context {context}:")?;
	for claim in claims {
		writeln!(writer, "{claim}")?;
	}
	Ok(())
}

/// Write the listing file for `side` into `dir`, replacing any previous one.
pub fn write_listing(
	dir: &Path,
	side: Side,
	context: &str,
	claims: &[ClaimRef],
) -> io::Result<PathBuf> {
	let path = dir.join(side.listing_file_name());
	let mut writer = BufWriter::new(File::create(&path)?);
	write_listing_to(&mut writer, side, context, claims)?;
	writer.flush()?;
	tracing::debug!(path = %path.display(), claims = claims.len(), "wrote listing file");
	Ok(path)
}
