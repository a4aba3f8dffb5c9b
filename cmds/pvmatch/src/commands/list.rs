//! Writing PVC listing files.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use kube::config::Kubeconfig;
use tracing::instrument;

use super::list_bound_volumes;
use crate::{
	config::ConfigError,
	listing::{write_listing, ListingSelection, Side},
	reconcile::bound_claims,
};

/// Write a listing file for every side in `selection`.
///
/// An empty cluster still gets a listing file holding only the header.
#[instrument(skip(kubeconfig, writer))]
pub async fn write_listings<W: Write>(
	kubeconfig: &Kubeconfig,
	selection: ListingSelection,
	source_context: &str,
	target_context: Option<&str>,
	output_dir: &Path,
	mut writer: W,
) -> Result<()> {
	for &side in selection.sides() {
		let context = match side {
			Side::Source => source_context,
			Side::Target => target_context.ok_or(ConfigError::MissingTargetContext(
				"--retrieve-pvcs target or both",
			))?,
		};

		let records = list_bound_volumes(kubeconfig, context).await?;
		let path = write_listing(output_dir, side, context, &bound_claims(&records))
			.with_context(|| format!("writing {side} listing to {}", output_dir.display()))?;

		writeln!(
			writer,
			"PVCs for {side}-context {context} written to {}",
			path.display()
		)?;
	}
	Ok(())
}
