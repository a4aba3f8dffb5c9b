//! Pairing source volumes with target volumes.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use kube::config::Kubeconfig;
use tracing::{debug, info, instrument};

use super::require_bound_volumes;
use crate::{
	reconcile::{bound_claims, match_by_claim, MappingFile},
	report::{write_matches, write_resolved},
};

/// Pair volumes whose claims have the same namespace and name in both clusters.
#[instrument(skip(kubeconfig, writer))]
pub async fn reconcile_by_claim<W: Write>(
	kubeconfig: &Kubeconfig,
	source_context: &str,
	target_context: &str,
	mut writer: W,
) -> Result<()> {
	let source = require_bound_volumes(kubeconfig, source_context).await?;
	let target = require_bound_volumes(kubeconfig, target_context).await?;

	let pairs = match_by_claim(&source, &target)?;
	info!(pairs = pairs.len(), "matched volumes by claim");

	write_matches(&mut writer, &pairs)?;
	Ok(())
}

/// Pair volumes as listed in a mapping file.
///
/// The file is checked against the naming pattern before any cluster is
/// contacted, then against the bound claims of both clusters.
#[instrument(skip(kubeconfig, writer))]
pub async fn reconcile_with_mapping<W: Write>(
	kubeconfig: &Kubeconfig,
	mapping_file: &Path,
	source_context: &str,
	target_context: &str,
	mut writer: W,
) -> Result<()> {
	let checked = MappingFile::read(mapping_file)
		.with_context(|| format!("failed to read mapping file {}", mapping_file.display()))?
		.check_pattern()?;
	debug!(entries = checked.entries().len(), "mapping file is well-formed");

	let source = require_bound_volumes(kubeconfig, source_context).await?;
	let target = require_bound_volumes(kubeconfig, target_context).await?;

	let resolved = checked
		.check_membership(&bound_claims(&source), &bound_claims(&target))?
		.resolve(&source, &target)?;
	info!(pairs = resolved.len(), "resolved mapping file");

	write_resolved(&mut writer, &resolved)?;
	Ok(())
}
