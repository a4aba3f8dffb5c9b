//! Command handler: resolves settings, then lists and/or pairs volumes.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use kube::config::Kubeconfig;
use tracing::{debug, instrument, warn};

use crate::{
	config::{ConfigError, PvmatchConfig, KUBECONFIG_ENV},
	k8s::{active_context, load_kubeconfig, ClusterConnection},
	listing::ListingSelection,
	reconcile::{extract_bound, ReconcileError, VolumeRecord},
};

pub mod list;
pub mod reconcile;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
	/// Path to the kubeconfig file. Defaults to the KUBECONFIG environment variable if not specified
	#[arg(long)]
	pub kube_config: Option<PathBuf>,

	/// Source context to use. Defaults to the active context of the kubeconfig
	#[arg(long)]
	pub source_context: Option<String>,

	/// Target context to use. Does not default to the active context
	#[arg(long)]
	pub target_context: Option<String>,

	/// Write the bound PVCs of the selected cluster(s) to <source|target>_pvcs.txt
	#[arg(long, value_enum)]
	pub retrieve_pvcs: Option<ListingSelection>,

	/// Mapping file with one namespace:pvc-name,namespace:pvc-name line per pair
	#[arg(long)]
	pub mapping_file: Option<PathBuf>,

	/// Directory to write PVC listing files to [default: .]
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	/// Config file to use instead of searching for .pvmatch.yaml
	#[arg(long)]
	pub config: Option<PathBuf>,
}

/// Settings for one run, after flags and config file were merged.
#[derive(Debug, Clone)]
pub struct RunOpts {
	/// Source context; the kubeconfig's active context when unset.
	pub source_context: Option<String>,
	pub target_context: Option<String>,
	pub retrieve_pvcs: Option<ListingSelection>,
	pub mapping_file: Option<PathBuf>,
	pub output_dir: PathBuf,
}

impl Default for RunOpts {
	fn default() -> Self {
		Self {
			source_context: None,
			target_context: None,
			retrieve_pvcs: None,
			mapping_file: None,
			output_dir: PathBuf::from("."),
		}
	}
}

impl RunOpts {
	/// Merge command-line flags over values from the config file.
	pub fn merge(args: RunArgs, file: PvmatchConfig) -> Self {
		Self {
			source_context: args.source_context.or(file.source_context),
			target_context: args.target_context.or(file.target_context),
			retrieve_pvcs: args.retrieve_pvcs,
			mapping_file: args.mapping_file,
			output_dir: args
				.output_dir
				.or(file.output_dir)
				.unwrap_or_else(|| PathBuf::from(".")),
		}
	}

	/// Reject flag combinations that cannot work before touching any cluster.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.target_context.is_some() {
			return Ok(());
		}
		if self.retrieve_pvcs.is_some_and(ListingSelection::needs_target) {
			return Err(ConfigError::MissingTargetContext(
				"--retrieve-pvcs target or both",
			));
		}
		if self.mapping_file.is_some() {
			return Err(ConfigError::MissingTargetContext("--mapping-file"));
		}
		Ok(())
	}
}

/// Run the command.
pub fn run<W: Write>(args: RunArgs, writer: W) -> Result<()> {
	let runtime = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.context("creating tokio runtime")?;

	runtime.block_on(run_async(args, writer))
}

async fn run_async<W: Write>(args: RunArgs, writer: W) -> Result<()> {
	let file_config = match &args.config {
		Some(path) => PvmatchConfig::load_from_file(path)?,
		None => {
			let cwd = std::env::current_dir().context("determining working directory")?;
			PvmatchConfig::load_from_directory(&cwd)?.unwrap_or_default()
		}
	};

	let kubeconfig_path = file_config.kubeconfig_path(
		args.kube_config.as_deref(),
		std::env::var_os(KUBECONFIG_ENV),
	)?;
	debug!(path = %kubeconfig_path.display(), "using kubeconfig");

	let opts = RunOpts::merge(args, file_config);
	opts.validate()?;

	let kubeconfig = load_kubeconfig(&kubeconfig_path)?;
	execute(opts, &kubeconfig, writer).await
}

/// Run listing and pairing against the clusters of `kubeconfig`.
///
/// The source cluster is always queried before the target cluster.
#[instrument(skip_all)]
pub async fn execute<W: Write>(opts: RunOpts, kubeconfig: &Kubeconfig, mut writer: W) -> Result<()> {
	opts.validate()?;

	let source_context = match opts.source_context {
		Some(context) => context,
		None => active_context(kubeconfig)?,
	};
	let target_context = opts.target_context.as_deref();
	debug!(source = %source_context, target = ?target_context, "resolved contexts");

	if let Some(selection) = opts.retrieve_pvcs {
		list::write_listings(
			kubeconfig,
			selection,
			&source_context,
			target_context,
			&opts.output_dir,
			&mut writer,
		)
		.await?;
	}

	match (&opts.mapping_file, target_context) {
		(Some(mapping_file), Some(target_context)) => {
			reconcile::reconcile_with_mapping(
				kubeconfig,
				mapping_file,
				&source_context,
				target_context,
				&mut writer,
			)
			.await
		}
		(None, Some(target_context)) => {
			reconcile::reconcile_by_claim(kubeconfig, &source_context, target_context, &mut writer)
				.await
		}
		// Rejected by validate()
		(Some(_), None) => Err(ConfigError::MissingTargetContext("--mapping-file").into()),
		(None, None) => {
			if opts.retrieve_pvcs.is_none() {
				warn!("nothing to do: pass --target-context to pair volumes or --retrieve-pvcs to list them");
			}
			Ok(())
		}
	}
}

/// List the bound volumes of `context`, possibly none.
async fn list_bound_volumes(kubeconfig: &Kubeconfig, context: &str) -> Result<Vec<VolumeRecord>> {
	let connection = ClusterConnection::connect(kubeconfig, context).await?;
	let volumes = connection.list_persistent_volumes().await?;
	let records = extract_bound(&volumes);
	debug!(
		context = %connection.context(),
		total = volumes.len(),
		bound = records.len(),
		"extracted bound volumes"
	);
	Ok(records)
}

/// List the bound volumes of `context`, failing if there are none.
async fn require_bound_volumes(
	kubeconfig: &Kubeconfig,
	context: &str,
) -> Result<Vec<VolumeRecord>> {
	let records = list_bound_volumes(kubeconfig, context).await?;
	if records.is_empty() {
		return Err(ReconcileError::NoVolumesFound(context.to_string()).into());
	}
	Ok(records)
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_flags_override_config_file() {
		let args = RunArgs {
			source_context: Some("flag-source".to_string()),
			..RunArgs::default()
		};
		let file = PvmatchConfig {
			source_context: Some("file-source".to_string()),
			target_context: Some("file-target".to_string()),
			output_dir: Some(PathBuf::from("out")),
			..PvmatchConfig::default()
		};

		let opts = RunOpts::merge(args, file);
		assert_eq!(opts.source_context.as_deref(), Some("flag-source"));
		assert_eq!(opts.target_context.as_deref(), Some("file-target"));
		assert_eq!(opts.output_dir, PathBuf::from("out"));
	}

	#[test]
	fn test_output_dir_defaults_to_cwd() {
		let opts = RunOpts::merge(RunArgs::default(), PvmatchConfig::default());
		assert_eq!(opts.output_dir, PathBuf::from("."));
	}

	#[test]
	fn test_listing_target_needs_target_context() {
		let opts = RunOpts {
			retrieve_pvcs: Some(ListingSelection::Both),
			..RunOpts::default()
		};
		assert_matches!(opts.validate(), Err(ConfigError::MissingTargetContext(_)));

		let opts = RunOpts {
			retrieve_pvcs: Some(ListingSelection::Source),
			..RunOpts::default()
		};
		assert_matches!(opts.validate(), Ok(()));
	}

	#[test]
	fn test_mapping_file_needs_target_context() {
		let opts = RunOpts {
			mapping_file: Some(PathBuf::from("mapping.txt")),
			..RunOpts::default()
		};
		assert_matches!(
			opts.validate(),
			Err(ConfigError::MissingTargetContext("--mapping-file"))
		);
	}
}
