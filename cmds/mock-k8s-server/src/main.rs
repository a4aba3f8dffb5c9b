//! Standalone mock Kubernetes API servers for rehearsing a reconciliation.
//!
//! Starts one HTTP server per cluster, each serving the PersistentVolume
//! manifests found in its directory, and writes a kubeconfig with a context
//! for each so pvmatch can be pointed at them without a real cluster.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use k8s_mock::{kubeconfig_for, HttpMockK8sServer};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mock-k8s-server")]
#[command(about = "Serve a mock source and target cluster for pvmatch")]
struct Cli {
	/// Directory containing YAML manifests for the source cluster
	#[arg(long)]
	source_dir: PathBuf,

	/// Directory containing YAML manifests for the target cluster
	#[arg(long)]
	target_dir: PathBuf,

	/// Path to write kubeconfig file
	#[arg(short = 'k', long)]
	kubeconfig: PathBuf,

	/// Context name of the source cluster, also used as current-context
	#[arg(long, default_value = "source")]
	source_context: String,

	/// Context name of the target cluster
	#[arg(long, default_value = "target")]
	target_context: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::builder()
				.with_default_directive(tracing::Level::INFO.into())
				.from_env_lossy(),
		)
		.with_writer(io::stderr)
		.init();

	let cli = Cli::parse();

	let source = HttpMockK8sServer::builder()
		.resources(load_manifests_from_dir(&cli.source_dir)?)
		.build()
		.start()
		.await;
	let target = HttpMockK8sServer::builder()
		.resources(load_manifests_from_dir(&cli.target_dir)?)
		.build()
		.start()
		.await;
	info!(source = %source.uri(), target = %target.uri(), "Mock clusters started");

	let kubeconfig = kubeconfig_for(
		&[
			(&source, cli.source_context.as_str()),
			(&target, cli.target_context.as_str()),
		],
		Some(cli.source_context.as_str()),
	);
	let kubeconfig_yaml =
		serde_yaml::to_string(&kubeconfig).context("failed to serialize kubeconfig")?;
	fs::write(&cli.kubeconfig, kubeconfig_yaml)
		.with_context(|| format!("failed to write kubeconfig to {}", cli.kubeconfig.display()))?;
	info!(path = %cli.kubeconfig.display(), "Wrote kubeconfig");

	let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
		.context("failed to register SIGTERM handler")?;

	tokio::select! {
		_ = tokio::signal::ctrl_c() => {
			info!("Received SIGINT");
		}
		_ = sigterm.recv() => {
			info!("Received SIGTERM");
		}
	}

	info!("Shutting down");
	Ok(())
}

/// Load YAML manifests from a directory, in file name order.
fn load_manifests_from_dir(dir: &Path) -> Result<Vec<serde_json::Value>> {
	let mut entries: Vec<_> = fs::read_dir(dir)
		.with_context(|| format!("failed to read directory {}", dir.display()))?
		.filter_map(|e| e.ok())
		.map(|e| e.path())
		.filter(|p| p.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
		.collect();
	entries.sort();

	let mut manifests = Vec::new();
	for path in entries {
		let content = fs::read_to_string(&path)
			.with_context(|| format!("failed to read {}", path.display()))?;

		// Handle multi-document YAML files
		for doc in serde_yaml::Deserializer::from_str(&content) {
			let value = serde_json::Value::deserialize(doc)
				.with_context(|| format!("failed to parse YAML in {}", path.display()))?;

			if value.is_null() {
				continue;
			}

			debug!(path = %path.display(), kind = ?value.get("kind"), "Loaded manifest");
			manifests.push(value);
		}
	}

	info!(count = manifests.len(), dir = %dir.display(), "Loaded manifests");
	Ok(manifests)
}

#[cfg(test)]
mod tests {
	use indoc::indoc;
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn test_load_multi_document_files_in_name_order() {
		let dir = TempDir::new().expect("tempdir");
		fs::write(
			dir.path().join("b.yaml"),
			indoc! {"
				apiVersion: v1
				kind: PersistentVolume
				metadata:
				  name: pv-b
				---
				apiVersion: v1
				kind: PersistentVolume
				metadata:
				  name: pv-c
			"},
		)
		.expect("write");
		fs::write(
			dir.path().join("a.yml"),
			"apiVersion: v1\nkind: PersistentVolume\nmetadata:\n  name: pv-a\n",
		)
		.expect("write");
		fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

		let names: Vec<_> = load_manifests_from_dir(dir.path())
			.expect("loads")
			.iter()
			.map(|m| m["metadata"]["name"].as_str().unwrap_or_default().to_string())
			.collect();
		assert_eq!(names, vec!["pv-a", "pv-b", "pv-c"]);
	}

	#[test]
	fn test_bundled_fixtures_load() {
		let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");

		let source = load_manifests_from_dir(&fixtures.join("source")).expect("source loads");
		let target = load_manifests_from_dir(&fixtures.join("target")).expect("target loads");
		assert_eq!(source.len(), 3);
		assert_eq!(target.len(), 2);
	}
}
