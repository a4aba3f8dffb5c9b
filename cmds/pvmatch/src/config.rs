//! Configuration file support for pvmatch.
//!
//! Supports `.pvmatch.yaml` files that can be placed anywhere in the directory
//! hierarchy. pvmatch searches from the working directory upward to the
//! filesystem root. Command-line flags always override values from the file.

use std::{
	ffi::OsString,
	fs, io,
	path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// The name of the config file pvmatch looks for
pub const CONFIG_FILE_NAME: &str = ".pvmatch.yaml";

/// Environment variable consulted when no kubeconfig path is configured
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(
		"no kube-config given and no KUBECONFIG found in environment variables, \
		 please specify a valid kube-config file"
	)]
	MissingKubeconfig,

	#[error("can't use {0} without --target-context set")]
	MissingTargetContext(&'static str),

	#[error("failed to read config file: {}", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to parse config file: {}", .path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},
}

/// Root configuration structure for .pvmatch.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PvmatchConfig {
	/// Path to the kubeconfig holding both contexts
	#[serde(default)]
	pub kube_config: Option<PathBuf>,

	/// Context of the cluster data is migrated from
	#[serde(default)]
	pub source_context: Option<String>,

	/// Context of the cluster data is migrated to
	#[serde(default)]
	pub target_context: Option<String>,

	/// Directory the PVC listing files are written to
	#[serde(default)]
	pub output_dir: Option<PathBuf>,
}

impl PvmatchConfig {
	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>, ConfigError> {
		find_config_file(start_dir)
			.map(|path| Self::load_from_file(&path))
			.transpose()
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
		let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "loaded config file");
		Ok(config)
	}

	/// Pick the kubeconfig path: explicit flag, then this file, then `$KUBECONFIG`.
	pub fn kubeconfig_path(
		&self,
		flag: Option<&Path>,
		env: Option<OsString>,
	) -> Result<PathBuf, ConfigError> {
		flag.map(Path::to_path_buf)
			.or_else(|| self.kube_config.clone())
			.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
			.ok_or(ConfigError::MissingKubeconfig)
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	start_dir
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use indoc::indoc;
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn test_find_config_in_parent_directory() {
		let root = TempDir::new().expect("tempdir");
		let nested = root.path().join("a/b/c");
		fs::create_dir_all(&nested).expect("create nested dirs");
		fs::write(root.path().join(CONFIG_FILE_NAME), "sourceContext: old\n").expect("write");

		assert_eq!(
			find_config_file(&nested),
			Some(root.path().join(CONFIG_FILE_NAME))
		);
	}

	#[test]
	fn test_load_all_fields() {
		let dir = TempDir::new().expect("tempdir");
		let path = dir.path().join(CONFIG_FILE_NAME);
		fs::write(
			&path,
			indoc! {"
				kubeConfig: /etc/kube/migration.yaml
				sourceContext: old-cluster
				targetContext: new-cluster
				outputDir: listings
			"},
		)
		.expect("write");

		let config = PvmatchConfig::load_from_directory(dir.path())
			.expect("loads")
			.expect("found");
		assert_eq!(
			config,
			PvmatchConfig {
				kube_config: Some(PathBuf::from("/etc/kube/migration.yaml")),
				source_context: Some("old-cluster".to_string()),
				target_context: Some("new-cluster".to_string()),
				output_dir: Some(PathBuf::from("listings")),
			}
		);
	}

	#[test]
	fn test_unknown_key_is_rejected() {
		let dir = TempDir::new().expect("tempdir");
		let path = dir.path().join(CONFIG_FILE_NAME);
		fs::write(&path, "sourceCtx: typo\n").expect("write");

		assert_matches!(
			PvmatchConfig::load_from_file(&path),
			Err(ConfigError::Parse { .. })
		);
	}

	#[test]
	fn test_kubeconfig_path_precedence() {
		let config = PvmatchConfig {
			kube_config: Some(PathBuf::from("/from/file")),
			..PvmatchConfig::default()
		};

		assert_eq!(
			config
				.kubeconfig_path(Some(Path::new("/from/flag")), Some("/from/env".into()))
				.expect("resolves"),
			PathBuf::from("/from/flag")
		);
		assert_eq!(
			config
				.kubeconfig_path(None, Some("/from/env".into()))
				.expect("resolves"),
			PathBuf::from("/from/file")
		);
		assert_eq!(
			PvmatchConfig::default()
				.kubeconfig_path(None, Some("/from/env".into()))
				.expect("resolves"),
			PathBuf::from("/from/env")
		);
	}

	#[test]
	fn test_missing_kubeconfig() {
		assert_matches!(
			PvmatchConfig::default().kubeconfig_path(None, None),
			Err(ConfigError::MissingKubeconfig)
		);
		assert_matches!(
			PvmatchConfig::default().kubeconfig_path(None, Some(OsString::new())),
			Err(ConfigError::MissingKubeconfig)
		);
	}
}
