//! Kubernetes cluster connection management.

use std::path::Path;

use k8s_openapi::api::core::v1::PersistentVolume;
use kube::{
	api::{Api, ListParams},
	config::{KubeConfigOptions, Kubeconfig, KubeconfigError},
	Client, Config,
};
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur when connecting to a Kubernetes cluster.
#[derive(Debug, Error)]
pub enum ConnectionError {
	#[error("failed to load kubeconfig `{path}`")]
	LoadKubeconfig {
		path: String,
		#[source]
		source: KubeconfigError,
	},

	#[error("no context named `{0}` was found. Please check your kube-config")]
	ContextNotFound(String),

	#[error("kube-config has no active context, please pass --source-context")]
	NoActiveContext,

	#[error("invalid configuration for context `{context}`")]
	InvalidContext {
		context: String,
		#[source]
		source: KubeconfigError,
	},

	#[error("failed to create a client for context `{context}`")]
	Client {
		context: String,
		#[source]
		source: kube::Error,
	},

	#[error("cluster for context `{context}` is unreachable or refused the request")]
	Unreachable {
		context: String,
		#[source]
		source: kube::Error,
	},
}

/// Read a kubeconfig file.
pub fn load_kubeconfig(path: &Path) -> Result<Kubeconfig, ConnectionError> {
	Kubeconfig::read_from(path).map_err(|source| ConnectionError::LoadKubeconfig {
		path: path.display().to_string(),
		source,
	})
}

/// Name of the kubeconfig's `current-context`.
pub fn active_context(kubeconfig: &Kubeconfig) -> Result<String, ConnectionError> {
	kubeconfig
		.current_context
		.clone()
		.filter(|c| !c.is_empty())
		.ok_or(ConnectionError::NoActiveContext)
}

/// A client bound to exactly one kubeconfig context.
#[derive(Clone)]
pub struct ClusterConnection {
	client: Client,
	context: String,
}

impl std::fmt::Debug for ClusterConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClusterConnection")
			.field("context", &self.context)
			.finish_non_exhaustive()
	}
}

impl ClusterConnection {
	/// Build a client for `context` from the given kubeconfig.
	///
	/// No request is made here; an unreachable cluster surfaces on first use.
	#[instrument(skip(kubeconfig))]
	pub async fn connect(kubeconfig: &Kubeconfig, context: &str) -> Result<Self, ConnectionError> {
		if !kubeconfig.contexts.iter().any(|c| c.name == context) {
			return Err(ConnectionError::ContextNotFound(context.to_string()));
		}

		let config = Config::from_custom_kubeconfig(
			kubeconfig.clone(),
			&KubeConfigOptions {
				context: Some(context.to_string()),
				..Default::default()
			},
		)
		.await
		.map_err(|source| ConnectionError::InvalidContext {
			context: context.to_string(),
			source,
		})?;

		let client = Client::try_from(config).map_err(|source| ConnectionError::Client {
			context: context.to_string(),
			source,
		})?;

		tracing::debug!(context = %context, "created cluster client");

		Ok(Self {
			client,
			context: context.to_string(),
		})
	}

	/// Context this connection is bound to.
	pub fn context(&self) -> &str {
		&self.context
	}

	/// List every PersistentVolume in the cluster, in the order the API returns them.
	#[instrument(skip(self), fields(context = %self.context))]
	pub async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ConnectionError> {
		let api: Api<PersistentVolume> = Api::all(self.client.clone());
		let list = api
			.list(&ListParams::default())
			.await
			.map_err(|source| ConnectionError::Unreachable {
				context: self.context.clone(),
				source,
			})?;

		tracing::info!(count = list.items.len(), "listed PersistentVolumes");
		Ok(list.items)
	}
}
