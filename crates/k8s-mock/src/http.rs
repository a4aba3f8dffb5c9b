//! HTTP-based mock Kubernetes server using wiremock.
//!
//! This provides a real HTTP server that can be used with actual kubeconfig-based
//! connections. It answers the PersistentVolume list request; the served
//! volumes are fixed at start.

use bon::Builder;
use kube::config::{
	AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use tracing::{debug, trace};
use wiremock::{
	matchers::{method, path, path_regex},
	Mock, MockServer, ResponseTemplate,
};

use super::resources::{is_persistent_volume, PERSISTENT_VOLUMES_PATH};

/// A mock Kubernetes server exposed over HTTP.
#[derive(Builder)]
pub struct HttpMockK8sServer {
	/// PersistentVolume manifests to serve, listed in this order. Manifests of
	/// any other kind are skipped.
	#[builder(default)]
	resources: Vec<serde_json::Value>,
	/// When set, every API request is answered with this status code, as a
	/// cluster rejecting the client's credentials would.
	reject_with: Option<u16>,
}

/// A running HTTP mock server instance.
pub struct RunningHttpMockK8sServer {
	server: MockServer,
}

impl HttpMockK8sServer {
	/// Start the mock server with all configured volumes.
	pub async fn start(self) -> RunningHttpMockK8sServer {
		let server = MockServer::start().await;

		debug!(uri = %server.uri(), "Started mock K8s server");

		match self.reject_with {
			Some(code) => mount_rejection(&server, code).await,
			None => mount_persistent_volumes(&server, self.resources).await,
		}

		RunningHttpMockK8sServer { server }
	}
}

impl RunningHttpMockK8sServer {
	/// Get the server's URI (e.g., "http://127.0.0.1:12345").
	pub fn uri(&self) -> String {
		self.server.uri()
	}
}

/// Create a Kubeconfig with one context per mock server.
///
/// Cluster and user entries are named after their context, so contexts never
/// share credentials or endpoints.
pub fn kubeconfig_for(
	servers: &[(&RunningHttpMockK8sServer, &str)],
	current_context: Option<&str>,
) -> Kubeconfig {
	let mut kubeconfig = Kubeconfig {
		current_context: current_context.map(str::to_string),
		..Default::default()
	};

	for (server, context_name) in servers {
		let cluster_name = format!("{}-cluster", context_name);
		let user_name = format!("{}-user", context_name);

		kubeconfig.clusters.push(NamedCluster {
			name: cluster_name.clone(),
			cluster: Some(Cluster {
				server: Some(server.uri()),
				insecure_skip_tls_verify: Some(true),
				..Default::default()
			}),
		});
		kubeconfig.contexts.push(NamedContext {
			name: (*context_name).to_string(),
			context: Some(Context {
				cluster: cluster_name,
				user: Some(user_name.clone()),
				namespace: Some("default".to_string()),
				..Default::default()
			}),
		});
		kubeconfig.auth_infos.push(NamedAuthInfo {
			name: user_name,
			auth_info: Some(AuthInfo::default()),
		});
	}

	kubeconfig
}

async fn mount_rejection(server: &MockServer, code: u16) {
	let reason = match code {
		401 => "Unauthorized",
		403 => "Forbidden",
		_ => "InternalError",
	};

	Mock::given(path_regex(r"^/api(s)?(/.*)?$"))
		.respond_with(ResponseTemplate::new(code).set_body_json(serde_json::json!({
			"kind": "Status",
			"apiVersion": "v1",
			"metadata": {},
			"status": "Failure",
			"message": reason.to_lowercase(),
			"reason": reason,
			"code": code
		})))
		.mount(server)
		.await;
}

/// Serve the PersistentVolume list.
async fn mount_persistent_volumes(server: &MockServer, resources: Vec<serde_json::Value>) {
	let items: Vec<_> = resources
		.into_iter()
		.filter(|manifest| {
			let served = is_persistent_volume(manifest);
			if !served {
				trace!(kind = ?manifest.get("kind"), "Skipped manifest");
			}
			served
		})
		.collect();
	debug!(count = items.len(), "Registered PersistentVolumes");

	Mock::given(method("GET"))
		.and(path(PERSISTENT_VOLUMES_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
			"kind": "PersistentVolumeList",
			"apiVersion": "v1",
			"metadata": {"resourceVersion": "1"},
			"items": items
		})))
		.mount(server)
		.await;
}
