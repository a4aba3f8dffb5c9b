//! Mock Kubernetes API server for testing.
//!
//! Provides an HTTP server serving PersistentVolume manifests that can be
//! used with kubeconfig-based connections. Several servers can
//! share one kubeconfig, one context each, to stand in for a source and a
//! target cluster.

pub mod http;
pub mod manifests;
mod resources;

pub use http::{kubeconfig_for, HttpMockK8sServer, RunningHttpMockK8sServer};
