//! Kubernetes access for listing PersistentVolumes.
//!
//! Every call goes through a [`client::ClusterConnection`] bound to one
//! kubeconfig context, so source and target clusters never share client state.

pub mod client;

pub use client::{active_context, load_kubeconfig, ClusterConnection, ConnectionError};
