pub mod commands;
pub mod config;
pub mod k8s;
pub mod listing;
pub mod reconcile;
pub mod report;
pub mod telemetry;
