//! MySQL operator - keeps replicated MySQL topologies in existence on Kubernetes
//!
//! For every `MySql` custom resource the operator ensures three dependent
//! objects exist in the resource's namespace: a headless Service for stable pod
//! DNS, a `-read` Service that load-balances reads across replicas, and a
//! StatefulSet running MySQL with an xtrabackup sidecar. The dependents carry a
//! controller owner reference, so deleting the `MySql` garbage-collects them.
//!
//! # Modules
//!
//! - [`crd`] - The `MySql` Custom Resource Definition
//! - [`dependents`] - Desired Service and StatefulSet templates
//! - [`ownership`] - Controller owner references on dependents
//! - [`store`] - Cluster store abstraction (Kubernetes API or test doubles)
//! - [`controller`] - Get-or-create sync, reconciliation and watch wiring
//! - [`events`] - Kubernetes Event publishing
//! - [`config`] - Command-line and environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//! - [`kube_utils`] - Kubernetes client construction
//! - [`error`] - Error types for the operator

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod crd;
pub mod dependents;
pub mod error;
pub mod events;
pub mod key;
pub mod kube_utils;
pub mod ownership;
pub mod store;
pub mod telemetry;

pub use error::Error;
pub use key::ObjectKey;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Name the controller reports in Kubernetes Events
pub const CONTROLLER_NAME: &str = "mysql-controller";

/// Field manager recorded on objects this operator creates
pub const FIELD_MANAGER: &str = "mysql-operator";
