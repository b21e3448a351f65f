//! Cluster store access for the reconciler
//!
//! The reconciler only needs four operations: read the MySql, read the
//! prerequisite ConfigMap, read a dependent and create a dependent. They sit
//! behind [`ClusterStore`] so reconciliation can be tested against a mock or an
//! in-memory store instead of an API server.

mod kube_store;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;

#[cfg(test)]
use mockall::automock;

use crate::crd::MySql;
use crate::dependents::{DependentKind, DependentObject};
use crate::{Error, ObjectKey};

pub use kube_store::KubeStore;

/// Trait abstracting the cluster API operations used by the reconciler
///
/// Reads return `Error::NotFound` when the object is absent; creates return
/// `Error::AlreadyExists` when an object with the same identity exists. Any
/// other failure is reported as-is. Implementations must be safe to share
/// between concurrent reconciliations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Read a MySql resource
    async fn get_mysql(&self, key: &ObjectKey) -> Result<MySql, Error>;

    /// Read the ConfigMap with the given identity
    async fn get_config_map(&self, key: &ObjectKey) -> Result<ConfigMap, Error>;

    /// Read the live dependent object of `kind` at `key`
    async fn get_dependent(
        &self,
        kind: DependentKind,
        key: &ObjectKey,
    ) -> Result<DependentObject, Error>;

    /// Create a dependent object
    async fn create_dependent(&self, object: &DependentObject) -> Result<(), Error>;
}
