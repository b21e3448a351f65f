//! Dependent objects realized for every MySql resource
//!
//! Each [`DependentKind`] is a small descriptor: it knows the deterministic
//! identity of its object relative to the owning MySql, and how to build the
//! object from compile-time constants. The reconciler iterates
//! [`DependentKind::ALL`] and runs the same get-or-create routine for each.

mod service;
mod statefulset;

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::ObjectKey;

pub use service::{build_read_service, build_service};
pub use statefulset::{
    build_statefulset, DATA_VOLUME_SIZE, PRIMARY_CONFIG_KEY, REPLICAS, REPLICA_CONFIG_KEY,
};

/// Port MySQL listens on, exposed by both Services
pub const MYSQL_PORT: i32 = 3306;

/// Port the xtrabackup sidecar streams clones on
pub const XTRABACKUP_PORT: i32 = 3307;

/// Suffix appended to the owner name for the read Service
pub const READ_SERVICE_SUFFIX: &str = "-read";

/// Label shared by every MySQL pod; the Services select on it
pub const APP_LABEL: (&str, &str) = ("app", "mysql");

/// Label carrying the owning MySql name, keeping selectors of sibling clusters apart
pub const INSTANCE_LABEL_KEY: &str = "app.kubernetes.io/instance";

/// Label marking objects created by this operator
pub const MANAGED_BY_LABEL: (&str, &str) = ("app.kubernetes.io/managed-by", "mysql-operator");

/// Selector labels for pods of the MySQL cluster named `name`
pub fn selector_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APP_LABEL.0.to_string(), APP_LABEL.1.to_string()),
        (INSTANCE_LABEL_KEY.to_string(), name.to_string()),
    ])
}

/// Labels stamped on every dependent object of the cluster named `name`
pub fn object_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = selector_labels(name);
    labels.insert(
        MANAGED_BY_LABEL.0.to_string(),
        MANAGED_BY_LABEL.1.to_string(),
    );
    labels
}

/// The kinds of dependent object kept present for each MySql
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DependentKind {
    /// Headless Service governing the StatefulSet (stable pod DNS, writes go to pod 0)
    Service,
    /// Cluster-IP Service load-balancing reads across all replicas
    ReadService,
    /// The replicated MySQL StatefulSet
    StatefulSet,
}

impl DependentKind {
    /// Every dependent kind, in the order the reconciler syncs them
    pub const ALL: [DependentKind; 3] = [Self::Service, Self::ReadService, Self::StatefulSet];

    /// Short name used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::ReadService => "read-service",
            Self::StatefulSet => "statefulset",
        }
    }

    /// Kubernetes kind of the object this descriptor produces
    pub fn object_kind(&self) -> &'static str {
        match self {
            Self::Service | Self::ReadService => "Service",
            Self::StatefulSet => "StatefulSet",
        }
    }

    /// Deterministic identity of this dependent for the given owner
    pub fn key(&self, owner: &ObjectKey) -> ObjectKey {
        match self {
            Self::Service | Self::StatefulSet => owner.clone(),
            Self::ReadService => owner.with_suffix(READ_SERVICE_SUFFIX),
        }
    }

    /// Build the target object for the given owner.
    ///
    /// The result has no owner reference yet; see [`crate::ownership`].
    pub fn build(&self, owner: &ObjectKey) -> DependentObject {
        match self {
            Self::Service => DependentObject::Service(build_service(owner)),
            Self::ReadService => DependentObject::Service(build_read_service(owner)),
            Self::StatefulSet => DependentObject::StatefulSet(build_statefulset(owner)),
        }
    }
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed dependent object, as read from or written to the cluster store
#[derive(Clone, Debug, PartialEq)]
pub enum DependentObject {
    /// A core/v1 Service
    Service(Service),
    /// An apps/v1 StatefulSet
    StatefulSet(StatefulSet),
}

impl DependentObject {
    /// Kubernetes kind of the wrapped object
    pub fn object_kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "Service",
            Self::StatefulSet(_) => "StatefulSet",
        }
    }

    /// Object metadata
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Service(svc) => &svc.metadata,
            Self::StatefulSet(sts) => &sts.metadata,
        }
    }

    /// Mutable object metadata
    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Service(svc) => &mut svc.metadata,
            Self::StatefulSet(sts) => &mut sts.metadata,
        }
    }

    /// Namespace/name of the wrapped object, if both are set
    pub fn key(&self) -> Option<ObjectKey> {
        let meta = self.metadata();
        Some(ObjectKey::new(meta.namespace.clone()?, meta.name.clone()?))
    }
}
