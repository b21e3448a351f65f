//! Reconciliation key: the namespace/name identity of a namespaced object

use std::fmt;

use kube::{Resource, ResourceExt};

use crate::Error;

/// Namespace/name pair identifying a namespaced object.
///
/// This is the unit of work handed to the reconciler and the identity used for
/// every store lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace of the object
    pub namespace: String,
    /// Name of the object
    pub name: String,
}

impl ObjectKey {
    /// Create a key from a namespace and a name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Read the key from a resource's metadata.
    ///
    /// Fails if either the name or the namespace is unset.
    pub fn for_resource<K>(obj: &K) -> Result<Self, Error>
    where
        K: Resource<DynamicType = ()>,
    {
        let kind = K::kind(&()).to_string();
        let name = obj.meta().name.clone().ok_or_else(|| Error::MissingMetadata {
            kind: kind.clone(),
            field: "name",
        })?;
        let namespace = obj.namespace().ok_or(Error::MissingMetadata {
            kind,
            field: "namespace",
        })?;
        Ok(Self { namespace, name })
    }

    /// Key of a sibling object in the same namespace with a suffixed name
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: format!("{}{}", self.name, suffix),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
