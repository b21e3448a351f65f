//! Error types for the MySQL operator
//!
//! The reconciler distinguishes two "expected" store outcomes from real failures:
//! `NotFound` drives the create path and `AlreadyExists` means another writer won a
//! create race. Everything else is returned unchanged to the controller runtime,
//! which owns retry timing.

use thiserror::Error;

use crate::ObjectKey;

/// Main error type for operator operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The object does not exist in the cluster store
    #[error("{kind} {key} not found")]
    NotFound {
        /// Kind of the missing object (e.g. "Service")
        kind: String,
        /// Namespace/name that was looked up
        key: ObjectKey,
    },

    /// A create was rejected because the object already exists
    #[error("{kind} {key} already exists")]
    AlreadyExists {
        /// Kind of the conflicting object
        kind: String,
        /// Namespace/name of the conflicting object
        key: ObjectKey,
    },

    /// The owner reference for a dependent object could not be built
    #[error("cannot resolve owner reference for {key}: {message}")]
    Ownership {
        /// Owner that could not be referenced
        key: ObjectKey,
        /// What was missing
        message: String,
    },

    /// Any other Kubernetes API error (transient or permission failures)
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A resource is missing identity metadata
    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata {
        /// Kind of the incomplete resource
        kind: String,
        /// The missing field ("name" or "namespace")
        field: &'static str,
    },

    /// Startup configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map a kube client error for `kind` at `key` onto the store taxonomy.
    ///
    /// HTTP 404 becomes `NotFound`, HTTP 409 becomes `AlreadyExists`, anything
    /// else stays a `Kube` error.
    pub fn from_kube(kind: impl Into<String>, key: &ObjectKey, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => Self::NotFound {
                kind: kind.into(),
                key: key.clone(),
            },
            kube::Error::Api(ae) if ae.code == 409 => Self::AlreadyExists {
                kind: kind.into(),
                key: key.clone(),
            },
            other => Self::Kube(other),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: impl Into<String>, key: &ObjectKey) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.clone(),
        }
    }

    /// Create an already-exists error
    pub fn already_exists(kind: impl Into<String>, key: &ObjectKey) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            key: key.clone(),
        }
    }

    /// Create an ownership error for the given owner
    pub fn ownership(key: &ObjectKey, msg: impl Into<String>) -> Self {
        Self::Ownership {
            key: key.clone(),
            message: msg.into(),
        }
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True if this error means the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True if this error means a create lost a race
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
