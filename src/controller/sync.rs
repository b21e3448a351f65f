//! Get-or-create convergence for a single dependent object
//!
//! Presence is convergence: an existing object is never compared or updated.
//! There is no lock around the read and the create. Two reconcilers racing on
//! the same key both see `NotFound`, both create, and the API server's uniqueness
//! check turns the loser's create into `AlreadyExists`, which counts as success.

use tracing::{debug, info};

use crate::crd::MySql;
use crate::dependents::DependentKind;
use crate::ownership::attach_owner;
use crate::store::ClusterStore;
use crate::{Error, ObjectKey};

/// What `sync_dependent` found or did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The dependent already existed; nothing was written
    Present,
    /// The dependent was missing and this call created it
    Created,
    /// The dependent was missing, but another writer created it first
    CreatedConcurrently,
}

/// Ensure the dependent of `kind` exists for `owner`.
///
/// Reads the object at its deterministic identity; if it is missing, builds it,
/// makes `owner` its controller and creates it. Read and create failures other
/// than `NotFound` / `AlreadyExists` are returned unchanged.
pub async fn sync_dependent(
    store: &dyn ClusterStore,
    owner: &MySql,
    owner_key: &ObjectKey,
    kind: DependentKind,
) -> Result<SyncOutcome, Error> {
    let key = kind.key(owner_key);

    match store.get_dependent(kind, &key).await {
        Ok(_) => {
            debug!(%kind, object = %key, "dependent present");
            return Ok(SyncOutcome::Present);
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    info!(%kind, object = %key, "dependent not found, creating");
    let mut object = kind.build(owner_key);
    attach_owner(owner, &mut object)?;

    match store.create_dependent(&object).await {
        Ok(()) => Ok(SyncOutcome::Created),
        Err(e) if e.is_already_exists() => {
            debug!(%kind, object = %key, "dependent created concurrently");
            Ok(SyncOutcome::CreatedConcurrently)
        }
        Err(e) => Err(e),
    }
}
