//! Controller owner references from a MySql onto its dependents
//!
//! The owner reference does two jobs: the garbage collector deletes dependents
//! when the MySql is deleted, and the watch mapper in [`crate::controller`]
//! routes events on a dependent back to the MySql that owns it.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;

use crate::crd::MySql;
use crate::dependents::DependentObject;
use crate::{Error, ObjectKey};

/// Make `owner` the controller of `object`.
///
/// Replaces any owner references already on the candidate so the created object
/// carries exactly one controller reference. The reference blocks owner deletion,
/// so foreground deletion of the MySql waits for its dependents. Fails if the
/// owner lacks the name or UID an owner reference needs, which happens only for
/// an object that was never read back from the API server.
pub fn attach_owner(owner: &MySql, object: &mut DependentObject) -> Result<(), Error> {
    let owner_ref = owner.controller_owner_ref(&()).ok_or_else(|| {
        let key = ObjectKey::new(
            owner.meta().namespace.clone().unwrap_or_default(),
            owner.meta().name.clone().unwrap_or_default(),
        );
        Error::ownership(&key, "owner has no name or uid")
    })?;

    object.metadata_mut().owner_references = Some(vec![OwnerReference {
        block_owner_deletion: Some(true),
        ..owner_ref
    }]);
    Ok(())
}
