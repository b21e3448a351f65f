//! Mapping dependent change notifications back to their MySql

use kube::runtime::reflector::ObjectRef;
use kube::Resource;

use crate::crd::MySql;

/// Resolve the MySql that controls `obj`, if any.
///
/// Only the owner reference marked `controller: true` counts, and only when it
/// names the MySql kind and API version. The request key reuses the dependent's
/// namespace because owner references cannot cross namespaces. Objects without
/// such a reference produce no request.
pub fn owner_request<K: Resource>(obj: &K) -> Option<ObjectRef<MySql>> {
    let meta = obj.meta();
    let namespace = meta.namespace.as_deref()?;
    meta.owner_references
        .as_ref()?
        .iter()
        .find(|owner| {
            owner.controller == Some(true)
                && owner.kind == MySql::kind(&())
                && owner.api_version == MySql::api_version(&())
        })
        .map(|owner| ObjectRef::new(&owner.name).within(namespace))
}
