//! MySql Custom Resource Definition
//!
//! A MySql resource declares a replicated MySQL cluster. The operator realizes it
//! as a headless Service, a read Service and a StatefulSet, all owned by the
//! MySql object so that deleting it cascades to everything the operator created.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a MySql cluster
///
/// Empty for now: replica count, storage size and images are fixed by the
/// operator. New fields here become inputs to the dependent-object builders.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "mysql.example.com",
    version = "v1alpha1",
    kind = "MySql",
    plural = "mysqls",
    shortname = "mysql",
    status = "MySqlStatus",
    namespaced,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MySqlSpec {}

/// Observed state of a MySql cluster
///
/// The reconciler does not write status; the subresource exists so it can be
/// added without a schema change.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MySqlStatus {}
