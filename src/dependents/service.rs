//! Service builders
//!
//! The primary Service is headless: it gives each StatefulSet pod a stable DNS
//! name (`<name>-0.<name>`), which is how clients reach the writable primary and
//! how replicas find their clone source. The read Service is a normal cluster-IP
//! Service spreading read-only traffic over every replica.

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{object_labels, selector_labels, MYSQL_PORT, READ_SERVICE_SUFFIX};
use crate::ObjectKey;

/// Build the headless Service for the MySQL cluster `owner`
pub fn build_service(owner: &ObjectKey) -> Service {
    mysql_service(owner, owner.clone(), Some("None".to_string()))
}

/// Build the read Service (`<name>-read`) for the MySQL cluster `owner`
pub fn build_read_service(owner: &ObjectKey) -> Service {
    mysql_service(owner, owner.with_suffix(READ_SERVICE_SUFFIX), None)
}

fn mysql_service(owner: &ObjectKey, key: ObjectKey, cluster_ip: Option<String>) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(key.name),
            namespace: Some(key.namespace),
            labels: Some(object_labels(&owner.name)),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some("mysql".to_string()),
                port: MYSQL_PORT,
                ..Default::default()
            }]),
            selector: Some(selector_labels(&owner.name)),
            cluster_ip,
            ..Default::default()
        }),
        ..Default::default()
    }
}
