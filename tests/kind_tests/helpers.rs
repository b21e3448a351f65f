//! Shared setup for kind integration tests

use std::time::Duration;

use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::runtime::wait::{await_condition, conditions};
use kube::{Client, CustomResourceExt};

use mysql_operator::crd::{MySql, MySqlSpec};
use mysql_operator::dependents::{PRIMARY_CONFIG_KEY, REPLICA_CONFIG_KEY};
use mysql_operator::kube_utils::create_client;

const CRD_WAIT: Duration = Duration::from_secs(30);

/// Connect to the current cluster and make sure the MySql CRD is established
pub async fn ensure_test_cluster() -> Result<Client, String> {
    let client = create_client(None)
        .await
        .map_err(|e| format!("failed to connect to cluster: {e}"))?;

    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let crd = MySql::crd();
    let name = crd.metadata.name.clone().unwrap_or_default();
    crds.patch(
        &name,
        &PatchParams::apply("mysql-operator-tests").force(),
        &Patch::Apply(&crd),
    )
    .await
    .map_err(|e| format!("failed to apply CRD: {e}"))?;

    tokio::time::timeout(
        CRD_WAIT,
        await_condition(crds, &name, conditions::is_crd_established()),
    )
    .await
    .map_err(|_| format!("CRD {name} not established after {CRD_WAIT:?}"))?
    .map_err(|e| format!("failed waiting for CRD: {e}"))?;

    Ok(client)
}

/// Create a fresh namespace for a single test
pub async fn fresh_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;
    wait_for_namespace_gone(&api, name).await;

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    api.create(&PostParams::default(), &ns)
        .await
        .expect("failed to create namespace");
}

async fn wait_for_namespace_gone(api: &Api<Namespace>, name: &str) {
    for _ in 0..60 {
        match api.get_opt(name).await {
            Ok(None) => return,
            _ => tokio::time::sleep(Duration::from_secs(1)).await,
        }
    }
    panic!("namespace {name} still terminating");
}

/// Delete a namespace created by `fresh_namespace`
pub async fn cleanup_namespace(client: &Client, name: &str) {
    let api: Api<Namespace> = Api::all(client.clone());
    let _ = api.delete(name, &DeleteParams::default()).await;
}

/// Create a MySql with no spec fields
pub async fn create_mysql(client: &Client, namespace: &str, name: &str) -> MySql {
    let api: Api<MySql> = Api::namespaced(client.clone(), namespace);
    api.create(&PostParams::default(), &MySql::new(name, MySqlSpec::default()))
        .await
        .expect("failed to create MySql")
}

/// Create the configuration ConfigMap a MySql waits for
pub async fn create_config_map(client: &Client, namespace: &str, name: &str) {
    let api: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    let cm = ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        data: Some(
            [
                (
                    PRIMARY_CONFIG_KEY.to_string(),
                    "[mysqld]\nlog-bin\n".to_string(),
                ),
                (
                    REPLICA_CONFIG_KEY.to_string(),
                    "[mysqld]\nsuper-read-only\n".to_string(),
                ),
            ]
            .into(),
        ),
        ..Default::default()
    };
    api.create(&PostParams::default(), &cm)
        .await
        .expect("failed to create ConfigMap");
}
