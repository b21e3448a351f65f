//! Integration tests for MySql reconciliation
//!
//! These tests drive `reconcile_key` directly against a real API server, so
//! they exercise the real store, owner references and create conflicts without
//! running the watch loop.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, DeleteParams};
use kube::Client;

use mysql_operator::controller::{reconcile_key, Context, ReconcileOutcome, SyncOutcome};
use mysql_operator::dependents::{DependentKind, REPLICAS};
use mysql_operator::events::NoopEventPublisher;
use mysql_operator::store::KubeStore;
use mysql_operator::{Error, ObjectKey};

use super::helpers::{
    cleanup_namespace, create_config_map, create_mysql, ensure_test_cluster, fresh_namespace,
};

fn context(client: &Client) -> Context {
    Context::new(
        Arc::new(KubeStore::new(client.clone())),
        Arc::new(NoopEventPublisher),
        Duration::from_secs(30),
    )
}

/// Story: A declared cluster gets its Services and StatefulSet
///
/// Expected behavior:
/// - All three dependents are created on the first pass
/// - Each is controlled by the MySql
/// - A second pass creates nothing
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_mysql_gets_its_dependents() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "mysql-reconcile-create";
    fresh_namespace(&client, ns).await;
    let mysql = create_mysql(&client, ns, "orders").await;
    create_config_map(&client, ns, "orders").await;
    let ctx = context(&client);
    let key = ObjectKey::new(ns, "orders");

    let first = reconcile_key(&key, &ctx).await.expect("first pass failed");
    assert_eq!(first.created(), 3);

    let services: Api<Service> = Api::namespaced(client.clone(), ns);
    let headless = services.get("orders").await.unwrap();
    let read = services.get("orders-read").await.unwrap();
    assert_eq!(
        headless.spec.as_ref().and_then(|s| s.cluster_ip.as_deref()),
        Some("None")
    );
    assert_ne!(
        read.spec.as_ref().and_then(|s| s.cluster_ip.as_deref()),
        Some("None")
    );

    let statefulsets: Api<StatefulSet> = Api::namespaced(client.clone(), ns);
    let sts = statefulsets.get("orders").await.unwrap();
    assert_eq!(sts.spec.as_ref().and_then(|s| s.replicas), Some(REPLICAS));

    let uid = mysql.metadata.uid.clone().unwrap();
    for meta in [&headless.metadata, &read.metadata, &sts.metadata] {
        let refs = meta.owner_references.as_ref().unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].uid, uid);
        assert_eq!(refs[0].controller, Some(true));
    }

    let second = reconcile_key(&key, &ctx).await.expect("second pass failed");
    assert_eq!(
        second,
        ReconcileOutcome::Converged(
            DependentKind::ALL
                .into_iter()
                .map(|kind| (kind, SyncOutcome::Present))
                .collect()
        )
    );

    cleanup_namespace(&client, ns).await;
}

/// Story: The cluster waits for its configuration
///
/// Expected behavior:
/// - Without the ConfigMap the pass fails with NotFound and creates nothing
/// - Once the ConfigMap exists the next pass creates everything
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_mysql_waits_for_config_map() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "mysql-reconcile-gate";
    fresh_namespace(&client, ns).await;
    create_mysql(&client, ns, "billing").await;
    let ctx = context(&client);
    let key = ObjectKey::new(ns, "billing");

    let err = reconcile_key(&key, &ctx).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { ref kind, .. } if kind == "ConfigMap"));
    let services: Api<Service> = Api::namespaced(client.clone(), ns);
    assert!(services.get_opt("billing").await.unwrap().is_none());

    create_config_map(&client, ns, "billing").await;
    let outcome = reconcile_key(&key, &ctx).await.expect("pass failed");
    assert_eq!(outcome.created(), 3);

    cleanup_namespace(&client, ns).await;
}

/// Story: A deleted dependent comes back
///
/// Deleting the read Service by hand is repaired on the next pass, while the
/// other dependents are left as they are.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_deleted_read_service_is_recreated() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "mysql-reconcile-repair";
    fresh_namespace(&client, ns).await;
    create_mysql(&client, ns, "inventory").await;
    create_config_map(&client, ns, "inventory").await;
    let ctx = context(&client);
    let key = ObjectKey::new(ns, "inventory");
    reconcile_key(&key, &ctx).await.expect("first pass failed");

    let services: Api<Service> = Api::namespaced(client.clone(), ns);
    services
        .delete("inventory-read", &DeleteParams::default())
        .await
        .unwrap();

    let outcome = reconcile_key(&key, &ctx).await.expect("repair pass failed");
    assert_eq!(
        outcome,
        ReconcileOutcome::Converged(vec![
            (DependentKind::Service, SyncOutcome::Present),
            (DependentKind::ReadService, SyncOutcome::Created),
            (DependentKind::StatefulSet, SyncOutcome::Present),
        ])
    );

    cleanup_namespace(&client, ns).await;
}

/// Story: A key for a deleted MySql is a no-op
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_deleted_mysql_is_ignored() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "mysql-reconcile-deleted";
    fresh_namespace(&client, ns).await;
    create_config_map(&client, ns, "gone").await;
    let ctx = context(&client);

    let outcome = reconcile_key(&ObjectKey::new(ns, "gone"), &ctx)
        .await
        .expect("pass failed");

    assert_eq!(outcome, ReconcileOutcome::Deleted);
    let statefulsets: Api<StatefulSet> = Api::namespaced(client.clone(), ns);
    assert!(statefulsets.get_opt("gone").await.unwrap().is_none());

    cleanup_namespace(&client, ns).await;
}
