//! Integration tests for MySql CRD operations
//!
//! Stories about how a database team creates and inspects MySql resources
//! through the Kubernetes API.

use kube::api::{Api, DeleteParams, ListParams};

use mysql_operator::crd::MySql;

use super::helpers::{cleanup_namespace, create_mysql, ensure_test_cluster, fresh_namespace};

/// Story: A team declares a MySQL cluster
///
/// The resource has no spec fields; declaring it is the whole request.
///
/// Expected behavior:
/// - The MySql is accepted by the API server in its namespace
/// - It gets a uid, which later becomes the dependents' owner reference
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_team_declares_mysql_cluster() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let ns = "mysql-crd-create";
    fresh_namespace(&client, ns).await;

    let created = create_mysql(&client, ns, "orders").await;

    assert_eq!(created.metadata.name.as_deref(), Some("orders"));
    assert_eq!(created.metadata.namespace.as_deref(), Some(ns));
    assert!(created.metadata.uid.is_some());

    cleanup_namespace(&client, ns).await;
}

/// Story: MySql resources are namespaced
///
/// Two teams can use the same cluster name in different namespaces.
#[tokio::test]
#[ignore = "requires kind cluster - run with: cargo test --test kind -- --ignored"]
async fn story_same_name_in_two_namespaces() {
    let client = ensure_test_cluster()
        .await
        .expect("failed to setup cluster");
    let (team_a, team_b) = ("mysql-crd-team-a", "mysql-crd-team-b");
    fresh_namespace(&client, team_a).await;
    fresh_namespace(&client, team_b).await;

    create_mysql(&client, team_a, "shared").await;
    create_mysql(&client, team_b, "shared").await;

    let a: Api<MySql> = Api::namespaced(client.clone(), team_a);
    let b: Api<MySql> = Api::namespaced(client.clone(), team_b);
    assert_eq!(a.list(&ListParams::default()).await.unwrap().items.len(), 1);
    assert_eq!(b.list(&ListParams::default()).await.unwrap().items.len(), 1);

    a.delete("shared", &DeleteParams::default()).await.unwrap();
    assert!(b.get_opt("shared").await.unwrap().is_some());

    cleanup_namespace(&client, team_a).await;
    cleanup_namespace(&client, team_b).await;
}
