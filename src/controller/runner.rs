//! Controller wiring: watches, work queue and the reconcile loop

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::core::NamespaceResourceScope;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, Resource};
use tracing::info;

use super::mysql::{error_policy, reconcile, Context};
use super::watch::owner_request;
use crate::config::ControllerConfig;
use crate::crd::MySql;

/// Server-side watch timeout in seconds
///
/// Kept below [`crate::kube_utils::DEFAULT_READ_TIMEOUT`] so the API server ends
/// an idle watch and the watcher reopens it before the client read deadline hits.
pub const WATCH_TIMEOUT_SECS: u32 = 25;

fn watcher_config() -> WatcherConfig {
    WatcherConfig::default().timeout(WATCH_TIMEOUT_SECS)
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Run the MySql controller until a shutdown signal arrives.
///
/// MySql changes enqueue their own key. Service and StatefulSet changes enqueue
/// the MySql named by their controller owner reference. The runtime collapses
/// duplicate keys and never reconciles the same key twice at once.
pub async fn run(client: Client, config: &ControllerConfig) {
    let namespace = config.namespace.as_deref();
    let ctx = Arc::new(Context::from_client(client.clone(), config));

    let mysqls: Api<MySql> = scoped_api(&client, namespace);
    let services: Api<Service> = scoped_api(&client, namespace);
    let statefulsets: Api<StatefulSet> = scoped_api(&client, namespace);

    info!(
        namespace = namespace.unwrap_or("<all>"),
        "starting MySql controller"
    );

    Controller::new(mysqls, watcher_config())
        .watches(services, watcher_config(), |svc: Service| {
            owner_request(&svc)
        })
        .watches(statefulsets, watcher_config(), |sts: StatefulSet| {
            owner_request(&sts)
        })
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(log_reconcile_result("MySql"))
        .await;

    info!("MySql controller stopped");
}

/// Creates a closure for logging reconciliation results.
fn log_reconcile_result<T: std::fmt::Debug, E: std::fmt::Debug>(
    controller_name: &'static str,
) -> impl Fn(Result<T, E>) -> std::future::Ready<()> {
    move |result| {
        match result {
            Ok(action) => tracing::debug!(?action, "{} reconciliation completed", controller_name),
            Err(e) => tracing::error!(error = ?e, "{} reconciliation error", controller_name),
        }
        std::future::ready(())
    }
}
