//! MySql reconciliation
//!
//! One pass for one MySql key: read the primary, gate on the prerequisite
//! ConfigMap, then converge the headless Service, the read Service and the
//! StatefulSet in that order. The first failure ends the pass and the runtime
//! retries the whole key, which is safe because every step is get-or-create.

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, error, info, instrument, warn};

use super::sync::{sync_dependent, SyncOutcome};
use crate::config::ControllerConfig;
use crate::crd::MySql;
use crate::dependents::DependentKind;
use crate::events::{EventPublisher, KubeEventPublisher, OperatorEvent};
use crate::store::{ClusterStore, KubeStore};
use crate::{Error, ObjectKey, CONTROLLER_NAME};

/// Controller context shared by all reconciliations
pub struct Context {
    /// Cluster store for reads and creates
    pub store: Arc<dyn ClusterStore>,
    /// Event publisher for Kubernetes Events
    pub events: Arc<dyn EventPublisher>,
    /// Delay before a failed key is retried
    pub error_requeue: Duration,
}

impl Context {
    /// Create a context from its parts
    pub fn new(
        store: Arc<dyn ClusterStore>,
        events: Arc<dyn EventPublisher>,
        error_requeue: Duration,
    ) -> Self {
        Self {
            store,
            events,
            error_requeue,
        }
    }

    /// Create a context backed by the Kubernetes API
    pub fn from_client(client: Client, config: &ControllerConfig) -> Self {
        Self::new(
            Arc::new(KubeStore::new(client.clone())),
            Arc::new(KubeEventPublisher::new(client, CONTROLLER_NAME)),
            config.error_requeue(),
        )
    }

    /// Create a context for testing with a no-op event publisher
    #[cfg(test)]
    pub fn for_testing(store: Arc<dyn ClusterStore>) -> Self {
        Self::new(
            store,
            Arc::new(crate::events::NoopEventPublisher),
            Duration::from_secs(crate::config::DEFAULT_ERROR_REQUEUE_SECS),
        )
    }
}

/// Result of a successful reconciliation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The MySql no longer exists; nothing was done
    Deleted,
    /// Every dependent exists; per-kind outcomes in sync order
    Converged(Vec<(DependentKind, SyncOutcome)>),
}

impl ReconcileOutcome {
    /// Number of dependents this pass created itself
    pub fn created(&self) -> usize {
        match self {
            Self::Deleted => 0,
            Self::Converged(synced) => synced
                .iter()
                .filter(|(_, outcome)| *outcome == SyncOutcome::Created)
                .count(),
        }
    }
}

/// Reconcile the MySql identified by `key` against the cluster store.
///
/// The MySql is re-read rather than trusted from the watch cache, so a key
/// queued just before deletion ends quietly as [`ReconcileOutcome::Deleted`].
/// A missing ConfigMap of the same identity stops the pass with `NotFound`
/// before any dependent is touched.
#[instrument(skip_all, fields(mysql = %key))]
pub async fn reconcile_key(key: &ObjectKey, ctx: &Context) -> Result<ReconcileOutcome, Error> {
    info!("start reconcile");

    let mysql = match ctx.store.get_mysql(key).await {
        Ok(mysql) => mysql,
        Err(e) if e.is_not_found() => {
            info!("MySql no longer exists, nothing to reconcile");
            return Ok(ReconcileOutcome::Deleted);
        }
        Err(e) => return Err(e),
    };

    if let Err(e) = ctx.store.get_config_map(key).await {
        if e.is_not_found() {
            warn!(config_map = %key, "prerequisite ConfigMap not found");
            ctx.events
                .publish(
                    &mysql.object_ref(&()),
                    &OperatorEvent::PrerequisiteMissing {
                        config_map: key.clone(),
                    },
                )
                .await;
        }
        return Err(e);
    }

    let mut synced = Vec::with_capacity(DependentKind::ALL.len());
    for kind in DependentKind::ALL {
        let outcome = sync_dependent(ctx.store.as_ref(), &mysql, key, kind).await?;
        if outcome == SyncOutcome::Created {
            ctx.events
                .publish(
                    &mysql.object_ref(&()),
                    &OperatorEvent::DependentCreated {
                        kind,
                        key: kind.key(key),
                    },
                )
                .await;
        }
        synced.push((kind, outcome));
    }

    info!("end reconcile");
    Ok(ReconcileOutcome::Converged(synced))
}

/// Controller entry point for a MySql delivered by the watch
///
/// Success waits for the next change notification; there is no periodic resync.
pub async fn reconcile(mysql: Arc<MySql>, ctx: Arc<Context>) -> Result<Action, Error> {
    let key = ObjectKey::for_resource(mysql.as_ref())?;
    let outcome = reconcile_key(&key, &ctx).await?;
    debug!(mysql = %key, created = outcome.created(), "reconcile finished");
    Ok(Action::await_change())
}

/// Retry a failed key after the configured delay
pub fn error_policy(mysql: Arc<MySql>, error: &Error, ctx: Arc<Context>) -> Action {
    error!(
        mysql = %mysql.name_any(),
        namespace = ?mysql.namespace(),
        error = %error,
        "reconcile failed, will retry"
    );
    Action::requeue(ctx.error_requeue)
}
