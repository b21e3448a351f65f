//! Kubernetes Events emitted on MySql resources
//!
//! Publishing is fire-and-forget: a failed publish is logged and dropped, and
//! never changes the outcome of a reconciliation.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::warn;

use crate::dependents::DependentKind;
use crate::ObjectKey;

/// Well-known event reason strings.
pub mod reasons {
    /// A missing dependent object was created
    pub const DEPENDENT_CREATED: &str = "DependentCreated";
    /// The prerequisite ConfigMap does not exist
    pub const PREREQUISITE_MISSING: &str = "PrerequisiteMissing";
}

/// Well-known event action strings.
pub mod actions {
    /// Standard reconciliation loop
    pub const RECONCILE: &str = "Reconcile";
    /// Creating a dependent object
    pub const CREATE: &str = "Create";
}

/// Something worth telling `kubectl describe mysql` about
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperatorEvent {
    /// This reconciler created a dependent that was missing
    DependentCreated {
        /// Which dependent
        kind: DependentKind,
        /// Identity of the created object
        key: ObjectKey,
    },
    /// The ConfigMap the cluster mounts does not exist yet
    PrerequisiteMissing {
        /// Identity of the missing ConfigMap
        config_map: ObjectKey,
    },
}

impl OperatorEvent {
    /// Normal for progress, Warning for anything blocking the cluster
    pub fn type_(&self) -> EventType {
        match self {
            Self::DependentCreated { .. } => EventType::Normal,
            Self::PrerequisiteMissing { .. } => EventType::Warning,
        }
    }

    /// Machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DependentCreated { .. } => reasons::DEPENDENT_CREATED,
            Self::PrerequisiteMissing { .. } => reasons::PREREQUISITE_MISSING,
        }
    }

    /// Action the controller took or attempted
    pub fn action(&self) -> &'static str {
        match self {
            Self::DependentCreated { .. } => actions::CREATE,
            Self::PrerequisiteMissing { .. } => actions::RECONCILE,
        }
    }

    /// Human-readable note
    pub fn note(&self) -> String {
        match self {
            Self::DependentCreated { kind, key } => {
                format!("Created {} {}", kind.object_kind(), key.name)
            }
            Self::PrerequisiteMissing { config_map } => format!(
                "ConfigMap {} must exist before the cluster is created",
                config_map.name
            ),
        }
    }
}

/// Sink for events about a MySql
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event` on the object behind `resource_ref`
    async fn publish(&self, resource_ref: &ObjectReference, event: &OperatorEvent);
}

/// Publisher backed by `kube::runtime::events::Recorder`
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    /// Create a publisher reporting as `controller_name`.
    ///
    /// `POD_NAME`, when set, becomes the reporting instance.
    pub fn new(client: Client, controller_name: &str) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(&self, resource_ref: &ObjectReference, event: &OperatorEvent) {
        let recorded = Event {
            type_: event.type_(),
            reason: event.reason().to_string(),
            note: Some(event.note()),
            action: event.action().to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&recorded, resource_ref).await {
            warn!(reason = event.reason(), error = %e, "failed to publish Kubernetes event");
        }
    }
}

/// Publisher that drops every event
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, _resource_ref: &ObjectReference, _event: &OperatorEvent) {}
}
