//! Reconciliation logic for the MySql custom resource
//!
//! The controller keeps three dependents in existence for every MySql: a
//! headless Service, a read Service and a StatefulSet. Reconciliation is
//! level-triggered and only ever creates what is missing.

mod mysql;
mod runner;
mod sync;
mod watch;

pub use mysql::{error_policy, reconcile, reconcile_key, Context, ReconcileOutcome};
pub use runner::{run, WATCH_TIMEOUT_SECS};
pub use sync::{sync_dependent, SyncOutcome};
pub use watch::owner_request;
