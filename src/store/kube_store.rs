//! `ClusterStore` backed by the Kubernetes API

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::api::{Api, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ClusterStore;
use crate::crd::MySql;
use crate::dependents::{DependentKind, DependentObject};
use crate::{Error, ObjectKey, FIELD_MANAGER};

/// Real Kubernetes store implementation
///
/// `kube::Client` is cheap to clone and safe to share, so one store serves every
/// in-flight reconciliation.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Create a new KubeStore wrapping the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get<K>(&self, key: &ObjectKey) -> Result<K, Error>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);
        api.get(&key.name)
            .await
            .map_err(|e| Error::from_kube(K::kind(&()), key, e))
    }

    async fn create<K>(&self, obj: &K) -> Result<(), Error>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
    {
        let key = ObjectKey::for_resource(obj)?;
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        api.create(&params, obj)
            .await
            .map_err(|e| Error::from_kube(K::kind(&()), &key, e))?;
        debug!(kind = %K::kind(&()), object = %key, "created object");
        Ok(())
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_mysql(&self, key: &ObjectKey) -> Result<MySql, Error> {
        self.get(key).await
    }

    async fn get_config_map(&self, key: &ObjectKey) -> Result<ConfigMap, Error> {
        self.get(key).await
    }

    async fn get_dependent(
        &self,
        kind: DependentKind,
        key: &ObjectKey,
    ) -> Result<DependentObject, Error> {
        match kind {
            DependentKind::Service | DependentKind::ReadService => {
                self.get::<Service>(key).await.map(DependentObject::Service)
            }
            DependentKind::StatefulSet => self
                .get::<StatefulSet>(key)
                .await
                .map(DependentObject::StatefulSet),
        }
    }

    async fn create_dependent(&self, object: &DependentObject) -> Result<(), Error> {
        match object {
            DependentObject::Service(svc) => self.create(svc).await,
            DependentObject::StatefulSet(sts) => self.create(sts).await,
        }
    }
}
