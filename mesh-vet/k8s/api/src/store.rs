use crate::{ConfigMap, Endpoints, Lookup, LookupError, Namespace, Pod, Service};
use futures::prelude::*;
use kube::{
    api::Api,
    runtime::{
        reflector::{self, ObjectRef, Store},
        watcher, WatchStreamExt,
    },
    Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

/// A [`Lookup`] served from cluster-wide reflector caches.
///
/// Each resource type is watched by a background task that keeps its store current. Reads never
/// touch the API server.
pub struct StoreLookup {
    namespaces: Store<Namespace>,
    pods: Store<Pod>,
    services: Store<Service>,
    endpoints: Store<Endpoints>,
    config_maps: Store<ConfigMap>,
    tasks: Vec<JoinHandle<()>>,
}

// === impl StoreLookup ===

impl StoreLookup {
    /// Starts watches for all resource types and waits for every store to complete its initial
    /// list.
    pub async fn spawn(client: Client) -> Result<Self, LookupError> {
        let mut tasks = Vec::with_capacity(5);
        let namespaces = spawn_store(Api::all(client.clone()), &mut tasks);
        let pods = spawn_store(Api::all(client.clone()), &mut tasks);
        let services = spawn_store(Api::all(client.clone()), &mut tasks);
        let endpoints = spawn_store(Api::all(client.clone()), &mut tasks);
        let config_maps = spawn_store(Api::all(client), &mut tasks);

        let lookup = Self {
            namespaces,
            pods,
            services,
            endpoints,
            config_maps,
            tasks,
        };
        lookup.ready().await?;
        Ok(lookup)
    }

    async fn ready(&self) -> Result<(), LookupError> {
        tokio::try_join!(
            self.namespaces.wait_until_ready(),
            self.pods.wait_until_ready(),
            self.services.wait_until_ready(),
            self.endpoints.wait_until_ready(),
            self.config_maps.wait_until_ready(),
        )
        .map_err(|error| LookupError::Transport(error.into()))?;
        debug!("Stores ready");
        Ok(())
    }
}

impl Lookup for StoreLookup {
    fn namespaces(&self) -> Result<Vec<Arc<Namespace>>, LookupError> {
        let mut namespaces = self.namespaces.state();
        namespaces.sort_by_key(|ns| ns.name_any());
        Ok(namespaces)
    }

    fn pods(&self, namespace: &str) -> Result<Vec<Arc<Pod>>, LookupError> {
        Ok(namespaced(&self.pods, namespace))
    }

    fn services(&self, namespace: &str) -> Result<Vec<Arc<Service>>, LookupError> {
        Ok(namespaced(&self.services, namespace))
    }

    fn endpoints(&self, namespace: &str) -> Result<Vec<Arc<Endpoints>>, LookupError> {
        Ok(namespaced(&self.endpoints, namespace))
    }

    fn config_map(&self, namespace: &str, name: &str) -> Result<Arc<ConfigMap>, LookupError> {
        self.config_maps
            .get(&ObjectRef::new(name).within(namespace))
            .ok_or_else(|| LookupError::not_found::<ConfigMap>(Some(namespace), name))
    }
}

impl Drop for StoreLookup {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

fn spawn_store<K>(api: Api<K>, tasks: &mut Vec<JoinHandle<()>>) -> Store<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let (reader, writer) = reflector::store();
    let kind = K::kind(&());
    let watch = watcher(api, watcher::Config::default()).default_backoff();
    let events = reflector::reflector(writer, watch).applied_objects();
    let task = tokio::spawn(
        async move {
            tokio::pin!(events);
            while let Some(res) = events.next().await {
                if let Err(error) = res {
                    warn!(%error, "Watch failed");
                }
            }
        }
        .instrument(info_span!("watch", %kind)),
    );
    tasks.push(task);
    reader
}

fn namespaced<K>(store: &Store<K>, namespace: &str) -> Vec<Arc<K>>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    let mut objects = store
        .state()
        .into_iter()
        .filter(|obj| obj.namespace().as_deref() == Some(namespace))
        .collect::<Vec<_>>();
    objects.sort_by_key(|obj| obj.name_any());
    objects
}
