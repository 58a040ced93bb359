use crate::{ConfigMap, Endpoints, Namespace, Pod, Service};
use std::sync::Arc;

/// Read access to the cluster resources a vetter inspects.
///
/// Implementations return snapshots: the returned collections are never updated after the call
/// completes.
pub trait Lookup {
    fn namespaces(&self) -> Result<Vec<Arc<Namespace>>, LookupError>;

    fn pods(&self, namespace: &str) -> Result<Vec<Arc<Pod>>, LookupError>;

    fn services(&self, namespace: &str) -> Result<Vec<Arc<Service>>, LookupError>;

    fn endpoints(&self, namespace: &str) -> Result<Vec<Arc<Endpoints>>, LookupError>;

    fn config_map(&self, namespace: &str, name: &str) -> Result<Arc<ConfigMap>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Mirrors the API server's message for a missing object, e.g. `configmaps "x" not found`.
    #[error("{resource} \"{name}\" not found")]
    NotFound {
        /// The plural resource name, e.g. `configmaps`.
        resource: &'static str,
        namespace: Option<String>,
        name: String,
    },

    #[error("lookup failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

// === impl LookupError ===

impl LookupError {
    pub fn not_found<K>(namespace: Option<&str>, name: impl Into<String>) -> Self
    where
        K: k8s_openapi::Resource,
    {
        Self::NotFound {
            resource: K::URL_PATH_SEGMENT,
            namespace: namespace.map(Into::into),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<kube::Error> for LookupError {
    fn from(error: kube::Error) -> Self {
        Self::Transport(error.into())
    }
}
