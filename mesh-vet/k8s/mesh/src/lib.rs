//! Mesh membership
//!
//! Determines which cluster resources belong to the service mesh. Membership is decided in two
//! steps:
//!
//! - A `Namespace` is in the mesh unless it is one of the exempted system namespaces or the
//!   sidecar injector's configuration (the `istio-inject` ConfigMap) leaves it out. When the
//!   configuration names excluded namespaces, only that list is consulted; otherwise a non-empty
//!   list of included namespaces restricts the mesh to those names.
//! - `Pod`s, `Service`s, and `Endpoints` are in the mesh when their namespace is. Pods must
//!   additionally have been injected with the proxy sidecar, and the API server's own
//!   `kubernetes` service is never considered part of the mesh.
//!
//! All lookups go through [`Lookup`], so membership is computed against whatever snapshot of the
//! cluster the caller provides.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod config;
mod namespace;
mod note;
mod pod;
mod service;


pub use self::{
    config::{load_inject_config, InjectConfig, InjectionPolicy, Params},
    namespace::{exempted_namespaces, is_exempted, namespaces_in_mesh},
    note::initializer_disabled_note,
    pod::{image, init_image, pods_in_mesh, pods_in_namespaces, sidecar_injected},
    service::{
        endpoints_in_mesh, endpoints_in_namespaces, services_in_mesh, services_in_namespaces,
    },
};
use mesh_vet_k8s_api::{Lookup, LookupError};

/// The namespace in which the mesh control plane runs.
pub const ISTIO_NAMESPACE: &str = "istio-system";

/// The name of the sidecar proxy container.
pub const PROXY_CONTAINER_NAME: &str = "istio-proxy";

/// The name of the init container that configures traffic redirection.
pub const INIT_CONTAINER_NAME: &str = "istio-init";

/// The ConfigMap, in [`ISTIO_NAMESPACE`], holding the sidecar injector's configuration.
pub const INJECT_CONFIG_MAP: &str = "istio-inject";

pub const INJECT_CONFIG_MAP_KEY: &str = "config";

/// Set by the injector on every pod it has injected.
pub const SIDECAR_STATUS_ANNOTATION: &str = "sidecar.istio.io/status";

/// The API server's service (and endpoints), present in the `default` namespace.
pub const KUBERNETES_SERVICE_NAME: &str = "kubernetes";

/// The ConfigMap, in [`ISTIO_NAMESPACE`], holding the mesh-wide configuration.
pub const MESH_CONFIG_MAP: &str = "istio";

pub const MESH_CONFIG_MAP_KEY: &str = "mesh";

/// Present in the mesh configuration when mutual TLS is required between proxies.
pub const MUTUAL_TLS_AUTH_POLICY: &str = "authPolicy: MUTUAL_TLS";

pub const MIXER_DEPLOYMENT_NAME: &str = "istio-mixer";

pub const MIXER_CONTAINER_NAME: &str = "mixer";

pub const PILOT_DEPLOYMENT_NAME: &str = "istio-pilot";

pub const PILOT_CONTAINER_NAME: &str = "discovery";

/// The pod label naming the application a workload belongs to.
pub const APP_LABEL: &str = "app";

/// The service port protocol that the mesh does not proxy.
pub const SERVICE_PROTOCOL_UDP: &str = "UDP";

/// Selects all namespaces when listed in [`InjectConfig::include_namespaces`].
pub const NAMESPACE_ALL: &str = "";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("missing configuration map key: {key} in configmap: {config_map}")]
    MissingKey {
        key: &'static str,
        config_map: &'static str,
    },

    #[error("failed to parse injection config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to find container {0}")]
    ContainerNotFound(String),
}
