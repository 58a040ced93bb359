use crate::{
    namespace::{list_in_namespaces, namespaces_in_mesh},
    Error, Lookup, PROXY_CONTAINER_NAME, SIDECAR_STATUS_ANNOTATION,
};
use mesh_vet_k8s_api::{Container, Namespace, Pod, PodSpec, ResourceExt};
use std::sync::Arc;
use tracing::error;

/// Lists the pods in mesh namespaces that have been injected with the sidecar.
pub fn pods_in_mesh<L>(lookup: &L) -> Result<Vec<Arc<Pod>>, Error>
where
    L: Lookup + ?Sized,
{
    pods_in_namespaces(lookup, &namespaces_in_mesh(lookup)?)
}

/// Lists the injected pods in the given mesh namespaces, as returned by
/// [`namespaces_in_mesh`](crate::namespaces_in_mesh).
pub fn pods_in_namespaces<L>(
    lookup: &L,
    namespaces: &[Arc<Namespace>],
) -> Result<Vec<Arc<Pod>>, Error>
where
    L: Lookup + ?Sized,
{
    list_in_namespaces(lookup, namespaces, "pods", |l, ns| l.pods(ns), sidecar_injected)
}

/// Returns true if the sidecar has been injected into the pod.
///
/// A pod is injected only if it carries the injector's status annotation *and* runs the proxy
/// container.
pub fn sidecar_injected(pod: &Pod) -> bool {
    if !pod.annotations().contains_key(SIDECAR_STATUS_ANNOTATION) {
        return false;
    }

    pod.spec
        .iter()
        .flat_map(|spec| spec.containers.iter())
        .any(|c| c.name == PROXY_CONTAINER_NAME)
}

/// Returns the image of the container named `name`.
pub fn image<'s>(name: &str, spec: &'s PodSpec) -> Result<&'s str, Error> {
    image_from_containers(name, &spec.containers)
}

/// Returns the image of the init container named `name`.
pub fn init_image<'s>(name: &str, spec: &'s PodSpec) -> Result<&'s str, Error> {
    image_from_containers(name, spec.init_containers.as_deref().unwrap_or_default())
}

fn image_from_containers<'c>(name: &str, containers: &'c [Container]) -> Result<&'c str, Error> {
    match containers.iter().find(|c| c.name == name) {
        Some(c) => Ok(c.image.as_deref().unwrap_or_default()),
        None => {
            let error = Error::ContainerNotFound(name.to_string());
            error!(%error);
            Err(error)
        }
    }
}
