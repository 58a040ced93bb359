use crate::{
    namespace::{list_in_namespaces, namespaces_in_mesh},
    Error, Lookup, KUBERNETES_SERVICE_NAME,
};
use mesh_vet_k8s_api::{Endpoints, Namespace, ResourceExt, Service};
use std::sync::Arc;

/// Lists the services in mesh namespaces.
pub fn services_in_mesh<L>(lookup: &L) -> Result<Vec<Arc<Service>>, Error>
where
    L: Lookup + ?Sized,
{
    services_in_namespaces(lookup, &namespaces_in_mesh(lookup)?)
}

/// Lists the services in the given mesh namespaces, as returned by
/// [`namespaces_in_mesh`](crate::namespaces_in_mesh).
pub fn services_in_namespaces<L>(
    lookup: &L,
    namespaces: &[Arc<Namespace>],
) -> Result<Vec<Arc<Service>>, Error>
where
    L: Lookup + ?Sized,
{
    list_in_namespaces(
        lookup,
        namespaces,
        "services",
        |l, ns| l.services(ns),
        |svc| svc.name_any() != KUBERNETES_SERVICE_NAME,
    )
}

/// Lists the endpoints in mesh namespaces.
pub fn endpoints_in_mesh<L>(lookup: &L) -> Result<Vec<Arc<Endpoints>>, Error>
where
    L: Lookup + ?Sized,
{
    endpoints_in_namespaces(lookup, &namespaces_in_mesh(lookup)?)
}

pub fn endpoints_in_namespaces<L>(
    lookup: &L,
    namespaces: &[Arc<Namespace>],
) -> Result<Vec<Arc<Endpoints>>, Error>
where
    L: Lookup + ?Sized,
{
    list_in_namespaces(
        lookup,
        namespaces,
        "endpoints",
        |l, ns| l.endpoints(ns),
        |ep| ep.name_any() != KUBERNETES_SERVICE_NAME,
    )
}
