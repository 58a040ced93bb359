#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod lookup;
mod store;

pub use self::{
    lookup::{Lookup, LookupError},
    store::StoreLookup,
};
pub use k8s_openapi::api::{
    self,
    core::v1::{ConfigMap, Container, Endpoints, Namespace, Pod, PodSpec, Service},
};
pub use kube::api::{ObjectMeta, ResourceExt};
