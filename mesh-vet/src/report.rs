use anyhow::Result;
use mesh_vet_core::Note;
use mesh_vet_k8s_api::{Lookup, ResourceExt};
use mesh_vet_k8s_mesh as mesh;
use serde::Serialize;
use std::io;
use tracing::info;

/// The note type reported by this vetter.
const VETTER_TYPE: &str = "MeshMembership";

/// The cluster resources that belong to the mesh.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Report {
    pub namespaces: Vec<String>,
    pub pods: Vec<PodRef>,
    pub services: Vec<ObjectRef>,
    pub endpoints: Vec<ObjectRef>,
    pub notes: Vec<Note>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PodRef {
    pub namespace: String,
    pub name: String,
    pub proxy_image: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct ObjectRef {
    pub namespace: String,
    pub name: String,
}

// === impl Report ===

impl Report {
    pub(crate) fn collect<L>(lookup: &L, vetter_id: &str) -> Result<Self>
    where
        L: Lookup + ?Sized,
    {
        let namespaces = match mesh::namespaces_in_mesh(lookup) {
            Ok(namespaces) => namespaces,
            Err(error) => {
                let note =
                    mesh::initializer_disabled_note(&error.to_string(), vetter_id, VETTER_TYPE)
                        .ok_or(error)?;
                info!("Automatic sidecar injection is not configured");
                return Ok(Self {
                    notes: vec![note.with_id()],
                    ..Default::default()
                });
            }
        };

        // Every list is drawn from the same namespace snapshot so that each object's namespace
        // appears in the report.
        let mut pods = Vec::new();
        for pod in mesh::pods_in_namespaces(lookup, &namespaces)? {
            let proxy_image = match pod.spec.as_ref() {
                Some(spec) => mesh::image(mesh::PROXY_CONTAINER_NAME, spec)?.to_string(),
                None => String::new(),
            };
            pods.push(PodRef {
                namespace: pod.namespace().unwrap_or_default(),
                name: pod.name_any(),
                proxy_image,
            });
        }

        Ok(Self {
            namespaces: namespaces.iter().map(|ns| ns.name_any()).collect(),
            pods,
            services: mesh::services_in_namespaces(lookup, &namespaces)?
                .iter()
                .map(|svc| ObjectRef::from_resource(svc.as_ref()))
                .collect(),
            endpoints: mesh::endpoints_in_namespaces(lookup, &namespaces)?
                .iter()
                .map(|ep| ObjectRef::from_resource(ep.as_ref()))
                .collect(),
            notes: Vec::new(),
        })
    }

    /// Writes the report as a single JSON document followed by a newline.
    pub(crate) fn write(&self, mut w: impl io::Write, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut w, self)?;
        } else {
            serde_json::to_writer(&mut w, self)?;
        }
        writeln!(w)?;
        Ok(())
    }
}

// === impl ObjectRef ===

impl ObjectRef {
    fn from_resource(obj: &impl ResourceExt) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }
}
