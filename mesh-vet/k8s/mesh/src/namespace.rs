use crate::{load_inject_config, Error, InjectConfig, Lookup, ISTIO_NAMESPACE, NAMESPACE_ALL};
use mesh_vet_k8s_api::{LookupError, Namespace, ResourceExt};
use std::{collections::HashSet, sync::Arc};
use tracing::{error, trace};

/// Namespaces that never take part in the mesh, regardless of the injector's configuration.
const EXEMPTED_NAMESPACES: [&str; 3] = ["kube-system", "kube-public", ISTIO_NAMESPACE];

/// Returns true if the namespace is exempted from automatic sidecar injection.
pub fn is_exempted(ns: &str) -> bool {
    EXEMPTED_NAMESPACES.contains(&ns)
}

pub fn exempted_namespaces() -> impl Iterator<Item = &'static str> {
    EXEMPTED_NAMESPACES.into_iter()
}

/// Lists the namespaces in the mesh, as determined by the injector configuration.
pub fn namespaces_in_mesh<L>(lookup: &L) -> Result<Vec<Arc<Namespace>>, Error>
where
    L: Lookup + ?Sized,
{
    let namespaces = lookup.namespaces().map_err(|error| {
        error!(%error, "Failed to retrieve namespaces");
        error
    })?;
    let config = load_inject_config(lookup)?;

    let mut seen = HashSet::with_capacity(namespaces.len());
    Ok(namespaces
        .into_iter()
        .filter(|ns| {
            let name = ns.name_any();
            let selected = config.selects_namespace(&name);
            trace!(ns = %name, selected);
            selected && seen.insert(name)
        })
        .collect())
}

/// Lists the objects of one kind in each of `namespaces`, keeping those accepted by `keep`.
///
/// Fails on the first namespace that cannot be listed.
pub(crate) fn list_in_namespaces<L, K>(
    lookup: &L,
    namespaces: &[Arc<Namespace>],
    kind: &'static str,
    list: impl Fn(&L, &str) -> Result<Vec<Arc<K>>, LookupError>,
    keep: impl Fn(&K) -> bool,
) -> Result<Vec<Arc<K>>, Error>
where
    L: Lookup + ?Sized,
{
    let mut objects = Vec::new();
    for ns in namespaces {
        let ns = ns.name_any();
        let listed = list(lookup, &ns).map_err(|error| {
            error!(%error, %ns, "Failed to retrieve {}", kind);
            error
        })?;
        objects.extend(listed.into_iter().filter(|obj| keep(obj.as_ref())));
    }
    Ok(objects)
}

// === impl InjectConfig ===

impl InjectConfig {
    /// Returns true if pods in the namespace are subject to injection.
    ///
    /// Exempted namespaces are never selected. A non-empty exclusion list takes precedence: when
    /// it is set, the inclusion list is not consulted.
    pub fn selects_namespace(&self, ns: &str) -> bool {
        if is_exempted(ns) {
            return false;
        }

        if !self.exclude_namespaces.is_empty() {
            return !self.exclude_namespaces.iter().any(|n| n == ns);
        }

        if !self.include_namespaces.is_empty() {
            return self
                .include_namespaces
                .iter()
                .any(|n| n == NAMESPACE_ALL || n == ns);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_config(include: &[&str], exclude: &[&str]) -> InjectConfig {
        InjectConfig {
            include_namespaces: include.iter().map(|s| s.to_string()).collect(),
            exclude_namespaces: exclude.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn exempted() {
        for ns in ["kube-system", "kube-public", "istio-system"] {
            assert!(is_exempted(ns), "{}", ns);
        }
        for ns in ["default", "istio", "kube-node-lease", "Kube-System", ""] {
            assert!(!is_exempted(ns), "{}", ns);
        }

        let mut all = exempted_namespaces().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, ["istio-system", "kube-public", "kube-system"]);
    }

    #[test]
    fn selects_namespace() {
        for (config, ns, selected, msg) in [
            (mk_config(&[], &[]), "default", true, "no lists"),
            (mk_config(&[], &[]), "kube-system", false, "exempted"),
            (mk_config(&["kube-system"], &[]), "kube-system", false, "exempted despite include"),
            (mk_config(&["default"], &[]), "default", true, "included"),
            (mk_config(&["default"], &[]), "bookinfo", false, "not included"),
            (mk_config(&[NAMESPACE_ALL], &[]), "bookinfo", true, "include all"),
            (mk_config(&[], &["default"]), "default", false, "excluded"),
            (mk_config(&[], &["default"]), "bookinfo", true, "not excluded"),
            (mk_config(&["default"], &["default"]), "default", false, "exclude beats include"),
            (
                mk_config(&["default"], &["legacy"]),
                "bookinfo",
                true,
                "include ignored when exclude set",
            ),
        ] {
            assert_eq!(config.selects_namespace(ns), selected, "{}", msg);
        }
    }
}
