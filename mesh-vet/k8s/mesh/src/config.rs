use crate::{Error, Lookup, INJECT_CONFIG_MAP, INJECT_CONFIG_MAP_KEY, ISTIO_NAMESPACE};
use serde::{Deserialize, Deserializer};
use tracing::{debug, error};

/// The sidecar injector's configuration.
///
/// Absent and null fields take their empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InjectConfig {
    pub policy: Option<InjectionPolicy>,

    /// Namespaces in which pods are injected. Empty means all namespaces.
    #[serde(rename = "namespaces", deserialize_with = "null_as_default")]
    pub include_namespaces: Vec<String>,

    /// Namespaces in which pods are never injected.
    #[serde(deserialize_with = "null_as_default")]
    pub exclude_namespaces: Vec<String>,

    /// Parameters of the injected sidecar template.
    #[serde(deserialize_with = "null_as_default")]
    pub params: Params,

    #[serde(deserialize_with = "null_as_default")]
    pub initializer_name: String,
}

/// Determines whether the injector adds the sidecar to pods in the watched namespaces.
///
/// The injector compares policies by exact string; values other than `disabled` and `enabled`
/// are kept as written.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum InjectionPolicy {
    Disabled,
    Enabled,
    Other(String),
}

/// Parameters for injecting the proxy into a pod.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    #[serde(deserialize_with = "null_as_default")]
    pub init_image: String,

    #[serde(deserialize_with = "null_as_default")]
    pub proxy_image: String,

    #[serde(deserialize_with = "null_as_default")]
    pub verbosity: i32,

    #[serde(rename = "sidecarProxyUID", deserialize_with = "null_as_default")]
    pub sidecar_proxy_uid: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub version: String,

    #[serde(deserialize_with = "null_as_default")]
    pub enable_core_dump: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub debug_mode: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub image_pull_policy: String,

    /// Comma-separated CIDRs. When set, only outbound traffic to these ranges is redirected to the
    /// proxy.
    #[serde(rename = "includeIPRanges", deserialize_with = "null_as_default")]
    pub include_ip_ranges: String,
}

/// Reads the injector configuration from the `istio-inject` ConfigMap.
pub fn load_inject_config<L>(lookup: &L) -> Result<InjectConfig, Error>
where
    L: Lookup + ?Sized,
{
    let cm = lookup
        .config_map(ISTIO_NAMESPACE, INJECT_CONFIG_MAP)
        .map_err(|error| {
            debug!(%error, configmap = INJECT_CONFIG_MAP, "Failed to retrieve configmap");
            error
        })?;

    let data = cm
        .data
        .as_ref()
        .and_then(|data| data.get(INJECT_CONFIG_MAP_KEY))
        .ok_or_else(|| {
            let error = Error::MissingKey {
                key: INJECT_CONFIG_MAP_KEY,
                config_map: INJECT_CONFIG_MAP,
            };
            error!(%error, "Invalid injection configmap");
            error
        })?;

    InjectConfig::from_yaml(data).map_err(|error| {
        error!(%error, "Failed to parse yaml injection config");
        error.into()
    })
}

// === impl InjectConfig ===

impl InjectConfig {
    /// Parses a YAML document. An empty document, or one holding only comments or a null value,
    /// yields the default configuration.
    pub fn from_yaml(s: &str) -> Result<Self, serde_yaml::Error> {
        let blank = s.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<Option<Self>>(s).map(Option::unwrap_or_default)
    }
}

// === impl InjectionPolicy ===

impl From<String> for InjectionPolicy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "disabled" => Self::Disabled,
            "enabled" => Self::Enabled,
            _ => Self::Other(s),
        }
    }
}

impl std::fmt::Display for InjectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => "disabled".fmt(f),
            Self::Enabled => "enabled".fmt(f),
            Self::Other(s) => s.fmt(f),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = InjectConfig::from_yaml(
            r#"
policy: enabled
namespaces: [default, bookinfo]
excludeNamespaces:
  - legacy
initializerName: sidecar.initializer.istio.io
params:
  initImage: docker.io/istio/proxy_init:0.2.12
  proxyImage: docker.io/istio/proxy:0.2.12
  verbosity: 2
  sidecarProxyUID: 1337
  version: 0.2.12
  enableCoreDump: true
  debugMode: false
  imagePullPolicy: IfNotPresent
  includeIPRanges: "10.0.0.0/8,172.16.0.0/12"
"#,
        )
        .expect("config must parse");

        assert_eq!(
            config,
            InjectConfig {
                policy: Some(InjectionPolicy::Enabled),
                include_namespaces: vec!["default".into(), "bookinfo".into()],
                exclude_namespaces: vec!["legacy".into()],
                initializer_name: "sidecar.initializer.istio.io".into(),
                params: Params {
                    init_image: "docker.io/istio/proxy_init:0.2.12".into(),
                    proxy_image: "docker.io/istio/proxy:0.2.12".into(),
                    verbosity: 2,
                    sidecar_proxy_uid: 1337,
                    version: "0.2.12".into(),
                    enable_core_dump: true,
                    debug_mode: false,
                    image_pull_policy: "IfNotPresent".into(),
                    include_ip_ranges: "10.0.0.0/8,172.16.0.0/12".into(),
                },
            }
        );
    }

    #[test]
    fn missing_fields_default() {
        let config = InjectConfig::from_yaml("policy: disabled").expect("config must parse");
        assert_eq!(config.policy, Some(InjectionPolicy::Disabled));
        assert!(config.include_namespaces.is_empty());
        assert!(config.exclude_namespaces.is_empty());
        assert_eq!(config.params, Params::default());
    }

    #[test]
    fn empty_values() {
        for (yaml, msg) in [
            ("", "empty document"),
            ("\n  \n", "whitespace"),
            ("# injector disabled\n# see docs", "comments only"),
            ("~", "null document"),
            ("namespaces: ~\nexcludeNamespaces: null", "null lists"),
            ("excludeNamespaces:", "empty value"),
            ("params: ~", "null params"),
            ("params:\n  proxyImage: ~\n  verbosity: ~", "null params fields"),
            ("initializerName: ~\npolicy: ~", "null scalars"),
        ] {
            assert_eq!(
                InjectConfig::from_yaml(yaml).expect(msg),
                InjectConfig::default(),
                "{}",
                msg
            );
        }
    }

    #[test]
    fn policies() {
        for (yaml, policy) in [
            ("policy: enabled", InjectionPolicy::Enabled),
            ("policy: disabled", InjectionPolicy::Disabled),
            ("policy: Enabled", InjectionPolicy::Other("Enabled".into())),
            ("policy: sometimes", InjectionPolicy::Other("sometimes".into())),
        ] {
            let config = InjectConfig::from_yaml(yaml).expect(yaml);
            assert_eq!(config.policy, Some(policy.clone()), "{}", yaml);
            assert_eq!(policy.to_string(), yaml.trim_start_matches("policy: "));
        }
    }

    #[test]
    fn rejects_malformed_config() {
        for (yaml, msg) in [
            ("namespaces: default", "namespaces not a sequence"),
            ("params: {verbosity: loud}", "verbosity not an integer"),
            ("- a\n- b", "not a mapping"),
        ] {
            assert!(InjectConfig::from_yaml(yaml).is_err(), "{}", msg);
        }
    }
}
