/// Application protocols that the mesh recognizes from a service port's name.
///
/// A port is named for a protocol either exactly (`http`) or with the protocol followed by a dash
/// and a suffix (`http-web`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Http2,
    Grpc,
    Mongo,
    Redis,
    Tcp,
}

/// Returns true if the port name is prefixed with a protocol supported by the mesh.
pub fn is_supported_port_name(name: &str) -> bool {
    Protocol::from_port_name(name).is_some()
}

// === impl Protocol ===

impl Protocol {
    pub const ALL: [Self; 6] = [
        Self::Http,
        Self::Http2,
        Self::Grpc,
        Self::Mongo,
        Self::Redis,
        Self::Tcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Http2 => "http2",
            Self::Grpc => "grpc",
            Self::Mongo => "mongo",
            Self::Redis => "redis",
            Self::Tcp => "tcp",
        }
    }

    pub fn from_port_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.names(name))
    }

    fn names(&self, port_name: &str) -> bool {
        match port_name.strip_prefix(self.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}
