//! Error types for pmodidl

/// Errors raised while mapping DIDL-Lite documents to objects and back
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown namespace alias: {0}")]
    UnknownNamespaceAlias(String),

    #[error("Unknown upnp:class: {0}")]
    UnknownClass(String),

    #[error("Missing upnp:class on <{tag}> (id: {})", .id.as_deref().unwrap_or("?"))]
    MissingClass { tag: String, id: Option<String> },

    #[error("{kind}: missing required property '{property}'")]
    MissingRequiredProperty { kind: String, property: String },

    #[error("{kind}: unknown property '{property}'")]
    UnknownProperty { kind: String, property: String },

    #[error("{0} is not a container and cannot hold children")]
    NotAContainer(String),

    #[error("Malformed DIDL-Lite document: {0}")]
    MalformedDocument(#[from] xmltree::ParseError),

    #[error("XML emitter error: {0}")]
    Emit(#[from] xmltree::Error),
}

impl Error {
    /// True for errors that lenient parsing downgrades to a skipped entry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnknownClass(_)
                | Error::MissingClass { .. }
                | Error::MissingRequiredProperty { .. }
        )
    }
}

/// Result type for pmodidl
pub type Result<T> = std::result::Result<T, Error>;
