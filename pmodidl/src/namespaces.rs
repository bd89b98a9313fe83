//! Registre des namespaces DIDL-Lite
//!
//! Table fixe alias → URI utilisée par les définitions de propriétés
//! (`dc:title`, `upnp:class`, ...) et par le sérialiseur pour déclarer
//! les préfixes.

use crate::error::{Error, Result};

/// Namespace par défaut des documents DIDL-Lite
pub const DIDL_LITE: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
/// Dublin Core
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
/// Extensions UPnP AV
pub const UPNP: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
/// Extensions Samsung
pub const SEC: &str = "http://www.sec.co.kr/";
/// Extensions DLNA
pub const DLNA: &str = "urn:schemas-dlna-org:metadata-1-0/";
/// XML Schema instance
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Alias DIDL-Lite (namespace par défaut, jamais préfixé à l'émission)
pub const DIDL_LITE_ALIAS: &str = "didl_lite";

/// Table alias → URI
pub static NAMESPACES: &[(&str, &str)] = &[
    (DIDL_LITE_ALIAS, DIDL_LITE),
    ("dc", DC),
    ("upnp", UPNP),
    ("sec", SEC),
    ("dlna", DLNA),
    ("xsi", XSI),
];

/// Retourne l'URI enregistrée pour un alias
pub fn namespace_uri(alias: &str) -> Result<&'static str> {
    NAMESPACES
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, uri)| *uri)
        .ok_or_else(|| Error::UnknownNamespaceAlias(alias.to_string()))
}

/// Retourne l'alias enregistré pour une URI
pub fn alias_for_uri(uri: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, u)| *u == uri)
        .map(|(alias, _)| *alias)
}

/// Développe `alias:local` en `{uri}local`.
///
/// Un nom sans `:` est retourné tel quel.
///
/// ```
/// use pmodidl::namespaces::expand;
///
/// assert_eq!(
///     expand("didl_lite:item").unwrap(),
///     "{urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/}item"
/// );
/// ```
pub fn expand(name: &str) -> Result<String> {
    match name.split_once(':') {
        None => Ok(name.to_string()),
        Some((alias, local)) => Ok(format!("{{{}}}{}", namespace_uri(alias)?, local)),
    }
}

/// Sépare `{uri}local` en `(Some(uri), local)`; `(None, name)` sans namespace.
pub fn contract(name: &str) -> (Option<&str>, &str) {
    if let Some(rest) = name.strip_prefix('{') {
        if let Some((uri, local)) = rest.split_once('}') {
            return (Some(uri), local);
        }
    }
    (None, name)
}

/// Nom qualifié `{uri}local` d'un élément parsé
pub(crate) fn qualified_name(element: &xmltree::Element) -> String {
    match element.namespace.as_deref() {
        Some(uri) if !uri.is_empty() => format!("{{{}}}{}", uri, element.name),
        _ => element.name.clone(),
    }
}
