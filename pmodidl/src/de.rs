//! Désérialisation DIDL-Lite → objets
//!
//! Un seul algorithme générique piloté par le schéma du kind résolu:
//! extraction des propriétés selon leur emplacement, ressources,
//! descripteurs, puis récursion pour les containers.

use tracing::{debug, warn};
use xmltree::{Element, XMLNode};

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::kinds::{self, Kind};
use crate::namespaces::{DIDL_LITE, DIDL_LITE_ALIAS, alias_for_uri, contract, expand, qualified_name};
use crate::naming::to_snake_case;
use crate::object::{DidlEntry, DidlObject, ExtraProperty};
use crate::options::ParseMode;
use crate::resource::Resource;
use crate::schema::Location;

/// Parse un document DIDL-Lite complet.
///
/// Retourne les objets de premier niveau (ordre du document) suivis des
/// descripteurs racine (ordre du document).
pub fn parse_document(xml: &[u8], mode: ParseMode) -> Result<Vec<DidlEntry>> {
    let root = Element::parse(xml)?;
    if root.name != "DIDL-Lite" {
        debug!(root = root.name.as_str(), "Unexpected DIDL-Lite root element");
    }

    let objects = objects_from_element(&root, mode)?;
    let descriptors = descriptors_from_element(&root, mode)?;

    debug!(
        objects = objects.len(),
        descriptors = descriptors.len(),
        %mode,
        "Parsed DIDL-Lite document"
    );

    Ok(objects
        .into_iter()
        .map(DidlEntry::Object)
        .chain(descriptors.into_iter().map(DidlEntry::Descriptor))
        .collect())
}

/// Parse une chaîne DIDL-Lite
pub fn parse_str(xml: &str, mode: ParseMode) -> Result<Vec<DidlEntry>> {
    parse_document(xml.as_bytes(), mode)
}

// ============= Helpers de navigation =============

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

/// Éléments structurels DIDL-Lite, jamais porteurs d'une propriété
const STRUCTURAL_TAGS: &[&str] = &["res", "desc", "item", "container"];

/// Élément du vocabulaire DIDL-Lite (namespace par défaut ou absent)
fn is_didl(element: &Element, local: &str) -> bool {
    element.name == local
        && element
            .namespace
            .as_deref()
            .is_none_or(|ns| ns.is_empty() || ns == DIDL_LITE)
}

/// Teste si `element` correspond à `alias:local`.
///
/// En mode lenient, un élément sans namespace ou dans le namespace
/// DIDL-Lite est accepté (serveurs qui omettent les préfixes `dc:`/`upnp:`),
/// sauf les éléments structurels (`upnp:res@protection` n'est pas `<res>`).
fn matches_property(element: &Element, alias: &str, local: &str, mode: ParseMode) -> Result<bool> {
    if qualified_name(element) == expand(&format!("{}:{}", alias, local))? {
        return Ok(true);
    }
    Ok(mode.is_lenient() && !STRUCTURAL_TAGS.contains(&local) && is_didl(element, local))
}

fn find_property_child<'a>(
    element: &'a Element,
    alias: &str,
    local: &str,
    mode: ParseMode,
) -> Result<Option<&'a Element>> {
    for child in child_elements(element) {
        if matches_property(child, alias, local, mode)? {
            return Ok(Some(child));
        }
    }
    Ok(None)
}

fn text_of(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

// ============= Objets =============

/// Objets `item`/`container` enfants directs de `element`
pub(crate) fn objects_from_element(element: &Element, mode: ParseMode) -> Result<Vec<DidlObject>> {
    let mut objects = Vec::new();
    let mut previous: Option<&Element> = None;

    for child in child_elements(element) {
        if is_didl(child, "item") || is_didl(child, "container") {
            match object_from_element(child, previous, mode) {
                Ok(object) => objects.push(object),
                Err(err) if mode.is_lenient() && err.is_recoverable() => {
                    warn!(
                        tag = child.name.as_str(),
                        id = child.attributes.get("id").map(String::as_str),
                        error = %err,
                        "Skipping invalid DIDL-Lite entry"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        previous = Some(child);
    }

    Ok(objects)
}

/// Valeur de `upnp:class`: enfant de l'élément, ou en mode lenient
/// l'élément frère qui le précède immédiatement (défaut de certains firmwares)
fn find_class(element: &Element, previous: Option<&Element>, mode: ParseMode) -> Result<Option<String>> {
    if let Some(class_el) = find_property_child(element, "upnp", "class", mode)? {
        let class = text_of(class_el).trim().to_string();
        if !class.is_empty() {
            return Ok(Some(class));
        }
    }

    if mode.is_lenient() {
        if let Some(sibling) = previous {
            if matches_property(sibling, "upnp", "class", mode)? {
                let class = text_of(sibling).trim().to_string();
                if !class.is_empty() {
                    debug!(class = class.as_str(), "Using upnp:class found as preceding sibling");
                    return Ok(Some(class));
                }
            }
        }
    }

    Ok(None)
}

fn object_from_element(
    element: &Element,
    previous: Option<&Element>,
    mode: ParseMode,
) -> Result<DidlObject> {
    let class = find_class(element, previous, mode)?.ok_or_else(|| Error::MissingClass {
        tag: element.name.clone(),
        id: element.attributes.get("id").cloned(),
    })?;
    let kind = kinds::resolve_with_hint(&class, mode, Some(element.name.as_str()))?;

    let mut object = DidlObject::empty(kind);
    extract_properties(&mut object, kind, element, mode)?;
    // la classe du document est conservée (extensions constructeur incluses)
    object.set("class", class)?;

    let extras = unmapped_nodes(kind, element, mode)?;
    if mode.is_strict() {
        object.check_required()?;
        for extra in &extras {
            debug!(
                tag = extra.element.as_deref().unwrap_or(element.name.as_str()),
                attribute = extra.attribute.as_deref(),
                id = object.id(),
                "Ignoring unmapped DIDL-Lite node"
            );
        }
    } else {
        for property in object.missing_required() {
            debug!(
                kind = kind.name,
                property,
                id = object.id(),
                "Missing required property tolerated"
            );
        }
        for extra in extras {
            object.push_extra(extra);
        }
    }

    for res in child_elements(element).filter(|c| is_didl(c, "res")) {
        let resource = Resource::from_element(res, mode)?;
        object.resources_mut().push(resource);
    }

    let descriptors = descriptors_from_element(element, mode)?;
    object.descriptors_mut().extend(descriptors);

    if kind.is_container() {
        let children = objects_from_element(element, mode)?;
        object.children_mut().extend(children);
    }

    Ok(object)
}

fn extract_properties(
    object: &mut DidlObject,
    kind: &'static Kind,
    element: &Element,
    mode: ParseMode,
) -> Result<()> {
    for property in kind.scalar_properties() {
        let alias = property.namespace();
        let value = match property.location() {
            Location::Attribute(attribute) => element.attributes.get(attribute).cloned(),
            Location::Element(name) => {
                find_property_child(element, alias, name, mode)?.map(text_of)
            }
            Location::ElementAttribute(name, attribute) => {
                find_property_child(element, alias, name, mode)?
                    .and_then(|child| child.attributes.get(attribute).cloned())
            }
        };

        if let Some(value) = value {
            object.set(&property.key, value)?;
        }
    }
    Ok(())
}

/// Attributs et éléments non décrits par le schéma.
///
/// Un élément dont la clé snake_case désigne une propriété déclarée dans un
/// autre namespace (`dc:artist` face à `upnp:artist`) garde son préfixe:
/// clé `dc_artist`, élément `dc:artist`.
fn unmapped_nodes(kind: &'static Kind, element: &Element, mode: ParseMode) -> Result<Vec<ExtraProperty>> {
    let mut extras = Vec::new();

    for (attribute, value) in &element.attributes {
        let key = to_snake_case(attribute);
        if kind.property(&key).is_none() {
            extras.push(ExtraProperty {
                key,
                element: None,
                attribute: Some(attribute.clone()),
                value: value.clone(),
            });
        }
    }

    for child in child_elements(element) {
        if STRUCTURAL_TAGS.iter().any(|tag| is_didl(child, tag)) {
            continue;
        }

        let qualified = qualified_name(child);
        let (uri, local) = contract(&qualified);
        let mut element_key = to_snake_case(local);
        let mut element_name = local.to_string();
        let mapped = mapped_element(kind, child)?;

        if !mapped && kind.property(&element_key).is_some() {
            let alias = uri
                .and_then(alias_for_uri)
                .filter(|alias| *alias != DIDL_LITE_ALIAS);
            if mode.is_lenient() {
                warn!(
                    kind = kind.name,
                    element = local,
                    namespace = uri,
                    "Element in unexpected namespace kept as extra property"
                );
            }
            element_key = format!("{}_{}", alias.unwrap_or("ext"), element_key);
            if let Some(alias) = alias {
                element_name = format!("{}:{}", alias, local);
            }
        }

        if !mapped {
            extras.push(ExtraProperty {
                key: element_key.clone(),
                element: Some(element_name.clone()),
                attribute: None,
                value: text_of(child),
            });
        }

        for (attribute, value) in &child.attributes {
            let key = format!("{}_{}", element_key, to_snake_case(attribute));
            if kind.property(&key).is_none() {
                extras.push(ExtraProperty {
                    key,
                    element: Some(element_name.clone()),
                    attribute: Some(attribute.clone()),
                    value: value.clone(),
                });
            }
        }
    }
    Ok(extras)
}

/// True si un élément enfant porte une propriété du schéma
fn mapped_element(kind: &'static Kind, child: &Element) -> Result<bool> {
    for property in kind.scalar_properties() {
        let name = match property.location() {
            Location::Element(name) | Location::ElementAttribute(name, _) => name,
            Location::Attribute(_) => continue,
        };
        if matches_property(child, property.namespace(), name, ParseMode::Lenient)? {
            return Ok(true);
        }
    }
    Ok(false)
}

// ============= Descripteurs =============

pub(crate) fn descriptors_from_element(element: &Element, mode: ParseMode) -> Result<Vec<Descriptor>> {
    let mut descriptors = Vec::new();
    for desc in child_elements(element).filter(|c| is_didl(c, "desc")) {
        match Descriptor::from_element(desc) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(err) if mode.is_lenient() => {
                warn!(error = %err, "Skipping invalid desc element");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;

    /// Champs `tag` des événements émis
    #[derive(Clone, Default)]
    struct TagRecorder(Arc<Mutex<Vec<String>>>);

    struct TagVisitor(Option<String>);

    impl Visit for TagVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "tag" {
                self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for TagRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = TagVisitor(None);
            event.record(&mut visitor);
            if let Some(tag) = visitor.0 {
                self.0.lock().unwrap().push(tag);
            }
        }
    }

    const HEADER: &str = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
           xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"
           xmlns:dc="http://purl.org/dc/elements/1.1/"
           xmlns:sec="http://www.sec.co.kr/">"#;

    fn doc(body: &str) -> String {
        format!("{}{}</DIDL-Lite>", HEADER, body)
    }

    fn objects(body: &str, mode: ParseMode) -> Vec<DidlObject> {
        parse_str(&doc(body), mode)
            .unwrap()
            .into_iter()
            .filter_map(DidlEntry::into_object)
            .collect()
    }

    #[test]
    fn test_property_attribute_from_xml() {
        let items = objects(
            r#"<item id="0" parentID="0" restricted="1">
                <dc:title>Video Item Title</dc:title>
                <upnp:class>object.item.videoItem</upnp:class>
                <upnp:genre id="genreId">Action</upnp:genre>
            </item>"#,
            ParseMode::Strict,
        );
        assert_eq!(items[0].get("genre").unwrap(), Some("Action"));
        assert_eq!(items[0].get("genre_id").unwrap(), Some("genreId"));
        assert_eq!(items[0].get("genre@type").unwrap(), None);
    }

    #[test]
    fn test_empty_element_reads_empty_string() {
        let items = objects(
            r#"<item id="0" parentID="0" restricted="1">
                <dc:title></dc:title>
                <upnp:class>object.item</upnp:class>
            </item>"#,
            ParseMode::Strict,
        );
        assert_eq!(items[0].title(), Some(""));
    }

    #[test]
    fn test_wrong_namespace_is_not_mapped_in_strict_mode() {
        let body = r#"<item id="0" parentID="0" restricted="1">
                <title>T</title>
                <upnp:class>object.item</upnp:class>
            </item>"#;
        assert!(matches!(
            parse_str(&doc(body), ParseMode::Strict),
            Err(Error::MissingRequiredProperty { .. })
        ));
        let items = objects(body, ParseMode::Lenient);
        assert_eq!(items[0].title(), Some("T"));
    }

    #[test]
    fn test_sibling_class_in_lenient_mode() {
        let body = r#"<upnp:class>object.item.audioItem.musicTrack</upnp:class>
            <item id="1" parentID="0" restricted="1">
                <dc:title>Track</dc:title>
            </item>"#;
        assert!(matches!(
            parse_str(&doc(body), ParseMode::Strict),
            Err(Error::MissingClass { .. })
        ));
        let items = objects(body, ParseMode::Lenient);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind(), &kinds::MUSIC_TRACK);
        assert_eq!(items[0].upnp_class(), "object.item.audioItem.musicTrack");
    }

    #[test]
    fn test_missing_class_is_skipped_in_lenient_mode() {
        let body = r#"<item id="1" parentID="0" restricted="1"><dc:title>A</dc:title></item>
            <item id="2" parentID="0" restricted="1">
                <dc:title>B</dc:title>
                <upnp:class>object.item</upnp:class>
            </item>"#;
        let items = objects(body, ParseMode::Lenient);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), Some("2"));
    }

    #[test]
    fn test_vendor_class_keeps_source_value() {
        let items = objects(
            r#"<item id="1" parentID="0" restricted="1">
                <dc:title>T</dc:title>
                <upnp:class>object.item.audioItem.musicTrack.vendorExt</upnp:class>
            </item>"#,
            ParseMode::Lenient,
        );
        assert_eq!(items[0].kind(), &kinds::MUSIC_TRACK);
        assert_eq!(items[0].upnp_class(), "object.item.audioItem.musicTrack.vendorExt");
    }

    #[test]
    fn test_extras_captured_only_in_lenient_mode() {
        let body = r#"<item id="1" parentID="0" restricted="1" vendor="x">
                <dc:title>T</dc:title>
                <upnp:class>object.item.videoItem</upnp:class>
                <upnp:albumArtURI profile="JPEG_TN">http://x/cover.jpg</upnp:albumArtURI>
                <upnp:genre extended="a,b">Drama</upnp:genre>
            </item>"#;

        let strict = objects(body, ParseMode::Strict);
        assert!(strict[0].extras().is_empty());
        assert!(strict[0].get("album_art_uri").is_err());

        let lenient = objects(body, ParseMode::Lenient);
        let item = &lenient[0];
        assert_eq!(item.get("albumArtURI").unwrap(), Some("http://x/cover.jpg"));
        assert_eq!(item.get("album_art_uri_profile").unwrap(), Some("JPEG_TN"));
        assert_eq!(item.get("genre_extended").unwrap(), Some("a,b"));
        assert_eq!(item.get("vendor").unwrap(), Some("x"));
        assert_eq!(item.get("genre").unwrap(), Some("Drama"));
    }

    #[test]
    fn test_malformed_document_is_always_fatal() {
        for mode in [ParseMode::Strict, ParseMode::Lenient] {
            assert!(matches!(
                parse_str("<DIDL-Lite><item>", mode),
                Err(Error::MalformedDocument(_))
            ));
        }
    }

    #[test]
    fn test_invalid_descriptor() {
        let body = r#"<desc nameSpace="ns">no id</desc><desc id="2" nameSpace="ns"/>"#;
        assert!(parse_str(&doc(body), ParseMode::Strict).is_err());
        let entries = parse_str(&doc(body), ParseMode::Lenient).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].as_descriptor().unwrap().id, "2");
    }

    #[test]
    fn test_strict_mode_logs_ignored_nodes() {
        let body = r#"<item id="1" parentID="0" restricted="1" vendor="x">
                <dc:title>T</dc:title>
                <upnp:class>object.item.audioItem.musicTrack</upnp:class>
                <upnp:albumArtURI>http://x/cover.jpg</upnp:albumArtURI>
            </item>"#;

        let recorder = TagRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        let items = tracing::subscriber::with_default(subscriber, || objects(body, ParseMode::Strict));

        assert!(items[0].extras().is_empty());
        let tags = recorder.0.lock().unwrap();
        assert!(tags.iter().any(|tag| tag == "albumArtURI"));
        assert!(tags.iter().any(|tag| tag == "item"));
    }

    #[test]
    fn test_structural_res_is_not_a_property() {
        let body = r#"<item id="1" parentID="0" restricted="1">
                <dc:title>Book</dc:title>
                <upnp:class>object.item.textItem</upnp:class>
                <res protocolInfo="p" protection="drm">u</res>
            </item>"#;
        let items = objects(body, ParseMode::Lenient);
        assert_eq!(items[0].get("res_protection").unwrap(), None);
        assert_eq!(items[0].resources().len(), 1);
    }
}
