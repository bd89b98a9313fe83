//! Sérialisation objets → DIDL-Lite
//!
//! Parcours du schéma du kind dans l'ordre déclaré, sans validation:
//! un objet est émis tel qu'il est. Les préfixes utilisés sont collectés
//! pendant le parcours et déclarés une seule fois sur la racine.

use std::collections::BTreeSet;

use xmltree::{Element, XMLNode};

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::namespaces::{DIDL_LITE, DIDL_LITE_ALIAS, NAMESPACES, namespace_uri};
use crate::object::DidlObject;
use crate::options::EmitOptions;
use crate::schema::Location;

/// Préfixes rencontrés pendant l'émission
#[derive(Debug, Default)]
struct UsedAliases(BTreeSet<&'static str>);

impl UsedAliases {
    /// Nom d'élément préfixé (`dc:title`), sans préfixe pour DIDL-Lite
    fn element_name(&mut self, alias: &'static str, local: &str) -> String {
        if alias == DIDL_LITE_ALIAS {
            local.to_string()
        } else {
            self.0.insert(alias);
            format!("{}:{}", alias, local)
        }
    }

    /// Nom d'un élément capturé, tel quel; son préfixe éventuel est déclaré
    fn extra_name(&mut self, name: &str) -> String {
        if let Some((prefix, _)) = name.split_once(':') {
            if let Some((alias, _)) = NAMESPACES.iter().find(|(alias, _)| *alias == prefix) {
                self.0.insert(alias);
            }
        }
        name.to_string()
    }
}

/// Élément `item`/`container` d'un objet, enfants compris
pub fn to_xml_element(object: &DidlObject) -> Element {
    object_element(object, &mut UsedAliases::default())
}

/// Élément enfant `name`, créé vide s'il n'a pas encore été émis
fn child_entry<'a>(element: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    if element.get_child(name).is_none() {
        element.children.push(XMLNode::Element(Element::new(name)));
    }
    element.get_mut_child(name)
}

fn object_element(object: &DidlObject, used: &mut UsedAliases) -> Element {
    let kind = object.kind();
    let mut element = Element::new(kind.tag.unwrap_or("item"));

    for property in kind.scalar_properties() {
        let Some(value) = object.value(&property.key) else {
            continue;
        };
        match property.location() {
            Location::Attribute(attribute) => {
                element
                    .attributes
                    .insert(attribute.to_string(), value.to_string());
            }
            Location::Element(local) => {
                let name = used.element_name(property.namespace(), local);
                // un `el@attr` déjà émis a pu créer l'élément sans texte
                if let Some(child) = child_entry(&mut element, &name) {
                    child.children.push(XMLNode::Text(value.to_string()));
                }
            }
            Location::ElementAttribute(local, attribute) => {
                let name = used.element_name(property.namespace(), local);
                if let Some(child) = child_entry(&mut element, &name) {
                    child
                        .attributes
                        .insert(attribute.to_string(), value.to_string());
                }
            }
        }
    }

    for extra in object.extras() {
        match (&extra.element, &extra.attribute) {
            (None, Some(attribute)) => {
                element
                    .attributes
                    .insert(attribute.clone(), extra.value.clone());
            }
            (Some(local), None) => {
                let mut child = Element::new(&used.extra_name(local));
                child.children.push(XMLNode::Text(extra.value.clone()));
                element.children.push(XMLNode::Element(child));
            }
            (Some(local), Some(attribute)) => {
                // rattaché à l'élément mappé de même nom local s'il existe
                let suffix = format!(":{}", local);
                let name = element
                    .children
                    .iter()
                    .filter_map(XMLNode::as_element)
                    .find(|c| c.name == *local || c.name.ends_with(&suffix))
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| used.extra_name(local));
                if let Some(child) = child_entry(&mut element, &name) {
                    child
                        .attributes
                        .insert(attribute.clone(), extra.value.clone());
                }
            }
            (None, None) => {}
        }
    }

    for resource in object.resources() {
        element.children.push(XMLNode::Element(resource.to_element()));
    }

    for descriptor in object.descriptors() {
        element
            .children
            .push(XMLNode::Element(descriptor.to_element()));
    }

    for child in object.children() {
        element
            .children
            .push(XMLNode::Element(object_element(child, used)));
    }

    element
}

/// Document complet: racine `DIDL-Lite`, objets puis descripteurs racine
pub fn to_xml_document(objects: &[DidlObject], descriptors: &[Descriptor]) -> Result<Element> {
    let mut used = UsedAliases::default();
    let mut root = Element::new("DIDL-Lite");

    let children: Vec<XMLNode> = objects
        .iter()
        .map(|object| XMLNode::Element(object_element(object, &mut used)))
        .chain(
            descriptors
                .iter()
                .map(|descriptor| XMLNode::Element(descriptor.to_element())),
        )
        .collect();

    root.attributes
        .insert("xmlns".to_string(), DIDL_LITE.to_string());
    for alias in &used.0 {
        root.attributes
            .insert(format!("xmlns:{}", alias), namespace_uri(alias)?.to_string());
    }
    root.children = children;

    Ok(root)
}

/// Émet un document DIDL-Lite
pub fn to_xml_bytes(
    objects: &[DidlObject],
    descriptors: &[Descriptor],
    options: &EmitOptions,
) -> Result<Vec<u8>> {
    let root = to_xml_document(objects, descriptors)?;
    let mut buf = Vec::new();
    root.write_with_config(&mut buf, options.emitter_config())?;
    Ok(buf)
}

/// Comme [`to_xml_bytes`], en chaîne UTF-8
pub fn to_xml_string(
    objects: &[DidlObject],
    descriptors: &[Descriptor],
    options: &EmitOptions,
) -> Result<String> {
    let bytes = to_xml_bytes(objects, descriptors, options)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
