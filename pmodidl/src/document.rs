//! Document DIDL-Lite complet

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::Serialize;

use crate::de;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::object::{Descendants, DidlEntry, DidlObject};
use crate::options::{EmitOptions, ParseMode};
use crate::ser;

// ============= Document =============

/// Racine d'un document DIDL-Lite: objets de premier niveau et
/// descripteurs racine, chacun dans l'ordre du document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DidlDocument {
    pub objects: Vec<DidlObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub descriptors: Vec<Descriptor>,
}

impl DidlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(xml: &[u8], mode: ParseMode) -> Result<Self> {
        Ok(Self::from_entries(de::parse_document(xml, mode)?))
    }

    pub fn parse_str(xml: &str, mode: ParseMode) -> Result<Self> {
        Self::parse(xml.as_bytes(), mode)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = DidlEntry>) -> Self {
        let mut document = Self::new();
        for entry in entries {
            document.push(entry);
        }
        document
    }

    /// Objets puis descripteurs racine
    pub fn into_entries(self) -> Vec<DidlEntry> {
        self.objects
            .into_iter()
            .map(DidlEntry::Object)
            .chain(self.descriptors.into_iter().map(DidlEntry::Descriptor))
            .collect()
    }

    pub fn push(&mut self, entry: impl Into<DidlEntry>) {
        match entry.into() {
            DidlEntry::Object(object) => self.objects.push(object),
            DidlEntry::Descriptor(descriptor) => self.descriptors.push(descriptor),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.descriptors.is_empty()
    }

    pub fn to_xml_bytes(&self, options: &EmitOptions) -> Result<Vec<u8>> {
        ser::to_xml_bytes(&self.objects, &self.descriptors, options)
    }

    pub fn to_xml_string(&self, options: &EmitOptions) -> Result<String> {
        ser::to_xml_string(&self.objects, &self.descriptors, options)
    }

    // ============= Parcours =============

    /// Tous les objets, parcours préfixe dans l'ordre du document
    pub fn all_objects(&self) -> Descendants<'_> {
        Descendants::new(&self.objects)
    }

    /// Itère sur tous les items de manière récursive
    pub fn all_items(&self) -> impl Iterator<Item = &DidlObject> {
        self.all_objects().filter(|o| o.is_item())
    }

    /// Itère sur tous les containers de manière récursive
    pub fn all_containers(&self) -> impl Iterator<Item = &DidlObject> {
        self.all_objects().filter(|o| o.is_container())
    }

    /// Trouve un objet par ID
    pub fn find_by_id(&self, id: &str) -> Option<&DidlObject> {
        self.all_objects().find(|o| o.id() == Some(id))
    }

    /// Filtre les items
    pub fn filter_items<F>(&self, predicate: F) -> impl Iterator<Item = &DidlObject>
    where
        F: Fn(&DidlObject) -> bool,
    {
        self.all_items().filter(move |i| predicate(i))
    }

    /// Filtre les containers
    pub fn filter_containers<F>(&self, predicate: F) -> impl Iterator<Item = &DidlObject>
    where
        F: Fn(&DidlObject) -> bool,
    {
        self.all_containers().filter(move |c| predicate(c))
    }

    // ============= Markdown =============

    /// Génère une représentation Markdown
    pub fn to_markdown(&self) -> String {
        let mut buf = String::new();
        // l'écriture dans une String n'échoue pas
        let _ = self.write_markdown(&mut buf);
        buf
    }

    pub fn write_markdown<W: Write>(&self, buf: &mut W) -> fmt::Result {
        buf.write_str("### DIDL-Lite Document\n\n")?;

        let (containers, items): (Vec<&DidlObject>, Vec<&DidlObject>) =
            self.objects.iter().partition(|o| o.is_container());

        if !containers.is_empty() {
            buf.write_str("#### Containers\n\n")?;
            for container in containers {
                write_object(buf, container, 0)?;
            }
        }

        if !items.is_empty() {
            buf.write_str("#### Items\n\n")?;
            for item in items {
                write_object(buf, item, 0)?;
            }
        }

        if !self.descriptors.is_empty() {
            buf.write_str("#### Descriptors\n\n")?;
            for desc in &self.descriptors {
                write_descriptor(buf, desc, "")?;
            }
        }

        Ok(())
    }
}

/// Parsing strict: `"<DIDL-Lite ...>".parse::<DidlDocument>()`
impl FromStr for DidlDocument {
    type Err = Error;

    fn from_str(xml: &str) -> Result<Self> {
        Self::parse_str(xml, ParseMode::Strict)
    }
}

/// Propriétés déjà affichées dans l'en-tête d'un objet
const HEADER_KEYS: &[&str] = &["id", "parent_id", "title", "class"];

fn write_object<W: Write>(buf: &mut W, object: &DidlObject, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let label = if object.is_container() { "Container" } else { "Item" };

    writeln!(buf, "{}- **{}**: {}", indent, label, object.title().unwrap_or(""))?;
    writeln!(buf, "{}  - ID: `{}`", indent, object.id().unwrap_or(""))?;
    writeln!(buf, "{}  - ParentID: `{}`", indent, object.parent_id().unwrap_or(""))?;
    writeln!(buf, "{}  - Class: `{}`", indent, object.upnp_class())?;

    for (key, value) in object.properties() {
        if HEADER_KEYS.contains(&key) {
            continue;
        }
        if key == "album_art_uri" {
            writeln!(buf, "{}  - Album Art: ![Cover]({})", indent, value)?;
        } else {
            writeln!(buf, "{}  - {}: {}", indent, key, value)?;
        }
    }

    if !object.resources().is_empty() {
        writeln!(buf, "{}  - Resources:", indent)?;
        for res in object.resources() {
            writeln!(buf, "{}    - URL: {}", indent, res.uri.as_deref().unwrap_or(""))?;
            for (name, value) in res.attributes() {
                writeln!(buf, "{}      - {}: `{}`", indent, name, value)?;
            }
        }
    }

    if !object.descriptors().is_empty() {
        writeln!(buf, "{}  - Descriptions:", indent)?;
        for desc in object.descriptors() {
            write_descriptor(buf, desc, &indent)?;
        }
    }

    if !object.is_empty() {
        writeln!(buf, "{}  - Children:", indent)?;
        for child in object {
            write_object(buf, child, depth + 2)?;
        }
    }

    buf.write_char('\n')
}

fn write_descriptor<W: Write>(buf: &mut W, desc: &Descriptor, indent: &str) -> fmt::Result {
    writeln!(buf, "{}    - Namespace: `{}` (id `{}`)", indent, desc.name_space, desc.id)?;
    if let Some(text) = &desc.text {
        writeln!(buf, "{}      - {}", indent, text.trim())?;
    }
    Ok(())
}
