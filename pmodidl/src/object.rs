//! Objets DIDL-Lite (items et containers)
//!
//! Un [`DidlObject`] porte son kind, ses valeurs de propriétés indexées par
//! clé canonique, ses ressources, ses descripteurs et, pour les containers,
//! ses enfants. Les noms de propriétés sont acceptés en camelCase comme en
//! snake_case (voir [`crate::naming::normalize`]).

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Serialize, Serializer};

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::kinds::Kind;
use crate::naming::normalize;
use crate::resource::Resource;

/// Propriété non déclarée par le schéma, capturée en parsing lenient.
///
/// `element` seul: texte d'un élément enfant; `attribute` seul: attribut de
/// l'élément de l'objet; les deux: attribut d'un élément enfant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraProperty {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub value: String,
}

/// Objet DIDL-Lite typé
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DidlObject {
    #[serde(serialize_with = "serialize_kind")]
    kind: &'static Kind,
    values: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extras: Vec<ExtraProperty>,
    resources: Vec<Resource>,
    descriptors: Vec<Descriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DidlObject>,
}

fn serialize_kind<S: Serializer>(kind: &&'static Kind, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.name)
}

impl DidlObject {
    /// Constructeur programmatique (toujours strict)
    pub fn builder(kind: &'static Kind) -> DidlObjectBuilder {
        DidlObjectBuilder::new(kind)
    }

    pub(crate) fn empty(kind: &'static Kind) -> Self {
        let mut values = BTreeMap::new();
        values.insert("class".to_string(), kind.upnp_class.to_string());
        Self {
            kind,
            values,
            extras: Vec::new(),
            resources: Vec::new(),
            descriptors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static Kind {
        self.kind
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_item(&self) -> bool {
        self.kind.is_item()
    }

    // ============= Propriétés =============

    /// Lit une propriété déclarée ou capturée.
    ///
    /// `Ok(None)` pour une propriété déclarée mais non renseignée;
    /// [`Error::UnknownProperty`] pour un nom inconnu du kind.
    pub fn get(&self, name: &str) -> Result<Option<&str>> {
        let key = normalize(name);
        if self.kind.property(&key).is_some() {
            return Ok(self.values.get(&key).map(String::as_str));
        }
        self.extra(&key)
            .map(|extra| Some(extra.value.as_str()))
            .ok_or_else(|| self.unknown(name))
    }

    /// Lecture infaillible: `None` si absente ou inconnue
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).ok().flatten()
    }

    /// Écrit une propriété déclarée ou capturée
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let key = normalize(name);
        if self.kind.property(&key).is_some() {
            self.values.insert(key, value.into());
            return Ok(());
        }
        match self.extras.iter_mut().find(|extra| extra.key == key) {
            Some(extra) => {
                extra.value = value.into();
                Ok(())
            }
            None => Err(self.unknown(name)),
        }
    }

    /// Efface une propriété et retourne l'ancienne valeur
    pub fn unset(&mut self, name: &str) -> Result<Option<String>> {
        let key = normalize(name);
        if self.kind.property(&key).is_some() {
            return Ok(self.values.remove(&key));
        }
        match self.extras.iter().position(|extra| extra.key == key) {
            Some(index) => Ok(Some(self.extras.remove(index).value)),
            None => Err(self.unknown(name)),
        }
    }

    /// True si le nom désigne une propriété déclarée ou capturée
    pub fn has_property(&self, name: &str) -> bool {
        let key = normalize(name);
        self.kind.property(&key).is_some() || self.extra(&key).is_some()
    }

    /// Propriétés renseignées: ordre du schéma puis propriétés capturées
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        let declared = self
            .kind
            .scalar_properties()
            .filter_map(|p| self.values.get(&p.key).map(|v| (p.key.as_str(), v.as_str())));
        let extras = self
            .extras
            .iter()
            .map(|extra| (extra.key.as_str(), extra.value.as_str()));
        declared.chain(extras)
    }

    pub fn extras(&self) -> &[ExtraProperty] {
        &self.extras
    }

    pub(crate) fn push_extra(&mut self, extra: ExtraProperty) {
        if self.kind.property(&extra.key).is_none() && self.extra(&extra.key).is_none() {
            self.extras.push(extra);
        }
    }

    /// Propriétés obligatoires non renseignées
    pub fn missing_required(&self) -> impl Iterator<Item = &'static str> {
        self.kind
            .required_properties()
            .filter(|p| !self.values.contains_key(&p.key))
            .map(|p| p.def.location.trim_start_matches('@'))
    }

    pub(crate) fn check_required(&self) -> Result<()> {
        match self.missing_required().next() {
            Some(property) => Err(Error::MissingRequiredProperty {
                kind: self.kind.name.to_string(),
                property: property.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn extra(&self, key: &str) -> Option<&ExtraProperty> {
        self.extras.iter().find(|extra| extra.key == key)
    }

    fn unknown(&self, name: &str) -> Error {
        Error::UnknownProperty {
            kind: self.kind.name.to_string(),
            property: name.to_string(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.value("id")
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.value("parent_id")
    }

    pub fn title(&self) -> Option<&str> {
        self.value("title")
    }

    pub fn restricted(&self) -> Option<&str> {
        self.value("restricted")
    }

    /// Classe portée par l'objet (celle du document source si parsé)
    pub fn upnp_class(&self) -> &str {
        self.value("class").unwrap_or(self.kind.upnp_class)
    }

    // ============= Ressources et descripteurs =============

    pub fn resources(&self) -> &Vec<Resource> {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Vec<Resource> {
        &mut self.resources
    }

    /// Alias de [`DidlObject::resources`] (nom de l'élément XML)
    pub fn res(&self) -> &Vec<Resource> {
        self.resources()
    }

    /// Alias de [`DidlObject::resources_mut`]
    pub fn res_mut(&mut self) -> &mut Vec<Resource> {
        self.resources_mut()
    }

    pub fn descriptors(&self) -> &Vec<Descriptor> {
        &self.descriptors
    }

    pub fn descriptors_mut(&mut self) -> &mut Vec<Descriptor> {
        &mut self.descriptors
    }

    /// Première ressource disponible
    pub fn primary_resource(&self) -> Option<&Resource> {
        self.resources.first()
    }

    /// Ressources audio uniquement
    pub fn audio_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_audio())
    }

    // ============= Séquence d'enfants (containers) =============

    pub fn children(&self) -> &[DidlObject] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<DidlObject> {
        &mut self.children
    }

    /// Ajoute un enfant; refusé pour un item
    pub fn push(&mut self, child: DidlObject) -> Result<()> {
        if !self.is_container() {
            return Err(Error::NotAContainer(self.kind.name.to_string()));
        }
        self.children.push(child);
        Ok(())
    }

    pub fn child(&self, index: usize) -> Option<&DidlObject> {
        self.children.get(index)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DidlObject> {
        self.children.iter()
    }

    /// Parcours en profondeur des descendants, dans l'ordre du document
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }
}

impl Index<usize> for DidlObject {
    type Output = DidlObject;

    fn index(&self, index: usize) -> &Self::Output {
        &self.children[index]
    }
}

impl<'a> IntoIterator for &'a DidlObject {
    type Item = &'a DidlObject;
    type IntoIter = std::slice::Iter<'a, DidlObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

// ============= Itérateur =============

/// Parcours préfixe d'un arbre d'objets
pub struct Descendants<'a> {
    stack: Vec<&'a DidlObject>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(roots: &'a [DidlObject]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DidlObject;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop().map(|object| {
            // enfants empilés à l'envers pour conserver l'ordre du document
            self.stack.extend(object.children.iter().rev());
            object
        })
    }
}

// ============= Builder =============

/// Construction programmatique d'un [`DidlObject`].
///
/// ```
/// use pmodidl::{kinds, DidlObject, Resource};
///
/// let track = DidlObject::builder(&kinds::MUSIC_TRACK)
///     .id("1")
///     .parent_id("0")
///     .restricted("1")
///     .title("Song")
///     .property("originalTrackNumber", "3")
///     .resource(Resource::new("http://host/song.flac", "http-get:*:audio/flac:*"))
///     .build()
///     .unwrap();
///
/// assert_eq!(track.get("original_track_number").unwrap(), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct DidlObjectBuilder {
    kind: &'static Kind,
    values: Vec<(String, String)>,
    resources: Vec<Resource>,
    descriptors: Vec<Descriptor>,
    children: Vec<DidlObject>,
}

impl DidlObjectBuilder {
    pub fn new(kind: &'static Kind) -> Self {
        Self {
            kind,
            values: Vec::new(),
            resources: Vec::new(),
            descriptors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.property("id", id)
    }

    pub fn parent_id(self, parent_id: impl Into<String>) -> Self {
        self.property("parent_id", parent_id)
    }

    pub fn restricted(self, restricted: impl Into<String>) -> Self {
        self.property("restricted", restricted)
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.property("title", title)
    }

    /// Propriété par nom (camelCase ou snake_case), vérifiée à `build`
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn child(mut self, child: DidlObject) -> Self {
        self.children.push(child);
        self
    }

    /// Valide les noms et les propriétés obligatoires
    pub fn build(self) -> Result<DidlObject> {
        let mut object = DidlObject::empty(self.kind);
        for (name, value) in self.values {
            object.set(&name, value)?;
        }
        object.check_required()?;

        object.resources = self.resources;
        object.descriptors = self.descriptors;
        for child in self.children {
            object.push(child)?;
        }
        Ok(object)
    }
}

// ============= Entrées de document =============

/// Entrée de premier niveau d'un document: objet ou descripteur racine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DidlEntry {
    Object(DidlObject),
    Descriptor(Descriptor),
}

impl DidlEntry {
    pub fn as_object(&self) -> Option<&DidlObject> {
        match self {
            DidlEntry::Object(object) => Some(object),
            DidlEntry::Descriptor(_) => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&Descriptor> {
        match self {
            DidlEntry::Descriptor(descriptor) => Some(descriptor),
            DidlEntry::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<DidlObject> {
        match self {
            DidlEntry::Object(object) => Some(object),
            DidlEntry::Descriptor(_) => None,
        }
    }
}

impl From<DidlObject> for DidlEntry {
    fn from(object: DidlObject) -> Self {
        DidlEntry::Object(object)
    }
}

impl From<Descriptor> for DidlEntry {
    fn from(descriptor: Descriptor) -> Self {
        DidlEntry::Descriptor(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{ALBUM, AUDIO_ITEM, ITEM, MUSIC_TRACK, STORAGE_FOLDER, VIDEO_ITEM};

    fn audio_item() -> DidlObject {
        DidlObject::builder(&AUDIO_ITEM)
            .id("0")
            .parent_id("0")
            .restricted("1")
            .title("Audio Item Title")
            .property("language", "English")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_sets_class_from_kind() {
        let item = audio_item();
        assert_eq!(item.upnp_class(), "object.item.audioItem");
        assert_eq!(item.get("upnp_class").unwrap(), Some("object.item.audioItem"));
        assert_eq!(item.get("class").unwrap(), Some("object.item.audioItem"));
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let err = DidlObject::builder(&ITEM)
            .id("0")
            .parent_id("0")
            .restricted("1")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredProperty { ref property, .. } if property == "title"
        ));
    }

    #[test]
    fn test_kind_specific_required_property() {
        let err = DidlObject::builder(&STORAGE_FOLDER)
            .id("0")
            .parent_id("-1")
            .restricted("1")
            .title("Music")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredProperty { ref property, .. } if property == "storageUsed"
        ));
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let err = DidlObject::builder(&AUDIO_ITEM)
            .id("0")
            .parent_id("0")
            .restricted("1")
            .title("T")
            .property("storageTotal", "100")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { .. }));
    }

    #[test]
    fn test_both_spellings_share_one_slot() {
        let mut item = audio_item();
        item.set("longDescription", "camel").unwrap();
        assert_eq!(item.get("long_description").unwrap(), Some("camel"));
        item.set("long_description", "snake").unwrap();
        assert_eq!(item.get("longDescription").unwrap(), Some("snake"));
        assert_eq!(item.get("parentID").unwrap(), item.get("parent_id").unwrap());
    }

    #[test]
    fn test_declared_but_unset_reads_none() {
        let item = DidlObject::builder(&VIDEO_ITEM)
            .id("0")
            .parent_id("0")
            .restricted("1")
            .title("Video Item Title")
            .build()
            .unwrap();
        assert_eq!(item.get("genre_type").unwrap(), None);
        assert!(item.has_property("genreType"));
        assert!(item.get("albumArtURI").is_err());
    }

    #[test]
    fn test_unset() {
        let mut item = audio_item();
        assert_eq!(item.unset("language").unwrap().as_deref(), Some("English"));
        assert_eq!(item.get("language").unwrap(), None);
        assert!(item.unset("nope").is_err());
    }

    #[test]
    fn test_extra_properties_are_addressable() {
        let mut item = audio_item();
        item.push_extra(ExtraProperty {
            key: "album_art_uri".to_string(),
            element: Some("albumArtURI".to_string()),
            attribute: None,
            value: "http://x/cover.jpg".to_string(),
        });
        assert_eq!(item.get("albumArtURI").unwrap(), Some("http://x/cover.jpg"));
        item.set("album_art_uri", "http://y/cover.jpg").unwrap();
        assert_eq!(item.value("albumArtURI"), Some("http://y/cover.jpg"));
        assert_eq!(item.properties().last(), Some(("album_art_uri", "http://y/cover.jpg")));
    }

    #[test]
    fn test_res_alias_shares_state() {
        let mut item = audio_item();
        item.res_mut().push(Resource::new("url", "protocol_info"));
        assert_eq!(item.resources().len(), 1);
        item.resources_mut().push(Resource::new("url2", "protocol_info"));
        assert_eq!(item.res().len(), 2);
        assert!(std::ptr::eq(item.res(), item.resources()));
    }

    #[test]
    fn test_container_sequence() {
        let mut album = DidlObject::builder(&ALBUM)
            .id("1")
            .parent_id("0")
            .restricted("1")
            .title("Album")
            .child(audio_item())
            .build()
            .unwrap();
        album.push(audio_item()).unwrap();
        assert_eq!(album.len(), 2);
        assert_eq!(album[0].title(), Some("Audio Item Title"));
        assert_eq!((&album).into_iter().count(), 2);
        assert_eq!(album.descendants().count(), 2);
    }

    #[test]
    fn test_item_cannot_hold_children() {
        let mut item = audio_item();
        assert!(matches!(item.push(audio_item()), Err(Error::NotAContainer(_))));

        let err = DidlObject::builder(&MUSIC_TRACK)
            .id("1")
            .parent_id("0")
            .restricted("1")
            .title("T")
            .child(audio_item())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::NotAContainer(_)));
    }

    #[test]
    fn test_properties_in_schema_order() {
        let item = audio_item();
        let keys: Vec<&str> = item.properties().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "parent_id", "restricted", "title", "class", "language"]);
    }
}
