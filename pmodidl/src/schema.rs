//! Définitions de propriétés et fusion par héritage
//!
//! Chaque kind déclare uniquement ses propres définitions; la liste
//! complète est obtenue en fusionnant la chaîne d'ancêtres depuis la
//! racine (voir [`merge`]).

use crate::naming::property_key;

/// Cardinalité d'une propriété
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
}

/// Emplacement XML d'une valeur de propriété
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// Texte d'un élément enfant (`title`)
    Element(&'a str),
    /// Attribut de l'élément de l'objet (`@id`)
    Attribute(&'a str),
    /// Attribut d'un élément enfant (`genre@id`)
    ElementAttribute(&'a str, &'a str),
}

impl<'a> Location<'a> {
    pub fn parse(location: &'a str) -> Self {
        match location.split_once('@') {
            None => Location::Element(location),
            Some(("", attribute)) => Location::Attribute(attribute),
            Some((element, attribute)) => Location::ElementAttribute(element, attribute),
        }
    }

    /// Élément enfant portant la valeur, s'il y en a un
    pub fn element(&self) -> Option<&'a str> {
        match *self {
            Location::Element(el) | Location::ElementAttribute(el, _) => Some(el),
            Location::Attribute(_) => None,
        }
    }
}

/// Définition déclarative d'une propriété: namespace, emplacement, cardinalité
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub namespace: &'static str,
    pub location: &'static str,
    pub cardinality: Cardinality,
}

impl PropertyDef {
    pub const fn required(namespace: &'static str, location: &'static str) -> Self {
        Self {
            namespace,
            location,
            cardinality: Cardinality::Required,
        }
    }

    pub const fn optional(namespace: &'static str, location: &'static str) -> Self {
        Self {
            namespace,
            location,
            cardinality: Cardinality::Optional,
        }
    }

    fn same_slot(&self, other: &PropertyDef) -> bool {
        self.namespace == other.namespace && self.location == other.location
    }
}

/// Définition fusionnée, avec sa clé canonique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub def: PropertyDef,
    pub key: String,
}

impl Property {
    fn new(def: PropertyDef) -> Self {
        Self {
            key: property_key(def.location),
            def,
        }
    }

    pub fn location(&self) -> Location<'static> {
        Location::parse(self.def.location)
    }

    pub fn namespace(&self) -> &'static str {
        self.def.namespace
    }

    pub fn is_required(&self) -> bool {
        self.def.cardinality == Cardinality::Required
    }

    /// `didl_lite:res` est une liste de ressources, pas une valeur scalaire
    pub fn is_scalar(&self) -> bool {
        !(self.def.namespace == crate::namespaces::DIDL_LITE_ALIAS && self.def.location == "res")
    }
}

/// Fusionne les définitions propres d'une chaîne d'ancêtres (racine d'abord).
///
/// Une redéclaration (même namespace et même emplacement) remplace
/// l'entrée héritée sur place: la position héritée est conservée, la
/// cardinalité du sous-type fait foi.
pub fn merge<'a, I>(chain: I) -> Vec<Property>
where
    I: IntoIterator<Item = &'a [PropertyDef]>,
{
    let mut merged: Vec<Property> = Vec::new();
    for defs in chain {
        for def in defs {
            match merged.iter_mut().find(|p| p.def.same_slot(def)) {
                Some(existing) => existing.def = *def,
                None => merged.push(Property::new(*def)),
            }
        }
    }
    merged
}
