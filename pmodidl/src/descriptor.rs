//! Descripteurs libres (`<desc>`)

use serde::{Deserialize, Serialize};
use xmltree::{Element, XMLNode};

use crate::error::{Error, Result};

/// Fragment de métadonnées libre, identifié par un namespace
/// (replaygain, extensions constructeur...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Descriptor {
    pub id: String,

    #[serde(rename = "nameSpace")]
    pub name_space: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Descriptor {
    pub fn new(id: impl Into<String>, name_space: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name_space: name_space.into(),
            type_: None,
            text: None,
        }
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// `id` et `nameSpace` sont obligatoires quel que soit le mode;
    /// l'appelant décide s'il ignore le descripteur en mode lenient.
    pub(crate) fn from_element(element: &Element) -> Result<Self> {
        let required = |name: &str| {
            element
                .attributes
                .get(name)
                .cloned()
                .ok_or_else(|| Error::MissingRequiredProperty {
                    kind: "Descriptor".to_string(),
                    property: name.to_string(),
                })
        };

        Ok(Self {
            id: required("id")?,
            name_space: required("nameSpace")?,
            type_: element.attributes.get("type").cloned(),
            text: element.get_text().map(|text| text.into_owned()),
        })
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut elem = Element::new("desc");
        elem.attributes.insert("id".to_string(), self.id.clone());
        elem.attributes
            .insert("nameSpace".to_string(), self.name_space.clone());
        if let Some(type_) = &self.type_ {
            elem.attributes.insert("type".to_string(), type_.clone());
        }
        if let Some(text) = &self.text {
            elem.children.push(XMLNode::Text(text.clone()));
        }
        elem
    }
}
