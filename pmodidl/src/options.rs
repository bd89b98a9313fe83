//! Options de parsing et d'émission
//!
//! Les deux types sont désérialisables avec serde pour pouvoir être
//! portés par la configuration YAML/JSON de l'application hôte.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Politique de parsing face aux documents non conformes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Toute violation du schéma interrompt le parsing du document
    #[default]
    Strict,
    /// Les entrées invalides sont ignorées, les champs inconnus conservés
    Lenient,
}

impl ParseMode {
    pub fn is_strict(self) -> bool {
        self == ParseMode::Strict
    }

    pub fn is_lenient(self) -> bool {
        self == ParseMode::Lenient
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Strict => f.write_str("strict"),
            ParseMode::Lenient => f.write_str("lenient"),
        }
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ParseMode::Strict),
            "lenient" | "lax" => Ok(ParseMode::Lenient),
            other => Err(format!("invalid parse mode: {}", other)),
        }
    }
}

/// Options d'émission des documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Préfixe `<?xml version="1.0" encoding="UTF-8"?>`
    pub xml_declaration: bool,
    /// Indentation de deux espaces
    pub indent: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: false,
        }
    }
}

impl EmitOptions {
    pub(crate) fn emitter_config(&self) -> xmltree::EmitterConfig {
        xmltree::EmitterConfig::new()
            .write_document_declaration(self.xml_declaration)
            .perform_indent(self.indent)
            .indent_string("  ")
    }
}
