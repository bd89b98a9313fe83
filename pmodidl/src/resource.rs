//! Ressources média (`<res>`)

use serde::{Deserialize, Serialize};
use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::error::{Error, Result};
use crate::options::ParseMode;

/// Ressource média référencée par un objet (fichier audio, image, flux...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Resource {
    /// URI de la ressource (texte de `<res>`)
    pub uri: Option<String>,

    #[serde(rename = "protocolInfo")]
    pub protocol_info: Option<String>,

    #[serde(rename = "importUri", skip_serializing_if = "Option::is_none")]
    pub import_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,

    #[serde(rename = "sampleFrequency", skip_serializing_if = "Option::is_none")]
    pub sample_frequency: Option<String>,

    #[serde(rename = "bitsPerSample", skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<String>,

    #[serde(rename = "nrAudioChannels", skip_serializing_if = "Option::is_none")]
    pub nr_audio_channels: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    #[serde(rename = "colorDepth", skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection: Option<String>,
}

impl Resource {
    pub fn new(uri: impl Into<String>, protocol_info: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            protocol_info: Some(protocol_info.into()),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Renseigne le format PCM (fréquence, bits, canaux)
    pub fn with_audio_format(
        mut self,
        sample_frequency: impl Into<String>,
        bits_per_sample: impl Into<String>,
        nr_audio_channels: impl Into<String>,
    ) -> Self {
        self.sample_frequency = Some(sample_frequency.into());
        self.bits_per_sample = Some(bits_per_sample.into());
        self.nr_audio_channels = Some(nr_audio_channels.into());
        self
    }

    /// True si le protocolInfo annonce un type MIME audio
    pub fn is_audio(&self) -> bool {
        self.mime_type().is_some_and(|mime| mime.starts_with("audio/"))
    }

    /// Type MIME (troisième champ du protocolInfo `protocol:network:mime:info`)
    pub fn mime_type(&self) -> Option<&str> {
        self.protocol_info
            .as_deref()
            .and_then(|info| info.split(':').nth(2))
            .filter(|mime| !mime.is_empty() && *mime != "*")
    }

    /// Paires (nom d'attribut XML, valeur) dans l'ordre d'émission
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("protocolInfo", &self.protocol_info),
            ("importUri", &self.import_uri),
            ("size", &self.size),
            ("duration", &self.duration),
            ("bitrate", &self.bitrate),
            ("sampleFrequency", &self.sample_frequency),
            ("bitsPerSample", &self.bits_per_sample),
            ("nrAudioChannels", &self.nr_audio_channels),
            ("resolution", &self.resolution),
            ("colorDepth", &self.color_depth),
            ("protection", &self.protection),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }

    pub(crate) fn from_element(element: &Element, mode: ParseMode) -> Result<Self> {
        let attr = |name: &str| element.attributes.get(name).cloned();

        let protocol_info = attr("protocolInfo");
        if protocol_info.is_none() {
            if mode.is_strict() {
                return Err(Error::MissingRequiredProperty {
                    kind: "Resource".to_string(),
                    property: "protocolInfo".to_string(),
                });
            }
            debug!("res element without protocolInfo");
        }

        Ok(Self {
            uri: element.get_text().map(|text| text.trim().to_string()),
            protocol_info,
            import_uri: attr("importUri"),
            size: attr("size"),
            duration: attr("duration"),
            bitrate: attr("bitrate"),
            sample_frequency: attr("sampleFrequency"),
            bits_per_sample: attr("bitsPerSample"),
            nr_audio_channels: attr("nrAudioChannels"),
            resolution: attr("resolution"),
            color_depth: attr("colorDepth"),
            protection: attr("protection"),
        })
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut elem = Element::new("res");
        for (name, value) in self.attributes() {
            elem.attributes.insert(name.to_string(), value.to_string());
        }
        if let Some(uri) = &self.uri {
            elem.children.push(XMLNode::Text(uri.clone()));
        }
        elem
    }
}
