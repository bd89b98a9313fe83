//! # pmodidl - DIDL-Lite Parser
//!
//! Correspondance bidirectionnelle entre documents DIDL-Lite (UPnP/DLNA)
//! et objets média typés.
//!
//! Chaque `upnp:class` connue correspond à un [`Kind`] statique qui hérite
//! des définitions de propriétés de ses ancêtres. Un seul désérialiseur et
//! un seul sérialiseur génériques sont pilotés par ces définitions.
//!
//! ```
//! use pmodidl::{DidlDocument, EmitOptions, ParseMode};
//!
//! let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
//!     xmlns:dc="http://purl.org/dc/elements/1.1/"
//!     xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
//!   <item id="1" parentID="0" restricted="1">
//!     <dc:title>Song</dc:title>
//!     <upnp:class>object.item.audioItem.musicTrack</upnp:class>
//!     <upnp:artist>Artist</upnp:artist>
//!   </item>
//! </DIDL-Lite>"#;
//!
//! let doc = DidlDocument::parse_str(xml, ParseMode::Strict).unwrap();
//! let track = &doc.objects[0];
//! assert_eq!(track.kind().name, "MusicTrack");
//! assert_eq!(track.get("artist").unwrap(), Some("Artist"));
//!
//! let out = doc.to_xml_string(&EmitOptions::default()).unwrap();
//! assert!(out.contains("<upnp:artist>Artist</upnp:artist>"));
//! ```

pub mod de;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod kinds;
pub mod namespaces;
pub mod naming;
pub mod object;
pub mod options;
pub mod resource;
pub mod schema;
pub mod ser;

pub use de::{parse_document, parse_str};
pub use descriptor::Descriptor;
pub use document::DidlDocument;
pub use error::{Error, Result};
pub use kinds::Kind;
pub use object::{Descendants, DidlEntry, DidlObject, DidlObjectBuilder, ExtraProperty};
pub use options::{EmitOptions, ParseMode};
pub use resource::Resource;
pub use ser::{to_xml_bytes, to_xml_element, to_xml_string};
