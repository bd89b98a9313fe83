//! Normalisation des noms de propriétés
//!
//! Le vocabulaire XML utilise une forme camelCase (`originalTrackNumber`,
//! `parentID`) alors que les clés de stockage sont en snake_case
//! (`original_track_number`, `parent_id`). Toutes les lectures/écritures
//! passent par [`normalize`], ce qui rend les deux orthographes équivalentes.

use heck::{ToLowerCamelCase, ToSnakeCase};

/// Convertit un nom camelCase en snake_case.
///
/// ```
/// use pmodidl::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("originalTrackNumber"), "original_track_number");
/// assert_eq!(to_snake_case("parentID"), "parent_id");
/// assert_eq!(to_snake_case("DVDRegionCode"), "dvd_region_code");
/// ```
pub fn to_snake_case(name: &str) -> String {
    name.to_snake_case()
}

/// Forme camelCase d'une clé snake_case (affichage uniquement).
///
/// Les sigles (`parent_id` → `parentId`) ne sont pas reconstruits; la
/// forme obtenue reste une orthographe acceptée par [`normalize`].
pub fn to_camel_case(key: &str) -> String {
    key.to_lower_camel_case()
}

/// Clé canonique d'une location de propriété.
///
/// `@parentID` → `parent_id`, `genre@id` → `genre_id`, `title` → `title`.
pub fn property_key(location: &str) -> String {
    match location.strip_prefix('@') {
        Some(attribute) => to_snake_case(attribute),
        None => to_snake_case(&location.replace('@', "_")),
    }
}

/// Clé canonique d'un nom fourni par l'appelant (l'une ou l'autre orthographe).
pub fn normalize(name: &str) -> String {
    let key = property_key(name);
    match key.as_str() {
        "upnp_class" => "class".to_string(),
        _ => key,
    }
}
