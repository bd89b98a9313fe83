//! Registre des kinds DIDL-Lite et résolution des `upnp:class`
//!
//! Chaque kind est un enregistrement statique: nom, classe UPnP, tag XML,
//! parent et définitions propres. La liste complète des propriétés est
//! fusionnée une seule fois (voir [`crate::schema::merge`]) puis mise en
//! cache pour toute la durée du processus.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::naming::normalize;
use crate::options::ParseMode;
use crate::schema::{PropertyDef, Property, merge};

/// Type d'objet DIDL-Lite (AudioItem, Album, ...)
#[derive(Debug)]
pub struct Kind {
    /// Nom lisible (`MusicTrack`)
    pub name: &'static str,
    /// Classe UPnP canonique (`object.item.audioItem.musicTrack`)
    pub upnp_class: &'static str,
    /// Tag XML; `None` pour la racine abstraite `object`
    pub tag: Option<&'static str>,
    pub parent: Option<&'static Kind>,
    /// Définitions ajoutées par ce kind
    pub own_properties: &'static [PropertyDef],
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.upnp_class == other.upnp_class
    }
}

impl Eq for Kind {}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Kind {
    /// Chaîne du kind vers la racine
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static Kind> {
        std::iter::successors(Some(self), |k| k.parent)
    }

    /// True si `self` est `other` ou en descend
    pub fn is_a(&'static self, other: &Kind) -> bool {
        self.ancestors().any(|k| k == other)
    }

    pub fn is_container(&self) -> bool {
        self.tag == Some("container")
    }

    pub fn is_item(&self) -> bool {
        self.tag == Some("item")
    }

    /// Propriétés héritées et propres, dans l'ordre d'émission
    pub fn properties(&self) -> &'static [Property] {
        SCHEMAS
            .get(self.upnp_class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Propriétés scalaires (hors `res`)
    pub fn scalar_properties(&self) -> impl Iterator<Item = &'static Property> {
        self.properties().iter().filter(|p| p.is_scalar())
    }

    /// Recherche une propriété scalaire par nom (camelCase ou snake_case)
    pub fn property(&self, name: &str) -> Option<&'static Property> {
        let key = normalize(name);
        self.scalar_properties().find(|p| p.key == key)
    }

    /// Propriétés obligatoires
    pub fn required_properties(&self) -> impl Iterator<Item = &'static Property> {
        self.scalar_properties().filter(|p| p.is_required())
    }
}

static SCHEMAS: Lazy<HashMap<&'static str, Vec<Property>>> = Lazy::new(|| {
    KINDS
        .iter()
        .map(|kind| {
            let mut chain: Vec<&'static [PropertyDef]> =
                kind.ancestors().map(|k| k.own_properties).collect();
            chain.reverse();
            (kind.upnp_class, merge(chain))
        })
        .collect()
});

const fn req(namespace: &'static str, location: &'static str) -> PropertyDef {
    PropertyDef::required(namespace, location)
}

const fn opt(namespace: &'static str, location: &'static str) -> PropertyDef {
    PropertyDef::optional(namespace, location)
}

macro_rules! kind {
    ($name:literal, $class:literal, $tag:literal, $parent:expr, $props:expr $(,)?) => {
        Kind {
            name: $name,
            upnp_class: $class,
            tag: Some($tag),
            parent: Some($parent),
            own_properties: $props,
        }
    };
}

// ============= Racine =============

pub static OBJECT: Kind = Kind {
    name: "Object",
    upnp_class: "object",
    tag: None,
    parent: None,
    own_properties: &[
        req("didl_lite", "@id"),
        req("didl_lite", "@parentID"),
        req("didl_lite", "@restricted"),
        req("dc", "title"),
        req("upnp", "class"),
        opt("dc", "creator"),
        opt("didl_lite", "res"),
        opt("upnp", "writeStatus"),
    ],
};

// ============= Items =============

pub static ITEM: Kind = kind!(
    "Item",
    "object.item",
    "item",
    &OBJECT,
    &[
        // obligatoire pour les références, ignoré ici
        opt("didl_lite", "@refID"),
        opt("upnp", "bookmarkID"),
    ],
);

pub static IMAGE_ITEM: Kind = kind!(
    "ImageItem",
    "object.item.imageItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "longDescription"),
        opt("upnp", "storageMedium"),
        opt("upnp", "rating"),
        opt("dc", "description"),
        opt("dc", "publisher"),
        opt("dc", "date"),
        opt("dc", "rights"),
    ],
);

pub static PHOTO: Kind = kind!(
    "Photo",
    "object.item.imageItem.photo",
    "item",
    &IMAGE_ITEM,
    &[opt("upnp", "album")],
);

pub static AUDIO_ITEM: Kind = kind!(
    "AudioItem",
    "object.item.audioItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "genre"),
        opt("dc", "description"),
        opt("upnp", "longDescription"),
        opt("dc", "publisher"),
        opt("dc", "language"),
        opt("dc", "relation"),
        opt("dc", "rights"),
    ],
);

pub static MUSIC_TRACK: Kind = kind!(
    "MusicTrack",
    "object.item.audioItem.musicTrack",
    "item",
    &AUDIO_ITEM,
    &[
        opt("upnp", "artist"),
        opt("upnp", "album"),
        opt("upnp", "originalTrackNumber"),
        opt("upnp", "playlist"),
        opt("upnp", "storageMedium"),
        opt("dc", "contributor"),
        opt("dc", "date"),
    ],
);

pub static AUDIO_BROADCAST: Kind = kind!(
    "AudioBroadcast",
    "object.item.audioItem.audioBroadcast",
    "item",
    &AUDIO_ITEM,
    &[
        opt("upnp", "region"),
        opt("upnp", "radioCallSign"),
        opt("upnp", "radioStationID"),
        opt("upnp", "radioBand"),
        opt("upnp", "channelNr"),
        opt("upnp", "signalStrength"),
        opt("upnp", "signalLocked"),
        opt("upnp", "tuned"),
        opt("upnp", "recordable"),
    ],
);

pub static AUDIO_BOOK: Kind = kind!(
    "AudioBook",
    "object.item.audioItem.audioBook",
    "item",
    &AUDIO_ITEM,
    &[
        opt("upnp", "storageMedium"),
        opt("upnp", "producer"),
        opt("dc", "contributor"),
        opt("dc", "date"),
    ],
);

pub static VIDEO_ITEM: Kind = kind!(
    "VideoItem",
    "object.item.videoItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "genre"),
        opt("upnp", "genre@id"),
        opt("upnp", "genre@type"),
        opt("upnp", "longDescription"),
        opt("upnp", "producer"),
        opt("upnp", "rating"),
        opt("upnp", "actor"),
        opt("upnp", "director"),
        opt("dc", "description"),
        opt("dc", "publisher"),
        opt("dc", "language"),
        opt("dc", "relation"),
        opt("upnp", "playbackCount"),
        opt("upnp", "lastPlaybackTime"),
        opt("upnp", "lastPlaybackPosition"),
        opt("upnp", "recordedDayOfWeek"),
        opt("upnp", "srsRecordScheduleID"),
    ],
);

pub static MOVIE: Kind = kind!(
    "Movie",
    "object.item.videoItem.movie",
    "item",
    &VIDEO_ITEM,
    &[
        opt("upnp", "storageMedium"),
        opt("upnp", "DVDRegionCode"),
        opt("upnp", "channelName"),
        opt("upnp", "scheduledStartTime"),
        opt("upnp", "scheduledEndTime"),
        opt("upnp", "programTitle"),
        opt("upnp", "seriesTitle"),
        opt("upnp", "episodeCount"),
        opt("upnp", "episodeNr"),
    ],
);

pub static VIDEO_BROADCAST: Kind = kind!(
    "VideoBroadcast",
    "object.item.videoItem.videoBroadcast",
    "item",
    &VIDEO_ITEM,
    &[
        opt("upnp", "icon"),
        opt("upnp", "region"),
        opt("upnp", "channelNr"),
        opt("upnp", "signalStrength"),
        opt("upnp", "signalLocked"),
        opt("upnp", "tuned"),
        opt("upnp", "recordable"),
        opt("upnp", "callSign"),
        opt("upnp", "price"),
        opt("upnp", "payPerView"),
    ],
);

pub static MUSIC_VIDEO_CLIP: Kind = kind!(
    "MusicVideoClip",
    "object.item.videoItem.musicVideoClip",
    "item",
    &VIDEO_ITEM,
    &[
        opt("upnp", "artist"),
        opt("upnp", "storageMedium"),
        opt("upnp", "album"),
        opt("upnp", "scheduledStartTime"),
        opt("upnp", "scheduledStopTime"),
        opt("dc", "contributor"),
        opt("dc", "date"),
    ],
);

pub static PLAYLIST_ITEM: Kind = kind!(
    "PlaylistItem",
    "object.item.playlistItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "artist"),
        opt("upnp", "genre"),
        opt("upnp", "longDescription"),
        opt("upnp", "storageMedium"),
        opt("dc", "description"),
        opt("dc", "date"),
        opt("dc", "language"),
    ],
);

pub static TEXT_ITEM: Kind = kind!(
    "TextItem",
    "object.item.textItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "author"),
        opt("upnp", "res@protection"),
        opt("upnp", "longDescription"),
        opt("upnp", "storageMedium"),
        opt("upnp", "rating"),
        opt("dc", "description"),
        opt("dc", "publisher"),
        opt("dc", "contributor"),
        opt("dc", "date"),
        opt("dc", "relation"),
        opt("dc", "language"),
        opt("dc", "rights"),
    ],
);

pub static BOOKMARK_ITEM: Kind = kind!(
    "BookmarkItem",
    "object.item.bookmarkItem",
    "item",
    &ITEM,
    &[
        req("upnp", "bookmarkedObjectID"),
        opt("upnp", "neverPlayable"),
        req("upnp", "deviceUDN"),
        req("upnp", "serviceType"),
        req("upnp", "serviceId"),
        opt("dc", "date"),
        req("dc", "stateVariableCollection"),
    ],
);

pub static EPG_ITEM: Kind = kind!(
    "EpgItem",
    "object.item.epgItem",
    "item",
    &ITEM,
    &[
        opt("upnp", "channelGroupName"),
        opt("upnp", "channelGroupName@id"),
        opt("upnp", "epgProviderName"),
        opt("upnp", "serviceProvider"),
        opt("upnp", "channelName"),
        opt("upnp", "channelNr"),
        opt("upnp", "programTitle"),
        opt("upnp", "seriesTitle"),
        opt("upnp", "programID"),
        opt("upnp", "programID@type"),
        opt("upnp", "seriesID"),
        opt("upnp", "seriesID@type"),
        opt("upnp", "channelID"),
        opt("upnp", "channelID@type"),
        opt("upnp", "episodeCount"),
        opt("upnp", "episodeNumber"),
        opt("upnp", "programCode"),
        opt("upnp", "programCode@type"),
        opt("upnp", "rating"),
        opt("upnp", "rating@type"),
        opt("upnp", "episodeType"),
        opt("upnp", "genre"),
        opt("upnp", "genre@id"),
        opt("upnp", "genre@extended"),
        opt("upnp", "artist"),
        opt("upnp", "artist@role"),
        opt("upnp", "actor"),
        opt("upnp", "actor@role"),
        opt("upnp", "author"),
        opt("upnp", "author@role"),
        opt("upnp", "producer"),
        opt("upnp", "director"),
        opt("dc", "publisher"),
        opt("dc", "contributor"),
        opt("upnp", "networkAffiliation"),
        opt("upnp", "price"),
        opt("upnp", "price@currency"),
        opt("upnp", "payPerView"),
        opt("dc", "description"),
        opt("upnp", "longDescription"),
        opt("upnp", "icon"),
        opt("upnp", "region"),
        opt("dc", "language"),
        opt("dc", "relation"),
        opt("upnp", "scheduledStartTime"),
        opt("upnp", "scheduledEndTime"),
        opt("upnp", "recordable"),
    ],
);

pub static AUDIO_PROGRAM: Kind = kind!(
    "AudioProgram",
    "object.item.epgItem.audioProgram",
    "item",
    &EPG_ITEM,
    &[
        opt("upnp", "radioCallSign"),
        opt("upnp", "radioStationID"),
        opt("upnp", "radioBand"),
    ],
);

pub static VIDEO_PROGRAM: Kind = kind!(
    "VideoProgram",
    "object.item.epgItem.videoProgram",
    "item",
    &EPG_ITEM,
    &[
        opt("upnp", "price"),
        opt("upnp", "price@currency"),
        opt("upnp", "payPerView"),
    ],
);

// ============= Containers =============

pub static CONTAINER: Kind = kind!(
    "Container",
    "object.container",
    "container",
    &OBJECT,
    &[
        opt("didl_lite", "@childCount"),
        opt("upnp", "createClass"),
        opt("upnp", "searchClass"),
        opt("didl_lite", "@searchable"),
        opt("didl_lite", "@neverPlayable"),
    ],
);

pub static PERSON: Kind = kind!(
    "Person",
    "object.container.person",
    "container",
    &CONTAINER,
    &[opt("dc", "language")],
);

pub static MUSIC_ARTIST: Kind = kind!(
    "MusicArtist",
    "object.container.person.musicArtist",
    "container",
    &PERSON,
    &[opt("upnp", "genre"), opt("upnp", "artistDiscographyURI")],
);

pub static PLAYLIST_CONTAINER: Kind = kind!(
    "PlaylistContainer",
    "object.container.playlistContainer",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "artist"),
        opt("upnp", "genre"),
        opt("upnp", "longDescription"),
        opt("upnp", "producer"),
        opt("upnp", "storageMedium"),
        opt("dc", "description"),
        opt("dc", "contributor"),
        opt("dc", "date"),
        opt("dc", "language"),
        opt("dc", "rights"),
    ],
);

pub static ALBUM: Kind = kind!(
    "Album",
    "object.container.album",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "storageMedium"),
        opt("upnp", "longDescription"),
        opt("dc", "description"),
        opt("dc", "publisher"),
        opt("dc", "contributor"),
        opt("dc", "date"),
        opt("dc", "relation"),
        opt("dc", "rights"),
    ],
);

pub static MUSIC_ALBUM: Kind = kind!(
    "MusicAlbum",
    "object.container.album.musicAlbum",
    "container",
    &ALBUM,
    &[
        opt("upnp", "artist"),
        opt("upnp", "genre"),
        opt("upnp", "producer"),
        opt("upnp", "albumArtURI"),
        opt("upnp", "toc"),
    ],
);

pub static PHOTO_ALBUM: Kind = kind!(
    "PhotoAlbum",
    "object.container.album.photoAlbum",
    "container",
    &ALBUM,
    &[],
);

pub static GENRE: Kind = kind!(
    "Genre",
    "object.container.genre",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "genre"),
        opt("upnp", "longDescription"),
        opt("dc", "description"),
    ],
);

pub static MUSIC_GENRE: Kind = kind!(
    "MusicGenre",
    "object.container.genre.musicGenre",
    "container",
    &GENRE,
    &[],
);

pub static MOVIE_GENRE: Kind = kind!(
    "MovieGenre",
    "object.container.genre.movieGenre",
    "container",
    &GENRE,
    &[],
);

pub static CHANNEL_GROUP: Kind = kind!(
    "ChannelGroup",
    "object.container.channelGroup",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "channelGroupName"),
        opt("upnp", "channelGroupName@id"),
        opt("upnp", "epgProviderName"),
        opt("upnp", "serviceProvider"),
        opt("upnp", "icon"),
        opt("upnp", "region"),
    ],
);

pub static AUDIO_CHANNEL_GROUP: Kind = kind!(
    "AudioChannelGroup",
    "object.container.channelGroup.audioChannelGroup",
    "container",
    &CHANNEL_GROUP,
    &[],
);

pub static VIDEO_CHANNEL_GROUP: Kind = kind!(
    "VideoChannelGroup",
    "object.container.channelGroup.videoChannelGroup",
    "container",
    &CHANNEL_GROUP,
    &[],
);

pub static EPG_CONTAINER: Kind = kind!(
    "EpgContainer",
    "object.container.epgContainer",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "channelGroupName"),
        opt("upnp", "channelGroupName@id"),
        opt("upnp", "epgProviderName"),
        opt("upnp", "serviceProvider"),
        opt("upnp", "channelName"),
        opt("upnp", "channelNr"),
        opt("upnp", "channelID"),
        opt("upnp", "channelID@type"),
        opt("upnp", "radioCallSign"),
        opt("upnp", "radioStationID"),
        opt("upnp", "radioBand"),
        opt("upnp", "callSign"),
        opt("upnp", "networkAffiliation"),
        opt("upnp", "price"),
        opt("upnp", "price@currency"),
        opt("upnp", "payPerView"),
        opt("upnp", "icon"),
        opt("upnp", "region"),
        opt("dc", "language"),
        opt("dc", "relation"),
        opt("upnp", "dateTimeRange"),
    ],
);

pub static STORAGE_SYSTEM: Kind = kind!(
    "StorageSystem",
    "object.container.storageSystem",
    "container",
    &CONTAINER,
    &[
        req("upnp", "storageTotal"),
        req("upnp", "storageUsed"),
        req("upnp", "storageFree"),
        req("upnp", "storageMaxPartition"),
        req("upnp", "storageMedium"),
    ],
);

pub static STORAGE_VOLUME: Kind = kind!(
    "StorageVolume",
    "object.container.storageVolume",
    "container",
    &CONTAINER,
    &[
        req("upnp", "storageTotal"),
        req("upnp", "storageUsed"),
        req("upnp", "storageFree"),
        req("upnp", "storageMedium"),
    ],
);

pub static STORAGE_FOLDER: Kind = kind!(
    "StorageFolder",
    "object.container.storageFolder",
    "container",
    &CONTAINER,
    &[req("upnp", "storageUsed")],
);

pub static BOOKMARK_FOLDER: Kind = kind!(
    "BookmarkFolder",
    "object.container.bookmarkFolder",
    "container",
    &CONTAINER,
    &[
        opt("upnp", "genre"),
        opt("upnp", "longDescription"),
        opt("dc", "description"),
    ],
);

/// Tous les kinds enregistrés, racine abstraite comprise
pub static KINDS: &[&Kind] = &[
    &OBJECT,
    &ITEM,
    &IMAGE_ITEM,
    &PHOTO,
    &AUDIO_ITEM,
    &MUSIC_TRACK,
    &AUDIO_BROADCAST,
    &AUDIO_BOOK,
    &VIDEO_ITEM,
    &MOVIE,
    &VIDEO_BROADCAST,
    &MUSIC_VIDEO_CLIP,
    &PLAYLIST_ITEM,
    &TEXT_ITEM,
    &BOOKMARK_ITEM,
    &EPG_ITEM,
    &AUDIO_PROGRAM,
    &VIDEO_PROGRAM,
    &CONTAINER,
    &PERSON,
    &MUSIC_ARTIST,
    &PLAYLIST_CONTAINER,
    &ALBUM,
    &MUSIC_ALBUM,
    &PHOTO_ALBUM,
    &GENRE,
    &MUSIC_GENRE,
    &MOVIE_GENRE,
    &CHANNEL_GROUP,
    &AUDIO_CHANNEL_GROUP,
    &VIDEO_CHANNEL_GROUP,
    &EPG_CONTAINER,
    &STORAGE_SYSTEM,
    &STORAGE_VOLUME,
    &STORAGE_FOLDER,
    &BOOKMARK_FOLDER,
];

// ============= Résolution =============

/// Kinds instanciables (ayant un tag XML)
pub fn instantiable() -> impl Iterator<Item = &'static Kind> {
    KINDS.iter().copied().filter(|k| k.tag.is_some())
}

/// Recherche exacte (sensible à la casse) parmi les kinds instanciables
pub fn by_class(upnp_class: &str) -> Option<&'static Kind> {
    instantiable().find(|k| k.upnp_class == upnp_class)
}

fn by_class_ignore_case(upnp_class: &str) -> Option<&'static Kind> {
    instantiable().find(|k| k.upnp_class.eq_ignore_ascii_case(upnp_class))
}

/// Résout une `upnp:class` en kind.
///
/// En mode strict la correspondance doit être exacte. En mode lenient,
/// la casse est ignorée et une classe inconnue retombe sur l'ancêtre
/// pointé le plus long, puis sur `Item`/`Container`.
///
/// ```
/// use pmodidl::{kinds, ParseMode};
///
/// let kind = kinds::resolve("object.item.audioItem.musicTrack.vendorExt", ParseMode::Lenient).unwrap();
/// assert_eq!(kind, &kinds::MUSIC_TRACK);
/// ```
pub fn resolve(upnp_class: &str, mode: ParseMode) -> Result<&'static Kind> {
    resolve_with_hint(upnp_class, mode, None)
}

/// Comme [`resolve`], le tag de l'élément source départageant
/// `Item`/`Container` en dernier recours
pub(crate) fn resolve_with_hint(
    upnp_class: &str,
    mode: ParseMode,
    tag: Option<&str>,
) -> Result<&'static Kind> {
    if mode.is_strict() {
        return by_class(upnp_class).ok_or_else(|| Error::UnknownClass(upnp_class.to_string()));
    }

    if let Some(kind) = by_class_ignore_case(upnp_class) {
        return Ok(kind);
    }

    let mut prefix = upnp_class;
    while let Some((head, _)) = prefix.rsplit_once('.') {
        if let Some(kind) = by_class_ignore_case(head) {
            return Ok(kind);
        }
        prefix = head;
    }

    let container = match tag {
        Some(tag) => tag == "container",
        None => upnp_class
            .to_ascii_lowercase()
            .starts_with("object.container"),
    };
    Ok(if container { &CONTAINER } else { &ITEM })
}
