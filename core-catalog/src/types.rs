//! Raw catalog API payloads and their mapping into canonical models.
//!
//! The API wraps every result list in an envelope carrying a status header.
//! Numeric fields arrive as either JSON numbers or strings depending on the
//! endpoint, so the deserializers here accept both.

use core_library::Track;
use serde::{Deserialize, Deserializer};

/// Response envelope common to all catalog endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub headers: ApiHeaders,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Status block of the response envelope. A `code` of zero means success
/// even when the HTTP status is 200 with an embedded error.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiHeaders {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ApiHeaders {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Track payload as the catalog returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub album_id: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub audiodownload: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        Track {
            id: raw.id,
            title: raw.name,
            artist: raw.artist_name,
            artist_id: raw.artist_id,
            album_id: raw.album_id,
            album_name: raw.album_name.filter(|s| !s.is_empty()),
            image: raw.image,
            audio_url: raw.audio,
            audio_download_url: raw.audiodownload.filter(|s| !s.is_empty()),
            duration_secs: raw.duration,
        }
    }
}

/// Artist payload as the catalog returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Browsable artist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Artist {
            id: raw.id,
            name: raw.name,
            image: raw.image,
        }
    }
}

/// Editorial playlist payload as the catalog returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPlaylist {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub image: String,
}

/// Browsable editorial playlist entry. Distinct from the user-owned
/// [`core_library::Playlist`]: these are remote and read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPlaylist {
    pub id: String,
    pub title: String,
    pub track_count: Option<u32>,
    pub image: String,
}

impl From<RawPlaylist> for CatalogPlaylist {
    fn from(raw: RawPlaylist) -> Self {
        CatalogPlaylist {
            id: raw.id,
            title: raw.name,
            track_count: raw.track_count,
            image: raw.image,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        String(String),
        Number(i64),
        Null,
    }

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
