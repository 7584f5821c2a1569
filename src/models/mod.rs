use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which lane of the board a tracked title lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    WantToWatch,
    Watching,
    Watched,
}

impl WatchStatus {
    /// All statuses in lane order (left to right on the board)
    pub const ALL: [WatchStatus; 3] = [
        WatchStatus::WantToWatch,
        WatchStatus::Watching,
        WatchStatus::Watched,
    ];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::WantToWatch => "WANT_TO_WATCH",
            WatchStatus::Watching => "WATCHING",
            WatchStatus::Watched => "WATCHED",
        }
    }

    /// Human-readable lane name
    pub fn lane_name(&self) -> &'static str {
        match self {
            WatchStatus::WantToWatch => "Want to watch",
            WatchStatus::Watching => "Watching",
            WatchStatus::Watched => "Watched",
        }
    }

    /// Parses the wire/database representation
    pub fn parse(s: &str) -> Option<WatchStatus> {
        match s {
            "WANT_TO_WATCH" => Some(WatchStatus::WantToWatch),
            "WATCHING" => Some(WatchStatus::Watching),
            "WATCHED" => Some(WatchStatus::Watched),
            _ => None,
        }
    }
}

impl Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type of tracked content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "MOVIE", alias = "movie")]
    Movie,
    #[serde(rename = "TV_SHOW", alias = "show", alias = "tv")]
    Show,
}

impl MediaKind {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "MOVIE",
            MediaKind::Show => "TV_SHOW",
        }
    }

    /// Parses the wire/database representation
    pub fn parse(s: &str) -> Option<MediaKind> {
        match s {
            "MOVIE" => Some(MediaKind::Movie),
            "TV_SHOW" => Some(MediaKind::Show),
            _ => None,
        }
    }

    /// Path segment used by the TMDB API ("movie" or "tv")
    pub fn tmdb_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque authenticated user identity supplied by the identity gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Genre tag as returned by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// One title on a user's board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// External metadata-provider id, unique per title
    pub id: i64,
    pub media_kind: MediaKind,
    pub title: String,
    /// Relative poster path; empty when the provider has none
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub status: WatchStatus,
    /// Insertion position within the lane; written but never used for sorting
    #[serde(default)]
    pub order: i32,
}

/// Catalog entry shared across users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedMedia {
    pub id: i64,
    pub title: String,
    pub kind: MediaKind,
    pub poster_path: String,
    pub genres: Vec<Genre>,
}

/// Per-user tracking record as returned by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRecord {
    pub title_id: i64,
    pub status: WatchStatus,
    pub order: i32,
    pub media: TrackedMedia,
}

impl TrackedRecord {
    /// Projects the persisted record into a board card
    pub fn into_card(self) -> Card {
        Card {
            id: self.media.id,
            media_kind: self.media.kind,
            title: self.media.title,
            poster_path: self.media.poster_path,
            genres: self.media.genres,
            status: self.status,
            order: self.order,
        }
    }
}

/// Search hit from the metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: String,
}

/// Streaming provider offering a title, as surfaced by the metadata API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProvider {
    pub name: String,
    #[serde(default)]
    pub logo_path: String,
}

/// Full title detail from the metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetail {
    pub id: i64,
    pub title: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Minutes, movies only
    pub runtime: Option<i32>,
    /// Movies: release date; shows: first air date (YYYY-MM-DD)
    pub release_date: Option<String>,
    #[serde(default)]
    pub watch_providers: Vec<WatchProvider>,
    pub fetched_at: DateTime<Utc>,
}
