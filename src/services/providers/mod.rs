/// Metadata provider abstraction
///
/// The board only ever reads from the metadata service: title search for the
/// add flow and full detail for the catalog upsert and detail views. Keeping
/// this behind a trait lets the store and handlers run against a mock without
/// a live TMDB key.
use crate::{
    error::AppResult,
    models::{MediaKind, SearchResult, TitleDetail},
};

pub mod tmdb;

/// Read-only external content provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search titles of one kind by free text.
    ///
    /// A blank query returns an empty list without touching the upstream API.
    async fn search_titles(&self, kind: MediaKind, query: &str) -> AppResult<Vec<SearchResult>>;

    /// Fetch full detail for one title, including genres and watch providers
    async fn get_title_detail(&self, kind: MediaKind, id: i64) -> AppResult<TitleDetail>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
