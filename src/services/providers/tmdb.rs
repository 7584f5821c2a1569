/// TMDB API provider
///
/// Provides title search (the add-card flow) and full title detail
/// (catalog upsert and detail views).
///
/// API Flow:
/// 1. Search: /search/{movie|tv}?query= → id, title, overview, poster
/// 2. Detail: /{movie|tv}/{id}?append_to_response=watch/providers
///
/// Responses are cached in Redis: searches briefly, details for a week.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Genre, MediaKind, SearchResult, TitleDetail, WatchProvider},
    services::providers::MetadataProvider,
};
use chrono::Utc;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::collections::HashMap;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAIL_CACHE_TTL: u64 = 604800; // 1 week

/// Region used when picking watch providers out of the per-country map
const WATCH_PROVIDER_REGION: &str = "US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

/// Raw TMDB search response
#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    pub results: Vec<TmdbSearchHit>,
}

/// One search hit; movies carry `title`, shows carry `name`
#[derive(Debug, Deserialize)]
pub struct TmdbSearchHit {
    pub id: i64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbSearchHit> for SearchResult {
    fn from(hit: TmdbSearchHit) -> Self {
        SearchResult {
            id: hit.id,
            title: hit.title,
            overview: hit.overview.unwrap_or_default(),
            poster_path: hit.poster_path.unwrap_or_default(),
        }
    }
}

/// Raw TMDB detail response with appended watch providers
#[derive(Debug, Deserialize)]
pub struct TmdbDetail {
    pub id: i64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Movies only
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default, rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProviders>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbWatchProviders {
    #[serde(default)]
    pub results: HashMap<String, TmdbRegion>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbRegion {
    #[serde(default)]
    pub flatrate: Option<Vec<TmdbProviderEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbProviderEntry {
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// Flattens the per-country provider map into subscription providers for
    /// the configured region
    fn extract_watch_providers(providers: Option<TmdbWatchProviders>) -> Vec<WatchProvider> {
        providers
            .and_then(|mut p| p.results.remove(WATCH_PROVIDER_REGION))
            .and_then(|region| region.flatrate)
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|e| WatchProvider {
                        name: e.provider_name,
                        logo_path: e.logo_path.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn detail_from_response(kind: MediaKind, detail: TmdbDetail) -> TitleDetail {
        TitleDetail {
            id: detail.id,
            title: detail.title,
            kind,
            overview: detail.overview.unwrap_or_default(),
            poster_path: detail.poster_path.unwrap_or_default(),
            genres: detail.genres,
            runtime: detail.runtime,
            release_date: detail.release_date,
            watch_providers: Self::extract_watch_providers(detail.watch_providers),
            fetched_at: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_titles(&self, kind: MediaKind, query: &str) -> AppResult<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::Search(kind, query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/search/{}", self.api_url, kind.tmdb_segment());

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("api_key", self.api_key.as_str()), ("query", query)])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "TMDB API returned status {}: {}",
                        status, body
                    )));
                }

                let search: TmdbSearchResponse = response.json().await?;
                let results: Vec<SearchResult> =
                    search.results.into_iter().map(SearchResult::from).collect();

                tracing::info!(
                    query = %query,
                    kind = %kind,
                    results = results.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok(results)
            }
        )
    }

    async fn get_title_detail(&self, kind: MediaKind, id: i64) -> AppResult<TitleDetail> {
        cached!(
            self.cache,
            CacheKey::Detail(kind, id),
            DETAIL_CACHE_TTL,
            async move {
                let url = format!("{}/{}/{}", self.api_url, kind.tmdb_segment(), id);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("api_key", self.api_key.as_str()),
                        ("append_to_response", "watch/providers"),
                    ])
                    .send()
                    .await?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(AppError::NotFound(format!(
                        "Title {}/{} not found upstream",
                        kind, id
                    )));
                }

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "TMDB API returned status {}: {}",
                        status, body
                    )));
                }

                let response_text = response.text().await?;
                let detail: TmdbDetail = serde_json::from_str(&response_text).map_err(|e| {
                    tracing::error!(
                        error = %e,
                        response = %response_text,
                        "Failed to deserialize TMDB response"
                    );
                    AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
                })?;

                let detail = Self::detail_from_response(kind, detail);

                tracing::info!(
                    title_id = id,
                    kind = %kind,
                    genres = detail.genres.len(),
                    providers = detail.watch_providers.len(),
                    provider = "tmdb",
                    "Title detail fetched"
                );

                Ok(detail)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
