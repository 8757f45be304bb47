//! Typed client for the catalog API.
//!
//! Works against the upstream API directly or through a relay mount such
//! as `http://localhost:8080/api/mangadex`. Listing filters (content
//! rating, expanded relationships) are chosen here, by the caller; the
//! relay forwards whatever it is given.

pub mod error;
pub mod types;
pub mod urls;

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::catalog::target::{build_upstream_url, split_segments, ForwardQuery};

pub use error::ClientError;
pub use types::{AtHome, Chapter, ChapterList, Entity, Manga, MangaList};
pub use urls::{chapter_page_url, cover_url, cover_url_candidates, image_proxy_url, CoverSize};

/// Upstream catalog API base.
pub const DEFAULT_BASE_URL: &str = "https://api.mangadex.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LISTING_INCLUDES: [&str; 3] = ["cover_art", "author", "artist"];
const LISTING_RATINGS: [&str; 2] = ["safe", "suggestive"];
const FEED_RATINGS: [&str; 3] = ["safe", "suggestive", "erotica"];
const FEED_PAGE_SIZE: u32 = 100;

/// Listing sort keys, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    FollowedCount,
    UpdatedAt,
    CreatedAt,
}

impl SortOrder {
    fn key(self) -> &'static str {
        match self {
            SortOrder::FollowedCount => "order[followedCount]",
            SortOrder::UpdatedAt => "order[updatedAt]",
            SortOrder::CreatedAt => "order[createdAt]",
        }
    }
}

/// Offset of a 1-based page.
pub fn page_offset(page: u32, limit: u32) -> u32 {
    page.max(1).saturating_sub(1).saturating_mul(limit)
}

fn append_all(query: &mut ForwardQuery, key: &str, values: &[&str]) {
    for value in values {
        query.append(key, *value);
    }
}

/// Query used by every manga listing page.
pub fn listing_query(order: SortOrder, page: u32, limit: u32) -> ForwardQuery {
    let mut query = ForwardQuery::default();
    query.append(order.key(), "desc");
    query.append("limit", limit.to_string());
    query.append("offset", page_offset(page, limit).to_string());
    append_all(&mut query, "includes[]", &LISTING_INCLUDES);
    append_all(&mut query, "contentRating[]", &LISTING_RATINGS);
    query
}

/// Query for a title search.
pub fn search_query(title: &str, limit: u32) -> ForwardQuery {
    let mut query = ForwardQuery::default();
    query.append("title", title);
    query.append("limit", limit.to_string());
    append_all(&mut query, "includes[]", &LISTING_INCLUDES);
    append_all(&mut query, "contentRating[]", &LISTING_RATINGS);
    query
}

/// Query for one page of a manga's English chapter feed.
pub fn feed_query(offset: u32) -> ForwardQuery {
    let mut query = ForwardQuery::default();
    query.append("limit", FEED_PAGE_SIZE.to_string());
    query.append("offset", offset.to_string());
    query.append("order[chapter]", "desc");
    query.append("translatedLanguage[]", "en");
    query.append("includes[]", "scanlation_group");
    append_all(&mut query, "contentRating[]", &FEED_RATINGS);
    query
}

/// Client for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("manga-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, base_url))
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn popular(&self, page: u32, limit: u32) -> Result<MangaList, ClientError> {
        self.list(SortOrder::FollowedCount, page, limit).await
    }

    pub async fn recently_updated(&self, page: u32, limit: u32) -> Result<MangaList, ClientError> {
        self.list(SortOrder::UpdatedAt, page, limit).await
    }

    pub async fn newest(&self, page: u32, limit: u32) -> Result<MangaList, ClientError> {
        self.list(SortOrder::CreatedAt, page, limit).await
    }

    pub async fn list(
        &self,
        order: SortOrder,
        page: u32,
        limit: u32,
    ) -> Result<MangaList, ClientError> {
        self.get("manga", &listing_query(order, page, limit)).await
    }

    pub async fn search(&self, title: &str, limit: u32) -> Result<MangaList, ClientError> {
        self.get("manga", &search_query(title, limit)).await
    }

    pub async fn manga(&self, id: &str) -> Result<Manga, ClientError> {
        let mut query = ForwardQuery::default();
        append_all(&mut query, "includes[]", &LISTING_INCLUDES);
        let entity: Entity<Manga> = self.get(&format!("manga/{id}"), &query).await?;
        Ok(entity.data)
    }

    pub async fn chapters(&self, manga_id: &str, offset: u32) -> Result<ChapterList, ClientError> {
        self.get(&format!("manga/{manga_id}/feed"), &feed_query(offset))
            .await
    }

    pub async fn chapter(&self, id: &str) -> Result<Chapter, ClientError> {
        let entity: Entity<Chapter> = self
            .get(&format!("chapter/{id}"), &ForwardQuery::default())
            .await?;
        Ok(entity.data)
    }

    pub async fn at_home(&self, chapter_id: &str) -> Result<AtHome, ClientError> {
        self.get(&format!("at-home/server/{chapter_id}"), &ForwardQuery::default())
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ForwardQuery,
    ) -> Result<T, ClientError> {
        let url = build_upstream_url(&self.base_url, &split_segments(path), query)?;
        tracing::debug!(url = %url, "Catalog request");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
