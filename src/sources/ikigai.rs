//! Ikigai panel API client
//!
//! Stateless typed wrappers over the panel's JSON endpoints. Responses are
//! reshaped only by type annotation: pagination parameters pass through
//! unmodified and the upstream pagination metadata is returned verbatim.

use crate::error::ScrapeError;
use crate::http_client::FetchClient;
use crate::models::{
    ChapterListResponse, MangaSeries, NewChapterEntry, PaginatedResponse, SeriesDetailResponse,
};

pub const API_BASE: &str = "https://panel.ikigaimangas.com/api/swf";

/// Popular ranking, one page
pub async fn popular(
    fetch: &FetchClient,
    page: u32,
) -> Result<PaginatedResponse<MangaSeries>, ScrapeError> {
    let url = format!(
        "{}/series/ranking-list?type=total&series_type=comic&nsfw=false&page={}",
        API_BASE, page
    );
    fetch.fetch_json(&url).await
}

/// Most recently published chapters across all series
pub async fn new_chapters(
    fetch: &FetchClient,
    page: u32,
) -> Result<PaginatedResponse<NewChapterEntry>, ScrapeError> {
    let url = format!("{}/new-chapters?nsfw=false&page={}", API_BASE, page);
    fetch.fetch_json(&url).await
}

/// Full series catalog, newest first
pub async fn all_series(
    fetch: &FetchClient,
    page: u32,
    page_size: u32,
) -> Result<PaginatedResponse<MangaSeries>, ScrapeError> {
    let url = format!(
        "{}/series?page={}&pageSize={}&sort=desc",
        API_BASE, page, page_size
    );
    fetch.fetch_json(&url).await
}

pub async fn series_detail(
    fetch: &FetchClient,
    slug: &str,
) -> Result<SeriesDetailResponse, ScrapeError> {
    let url = format!("{}/series/{}", API_BASE, slug);
    fetch.fetch_json(&url).await
}

pub async fn series_chapters(
    fetch: &FetchClient,
    slug: &str,
    page: u32,
) -> Result<ChapterListResponse, ScrapeError> {
    let url = format!("{}/series/{}/chapters?page={}", API_BASE, slug, page);
    fetch.fetch_json(&url).await
}
