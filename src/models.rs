use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Anime side (AnimeFLV). These records are constructed by the extractor, so
// every field is resolved to a concrete value before the record exists.
// ---------------------------------------------------------------------------

/// A single catalog entry as shown in listing grids
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimeCard {
    pub id: String,
    pub title: String,
    pub poster: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEpisode {
    pub anime_title: String,
    pub episode_number: String,
    pub poster: String,
    pub slug: String,
    pub anime_slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub recent: Vec<RecentEpisode>,
    pub trending: Vec<AnimeCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub number: i64,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    pub title: String,
    pub alt_title: String,
    pub synopsis: String,
    pub poster: String,
    pub status: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub genres: Vec<String>,
    pub episodes: Vec<Episode>,
    pub slug: String,
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSource {
    pub server: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodePage {
    pub sources: Vec<EpisodeSource>,
    pub anime_slug: String,
    pub episode_number: String,
    pub anime_title: String,
}

// ---------------------------------------------------------------------------
// Manga side (Ikigai panel API). These are pass-through mirrors of upstream
// JSON: every field is optional at the boundary because the upstream schema
// is unversioned, and unknown fields are carried through verbatim.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MangaSeries {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(rename = "type", default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub chapter_count: Option<i64>,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub genres: Value,
    #[serde(default)]
    pub team: Value,
    #[serde(default)]
    pub is_mature: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaDetail {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(rename = "type", default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub genres: Value,
    #[serde(default)]
    pub team: Value,
    #[serde(default)]
    pub chapter_count: Option<i64>,
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub rating_count: Option<i64>,
    #[serde(default)]
    pub view_count: Option<i64>,
    #[serde(default)]
    pub bookmark_count: Option<i64>,
    #[serde(default)]
    pub first_chapter: Value,
    #[serde(default)]
    pub last_chapter: Value,
    #[serde(default)]
    pub is_mature: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaChapter {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewChapterEntry {
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub series_slug: Option<String>,
    #[serde(default)]
    pub series_id: Value,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upstream page envelope; the pagination metadata is passed through
/// verbatim and is the only pagination contract callers rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: Option<i64>,
    #[serde(default)]
    pub last_page: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDetailResponse {
    #[serde(default)]
    pub series: Option<MangaDetail>,
    #[serde(default)]
    pub similar_series: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterListResponse {
    #[serde(default)]
    pub data: Vec<MangaChapter>,
    #[serde(default)]
    pub meta: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Schedule (Jikan)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub mal_id: i64,
    pub title: String,
    pub poster: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub score: Option<f64>,
    pub broadcast_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response_passes_meta_through() {
        let json = r#"{
            "data": [{"id": 7, "name": "Series", "slug": "series", "rank": 1, "views": 12345}],
            "current_page": 2,
            "last_page": 9,
            "total": 160,
            "per_page": 18
        }"#;
        let page: PaginatedResponse<MangaSeries> = serde_json::from_str(json).unwrap();
        assert_eq!(page.current_page, Some(2));
        assert_eq!(page.last_page, Some(9));
        assert_eq!(page.total, Some(160));
        assert_eq!(page.data.len(), 1);
        // unknown fields survive the round trip
        assert_eq!(page.data[0].extra.get("rank"), Some(&Value::from(1)));
        assert_eq!(page.data[0].extra.get("views"), Some(&Value::from(12345)));
    }

    #[test]
    fn test_manga_series_tolerates_missing_fields() {
        let series: MangaSeries = serde_json::from_str(r#"{"name": "Bare"}"#).unwrap();
        assert_eq!(series.name.as_deref(), Some("Bare"));
        assert!(series.slug.is_none());
        assert!(series.id.is_null());
        assert!(series.status.is_null());
    }

    #[test]
    fn test_similar_series_null_passes_through() {
        let detail: SeriesDetailResponse =
            serde_json::from_str(r#"{"series": {"name": "X"}, "similar_series": null}"#).unwrap();
        assert!(detail.similar_series.is_null());
        let out = serde_json::to_value(&detail).unwrap();
        assert!(out.get("similar_series").unwrap().is_null());
    }
}
