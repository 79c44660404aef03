//! Chapter image retrieval across the Ikigai reader mirrors
//!
//! No single upstream is reliable here. Reader mirrors change domains,
//! some publish image URLs directly, some only serialized filenames, and
//! some address chapters by an opaque id that first has to be resolved
//! from the human-readable chapter name via the paginated API. Every step
//! is best-effort: an error inside a step counts as "no result" and the
//! next mirror, pattern, or step is attempted. An empty image list after
//! everything has been tried is a valid terminal state, not an error.

use crate::helpers::{chapter_matches, dedup_keep_order, normalize_chapter, normalize_media_url};
use crate::http_client::FetchClient;
use crate::sources::ikigai;
use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

/// Mirrors that address chapters by series slug and chapter name
const READER_DOMAINS: &[&str] = &["https://visorikigai.net", "https://ikigaimangas.com"];

/// Mirrors that address chapters by opaque chapter id
const CHAPTER_ID_READER_DOMAINS: &[&str] = &[
    "https://visualikigai.com",
    "https://zonaikigai.melauroral.com",
    "https://visorikigai.techbee.site",
    "https://visualikigai.gettocaboca.com",
    "https://viralikigai.glovix.one",
    "https://zonaikigai.foodib.net",
];

const MEDIA_CDN_BASE: &str = "https://media.ikigaimangas.cloud";

const CHAPTER_PAGE_SIZE: u32 = 100;
const MAX_PROBE_PAGES: u32 = 80;

/// Filename patterns for constructed page URLs: (zero-pad width, extension).
/// Width 0 means unpadded.
const FILENAME_PATTERNS: &[(usize, &str)] = &[
    (2, "webp"),
    (3, "webp"),
    (0, "webp"),
    (2, "jpg"),
    (2, "jpeg"),
    (2, "png"),
];

/// Resolve the ordered page images for a chapter. Scraping the slug-addressed
/// reader mirrors comes first; the constructed-URL fallback chain only runs
/// when that yields nothing.
pub async fn chapter_images(fetch: &FetchClient, slug: &str, chapter: &str) -> Vec<String> {
    let images = scrape_reader_mirrors(fetch, slug, chapter).await;
    if !images.is_empty() {
        return images;
    }
    construct_image_urls(fetch, slug, chapter).await
}

async fn scrape_reader_mirrors(fetch: &FetchClient, slug: &str, chapter: &str) -> Vec<String> {
    for domain in READER_DOMAINS {
        let url = format!("{}/series/{}/chapter/{}", domain, slug, chapter);
        let html = match fetch.fetch_text(&url).await {
            Ok(html) => html,
            Err(e) => {
                debug!("reader mirror {} failed: {}", domain, e);
                continue;
            }
        };
        let images = extract_reader_images(&html, domain);
        if !images.is_empty() {
            return images;
        }
    }
    Vec::new()
}

/// Pull CDN image URLs out of a reader page: viewer container images first,
/// then any image on the page, then serialized URLs inside script blocks.
pub fn extract_reader_images(html: &str, domain: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut images = Vec::new();

    for selector in ["section div img", "img"] {
        let parsed = Selector::parse(selector).unwrap();
        for element in document.select(&parsed) {
            let raw = element
                .value()
                .attr("src")
                .or_else(|| element.value().attr("data-src"))
                .unwrap_or("");
            let src = normalize_media_url(raw, domain);
            if is_cdn_image_url(&src) {
                images.push(src);
            }
        }
        if !images.is_empty() {
            break;
        }
    }

    if images.is_empty() {
        let script_selector = Selector::parse("script").unwrap();
        for script in document.select(&script_selector) {
            let content = script.text().collect::<String>();
            images.extend(extract_cdn_image_urls(&content));
        }
    }

    dedup_keep_order(images)
}

fn is_cdn_image_url(url: &str) -> bool {
    url.contains("media.ikigaimangas.cloud/series/")
        || url.contains("image.ikigaimangas.cloud/series/")
        || (url.contains("ikigaimangas")
            && Regex::new(r"(?i)\.(webp|png|jpe?g|avif)(\?|$)")
                .unwrap()
                .is_match(url))
}

/// Match full CDN image URLs inside arbitrary text, un-escaping `\/` first
/// since the mirrors embed them in serialized JSON payloads
pub fn extract_cdn_image_urls(text: &str) -> Vec<String> {
    let normalized = text.replace("\\/", "/");
    let re = Regex::new(
        r#"(?i)https?://(?:media|image)\.ikigaimangas\.cloud/series/[^\s"'<>\\]+?\.(?:webp|png|jpe?g|avif)"#,
    )
    .unwrap();
    dedup_keep_order(
        re.find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect(),
    )
}

/// Fallback chain: resolve the chapter name to its opaque id through the
/// paginated chapter list, look up the series id, then try the id-addressed
/// mirrors and finally brute-force constructed CDN URLs.
async fn construct_image_urls(fetch: &FetchClient, slug: &str, chapter: &str) -> Vec<String> {
    let chapters_base = format!("{}/series/{}/chapters", ikigai::API_BASE, slug);

    let first_page: Value = match fetch
        .fetch_json(&format!(
            "{}?page=1&pageSize={}",
            chapters_base, CHAPTER_PAGE_SIZE
        ))
        .await
    {
        Ok(value) => value,
        Err(e) => {
            debug!("chapter list fetch failed for {}: {}", slug, e);
            return Vec::new();
        }
    };
    let last_page = first_page["meta"]["last_page"].as_u64().unwrap_or(1);

    // The requested chapter is usually recent, so the already-fetched first
    // page settles most lookups without another request
    let mut chapter_id = find_chapter_id(&first_page, chapter);
    if chapter_id.is_none() {
        for page in scan_order(chapter, last_page) {
            if page == 1 {
                continue;
            }
            let page_data: Value = match fetch
                .fetch_json(&format!(
                    "{}?page={}&pageSize={}",
                    chapters_base, page, CHAPTER_PAGE_SIZE
                ))
                .await
            {
                Ok(value) => value,
                Err(_) => continue,
            };
            chapter_id = find_chapter_id(&page_data, chapter);
            if chapter_id.is_some() {
                break;
            }
        }
    }
    let chapter_id = match chapter_id {
        Some(id) => id,
        None => return Vec::new(),
    };

    let detail: Value = match fetch
        .fetch_json(&format!("{}/series/{}", ikigai::API_BASE, slug))
        .await
    {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };
    let series_id = id_string(&detail["series"]["id"]);
    if series_id.is_empty() {
        return Vec::new();
    }

    let mirror_images = probe_chapter_id_mirrors(fetch, &chapter_id, &series_id).await;
    if !mirror_images.is_empty() {
        return mirror_images;
    }

    // Last resort: probe constructed page URLs. Page numbering is treated as
    // contiguous from 1, so the first failed index ends the pattern.
    let base_url = format!("{}/series/{}/{}", MEDIA_CDN_BASE, series_id, chapter_id);
    for &(width, ext) in FILENAME_PATTERNS {
        let mut images = Vec::new();
        for index in 1..=MAX_PROBE_PAGES {
            let url = format!("{}/{}", base_url, page_filename(width, ext, index));
            if fetch.image_exists(&url).await {
                images.push(url);
            } else {
                break;
            }
        }
        if !images.is_empty() {
            return images;
        }
    }

    Vec::new()
}

/// Newer mirrors expose chapter pages by chapter id and either include the
/// real image URLs or only the bare filenames of a serialized payload
async fn probe_chapter_id_mirrors(
    fetch: &FetchClient,
    chapter_id: &str,
    series_id: &str,
) -> Vec<String> {
    let filename_re = Regex::new(r"(?i)\b\d+_\d+\.(?:webp|png|jpe?g|avif)\b").unwrap();

    for domain in CHAPTER_ID_READER_DOMAINS {
        let url = format!("{}/capitulo/{}/", domain, chapter_id);
        let html = match fetch.fetch_text(&url).await {
            Ok(html) => html,
            Err(_) => continue,
        };

        let direct = extract_cdn_image_urls(&html);
        if !direct.is_empty() {
            return direct;
        }

        let normalized = html.replace("\\/", "/");
        let files = dedup_keep_order(
            filename_re
                .find_iter(&normalized)
                .map(|m| m.as_str().to_string())
                .collect(),
        );
        if !files.is_empty() {
            return files
                .into_iter()
                .map(|file| {
                    format!(
                        "{}/series/{}/{}/{}",
                        MEDIA_CDN_BASE, series_id, chapter_id, file
                    )
                })
                .collect();
        }
    }

    Vec::new()
}

/// Find a chapter by normalized-name comparison within one list page and
/// return its opaque id
fn find_chapter_id(page: &Value, chapter: &str) -> Option<String> {
    let entries = page["data"].as_array()?;
    let found = entries
        .iter()
        .find(|entry| chapter_matches(&id_string(&entry["name"]), chapter))?;
    let id = id_string(&found["id"]);
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Page scan order for the name-to-id lookup. Chapter lists paginate
/// oldest-first with newest-first insertion, so early chapters usually sit
/// near the end: small chapter numbers scan last page to first.
pub fn scan_order(chapter: &str, last_page: u64) -> Vec<u64> {
    let scan_from_last = normalize_chapter(chapter)
        .parse::<f64>()
        .map(|n| n.is_finite() && (0.0..=5.0).contains(&n))
        .unwrap_or(false);
    if scan_from_last {
        (1..=last_page).rev().collect()
    } else {
        (1..=last_page).collect()
    }
}

pub fn page_filename(width: usize, ext: &str, index: u32) -> String {
    if width == 0 {
        format!("{}.{}", index, ext)
    } else {
        format!("{:0width$}.{}", index, ext, width = width)
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
