//! AnimeFLV extractor
//!
//! The markup is not controlled by this system: structural classes drift,
//! nested wrappers double text nodes, and the episode/source lists live in
//! inline script blocks as JSON literals rather than in the DOM. Every
//! operation therefore walks an ordered list of strategies and settles for
//! the first one that yields anything.

use crate::error::ScrapeError;
use crate::helpers::{
    dedup_doubled, extract_script_json, normalize_media_url, split_episode_slug,
};
use crate::http_client::FetchClient;
use crate::models::{
    AnimeCard, AnimeDetail, Episode, EpisodePage, EpisodeSource, HomePage, RecentEpisode,
};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

pub const BASE_URL: &str = "https://www3.animeflv.net";

/// Known dead/unreachable video hosting domains
const BLOCKED_DOMAINS: &[&str] = &["habetar.com"];

pub async fn home_page(fetch: &FetchClient) -> Result<HomePage, ScrapeError> {
    let html = fetch_page(fetch, BASE_URL).await?;
    Ok(parse_home(&html))
}

pub async fn search(fetch: &FetchClient, query: &str) -> Result<Vec<AnimeCard>, ScrapeError> {
    let mut url = Url::parse(&format!("{}/browse", BASE_URL)).unwrap();
    url.query_pairs_mut().append_pair("q", query);
    let html = fetch_page(fetch, url.as_str()).await?;
    Ok(parse_listing(&html))
}

pub async fn anime_detail(fetch: &FetchClient, slug: &str) -> Result<AnimeDetail, ScrapeError> {
    let html = fetch_page(fetch, &format!("{}/anime/{}", BASE_URL, slug)).await?;
    Ok(parse_detail(&html, slug))
}

pub async fn episode_sources(fetch: &FetchClient, slug: &str) -> Result<EpisodePage, ScrapeError> {
    let html = fetch_page(fetch, &format!("{}/ver/{}", BASE_URL, slug)).await?;
    Ok(parse_episode_page(&html, slug))
}

async fn fetch_page(fetch: &FetchClient, url: &str) -> Result<String, ScrapeError> {
    // The site rejects requests without a matching referer
    fetch
        .fetch_text_with_referer(url, &format!("{}/", BASE_URL))
        .await
}

pub fn parse_home(html: &str) -> HomePage {
    let document = Html::parse_document(html);

    let item_selector = Selector::parse(".ListEpisodios li").unwrap();
    let link_selector = Selector::parse("a.fa-play").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let title_selector = Selector::parse(".Title").unwrap();
    let episode_selector = Selector::parse(".Capi").unwrap();
    let slug_re = Regex::new(r"/ver/(.+?)(?:\?|$)").unwrap();

    let mut recent = Vec::new();
    for element in document.select(&item_selector) {
        let href = element
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or("");
        let slug = slug_re
            .captures(href)
            .map(|cap| cap[1].to_string())
            .unwrap_or_default();
        if slug.is_empty() {
            // not navigable without a slug
            continue;
        }
        let poster = element
            .select(&img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or("");
        let title = text_of(element.select(&title_selector).next());
        let episode = text_of(element.select(&episode_selector).next()).replace("Episodio ", "");
        let (anime_slug, _) = split_episode_slug(&slug);

        recent.push(RecentEpisode {
            anime_title: title,
            episode_number: episode,
            poster: normalize_media_url(poster, BASE_URL),
            slug,
            anime_slug,
        });
    }

    let trending = parse_cards(&document);
    HomePage { recent, trending }
}

pub fn parse_listing(html: &str) -> Vec<AnimeCard> {
    let document = Html::parse_document(html);
    parse_cards(&document)
}

fn parse_cards(document: &Html) -> Vec<AnimeCard> {
    let card_selector = Selector::parse(".ListAnimes .Anime").unwrap();
    let link_selector = Selector::parse("a").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let title_selector = Selector::parse(".Title").unwrap();
    let type_selector = Selector::parse(".Type").unwrap();
    let slug_re = Regex::new(r"/anime/(.+)").unwrap();

    let mut cards = Vec::new();
    for element in document.select(&card_selector) {
        let href = element
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or("");
        let slug = slug_re
            .captures(href)
            .map(|cap| cap[1].to_string())
            .unwrap_or_default();
        if slug.is_empty() {
            continue;
        }
        let poster = element
            .select(&img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or("");
        let title = dedup_doubled(&text_of(element.select(&title_selector).next())).to_string();
        let media_type = dedup_doubled(&text_of(element.select(&type_selector).next())).to_string();

        cards.push(AnimeCard {
            id: slug.clone(),
            title,
            poster: normalize_media_url(poster, BASE_URL),
            media_type,
            slug,
        });
    }
    cards
}

pub fn parse_detail(html: &str, slug: &str) -> AnimeDetail {
    let document = Html::parse_document(html);

    let title = select_text(&document, &[".Ficha .Title", "h1.Title"]);
    let alt_title = select_text(&document, &[".TitleAlt"]);
    let synopsis = select_text(&document, &[".Description p"]);
    let poster = document
        .select(&Selector::parse(".AnimeCover img, .Image img").unwrap())
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or("");
    let media_type = select_text(&document, &[".Ficha .Type"]);
    let rating = select_text(&document, &[".vtprmd"]);

    // The airing status lives in the text of the icon's parent element
    let status_from_icon = document
        .select(&Selector::parse(".Ficha .fa-tv").unwrap())
        .next()
        .and_then(|icon| icon.parent())
        .and_then(ElementRef::wrap)
        .map(|parent| parent.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let status = if status_from_icon.is_empty() {
        select_text(&document, &[".Type.A"])
    } else {
        status_from_icon
    };

    let mut genres = Vec::new();
    for genre in document.select(&Selector::parse(".Nvgs a, nav.Nvgs a").unwrap()) {
        genres.push(genre.text().collect::<String>().trim().to_string());
    }

    // Episodes are published as a script literal, not in the DOM
    let mut episodes = Vec::new();
    if let Some(value) = extract_script_json(&document, "episodes") {
        if let Some(entries) = value.as_array() {
            for pair in entries {
                let number = pair.get(0).and_then(Value::as_i64);
                let id = pair.get(1).and_then(Value::as_i64);
                if let (Some(number), Some(id)) = (number, id) {
                    episodes.push(Episode { number, id });
                }
            }
        }
    }
    episodes.sort_by_key(|episode| episode.number);

    AnimeDetail {
        title,
        alt_title,
        synopsis,
        poster: normalize_media_url(poster, BASE_URL),
        status,
        media_type,
        genres,
        episodes,
        slug: slug.to_string(),
        rating,
    }
}

pub fn parse_episode_page(html: &str, slug: &str) -> EpisodePage {
    let document = Html::parse_document(html);

    let anime_title = select_text(&document, &[".CapiTnworget .Title", "h1.Title"]);
    let (anime_slug, episode_number) = split_episode_slug(slug);

    let mut sources = Vec::new();
    if let Some(videos) = extract_script_json(&document, "videos") {
        if let Some(subs) = videos.get("SUB").and_then(Value::as_array) {
            for entry in subs {
                let server = entry
                    .get("title")
                    .and_then(Value::as_str)
                    .or_else(|| entry.get("server").and_then(Value::as_str))
                    .unwrap_or("Unknown");
                let url = entry
                    .get("url")
                    .and_then(Value::as_str)
                    .or_else(|| entry.get("code").and_then(Value::as_str))
                    .unwrap_or("");
                sources.push(EpisodeSource {
                    server: server.to_string(),
                    url: url.to_string(),
                });
            }
        }
    }

    // No structured video list: grab embedded frames instead
    if sources.is_empty() {
        let iframe_selector =
            Selector::parse(".CapiTnworget iframe, .player_conte iframe, iframe").unwrap();
        for frame in document.select(&iframe_selector) {
            if let Some(src) = frame.value().attr("src") {
                if !src.is_empty() {
                    sources.push(EpisodeSource {
                        server: "Player".to_string(),
                        url: src.to_string(),
                    });
                }
            }
        }
    }

    // Filtering happens once, after collection, so a blocked host cannot
    // short-circuit discovery of the other servers
    sources.retain(|source| !source.url.is_empty() && !is_blocked_url(&source.url));

    EpisodePage {
        sources,
        anime_slug,
        episode_number,
        anime_title,
    }
}

fn is_blocked_url(url: &str) -> bool {
    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };
    BLOCKED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

fn select_text(document: &Html, selectors: &[&str]) -> String {
    for selector in selectors {
        let parsed = Selector::parse(selector).unwrap();
        let text = text_of(document.select(&parsed).next());
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

fn text_of(element: Option<ElementRef>) -> String {
    element
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_HTML: &str = r#"
        <html><body>
        <ul class="ListEpisodios">
          <li>
            <a class="fa-play" href="/ver/some-anime-12"></a>
            <img src="/uploads/thumbs/some-anime.jpg">
            <strong class="Title">Some Anime</strong>
            <span class="Capi">Episodio 12</span>
          </li>
          <li>
            <a class="fa-play" href="/other/unrelated"></a>
            <strong class="Title">Broken Entry</strong>
          </li>
        </ul>
        <ul class="ListAnimes">
          <article class="Anime">
            <a href="/anime/some-anime"><img src="//cdn.animeflv.net/covers/1.jpg"></a>
            <h3 class="Title"><span>Some AnimeSome Anime</span></h3>
            <span class="Type">TVTV</span>
          </article>
          <article class="Anime">
            <a href="/browse/nope"><img src="/covers/2.jpg"></a>
            <h3 class="Title">No Slug</h3>
            <span class="Type">TV</span>
          </article>
        </ul>
        </body></html>"#;

    #[test]
    fn test_parse_home_recent() {
        let page = parse_home(HOME_HTML);
        assert_eq!(page.recent.len(), 1);
        let episode = &page.recent[0];
        assert_eq!(episode.anime_title, "Some Anime");
        assert_eq!(episode.episode_number, "12");
        assert_eq!(episode.slug, "some-anime-12");
        assert_eq!(episode.anime_slug, "some-anime");
        assert_eq!(
            episode.poster,
            "https://www3.animeflv.net/uploads/thumbs/some-anime.jpg"
        );
    }

    #[test]
    fn test_parse_home_trending_dedups_doubled_text() {
        let page = parse_home(HOME_HTML);
        assert_eq!(page.trending.len(), 1);
        let card = &page.trending[0];
        assert_eq!(card.title, "Some Anime");
        assert_eq!(card.media_type, "TV");
        assert_eq!(card.slug, "some-anime");
        assert_eq!(card.poster, "https://cdn.animeflv.net/covers/1.jpg");
    }

    #[test]
    fn test_entries_without_slug_are_dropped() {
        let page = parse_home(HOME_HTML);
        assert!(page.trending.iter().all(|card| !card.slug.is_empty()));
        assert!(page.recent.iter().all(|episode| !episode.slug.is_empty()));
    }

    #[test]
    fn test_parse_detail_sorts_episodes_ascending() {
        let html = r#"
            <div class="Ficha"><h1 class="Title">Some Anime</h1><span class="Type">TV</span></div>
            <div class="Description"><p>Synopsis here.</p></div>
            <script>var episodes = [[3,103],[1,101],[2,102]];</script>"#;
        let detail = parse_detail(html, "some-anime");
        let numbers: Vec<i64> = detail.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(detail.episodes[0].id, 101);
        assert_eq!(detail.title, "Some Anime");
        assert_eq!(detail.synopsis, "Synopsis here.");
    }

    #[test]
    fn test_parse_detail_keeps_duplicate_episodes() {
        let html = r#"<script>var episodes = [[1,101],[1,101],[2,102]];</script>"#;
        let detail = parse_detail(html, "x");
        assert_eq!(detail.episodes.len(), 3);
    }

    #[test]
    fn test_parse_detail_malformed_episode_literal_yields_empty() {
        let html = r#"<script>var episodes = [[3,103],[1,;</script>"#;
        let detail = parse_detail(html, "x");
        assert!(detail.episodes.is_empty());
    }

    #[test]
    fn test_parse_episode_sources_from_script() {
        let html = r#"<h1 class="Title">Some Anime</h1>
            <script>var videos = {"SUB":[
                {"server":"sv1","title":"Stape","url":"https://stape.example/e/1"},
                {"server":"sv2","code":"https://ok.example/e/2"},
                {"url":"https://habetar.com/e/3"}
            ]};</script>"#;
        let page = parse_episode_page(html, "some-anime-12");
        assert_eq!(page.anime_slug, "some-anime");
        assert_eq!(page.episode_number, "12");
        // the blocked habetar.com source is filtered out after collection
        assert_eq!(page.sources.len(), 2);
        assert_eq!(page.sources[0].server, "Stape");
        assert_eq!(page.sources[0].url, "https://stape.example/e/1");
        // `code` is accepted when `url` is absent
        assert_eq!(page.sources[1].server, "sv2");
        assert_eq!(page.sources[1].url, "https://ok.example/e/2");
    }

    #[test]
    fn test_default_server_name() {
        let html = r#"<script>var videos = {"SUB":[{"url":"https://a.example/e"}]};</script>"#;
        let page = parse_episode_page(html, "x-1");
        assert_eq!(page.sources[0].server, "Unknown");
    }

    #[test]
    fn test_iframe_fallback_when_no_video_literal() {
        let html = r#"
            <div class="player_conte"><iframe src="https://embed.example/v/9"></iframe></div>"#;
        let page = parse_episode_page(html, "some-anime-3");
        assert_eq!(page.sources.len(), 1);
        assert_eq!(page.sources[0].server, "Player");
        assert_eq!(page.sources[0].url, "https://embed.example/v/9");
    }

    #[test]
    fn test_iframe_fallback_when_video_literal_is_malformed() {
        let html = r#"
            <script>var videos = {oops;</script>
            <iframe src="https://embed.example/v/1"></iframe>"#;
        let page = parse_episode_page(html, "x-1");
        assert_eq!(page.sources.len(), 1);
        assert_eq!(page.sources[0].server, "Player");
    }

    #[test]
    fn test_blocked_domain_filtering_includes_subdomains() {
        assert!(is_blocked_url("https://habetar.com/v/1"));
        assert!(is_blocked_url("https://cdn.habetar.com/v/1"));
        assert!(!is_blocked_url("https://nothabetar.com/v/1"));
        assert!(!is_blocked_url("not a url"));
    }

    #[test]
    fn test_slug_without_numeric_suffix_used_for_both_fields() {
        let page = parse_episode_page("<html></html>", "pelicula-special");
        assert_eq!(page.anime_slug, "pelicula-special");
        assert_eq!(page.episode_number, "pelicula-special");
    }
}
