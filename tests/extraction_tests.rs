/// Extraction pipeline tests against fixture markup and payloads.
/// No network access: these exercise the parsing surface that the route
/// handlers feed with fetched documents.
use aniflux::helpers::{chapter_matches, dedup_doubled, split_episode_slug};
use aniflux::models::{MangaSeries, PaginatedResponse};
use aniflux::sources::{animeflv, ikigai_reader};

const HOME_FIXTURE: &str = r#"
<html><body>
<section>
  <ul class="ListEpisodios">
    <li>
      <a class="fa-play" href="/ver/kimetsu-no-yaiba-26?src=home"></a>
      <img src="/uploads/screenshots/kimetsu-26.jpg">
      <strong class="Title">Kimetsu no Yaiba</strong>
      <span class="Capi">Episodio 26</span>
    </li>
    <li>
      <a class="fa-play" href="/ver/one-piece-1071"></a>
      <img src="//cdn.animeflv.net/screenshots/op-1071.jpg">
      <strong class="Title">One Piece</strong>
      <span class="Capi">Episodio 1071</span>
    </li>
  </ul>
</section>
<section>
  <ul class="ListAnimes AX Rows A03 C02 D02">
    <article class="Anime alt B">
      <a href="/anime/kimetsu-no-yaiba">
        <img src="/uploads/covers/kimetsu.jpg">
        <h3 class="Title">Kimetsu no YaibaKimetsu no Yaiba</h3>
      </a>
      <span class="Type tv">AnimeAnime</span>
    </article>
  </ul>
</section>
</body></html>"#;

const EPISODE_FIXTURE: &str = r#"
<html><body>
<div class="CapiTnworget">
  <h1 class="Title">Kimetsu no Yaiba</h1>
</div>
<script>
  var anime_id = "281";
  var videos = {"SUB":[
    {"server":"sw","title":"SW","ads":0,"url":"https://swiftplayers.com/e/abc"},
    {"server":"yu","title":"YourUpload","code":"https://www.yourupload.com/embed/def"},
    {"server":"hb","title":"Habetar","url":"https://habetar.com/e/ghi"}
  ]};
</script>
</body></html>"#;

#[test]
fn test_home_extraction_end_to_end() {
    let page = animeflv::parse_home(HOME_FIXTURE);

    assert_eq!(page.recent.len(), 2);
    // the query string never leaks into the slug
    assert_eq!(page.recent[0].slug, "kimetsu-no-yaiba-26");
    assert_eq!(page.recent[0].anime_slug, "kimetsu-no-yaiba");
    assert_eq!(page.recent[0].episode_number, "26");
    assert_eq!(
        page.recent[0].poster,
        "https://www3.animeflv.net/uploads/screenshots/kimetsu-26.jpg"
    );
    // protocol-relative posters get an explicit scheme
    assert_eq!(
        page.recent[1].poster,
        "https://cdn.animeflv.net/screenshots/op-1071.jpg"
    );

    assert_eq!(page.trending.len(), 1);
    assert_eq!(page.trending[0].title, "Kimetsu no Yaiba");
    assert_eq!(page.trending[0].media_type, "Anime");
    assert_eq!(page.trending[0].id, page.trending[0].slug);
}

#[test]
fn test_search_uses_the_same_card_extraction() {
    let results = animeflv::parse_listing(HOME_FIXTURE);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].slug, "kimetsu-no-yaiba");
}

#[test]
fn test_episode_sources_filter_blocked_hosts_after_collection() {
    let page = animeflv::parse_episode_page(EPISODE_FIXTURE, "kimetsu-no-yaiba-26");

    assert_eq!(page.anime_title, "Kimetsu no Yaiba");
    assert_eq!(page.anime_slug, "kimetsu-no-yaiba");
    assert_eq!(page.episode_number, "26");

    // habetar.com is on the deny-list; the sources before and after it both
    // survive, so a blocked host cannot short-circuit discovery
    let servers: Vec<&str> = page.sources.iter().map(|s| s.server.as_str()).collect();
    assert_eq!(servers, vec!["SW", "YourUpload"]);
}

#[test]
fn test_reader_page_extraction_prefers_viewer_images() {
    let html = r#"
        <html><body>
        <section><div>
          <img src="https://media.ikigaimangas.cloud/series/44/900/01.webp">
          <img src="https://media.ikigaimangas.cloud/series/44/900/02.webp">
        </div></section>
        <script>self.__next_f.push(["https:\/\/media.ikigaimangas.cloud\/series\/44\/900\/99.webp"])</script>
        </body></html>"#;
    let images = ikigai_reader::extract_reader_images(html, "https://visorikigai.net");
    // the DOM strategy wins; the script strategy is never consulted
    assert_eq!(
        images,
        vec![
            "https://media.ikigaimangas.cloud/series/44/900/01.webp",
            "https://media.ikigaimangas.cloud/series/44/900/02.webp",
        ]
    );
}

#[test]
fn test_reader_page_with_no_cdn_images_yields_empty() {
    let html = r#"<html><body><img src="https://ads.example/banner.jpg"></body></html>"#;
    assert!(ikigai_reader::extract_reader_images(html, "https://visorikigai.net").is_empty());
}

#[test]
fn test_paginated_response_round_trip_preserves_unknown_fields() {
    let upstream = r#"{
        "data": [{"id": 3, "name": "Solo Farming", "slug": "solo-farming", "rank": 2}],
        "current_page": 1, "last_page": 40, "total": 720, "per_page": 18,
        "next_page_url": "https://panel.ikigaimangas.com/api/swf/series?page=2"
    }"#;
    let page: PaginatedResponse<MangaSeries> = serde_json::from_str(upstream).unwrap();
    let out = serde_json::to_value(&page).unwrap();
    assert_eq!(out["last_page"], 40);
    assert_eq!(out["data"][0]["rank"], 2);
    assert_eq!(
        out["next_page_url"],
        "https://panel.ikigaimangas.com/api/swf/series?page=2"
    );
}

#[test]
fn test_normalization_properties() {
    assert_eq!(dedup_doubled("ActionAction"), "Action");
    assert_eq!(dedup_doubled("Action"), "Action");
    assert_eq!(
        split_episode_slug("some-anime-12"),
        ("some-anime".to_string(), "12".to_string())
    );
    assert!(chapter_matches("12", "12.0"));
    assert!(chapter_matches("12,5", "12.5"));
    assert!(chapter_matches("Extra", "extra"));
}
