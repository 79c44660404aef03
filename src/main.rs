use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde_json::json;
use std::collections::HashMap;

use aniflux::app_state::AppState;
use aniflux::config::Config;
use aniflux::http_client::FetchClient;
use aniflux::sources::{animeflv, ikigai, ikigai_reader, jikan};

#[get("/home")]
async fn home(data: web::Data<AppState>) -> impl Responder {
    match animeflv::home_page(&data.fetch).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            error!("Home fetch error: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to fetch homepage data"}))
        }
    }
}

#[get("/search")]
async fn search(
    data: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let q = match query.get("q").filter(|q| !q.is_empty()) {
        Some(q) => q,
        None => {
            return HttpResponse::BadRequest().json(json!({"error": "Missing query parameter"}))
        }
    };
    match animeflv::search(&data.fetch, q).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!("Search error: {}", e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to search anime"}))
        }
    }
}

#[get("/schedule")]
async fn schedule(
    data: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let day = query
        .get("day")
        .map(|d| d.to_lowercase())
        .unwrap_or_else(|| "monday".to_string());
    if !jikan::VALID_DAYS.contains(&day.as_str()) {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Invalid day. Use: {}", jikan::VALID_DAYS.join(", "))
        }));
    }
    match jikan::schedule(&data.fetch, &day).await {
        Ok(animes) => HttpResponse::Ok().json(json!({"day": day, "animes": animes})),
        Err(e) => {
            error!("Schedule fetch error: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to fetch schedule data"}))
        }
    }
}

#[get("/anime/{slug}")]
async fn anime_detail(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    match animeflv::anime_detail(&data.fetch, &slug).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => {
            error!("Anime detail error for {}: {}", slug, e);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to fetch anime detail"}))
        }
    }
}

#[get("/episode/{slug}")]
async fn episode_sources(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    match animeflv::episode_sources(&data.fetch, &slug).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            error!("Episode sources error for {}: {}", slug, e);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to fetch episode sources"}))
        }
    }
}

#[get("/manga/home")]
async fn manga_home(data: web::Data<AppState>) -> impl Responder {
    // Both halves of the home view load concurrently; there is no meaningful
    // partial home view, so a failure of either fails the whole request
    match tokio::try_join!(
        ikigai::popular(&data.fetch, 1),
        ikigai::new_chapters(&data.fetch, 1)
    ) {
        Ok((mut popular, mut recent)) => {
            popular.data.truncate(12);
            recent.data.truncate(15);
            HttpResponse::Ok().json(json!({"popular": popular.data, "recent": recent.data}))
        }
        Err(e) => {
            error!("Manga home error: {}", e);
            HttpResponse::BadGateway()
                .json(json!({"error": format!("Failed to load manga home: {}", e)}))
        }
    }
}

#[get("/manga/list")]
async fn manga_list(
    data: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);
    match ikigai::all_series(&data.fetch, page, 18).await {
        Ok(series) => HttpResponse::Ok().json(series),
        Err(e) => {
            error!("Manga list error: {}", e);
            HttpResponse::BadGateway()
                .json(json!({"error": format!("Failed to load manga list: {}", e)}))
        }
    }
}

#[get("/manga/{slug}/chapters")]
async fn manga_chapters(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let slug = path.into_inner();
    let page = query
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);
    match ikigai::series_chapters(&data.fetch, &slug, page).await {
        Ok(chapters) => HttpResponse::Ok().json(chapters),
        Err(e) => {
            error!("Manga chapters error for {}: {}", slug, e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load chapters"}))
        }
    }
}

#[get("/manga/{slug}")]
async fn manga_detail(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    match ikigai::series_detail(&data.fetch, &slug).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => {
            error!("Manga detail error for {}: {}", slug, e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load manga"}))
        }
    }
}

#[get("/manga/{slug}/{chapter}")]
async fn manga_chapter_images(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (slug, chapter) = path.into_inner();
    // Every failure inside the resolver is absorbed into "no images"; an
    // empty list is a valid terminal state and still answers 200
    let images = ikigai_reader::chapter_images(&data.fetch, &slug, &chapter).await;
    HttpResponse::Ok().json(json!({"images": images, "slug": slug, "chapter": chapter}))
}

#[get("/proxy-image")]
async fn proxy_image(
    data: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let url = match query.get("url").filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => return HttpResponse::BadRequest().json(json!({"error": "Missing url"})),
    };
    match data
        .fetch
        .fetch_bytes(url, Some(&format!("{}/", animeflv::BASE_URL)))
        .await
    {
        Ok((bytes, content_type)) => HttpResponse::Ok()
            .insert_header(("Content-Type", content_type))
            .insert_header(("Cache-Control", "public, max-age=86400"))
            .body(bytes),
        Err(e) => {
            error!("Image proxy error for {}: {}", url, e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to proxy image"}))
        }
    }
}

#[get("/embed")]
async fn embed(query: web::Query<HashMap<String, String>>) -> impl Responder {
    let url = match query.get("url").filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => return HttpResponse::BadRequest().json(json!({"error": "Missing url"})),
    };
    let src = url.replace('"', "&quot;");
    let html = format!(
        r#"<!DOCTYPE html>
<html><head>
<meta name="referrer" content="no-referrer">
<style>*{{margin:0;padding:0;overflow:hidden;background:#000}}iframe{{width:100%;height:100vh;border:none}}</style>
</head><body>
<iframe src="{}" allowfullscreen allow="autoplay; encrypted-media; picture-in-picture" referrerpolicy="no-referrer"></iframe>
</body></html>"#,
        src
    );
    HttpResponse::Ok()
        .content_type("text/html")
        .insert_header(("X-Frame-Options", "SAMEORIGIN"))
        .insert_header(("Content-Security-Policy", "frame-ancestors 'self'"))
        .body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();

    let config = Config::load();
    let fetch = FetchClient::new(&config.fetch).expect("Failed to build HTTP client");
    let data = web::Data::new(AppState { fetch, config });

    // Try to bind to an available port starting at 8080
    let mut last_err: Option<std::io::Error> = None;
    for port in 8080..=8090 {
        let data_clone = data.clone();
        let addr = format!("127.0.0.1:{}", port);
        match HttpServer::new(move || {
            // Literal segments are registered ahead of parameterized ones:
            // /manga/home and /manga/list before /manga/{slug}, and
            // /manga/{slug}/chapters before /manga/{slug}/{chapter}
            App::new()
                .app_data(data_clone.clone())
                .service(home)
                .service(search)
                .service(schedule)
                .service(anime_detail)
                .service(episode_sources)
                .service(manga_home)
                .service(manga_list)
                .service(manga_chapters)
                .service(manga_detail)
                .service(manga_chapter_images)
                .service(proxy_image)
                .service(embed)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                return server.run().await;
            }
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "No available ports 8080-8090")
    }))
}
