//! Jikan v4 client for the weekly broadcast schedule

use crate::error::ScrapeError;
use crate::http_client::FetchClient;
use crate::models::ScheduleEntry;
use serde_json::Value;

const API_BASE: &str = "https://api.jikan.moe/v4";

pub const VALID_DAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

pub async fn schedule(fetch: &FetchClient, day: &str) -> Result<Vec<ScheduleEntry>, ScrapeError> {
    let url = format!("{}/schedules?filter={}&sfw=true&limit=25", API_BASE, day);
    let payload: Value = fetch.fetch_json(&url).await?;
    Ok(map_schedule(&payload))
}

fn map_schedule(payload: &Value) -> Vec<ScheduleEntry> {
    let mut animes = Vec::new();
    for entry in payload["data"].as_array().cloned().unwrap_or_default() {
        let poster = entry["images"]["jpg"]["large_image_url"]
            .as_str()
            .or_else(|| entry["images"]["jpg"]["image_url"].as_str())
            .unwrap_or("")
            .to_string();
        animes.push(ScheduleEntry {
            mal_id: entry["mal_id"].as_i64().unwrap_or(0),
            title: entry["title"].as_str().unwrap_or("").to_string(),
            poster,
            media_type: entry["type"].as_str().unwrap_or("TV").to_string(),
            score: entry["score"].as_f64(),
            broadcast_time: entry["broadcast"]["time"].as_str().map(str::to_string),
        });
    }
    animes
}
