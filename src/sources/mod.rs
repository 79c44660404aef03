// HTML scraping source
pub mod animeflv;

// JSON API sources
pub mod ikigai;
pub mod jikan;

// Reader mirror fallback chain for chapter images
pub mod ikigai_reader;
