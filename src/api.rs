//! TMDB (The Movie Database) API client

use std::time::Duration;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::{MovieDetail, Section};

/// Poster width used on result cards
pub const CARD_POSTER_WIDTH: &str = "w200";
/// Poster width used in the detail window
pub const DETAIL_POSTER_WIDTH: &str = "w300";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no TMDB API key configured (set {env} or api_key in config.json)", env = crate::config::API_KEY_ENV)]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Payload(String),
}

/// First page of a TMDB list or search endpoint
#[derive(Debug, Deserialize)]
struct ResultsPage {
    results: Vec<MovieDetail>,
}

/// Error body TMDB sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct StatusBody {
    status_message: String,
}

#[derive(Clone)]
pub struct TmdbClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            agent: create_agent(10, 30),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            language: "en-US".to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.api_base_url, config.effective_api_key())
            .with_language(&config.language)
            .with_timeouts(config.connect_timeout_secs, config.request_timeout_secs)
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_timeouts(mut self, connect_secs: u64, total_secs: u64) -> Self {
        self.agent = create_agent(connect_secs, total_secs);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_results(&self, path: &str, query: Option<&str>) -> Result<Vec<MovieDetail>, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let url = self.endpoint(path);
        tracing::debug!(%url, query, "tmdb request");

        let mut request = self
            .agent
            .get(&url)
            .query("api_key", &self.api_key)
            .query("language", &self.language)
            .query("page", "1")
            .header("Accept", "application/json");
        if let Some(query) = query {
            request = request.query("query", query);
        }

        let mut response = request.call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;

        check_status(status, &body)?;
        parse_results(&body)
    }

    pub fn search_by_title(&self, query: &str) -> Result<Vec<MovieDetail>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_results("search/movie", Some(query))
    }

    pub fn fetch_top_rated(&self) -> Result<Vec<MovieDetail>, ApiError> {
        self.get_results("movie/top_rated", None)
    }

    pub fn fetch_popular(&self) -> Result<Vec<MovieDetail>, ApiError> {
        self.get_results("movie/popular", None)
    }

    /// Now-playing list, most recent release first
    pub fn fetch_now_playing(&self) -> Result<Vec<MovieDetail>, ApiError> {
        let mut movies = self.get_results("movie/now_playing", None)?;
        newest_first(&mut movies);
        Ok(movies)
    }

    pub fn fetch_section(&self, section: Section) -> Result<Vec<MovieDetail>, ApiError> {
        match section {
            Section::TopRated => self.fetch_top_rated(),
            Section::Popular => self.fetch_popular(),
            Section::NowPlaying => self.fetch_now_playing(),
        }
    }
}

fn create_agent(connect_secs: u64, total_secs: u64) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(total_secs)))
        .timeout_connect(Some(Duration::from_secs(connect_secs)))
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Map a non-2xx status to an error, preferring TMDB's own status message
pub fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let message = serde_json::from_str::<StatusBody>(body)
        .map(|b| b.status_message)
        .ok()
        .or_else(|| {
            ureq::http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown error".to_string());

    Err(ApiError::Status { status, message })
}

/// Decode the `results` array of a list/search response
pub fn parse_results(body: &str) -> Result<Vec<MovieDetail>, ApiError> {
    serde_json::from_str::<ResultsPage>(body)
        .map(|page| page.results)
        .map_err(|e| ApiError::Payload(e.to_string()))
}

/// ISO dates sort lexicographically; undated entries end up last
pub fn newest_first(movies: &mut [MovieDetail]) {
    movies.sort_by(|a, b| b.summary.release_date.cmp(&a.summary.release_date));
}

/// Poster image URL, or None when the movie has no poster
pub fn poster_url(image_base: &str, width: &str, poster_path: Option<&str>) -> Option<String> {
    match poster_path {
        Some(path) if !path.trim().is_empty() => Some(format!("{}{}{}", image_base, width, path)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
