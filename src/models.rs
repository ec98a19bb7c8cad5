//! Data models for Movie Mingle

use serde::{Deserialize, Serialize};

/// Catalog sections fetched once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    TopRated,
    Popular,
    NowPlaying,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::TopRated, Section::Popular, Section::NowPlaying];

    /// Heading shown above the section
    pub fn title(&self) -> &'static str {
        match self {
            Section::TopRated => "Top Movies",
            Section::Popular => "Recommended Movies",
            Section::NowPlaying => "Recently Released",
        }
    }

    /// Used in the inline failure message
    pub fn noun(&self) -> &'static str {
        match self {
            Section::TopRated => "top movies",
            Section::Popular => "recommended movies",
            Section::NowPlaying => "recently released movies",
        }
    }
}

/// Jump targets in the top bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Catalog(Section),
    Favourites,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::Catalog(Section::TopRated),
        Anchor::Catalog(Section::Popular),
        Anchor::Catalog(Section::NowPlaying),
        Anchor::Favourites,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Anchor::Catalog(section) => section.title(),
            Anchor::Favourites => "Favourites",
        }
    }
}

/// Card-level view of a movie. This is also the persisted favourite record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
}

/// Movie as returned by the list endpoints, including the overview text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default)]
    pub overview: String,
}

impl MovieDetail {
    pub fn id(&self) -> i64 {
        self.summary.id
    }
}
