use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed set of catalog categories. Scan order (books, bhajans, videos,
/// vidhis, panchang) is the declaration order and drives tie-breaking in
/// search results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Books,
    Bhajans,
    Videos,
    Vidhis,
    Panchang,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Books,
        Category::Bhajans,
        Category::Videos,
        Category::Vidhis,
        Category::Panchang,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Bhajans => "Bhajans",
            Self::Videos => "Videos",
            Self::Vidhis => "Pooja Vidhis",
            Self::Panchang => "Panchang",
        }
    }

    pub fn route_prefix(&self) -> &'static str {
        match self {
            Self::Books => "/books",
            Self::Bhajans => "/bhajans",
            Self::Videos => "/videos",
            Self::Vidhis => "/vidhis",
            Self::Panchang => "/panchang",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Books => write!(f, "books"),
            Self::Bhajans => write!(f, "bhajans"),
            Self::Videos => write!(f, "videos"),
            Self::Vidhis => write!(f, "vidhis"),
            Self::Panchang => write!(f, "panchang"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub cover_url: Option<String>,
    pub pdf_url: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bhajan {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
    pub deity: String,
    pub category: String,
    pub audio_url: String,
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidhiStep {
    pub title: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vidhi {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deity: String,
    pub steps: Vec<VidhiStep>,
}

/// Named auspicious time window within a panchang day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Muhurat {
    pub name: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanchangEntry {
    pub date: NaiveDate,
    pub city: String,
    pub tithi: String,
    pub nakshatra: String,
    pub sunrise: String,
    pub sunset: String,
    #[serde(default)]
    pub festivals: Vec<String>,
    #[serde(default)]
    pub muhurats: Vec<Muhurat>,
}

impl PanchangEntry {
    /// Stable id derived from the (date, city) key.
    pub fn id(&self) -> String {
        format!("panchang-{}-{}", self.date, self.city.to_lowercase().replace(' ', "-"))
    }
}
