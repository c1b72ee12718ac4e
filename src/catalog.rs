use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::catalog::{Bhajan, Book, PanchangEntry, Vidhi, Video};

/// Read-only content catalog loaded once at startup. Collections keep their
/// load order; nothing mutates them afterwards. The scan counter tracks how
/// many full search scans have run, so cache hits are observable in tests.
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub bhajans: Vec<Bhajan>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub vidhis: Vec<Vidhi>,
    #[serde(default)]
    pub panchang: Vec<PanchangEntry>,
    #[serde(skip)]
    scans: AtomicU64,
}

impl Catalog {
    pub fn new(
        books: Vec<Book>,
        bhajans: Vec<Bhajan>,
        videos: Vec<Video>,
        vidhis: Vec<Vidhi>,
        panchang: Vec<PanchangEntry>,
    ) -> Self {
        Self {
            books,
            bhajans,
            videos,
            vidhis,
            panchang,
            scans: AtomicU64::new(0),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn bhajan(&self, id: &str) -> Option<&Bhajan> {
        self.bhajans.iter().find(|b| b.id == id)
    }

    pub fn video(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn vidhi(&self, id: &str) -> Option<&Vidhi> {
        self.vidhis.iter().find(|v| v.id == id)
    }

    /// City match is case-insensitive; absent entries are simply `None`.
    pub fn panchang_for(&self, date: NaiveDate, city: &str) -> Option<&PanchangEntry> {
        self.panchang
            .iter()
            .find(|e| e.date == date && e.city.eq_ignore_ascii_case(city))
    }
}
