use serde::{Deserialize, Serialize};

/// Classification reported by the catalog for a search hit
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Series,
    Episodic,
    Unknown,
}

impl EntryKind {
    /// Map the catalog's raw `type` string onto a kind. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manga" | "manhua" | "manhwa" => EntryKind::Series,
            "anime" => EntryKind::Episodic,
            _ => EntryKind::Unknown,
        }
    }
}

/// One enrichment lookup, listed in the order the pipeline runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Description,
    Chapters,
    CoverImage,
    ChapterPages,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Description,
        Stage::Chapters,
        Stage::CoverImage,
        Stage::ChapterPages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Description => "description",
            Stage::Chapters => "chapters",
            Stage::CoverImage => "cover_image",
            Stage::ChapterPages => "chapter_pages",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: String,
    pub url: String,
    pub release_date: String,
}

/// One discovered series.
///
/// Created bare by the search step, then filled in by the enrichment stages.
/// `chapter_pages` is either empty (stage not run) or positionally aligned
/// with `chapters`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub source_url: String,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub chapters: Vec<Chapter>,
    pub image_url: Option<String>,
    pub chapter_pages: Vec<Vec<String>>,
}

impl Entry {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            kind,
            description: None,
            chapters: Vec::new(),
            image_url: None,
            chapter_pages: Vec::new(),
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replaces the chapter list. Page lists scraped for the previous
    /// chapter list are dropped since they no longer line up.
    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        self.chapters = chapters;
        self.chapter_pages.clear();
    }

    pub fn set_image_url(&mut self, image_url: Option<String>) {
        self.image_url = image_url;
    }

    /// Stores per-chapter page URLs. Lengths must match `chapters`; a
    /// mismatched list is padded or truncated so positions stay aligned.
    pub fn set_chapter_pages(&mut self, mut pages: Vec<Vec<String>>) {
        if pages.len() != self.chapters.len() {
            log::warn!(
                "Page list length {} does not match {} chapters for {}",
                pages.len(),
                self.chapters.len(),
                self.source_url
            );
            pages.resize_with(self.chapters.len(), Vec::new);
        }
        self.chapter_pages = pages;
    }

    pub fn page_count(&self) -> usize {
        self.chapter_pages.iter().map(|p| p.len()).sum()
    }
}

/// Raw search endpoint response. `data` is an array of hits on success but
/// an object carrying an error message when nothing matched.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One element of the search response `data` array.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}
