use crate::error::CatalogError;
use crate::models::{Entry, Stage};
use crate::ranking;
use crate::sources::wp_manga::WpMangaCatalog;
use futures::stream::{self, StreamExt};

/// Runs the enrichment stages over search hits.
///
/// Within one entry the stages run in `Stage::ALL` order, since chapter pages
/// need the chapter list. Entries are enriched concurrently, at most
/// `entry_concurrency` at a time, and come back in input order.
pub struct EnrichmentPipeline<'a> {
    catalog: &'a WpMangaCatalog,
    entry_concurrency: usize,
}

impl<'a> EnrichmentPipeline<'a> {
    pub fn new(catalog: &'a WpMangaCatalog, entry_concurrency: usize) -> Self {
        Self {
            catalog,
            entry_concurrency: entry_concurrency.max(1),
        }
    }

    /// Search, enrich every hit, then rank by title similarity to `query`
    pub async fn discover(&self, query: &str) -> Vec<Entry> {
        let entries = self.catalog.search(query).await;
        if entries.is_empty() {
            log::info!("No results for {:?}", query);
            return entries;
        }
        log::info!("Found {} results for {:?}, enriching", entries.len(), query);

        let enriched = self.enrich_all(entries).await;

        let report = EnrichmentReport::from_entries(&enriched);
        report.log();

        ranking::rank(query, enriched)
    }

    pub async fn enrich_all(&self, entries: Vec<Entry>) -> Vec<Entry> {
        stream::iter(entries)
            .map(|entry| self.enrich_entry(entry))
            .buffered(self.entry_concurrency)
            .collect()
            .await
    }

    pub async fn enrich_entry(&self, mut entry: Entry) -> Entry {
        for stage in Stage::ALL {
            self.run_stage(&mut entry, stage).await;
        }
        entry
    }

    /// Run one stage, overwriting whatever it produced before. A failed
    /// stage leaves its field at the default and returns false.
    pub async fn run_stage(&self, entry: &mut Entry, stage: Stage) -> bool {
        match stage {
            Stage::Description => match self.catalog.fetch_description(entry).await {
                Ok(description) => {
                    entry.set_description(description);
                    true
                }
                Err(e) => {
                    degrade(entry, stage, &e);
                    entry.set_description(None);
                    false
                }
            },
            Stage::Chapters => match self.catalog.fetch_chapters(entry).await {
                Ok(chapters) => {
                    entry.set_chapters(chapters);
                    true
                }
                Err(e) => {
                    degrade(entry, stage, &e);
                    entry.set_chapters(Vec::new());
                    false
                }
            },
            Stage::CoverImage => match self.catalog.fetch_cover_image(entry).await {
                Ok(image_url) => {
                    entry.set_image_url(image_url);
                    true
                }
                Err(e) => {
                    degrade(entry, stage, &e);
                    entry.set_image_url(None);
                    false
                }
            },
            Stage::ChapterPages => {
                let pages = self.catalog.fetch_chapter_pages(&entry.chapters).await;
                entry.set_chapter_pages(pages);
                true
            }
        }
    }
}

fn degrade(entry: &Entry, stage: Stage, error: &CatalogError) {
    log::warn!(
        "[{}] {} ({}): {}; leaving field empty",
        stage.as_str(),
        entry.title,
        entry.source_url,
        error
    );
}

/// What a run managed to fill in, across all entries
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub entries: usize,
    pub with_description: usize,
    pub with_chapters: usize,
    pub with_cover: usize,
    pub chapters: usize,
    pub chapters_without_pages: usize,
    pub pages: usize,
}

impl EnrichmentReport {
    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut report = Self {
            entries: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            if entry.description.is_some() {
                report.with_description += 1;
            }
            if !entry.chapters.is_empty() {
                report.with_chapters += 1;
            }
            if entry.image_url.is_some() {
                report.with_cover += 1;
            }
            report.chapters += entry.chapters.len();
            report.chapters_without_pages += entry.chapter_pages.iter().filter(|p| p.is_empty()).count();
            report.pages += entry.page_count();
        }
        report
    }

    pub fn log(&self) {
        log::info!(
            "Enriched {} entries: {} descriptions, {} chapter lists ({} chapters, {} without pages), {} covers, {} pages",
            self.entries,
            self.with_description,
            self.with_chapters,
            self.chapters,
            self.chapters_without_pages,
            self.with_cover,
            self.pages
        );
    }
}
