use crate::error::CatalogError;
use crate::http_client::{HttpClient, HttpClientConfig};
use crate::metrics::{track_request, MetricsTracker};
use crate::models::{Chapter, Entry, EntryKind, SearchHit, SearchResponse, Stage};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Arc;

const SEARCH_ACTION: &str = "wp-manga-search-manga";
const SEARCH_STAGE: &str = "search";
const SHOW_MORE: &str = "Show more";

// Structural path first, then a looser match for themes that rename the wrapper
const COVER_SELECTORS: &[&str] = &[
    "div.tab-summary > div.summary_image > a > img",
    ".summary_image a img",
];

/// Where the catalog lives and which headers identify us to it.
///
/// Built once and handed to `WpMangaCatalog::new`; nothing here changes
/// after construction.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    base_url: String,
    headers: &'static [(&'static str, &'static str)],
}

impl CatalogConfig {
    pub fn new(base_url: &str, headers: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self) -> String {
        format!("{}/wp-admin/admin-ajax.php", self.base_url)
    }

    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => log::warn!("Skipping invalid header {}", name),
            }
        }
        map
    }
}

/// Client for a WP-Manga (Madara theme) catalog: title search plus the four
/// detail lookups used to enrich a search hit.
pub struct WpMangaCatalog {
    config: CatalogConfig,
    http: HttpClient,
    metrics: Arc<MetricsTracker>,
}

impl WpMangaCatalog {
    pub fn new(config: CatalogConfig, http_config: HttpClientConfig) -> Result<Self, CatalogError> {
        let http = HttpClient::with_config(http_config, config.header_map())?;
        Ok(Self {
            config,
            http,
            metrics: Arc::new(MetricsTracker::new()),
        })
    }

    pub fn metrics(&self) -> &Arc<MetricsTracker> {
        &self.metrics
    }

    /// Search the catalog by title. Any failure yields an empty list.
    pub async fn search(&self, query: &str) -> Vec<Entry> {
        match self.try_search(query).await {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    pub async fn try_search(&self, query: &str) -> Result<Vec<Entry>, CatalogError> {
        let search_url = self.config.search_url();
        track_request(&self.metrics, SEARCH_STAGE, async {
            let body = self
                .http
                .post_form(&search_url, &[("action", SEARCH_ACTION), ("title", query)])
                .await?;
            parse_search_response(&body)
        })
        .await
    }

    pub async fn fetch_description(&self, entry: &Entry) -> Result<Option<String>, CatalogError> {
        track_request(&self.metrics, Stage::Description.as_str(), async {
            let html = self.http.get_text(&entry.source_url).await?;
            parse_description(&entry.source_url, &html)
        })
        .await
    }

    pub async fn fetch_chapters(&self, entry: &Entry) -> Result<Vec<Chapter>, CatalogError> {
        track_request(&self.metrics, Stage::Chapters.as_str(), async {
            let html = self.http.get_text(&entry.source_url).await?;
            let chapters = parse_chapters(&entry.source_url, &html)?;
            log::debug!("Found {} chapters for {}", chapters.len(), entry.source_url);
            Ok::<_, CatalogError>(chapters)
        })
        .await
    }

    pub async fn fetch_cover_image(&self, entry: &Entry) -> Result<Option<String>, CatalogError> {
        track_request(&self.metrics, Stage::CoverImage.as_str(), async {
            let html = self.http.get_text(&entry.source_url).await?;
            parse_cover_image(&entry.source_url, &html)
        })
        .await
    }

    /// Page image URLs of a single chapter, in reading order
    pub async fn fetch_chapter_images(&self, chapter: &Chapter) -> Result<Vec<String>, CatalogError> {
        track_request(&self.metrics, Stage::ChapterPages.as_str(), async {
            let html = self.http.get_text(&chapter.url).await?;
            parse_chapter_images(&chapter.url, &html)
        })
        .await
    }

    /// Page lists for every chapter, aligned with `chapters`. A chapter that
    /// fails to load contributes an empty list; the rest are still fetched.
    pub async fn fetch_chapter_pages(&self, chapters: &[Chapter]) -> Vec<Vec<String>> {
        let width = self.http.config().max_in_flight.max(1);
        stream::iter(chapters)
            .map(|chapter| async move {
                match self.fetch_chapter_images(chapter).await {
                    Ok(urls) => urls,
                    Err(e) => {
                        log::warn!(
                            "Failed to fetch pages for chapter {:?} ({}): {}",
                            chapter.number,
                            chapter.url,
                            e
                        );
                        Vec::new()
                    }
                }
            })
            .buffered(width)
            .collect()
            .await
    }
}

fn selector(page_url: &str, css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css)
        .map_err(|e| CatalogError::miss(page_url, format!("valid selector {:?} ({:?})", css, e)))
}

/// Absolute hrefs are returned as written; only relative ones are joined
fn resolve_url(base: Option<&Url>, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Parse the admin-ajax search payload.
///
/// A `data` field that is not an array means "no matches". Elements missing
/// a field, or with an empty title or url, are skipped on their own.
pub fn parse_search_response(body: &str) -> Result<Vec<Entry>, CatalogError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::MalformedPayload(e.to_string()))?;

    let items = match response.data {
        Value::Array(items) => items,
        other => {
            log::debug!(
                "Search returned no hits (success={:?}, data={})",
                response.success,
                other
            );
            return Ok(Vec::new());
        }
    };

    let entries = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_search_hit(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping search result #{}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(entries)
}

fn parse_search_hit(item: Value) -> Result<Entry, CatalogError> {
    let hit: SearchHit =
        serde_json::from_value(item).map_err(|e| CatalogError::MalformedPayload(e.to_string()))?;

    let title = hit.title.trim();
    let url = hit.url.trim();
    if title.is_empty() || url.is_empty() {
        return Err(CatalogError::MalformedPayload(format!(
            "empty title or url in hit {:?}",
            hit
        )));
    }

    Ok(Entry::new(title, url, EntryKind::parse(&hit.kind)))
}

/// Summary text of a detail page with every "Show more" removed.
/// `None` when the summary block is missing or blank.
pub fn parse_description(page_url: &str, html: &str) -> Result<Option<String>, CatalogError> {
    let document = Html::parse_document(html);
    let summary = selector(page_url, ".description-summary")?;

    let description = document.select(&summary).next().and_then(|element| {
        let text = element.text().collect::<String>().replace(SHOW_MORE, "");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    });

    Ok(description)
}

/// Chapter list of a detail page, in document order.
///
/// Every `li.wp-manga-chapter` must carry an anchor with an `href` and a
/// `span.chapter-release-date`; one broken item fails the whole list.
pub fn parse_chapters(page_url: &str, html: &str) -> Result<Vec<Chapter>, CatalogError> {
    let document = Html::parse_document(html);
    let items = selector(page_url, "li.wp-manga-chapter")?;
    let anchor = selector(page_url, "a")?;
    let release = selector(page_url, "span.chapter-release-date")?;
    let base = Url::parse(page_url).ok();

    document
        .select(&items)
        .enumerate()
        .map(|(index, item)| {
            let link = item
                .select(&anchor)
                .next()
                .ok_or_else(|| CatalogError::miss(page_url, format!("anchor in chapter item #{}", index)))?;
            let href = link
                .value()
                .attr("href")
                .ok_or_else(|| CatalogError::miss(page_url, format!("href in chapter item #{}", index)))?;
            let release_date = item
                .select(&release)
                .next()
                .ok_or_else(|| CatalogError::miss(page_url, format!("release date in chapter item #{}", index)))?;

            Ok(Chapter {
                number: link.text().collect::<String>().trim().to_string(),
                url: resolve_url(base.as_ref(), href.trim()),
                release_date: release_date.text().collect::<String>().trim().to_string(),
            })
        })
        .collect()
}

pub fn parse_cover_image(page_url: &str, html: &str) -> Result<Option<String>, CatalogError> {
    let document = Html::parse_document(html);

    for css in COVER_SELECTORS {
        let image = selector(page_url, css)?;
        if let Some(img) = document.select(&image).next() {
            return Ok(img.value().attr("src").map(|src| src.trim().to_string()));
        }
    }

    Ok(None)
}

/// `data-src` of every `img.wp-manga-chapter-img`; images without it are skipped
pub fn parse_chapter_images(page_url: &str, html: &str) -> Result<Vec<String>, CatalogError> {
    let document = Html::parse_document(html);
    let images = selector(page_url, "img.wp-manga-chapter-img")?;

    Ok(document
        .select(&images)
        .filter_map(|img| img.value().attr("data-src"))
        .map(|src| src.trim().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://manhuaus.com/manga/dragon-ball/";

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"success":true,"data":[
            {"title":"Dragon Ball","url":"https://manhuaus.com/manga/dragon-ball/","type":"manga"},
            {"title":"Dragon Raja","url":"https://manhuaus.com/manga/dragon-raja/","type":"comic"}
        ]}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Dragon Ball");
        assert_eq!(entries[0].kind, EntryKind::Series);
        assert_eq!(entries[1].kind, EntryKind::Unknown);
        assert!(entries[0].chapters.is_empty());
        assert!(entries[0].description.is_none());
    }

    #[test]
    fn test_parse_search_response_skips_malformed_hit() {
        let body = r#"{"data":[
            {"title":"No Url","type":"manga"},
            {"title":"","url":"https://manhuaus.com/manga/blank/","type":"manga"},
            {"title":"Kept","url":"https://manhuaus.com/manga/kept/","type":"anime"}
        ]}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Kept");
        assert_eq!(entries[0].kind, EntryKind::Episodic);
    }

    #[test]
    fn test_parse_search_response_no_matches() {
        let body = r#"{"success":false,"data":{"error":"not found","message":"No Manga found"}}"#;
        assert!(parse_search_response(body).unwrap().is_empty());
        assert!(parse_search_response(r#"{"data":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_response_not_json() {
        let err = parse_search_response("<html>blocked</html>").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedPayload(_)));
    }

    #[test]
    fn test_parse_description_strips_show_more() {
        let html = r#"<div class="description-summary"><div class="summary__content">  Plot here. Show more</div></div>"#;
        let description = parse_description(PAGE, html).unwrap();
        assert_eq!(description, Some("Plot here.".to_string()));
    }

    #[test]
    fn test_parse_description_strips_every_occurrence() {
        let html = r#"<div class="description-summary"><p>Show more A</p><p>B Show more</p><span>show more</span></div>"#;
        let description = parse_description(PAGE, html).unwrap();
        assert_eq!(description, Some("AB show more".to_string()));
    }

    #[test]
    fn test_parse_description_missing() {
        let html = r#"<div class="summary">Nothing</div>"#;
        assert_eq!(parse_description(PAGE, html).unwrap(), None);
        let blank = r#"<div class="description-summary"> Show more </div>"#;
        assert_eq!(parse_description(PAGE, blank).unwrap(), None);
    }

    #[test]
    fn test_parse_chapters_in_document_order() {
        let html = r#"
            <ul class="main version-chap">
              <li class="wp-manga-chapter"><a href="https://manhuaus.com/manga/dragon-ball/chapter-3/"> Chapter 3 </a>
                <span class="chapter-release-date"><i> March 3, 2024 </i></span></li>
              <li class="wp-manga-chapter"><a href="chapter-2/">Chapter 2</a>
                <span class="chapter-release-date">March 2, 2024</span></li>
              <li class="wp-manga-chapter"><a href="/manga/dragon-ball/chapter-1/">Chapter 1</a>
                <span class="chapter-release-date">March 1, 2024</span></li>
            </ul>"#;
        let chapters = parse_chapters(PAGE, html).unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].number, "Chapter 3");
        assert_eq!(chapters[0].release_date, "March 3, 2024");
        assert_eq!(chapters[0].url, "https://manhuaus.com/manga/dragon-ball/chapter-3/");
        assert_eq!(chapters[1].url, "https://manhuaus.com/manga/dragon-ball/chapter-2/");
        assert_eq!(chapters[2].number, "Chapter 1");
        assert_eq!(chapters[2].url, "https://manhuaus.com/manga/dragon-ball/chapter-1/");
    }

    #[test]
    fn test_parse_chapters_keeps_absolute_href_verbatim() {
        let html = r#"<li class="wp-manga-chapter"><a href="HTTPS://CDN.Example.com/a b">Chapter 1</a>
            <span class="chapter-release-date">March 1, 2024</span></li>"#;
        let chapters = parse_chapters(PAGE, html).unwrap();
        assert_eq!(chapters[0].url, "HTTPS://CDN.Example.com/a b");
    }

    #[test]
    fn test_parse_chapters_missing_release_date_fails() {
        let html = r#"
            <li class="wp-manga-chapter"><a href="/c/2/">Chapter 2</a><span class="chapter-release-date">x</span></li>
            <li class="wp-manga-chapter"><a href="/c/1/">Chapter 1</a></li>"#;
        let err = parse_chapters(PAGE, html).unwrap_err();
        assert!(matches!(err, CatalogError::ExtractionMiss { .. }));
        assert!(err.to_string().contains("release date in chapter item #1"));
    }

    #[test]
    fn test_parse_chapters_missing_anchor_fails() {
        let html = r#"<li class="wp-manga-chapter"><span class="chapter-release-date">x</span></li>"#;
        let err = parse_chapters(PAGE, html).unwrap_err();
        assert!(err.to_string().contains("anchor in chapter item #0"));
    }

    #[test]
    fn test_parse_chapters_empty_page() {
        assert!(parse_chapters(PAGE, "<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_cover_image() {
        let html = r#"
            <div class="tab-summary">
              <div class="summary_image"><a href="/manga/dragon-ball/"><img src=" https://cdn.example.com/cover.jpg " class="img-responsive"></a></div>
            </div>
            <img src="https://cdn.example.com/other.jpg">"#;
        let cover = parse_cover_image(PAGE, html).unwrap();
        assert_eq!(cover, Some("https://cdn.example.com/cover.jpg".to_string()));
    }

    #[test]
    fn test_parse_cover_image_loose_structure() {
        let html = r#"<section class="summary_image"><div><a><img src="https://cdn.example.com/c.png"></a></div></section>"#;
        let cover = parse_cover_image(PAGE, html).unwrap();
        assert_eq!(cover, Some("https://cdn.example.com/c.png".to_string()));
    }

    #[test]
    fn test_parse_cover_image_without_src() {
        let html = r#"<div class="tab-summary"><div class="summary_image"><a><img data-src="lazy.jpg"></a></div></div>"#;
        assert_eq!(parse_cover_image(PAGE, html).unwrap(), None);
        assert_eq!(parse_cover_image(PAGE, "<p>no image</p>").unwrap(), None);
    }

    #[test]
    fn test_parse_chapter_images() {
        let html = r#"
            <div class="reading-content">
              <img class="wp-manga-chapter-img" data-src="
                https://cdn.example.com/1.jpg ">
              <img class="wp-manga-chapter-img" src="https://cdn.example.com/placeholder.jpg">
              <img class="wp-manga-chapter-img" data-src="https://cdn.example.com/2.jpg">
              <img class="ad" data-src="https://ads.example.com/banner.jpg">
            </div>"#;
        let images = parse_chapter_images("https://manhuaus.com/c/1/", html).unwrap();
        assert_eq!(
            images,
            vec![
                "https://cdn.example.com/1.jpg".to_string(),
                "https://cdn.example.com/2.jpg".to_string()
            ]
        );
    }
}
