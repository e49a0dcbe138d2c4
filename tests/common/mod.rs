#![allow(dead_code)]

use manga_search::http_client::HttpClientConfig;
use manga_search::sources::manhuaus;
use manga_search::{CatalogConfig, WpMangaCatalog};
use std::time::Duration;
use wiremock::MockServer;

pub const SEARCH_PATH: &str = "/wp-admin/admin-ajax.php";

pub fn test_http_config() -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_secs(5),
        max_retries: 0,
        initial_retry_delay_ms: 10,
        max_retry_delay_ms: 50,
        max_in_flight: 4,
        enable_gzip: false,
    }
}

pub fn catalog_for(server: &MockServer) -> WpMangaCatalog {
    catalog_with(server, test_http_config())
}

pub fn catalog_with(server: &MockServer, http_config: HttpClientConfig) -> WpMangaCatalog {
    let config = CatalogConfig::new(&server.uri(), manhuaus::HEADERS);
    WpMangaCatalog::new(config, http_config).expect("Failed to create catalog client")
}

pub fn series_path(slug: &str) -> String {
    format!("/manga/{}/", slug)
}

pub fn chapter_path(slug: &str, number: u32) -> String {
    format!("/manga/{}/chapter-{}/", slug, number)
}

/// Madara-style detail page; chapters listed newest first like the real theme
pub fn detail_page(base: &str, slug: &str, description: &str, chapters: &[u32]) -> String {
    let items: String = chapters
        .iter()
        .map(|n| {
            format!(
                r#"<li class="wp-manga-chapter"><a href="{}{}">Chapter {}</a>
                   <span class="chapter-release-date"><i>January {}, 2024</i></span></li>"#,
                base,
                chapter_path(slug, *n),
                n,
                n
            )
        })
        .collect();

    format!(
        r#"<html><body>
          <div class="tab-summary">
            <div class="summary_image"><a href="{base}/manga/{slug}/"><img src="{base}/covers/{slug}.jpg"></a></div>
          </div>
          <div class="description-summary"><div class="summary__content"><p>{description}</p></div>
            <div class="c-content-readmore"><span class="btn btn-link content-readmore">Show more</span></div></div>
          <div class="listing-chapters_wrap"><ul class="main version-chap">{items}</ul></div>
        </body></html>"#,
        base = base,
        slug = slug,
        description = description,
        items = items
    )
}

pub fn chapter_page(base: &str, slug: &str, number: u32, pages: usize) -> String {
    let images: String = (1..=pages)
        .map(|p| {
            format!(
                r#"<img id="image-{p}" data-src=" {base}/uploads/{slug}/{number}/{p}.jpg " class="wp-manga-chapter-img">"#,
                p = p,
                base = base,
                slug = slug,
                number = number
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="reading-content">{}<img class="wp-manga-chapter-img" src="/spacer.gif"></div></body></html>"#,
        images
    )
}
