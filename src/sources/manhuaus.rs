use super::wp_manga::CatalogConfig;

pub const BASE_URL: &str = "https://manhuaus.com";

/// Header bundle sent with every request to the catalog
pub const HEADERS: &[(&str, &str)] = &[
    ("authority", "manhuaus.com"),
    ("accept", "application/json, text/javascript, */*; q=0.01"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/x-www-form-urlencoded; charset=UTF-8"),
    ("origin", "https://manhuaus.com"),
    ("referer", "https://manhuaus.com/manhuaus/"),
    ("sec-ch-ua", "\"Chromium\";v=\"118\", \"Google Chrome\";v=\"118\", \"Not=A?Brand\";v=\"99\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Chrome OS\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    ("user-agent", "Mozilla/5.0 (X11; CrOS x86_64 14541.0.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36"),
    ("x-requested-with", "XMLHttpRequest"),
];

/// Catalog preset for manhuaus.com, optionally pointed at another host
pub fn catalog_config(base_url: Option<&str>) -> CatalogConfig {
    CatalogConfig::new(base_url.unwrap_or(BASE_URL), HEADERS)
}
