use log::{debug, error, info};
use manga_search::config::Config;
use manga_search::sources::manhuaus;
use manga_search::{EnrichmentPipeline, WpMangaCatalog};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("usage: manga_search <title query>");
        std::process::exit(2);
    }

    let config = Config::load();
    let catalog_config = manhuaus::catalog_config(config.catalog.base_url.as_deref());
    info!("Searching {} for {:?}", catalog_config.base_url(), query);

    let catalog = match WpMangaCatalog::new(catalog_config, config.http.client_config()) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(e.into());
        }
    };

    let pipeline = EnrichmentPipeline::new(&catalog, config.pipeline.entry_concurrency);
    let entries = pipeline.discover(query.trim()).await;

    println!("{}", serde_json::to_string_pretty(&entries)?);

    catalog.metrics().log_summary();
    debug!("Lookup metrics: {}", catalog.metrics().export_json());
    Ok(())
}
