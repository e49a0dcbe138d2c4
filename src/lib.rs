// Library interface for manga_search
// The binary and the integration tests drive the pipeline through these modules

pub mod config;
pub mod enrichment;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod sources;

pub use enrichment::{EnrichmentPipeline, EnrichmentReport};
pub use error::CatalogError;
pub use models::{Chapter, Entry, EntryKind, Stage};
pub use sources::wp_manga::{CatalogConfig, WpMangaCatalog};
