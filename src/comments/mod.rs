// Comment records — data model, scraper ingestion, and batch validation.

pub mod ingest;
pub mod models;
pub mod validate;

pub use models::{Comment, Platform};
