/// Document ingestion module.
///
/// Converts files on disk into normalized text and keeps the ingested
/// documents in an append-only store for the current session.
mod converter;
mod store;

pub use converter::{DocumentConverter, FileConverter, IngestError, PDF_EXTRACT_TIMEOUT};
pub use store::{DocumentStore, media_type_for};
