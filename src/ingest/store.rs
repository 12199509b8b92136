//! In-memory document store.

use std::fmt;
use std::path::Path;

use crate::models::{Document, MediaType};

use super::converter::{DocumentConverter, FileConverter, IngestError};

/// Append-only collection of the documents loaded in this session.
///
/// Documents keep their position for the lifetime of the store, so a
/// citation's document index stays valid after more files are added.
pub struct DocumentStore {
    documents: Vec<Document>,
    converter: Box<dyn DocumentConverter>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Creates an empty store using [`FileConverter`].
    pub fn new() -> Self {
        Self::with_converter(Box::new(FileConverter))
    }

    /// Creates an empty store with a custom converter.
    pub fn with_converter(converter: Box<dyn DocumentConverter>) -> Self {
        Self {
            documents: Vec::new(),
            converter,
        }
    }

    /// Ingests a file, logging and skipping it on failure.
    ///
    /// Returns `true` if the document was added.
    pub fn add_document(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_add_document(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to ingest document");
                false
            }
        }
    }

    /// Ingests a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or converted. The store is
    /// left unchanged in that case.
    pub fn try_add_document(&mut self, path: impl AsRef<Path>) -> Result<(), IngestError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let content = self.converter.convert(path, &data)?;

        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let document = Document::new(
            title,
            content,
            path.display().to_string(),
            media_type_for(path),
            &data,
        );
        tracing::info!(
            title = %document.title,
            media_type = %document.media_type,
            "added document"
        );
        self.documents.push(document);
        Ok(())
    }

    /// Appends an already-built document.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Returns all documents in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Returns the title of the document at `index`, if any.
    pub fn title_for(&self, index: usize) -> Option<&str> {
        self.get(index).map(|doc| doc.title.as_str())
    }
}

/// Resolves the media type of a file from its extension.
pub fn media_type_for(path: impl AsRef<Path>) -> MediaType {
    MediaType::from_path(path)
}
