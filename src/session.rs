//! Interactive session state.
//!
//! A `Session` owns the document store, the answer engine, the chat history
//! and the per-entry citation toggles for one interactive run.

use std::path::Path;

use crate::answerer::{AnswerEngine, NO_DOCUMENTS_MESSAGE, format_text};
use crate::anthropic::AnthropicError;
use crate::ingest::DocumentStore;
use crate::models::ChatEntry;

/// File extensions accepted by [`Session::upload`].
pub const UPLOAD_EXTENSIONS: [&str; 4] = ["txt", "pdf", "docx", "pptx"];

/// A file received by name and contents rather than by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Returns the file name with any directory components removed.
    fn file_name(&self) -> Option<&str> {
        Path::new(&self.name)
            .file_name()
            .and_then(|name| name.to_str())
    }

    fn has_allowed_extension(&self) -> bool {
        is_upload_extension(Path::new(&self.name))
    }
}

/// Returns whether the path ends in one of [`UPLOAD_EXTENSIONS`].
pub fn is_upload_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub struct Session {
    engine: AnswerEngine,
    store: DocumentStore,
    history: Vec<ChatEntry>,
    citations_visible: Vec<bool>,
}

impl Session {
    /// Opens a session with an empty store.
    pub fn new(engine: AnswerEngine) -> Self {
        Self::with_store(engine, DocumentStore::new())
    }

    /// Opens a session around an existing store.
    pub fn with_store(engine: AnswerEngine, store: DocumentStore) -> Self {
        Self {
            engine,
            store,
            history: Vec::new(),
            citations_visible: Vec::new(),
        }
    }

    /// Ingests uploaded files through a scoped temporary directory.
    ///
    /// Each file is written under its own name, ingested, and removed with
    /// the directory when this call returns. Files with an extension outside
    /// [`UPLOAD_EXTENSIONS`] are skipped.
    ///
    /// Returns the number of documents added.
    pub fn upload(&mut self, files: &[UploadedFile]) -> usize {
        let staging = match tempfile::Builder::new().prefix("docqa-upload-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!(error = %e, "failed to create upload staging directory");
                return 0;
            }
        };

        let mut added = 0;
        for file in files {
            let Some(name) = file.file_name() else {
                tracing::warn!(name = %file.name, "rejecting upload without a file name");
                continue;
            };
            if !file.has_allowed_extension() {
                tracing::warn!(name = %file.name, "rejecting upload with unsupported extension");
                continue;
            }

            let staged = staging.path().join(name);
            if let Err(e) = std::fs::write(&staged, &file.data) {
                tracing::warn!(name = %file.name, error = %e, "failed to stage upload");
                continue;
            }

            if self.store.add_document(&staged) {
                added += 1;
            }

            if let Err(e) = std::fs::remove_file(&staged) {
                tracing::debug!(path = %staged.display(), error = %e, "staged upload already gone");
            }
        }

        tracing::info!(received = files.len(), added, "processed uploads");
        added
    }

    /// Ingests files already on disk, in order, through [`Session::upload`].
    ///
    /// Paths with an extension outside [`UPLOAD_EXTENSIONS`] are skipped
    /// without being read.
    ///
    /// Returns the number of documents added.
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let files: Vec<UploadedFile> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| {
                let allowed = is_upload_extension(path);
                if !allowed {
                    tracing::warn!(path = %path.display(), "skipping unsupported file type");
                }
                allowed
            })
            .filter_map(|path| match std::fs::read(path) {
                Ok(data) => Some(UploadedFile::new(path.display().to_string(), data)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                    None
                }
            })
            .collect();

        if files.is_empty() {
            return 0;
        }
        self.upload(&files)
    }

    /// Asks a question about the loaded documents and records the exchange.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the history is unchanged in that case.
    pub fn ask(&mut self, question: &str) -> Result<&ChatEntry, AnthropicError> {
        let answer = self.engine.answer(&self.store, question)?;

        let response = if answer.is_no_documents() {
            NO_DOCUMENTS_MESSAGE.to_string()
        } else {
            format_text(answer.segments(), &self.store)
        };

        self.history.push(ChatEntry::new(
            question.to_string(),
            response,
            answer.into_segments(),
        ));
        self.citations_visible.push(false);

        let index = self.history.len() - 1;
        Ok(&self.history[index])
    }

    /// Flips citation visibility for the entry at `index`.
    ///
    /// Returns the new visibility, or `false` if there is no such entry.
    pub fn toggle_citations(&mut self, index: usize) -> bool {
        match self.citations_visible.get_mut(index) {
            Some(visible) => {
                *visible = !*visible;
                *visible
            }
            None => false,
        }
    }

    pub fn citations_visible(&self, index: usize) -> bool {
        self.citations_visible.get(index).copied().unwrap_or(false)
    }

    /// Returns the chat history, oldest first.
    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn engine(&self) -> &AnswerEngine {
        &self.engine
    }
}
