use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::MediaType;

/// A converted document held in the session's document store.
///
/// Documents are created once on ingestion and never mutated afterwards.
/// `content` holds the normalized text produced by the converter, while
/// `original_data` keeps the uploaded bytes (base64-encoded) for media types
/// that are sent to the model as binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Display title, the file's base name.
    pub title: String,
    /// Normalized text content.
    pub content: String,
    /// Path the document was ingested from.
    pub file_path: String,
    /// Media type resolved from the file extension.
    pub media_type: MediaType,
    /// Base64 encoding of the original file bytes.
    pub original_data: String,
}

impl Document {
    /// Creates a document from its converted text and the raw file bytes.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        file_path: impl Into<String>,
        media_type: MediaType,
        original_bytes: &[u8],
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            file_path: file_path.into(),
            media_type,
            original_data: BASE64.encode(original_bytes),
        }
    }
}

/// Builder for constructing `Document` instances with optional fields.
///
/// Mostly useful in tests, where documents are built without going
/// through a converter.
///
/// # Examples
///
/// ```
/// use docqa::{DocumentBuilder, MediaType};
///
/// let doc = DocumentBuilder::new()
///     .title("notes.txt")
///     .content("Rust is a systems language.")
///     .build();
///
/// assert_eq!(doc.media_type, MediaType::PlainText);
/// assert_eq!(doc.file_path, "notes.txt");
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    content: Option<String>,
    file_path: Option<String>,
    media_type: Option<MediaType>,
    original_bytes: Option<Vec<u8>>,
}

impl DocumentBuilder {
    /// Creates a new `DocumentBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the normalized text content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the source file path.
    pub fn file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Overrides the media type instead of resolving it from the title.
    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Sets the original bytes (encoded as base64 on build).
    pub fn original_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.original_bytes = Some(bytes.into());
        self
    }

    /// Builds the `Document`.
    ///
    /// Missing fields default as follows: title to `"untitled.txt"`, content
    /// to empty, file path to the title, media type to the one resolved from
    /// the title, and original bytes to the content's bytes.
    pub fn build(self) -> Document {
        let title = self.title.unwrap_or_else(|| "untitled.txt".to_string());
        let content = self.content.unwrap_or_default();
        let file_path = self.file_path.unwrap_or_else(|| title.clone());
        let media_type = self
            .media_type
            .unwrap_or_else(|| MediaType::from_path(&title));
        let original_bytes = self
            .original_bytes
            .unwrap_or_else(|| content.as_bytes().to_vec());

        Document::new(title, content, file_path, media_type, &original_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_encodes_original_bytes_as_base64() {
        let doc = Document::new(
            "hello.pdf",
            "Hello",
            "/tmp/hello.pdf",
            MediaType::Pdf,
            b"%PDF-1.4",
        );

        assert_eq!(doc.original_data, "JVBERi0xLjQ=");
        assert_eq!(BASE64.decode(&doc.original_data).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn builder_resolves_media_type_from_title() {
        let doc = DocumentBuilder::new().title("deck.pptx").build();
        assert_eq!(doc.media_type, MediaType::Pptx);
    }

    #[test]
    fn builder_media_type_override_wins() {
        let doc = DocumentBuilder::new()
            .title("deck.pptx")
            .media_type(MediaType::OctetStream)
            .build();
        assert_eq!(doc.media_type, MediaType::OctetStream);
    }

    #[test]
    fn builder_defaults_original_bytes_to_content() {
        let doc = DocumentBuilder::new().title("a.txt").content("abc").build();
        assert_eq!(doc.original_data, BASE64.encode("abc"));
    }

    #[test]
    fn document_serialization_roundtrip() {
        let doc = DocumentBuilder::new()
            .title("a.txt")
            .content("body")
            .file_path("/data/a.txt")
            .build();

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""media_type":"text/plain""#));

        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
