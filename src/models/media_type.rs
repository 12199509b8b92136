use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// MIME classification of an ingested document.
///
/// Controls whether a document is sent to the model as inline text or as
/// base64-encoded binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    PlainText,
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.presentationml.presentation")]
    Pptx,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")]
    Xlsx,
    #[serde(rename = "application/octet-stream")]
    OctetStream,
}

impl MediaType {
    /// Resolves a media type from a bare extension (with or without the leading dot).
    ///
    /// Matching is case-insensitive. Unknown extensions map to `OctetStream`.
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" => Self::PlainText,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "xlsx" => Self::Xlsx,
            _ => Self::OctetStream,
        }
    }

    /// Resolves a media type from a file path's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use docqa::MediaType;
    ///
    /// assert_eq!(MediaType::from_path("paper.PDF"), MediaType::Pdf);
    /// assert_eq!(MediaType::from_path("archive.xyz"), MediaType::OctetStream);
    /// assert_eq!(MediaType::from_path("README"), MediaType::OctetStream);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::OctetStream)
    }

    /// Returns the MIME string sent to the model provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Returns true if documents of this type are sent inline as text.
    pub fn is_plain_text(self) -> bool {
        matches!(self, Self::PlainText)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
