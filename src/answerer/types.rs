//! Types for citation-annotated answers.

use std::fmt;

/// Where a citation points inside its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationLocation {
    /// Page span within a paged document (PDF).
    PageRange { start: usize, end: usize },
    /// Character span within a text document.
    CharRange { start: usize, end: usize },
}

impl CitationLocation {
    /// Returns the provider's name for this kind of location.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageRange { .. } => "page_location",
            Self::CharRange { .. } => "char_location",
        }
    }

    /// Returns the first page or character of the span.
    pub fn start(&self) -> usize {
        match *self {
            Self::PageRange { start, .. } | Self::CharRange { start, .. } => start,
        }
    }

    /// Returns the end of the span.
    pub fn end(&self) -> usize {
        match *self {
            Self::PageRange { end, .. } | Self::CharRange { end, .. } => end,
        }
    }
}

impl fmt::Display for CitationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageRange { start, .. } => write!(f, "Page {start}"),
            Self::CharRange { start, .. } => write!(f, "Character {start}"),
        }
    }
}

/// A citation linking answer text to a passage of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// The quoted source passage
    cited_text: String,
    /// Position of the cited document in the store when the question was asked
    document_index: Option<usize>,
    /// Page or character span, when the provider reported one
    location: Option<CitationLocation>,
    /// Citation type as reported by the provider
    kind: Option<String>,
}

impl Citation {
    /// Creates a new citation.
    pub fn new(
        cited_text: impl Into<String>,
        document_index: Option<usize>,
        location: Option<CitationLocation>,
    ) -> Self {
        Self {
            cited_text: cited_text.into(),
            document_index,
            location,
            kind: None,
        }
    }

    /// Records the provider's citation type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Creates a citation with a character-range location.
    pub fn char_range(
        cited_text: impl Into<String>,
        document_index: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Self::new(
            cited_text,
            Some(document_index),
            Some(CitationLocation::CharRange { start, end }),
        )
    }

    /// Creates a citation with a page-range location.
    pub fn page_range(
        cited_text: impl Into<String>,
        document_index: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Self::new(
            cited_text,
            Some(document_index),
            Some(CitationLocation::PageRange { start, end }),
        )
    }

    /// Returns the quoted source passage.
    pub fn cited_text(&self) -> &str {
        &self.cited_text
    }

    /// Returns the index of the cited document, if reported.
    pub fn document_index(&self) -> Option<usize> {
        self.document_index
    }

    /// Returns the cited location, if reported.
    pub fn location(&self) -> Option<CitationLocation> {
        self.location
    }

    /// Returns the citation type, falling back to the location's kind.
    pub fn kind(&self) -> Option<&str> {
        self.kind
            .as_deref()
            .or_else(|| self.location.map(|l| l.kind()))
    }
}

/// One text block of a generated answer with its citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSegment {
    text: String,
    citations: Vec<Citation>,
}

impl AnswerSegment {
    /// Creates a new answer segment.
    pub fn new(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }

    /// Returns the segment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the citations attached to this segment.
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

/// Result of asking a question against the document store.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The original question
    question: String,
    /// Generated answer segments, in provider order
    segments: Vec<AnswerSegment>,
    /// Model used to generate the answer
    model: String,
    /// True if the store was empty and no request was made
    no_documents: bool,
}

impl Answer {
    /// Creates a generated answer.
    pub fn new(question: String, segments: Vec<AnswerSegment>, model: String) -> Self {
        Self {
            question,
            segments,
            model,
            no_documents: false,
        }
    }

    /// Creates the answer returned when there are no documents to ask about.
    pub fn no_documents(question: String) -> Self {
        Self {
            question,
            segments: Vec::new(),
            model: String::new(),
            no_documents: true,
        }
    }

    /// Returns the original question.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the answer segments.
    pub fn segments(&self) -> &[AnswerSegment] {
        &self.segments
    }

    /// Consumes the answer and returns its segments.
    pub fn into_segments(self) -> Vec<AnswerSegment> {
        self.segments
    }

    /// Returns the model used, empty when no request was made.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns true if no request was made because the store was empty.
    pub fn is_no_documents(&self) -> bool {
        self.no_documents
    }

    /// Returns true if the provider produced at least one text segment.
    pub fn has_answer(&self) -> bool {
        !self.no_documents && !self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_uses_start_only() {
        let page = CitationLocation::PageRange { start: 3, end: 5 };
        let chars = CitationLocation::CharRange { start: 120, end: 180 };

        assert_eq!(page.to_string(), "Page 3");
        assert_eq!(chars.to_string(), "Character 120");
    }

    #[test]
    fn location_kind_names() {
        assert_eq!(
            CitationLocation::PageRange { start: 1, end: 2 }.kind(),
            "page_location"
        );
        assert_eq!(
            CitationLocation::CharRange { start: 1, end: 2 }.kind(),
            "char_location"
        );
    }

    #[test]
    fn citation_constructors_set_location() {
        let citation = Citation::char_range("quoted", 2, 10, 16);
        assert_eq!(citation.cited_text(), "quoted");
        assert_eq!(citation.document_index(), Some(2));
        assert_eq!(
            citation.location(),
            Some(CitationLocation::CharRange { start: 10, end: 16 })
        );

        let citation = Citation::page_range("quoted", 0, 4, 5);
        assert_eq!(citation.location().map(|l| l.end()), Some(5));
    }

    #[test]
    fn answer_has_answer() {
        let answer = Answer::new(
            "q".to_string(),
            vec![AnswerSegment::new("text", Vec::new())],
            "model".to_string(),
        );
        assert!(answer.has_answer());

        let answer = Answer::new("q".to_string(), Vec::new(), "model".to_string());
        assert!(!answer.has_answer());

        let answer = Answer::no_documents("q".to_string());
        assert!(answer.is_no_documents());
        assert!(!answer.has_answer());
    }
}
