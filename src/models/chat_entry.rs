use time::OffsetDateTime;

use crate::answerer::{AnswerSegment, FormattedParts, split_formatted};

/// One question/answer exchange in the session history.
///
/// Entries are appended to the history and never mutated. `response` keeps
/// the delimited text rendering; `segments` keeps the structured form the
/// shell renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    question: String,
    response: String,
    segments: Vec<AnswerSegment>,
    asked_at: OffsetDateTime,
}

impl ChatEntry {
    /// Creates a new entry stamped with the current time.
    pub fn new(question: String, response: String, segments: Vec<AnswerSegment>) -> Self {
        Self {
            question,
            response,
            segments,
            asked_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns the question as typed by the user.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the formatted answer and citation text.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Returns the structured answer segments.
    ///
    /// Empty when the question was answered with a sentinel message.
    pub fn segments(&self) -> &[AnswerSegment] {
        &self.segments
    }

    /// Returns when the question was asked.
    pub fn asked_at(&self) -> OffsetDateTime {
        self.asked_at
    }

    /// Total number of citations across all segments.
    pub fn citation_count(&self) -> usize {
        self.segments.iter().map(|s| s.citations().len()).sum()
    }

    /// Splits the formatted response back into answer text and citation lines.
    pub fn parts(&self) -> FormattedParts {
        split_formatted(&self.response)
    }
}
