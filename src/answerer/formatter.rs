//! Rendering of answers into the delimited text protocol and JSON.
//!
//! The text form is read back by [`split_formatted`], which scans for the
//! `Citations:` marker and dash rules. Marker strings and rule widths are
//! part of that contract and must not change.

use serde::{Deserialize, Serialize};

use crate::ingest::DocumentStore;

use super::types::{AnswerSegment, Citation, CitationLocation};

/// Returned when the provider produced no content.
pub const NO_ANSWER_MESSAGE: &str = "No answer generated";

pub const RESPONSE_HEADER: &str = "Response Text:";
pub const CITATIONS_HEADER: &str = "Citations:";

/// Width of the rule under each section header.
pub const SECTION_RULE_WIDTH: usize = 50;
/// Width of the rule closing each citation entry.
pub const ENTRY_RULE_WIDTH: usize = 30;
/// Minimum dash run recognized as a rule when splitting.
const RULE_MARKER_WIDTH: usize = 10;

/// Formats answer segments as delimited text.
///
/// # Examples
///
/// ```
/// use docqa::answerer::{AnswerSegment, format_text};
/// use docqa::ingest::DocumentStore;
///
/// let store = DocumentStore::new();
/// assert_eq!(format_text(&[], &store), "No answer generated");
///
/// let text = format_text(&[AnswerSegment::new("42.", Vec::new())], &store);
/// assert!(text.starts_with("\nResponse Text:\n"));
/// assert!(text.ends_with("\n42."));
/// ```
pub fn format_text(segments: &[AnswerSegment], store: &DocumentStore) -> String {
    if segments.is_empty() {
        return NO_ANSWER_MESSAGE.to_string();
    }

    let section_rule = "-".repeat(SECTION_RULE_WIDTH);
    let entry_rule = "-".repeat(ENTRY_RULE_WIDTH);
    let mut output: Vec<String> = Vec::new();

    for segment in segments {
        output.push(format!("\n{RESPONSE_HEADER}"));
        output.push(section_rule.clone());
        output.push(segment.text().to_string());

        if segment.citations().is_empty() {
            continue;
        }

        output.push(format!("\n{CITATIONS_HEADER}"));
        output.push(section_rule.clone());

        for citation in segment.citations() {
            output.push(format!("\nCited Text: \"{}\"", citation.cited_text()));
            output.push(format!("Document: {}", resolve_title(store, citation)));
            if let Some(location) = citation.location() {
                output.push(format!("Location: {location}"));
            }
            output.push(entry_rule.clone());
        }
    }

    output.join("\n")
}

/// Formats answer segments as pretty-printed JSON.
///
/// Returns [`NO_ANSWER_MESSAGE`] verbatim (not JSON) for an empty answer.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_json(
    segments: &[AnswerSegment],
    store: &DocumentStore,
) -> Result<String, serde_json::Error> {
    if segments.is_empty() {
        return Ok(NO_ANSWER_MESSAGE.to_string());
    }
    serde_json::to_string_pretty(&to_json_answer(segments, store))
}

/// JSON rendering of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonAnswer {
    pub content: Vec<JsonBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<JsonCitation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCitation {
    #[serde(rename = "type")]
    pub kind: String,
    pub cited_text: String,
    pub document_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_page_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_char_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_char_index: Option<usize>,
}

/// Builds the JSON rendering of answer segments.
///
/// The provider's citation type is kept. Citations with neither a type nor a
/// location are reported as `char_location`; citations without a document
/// index get an empty title.
pub fn to_json_answer(segments: &[AnswerSegment], store: &DocumentStore) -> JsonAnswer {
    let content = segments
        .iter()
        .map(|segment| JsonBlock {
            kind: "text".to_string(),
            text: segment.text().to_string(),
            citations: segment
                .citations()
                .iter()
                .map(|citation| json_citation(citation, store))
                .collect(),
        })
        .collect();

    JsonAnswer { content }
}

fn json_citation(citation: &Citation, store: &DocumentStore) -> JsonCitation {
    let location = citation.location();
    let mut json = JsonCitation {
        kind: citation.kind().unwrap_or("char_location").to_string(),
        cited_text: citation.cited_text().to_string(),
        document_title: resolve_title(store, citation).to_string(),
        start_page_number: None,
        end_page_number: None,
        start_char_index: None,
        end_char_index: None,
    };

    match location {
        Some(CitationLocation::PageRange { start, end }) => {
            json.start_page_number = Some(start);
            json.end_page_number = Some(end);
        }
        Some(CitationLocation::CharRange { start, end }) => {
            json.start_char_index = Some(start);
            json.end_char_index = Some(end);
        }
        None => {}
    }

    json
}

/// Looks up the title of the cited document, empty if unknown.
fn resolve_title<'a>(store: &'a DocumentStore, citation: &Citation) -> &'a str {
    citation
        .document_index()
        .and_then(|index| store.title_for(index))
        .unwrap_or("")
}

/// Answer text and citation lines recovered from the delimited text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedParts {
    /// Answer lines concatenated without separators
    pub answer: String,
    /// Non-blank lines after the `Citations:` marker, rules removed
    pub citations: Vec<String>,
}

/// Splits delimited text back into answer and citation lines.
///
/// Everything after the first `Citations:` line counts as citation lines.
/// Before it, header and rule lines are dropped and the rest concatenated.
pub fn split_formatted(text: &str) -> FormattedParts {
    let rule_marker = "-".repeat(RULE_MARKER_WIDTH);
    let mut answer: Vec<&str> = Vec::new();
    let mut citations = Vec::new();
    let mut collecting_citations = false;

    for line in text.split('\n') {
        if line.starts_with(CITATIONS_HEADER) {
            collecting_citations = true;
            continue;
        }

        if collecting_citations {
            if !line.trim().is_empty() && !line.starts_with(&rule_marker) {
                citations.push(line.to_string());
            }
        } else if !line.starts_with(RESPONSE_HEADER) && !line.starts_with(&rule_marker) {
            answer.push(line);
        }
    }

    FormattedParts {
        answer: answer.concat(),
        citations,
    }
}
