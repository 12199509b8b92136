//! Question answering over the loaded documents.
//!
//! `AnswerEngine` sends every document in the store to the Messages API with
//! citations enabled. The formatter turns the resulting segments into the
//! delimited text protocol or JSON.

mod engine;
mod formatter;
mod types;

pub use engine::{AnswerEngine, AnswerEngineBuilder, DEFAULT_MAX_TOKENS, NO_DOCUMENTS_MESSAGE};
pub use formatter::{
    CITATIONS_HEADER, ENTRY_RULE_WIDTH, FormattedParts, JsonAnswer, JsonBlock, JsonCitation,
    NO_ANSWER_MESSAGE, RESPONSE_HEADER, SECTION_RULE_WIDTH, format_json, format_text,
    split_formatted, to_json_answer,
};
pub use types::{Answer, AnswerSegment, Citation, CitationLocation};
