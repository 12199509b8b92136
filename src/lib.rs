pub mod answerer;
pub mod anthropic;
pub mod ingest;
pub mod models;
pub mod session;
pub mod tui;
pub mod utils;

pub use answerer::{
    Answer, AnswerEngine, AnswerEngineBuilder, AnswerSegment, Citation, CitationLocation,
    FormattedParts, NO_ANSWER_MESSAGE, NO_DOCUMENTS_MESSAGE, format_json, format_text,
    split_formatted,
};
pub use anthropic::{AnthropicClient, AnthropicClientBuilder, AnthropicClientTrait, AnthropicError};
pub use ingest::{DocumentConverter, DocumentStore, FileConverter, IngestError};
pub use models::{ChatEntry, Document, DocumentBuilder, MediaType};
pub use session::{Session, UploadedFile};
