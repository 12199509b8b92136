//! Multi-document question answering against the Messages API.

use std::sync::Arc;

use crate::anthropic::types::{
    CitationsConfig, ContentBlock, DocumentSource, Message, MessageRequest, MessageResponse,
    ResponseBlock, Role, WireCitation,
};
use crate::anthropic::{AnthropicClientTrait, AnthropicError, DEFAULT_MODEL};
use crate::ingest::DocumentStore;
use crate::models::Document;

use super::formatter::{format_json, format_text};
use super::types::{Answer, AnswerSegment, Citation, CitationLocation};

/// Returned instead of an answer when the store holds no documents.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents available to answer from";

/// Default response token limit.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

const QUESTION_TEMPLATE: &str = "Answer this question using the provided documents: {question}.You are an Q&A system that can answer questions about the documents.Just return the answer.";

/// Builder for constructing `AnswerEngine` instances.
///
/// Model and token limit fall back to `ANTHROPIC_MODEL` and
/// `DOCQA_MAX_TOKENS`, then to the defaults.
pub struct AnswerEngineBuilder {
    client: Arc<dyn AnthropicClientTrait>,
    model: Option<String>,
    max_tokens: Option<u32>,
}

impl AnswerEngineBuilder {
    /// Creates a builder around the given client.
    pub fn new(client: Arc<dyn AnthropicClientTrait>) -> Self {
        Self {
            client,
            model: None,
            max_tokens: None,
        }
    }

    /// Sets the model to request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the response token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn build(self) -> AnswerEngine {
        let model = self
            .model
            .or_else(|| std::env::var("ANTHROPIC_MODEL").ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = self
            .max_tokens
            .or_else(max_tokens_from_env)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        AnswerEngine {
            client: self.client,
            model,
            max_tokens,
        }
    }
}

fn max_tokens_from_env() -> Option<u32> {
    let raw = std::env::var("DOCQA_MAX_TOKENS").ok()?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid DOCQA_MAX_TOKENS");
            None
        }
    }
}

/// Answers questions about every document in a store with one request.
pub struct AnswerEngine {
    client: Arc<dyn AnthropicClientTrait>,
    model: String,
    max_tokens: u32,
}

impl AnswerEngine {
    /// Creates an engine with the default model and token limit.
    #[must_use]
    pub fn new(client: Arc<dyn AnthropicClientTrait>) -> Self {
        AnswerEngineBuilder::new(client).build()
    }

    /// Returns the model this engine requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the response token limit.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Asks a question and returns the structured answer.
    ///
    /// No request is made when the store is empty.
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged; requests are not retried.
    pub fn answer(&self, store: &DocumentStore, question: &str) -> Result<Answer, AnthropicError> {
        if store.is_empty() {
            tracing::info!("no documents loaded; skipping request");
            return Ok(Answer::no_documents(question.to_string()));
        }

        let request = self.build_request(store.documents(), question);
        tracing::info!(
            documents = store.len(),
            model = %self.model,
            "asking question"
        );

        let response = self.client.create_message(&request)?;
        tracing::debug!(
            id = %response.id,
            model = %response.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "received response"
        );
        let segments = segments_from_response(response);
        tracing::debug!(segments = segments.len(), "received answer");

        Ok(Answer::new(question.to_string(), segments, self.model.clone()))
    }

    /// Asks a question and returns the answer as delimited text.
    pub fn ask(&self, store: &DocumentStore, question: &str) -> Result<String, AnthropicError> {
        let answer = self.answer(store, question)?;
        if answer.is_no_documents() {
            return Ok(NO_DOCUMENTS_MESSAGE.to_string());
        }
        Ok(format_text(answer.segments(), store))
    }

    /// Asks a question and returns the answer as pretty-printed JSON.
    pub fn ask_json(
        &self,
        store: &DocumentStore,
        question: &str,
    ) -> Result<String, AnthropicError> {
        let answer = self.answer(store, question)?;
        if answer.is_no_documents() {
            return Ok(NO_DOCUMENTS_MESSAGE.to_string());
        }
        format_json(answer.segments(), store).map_err(AnthropicError::Serialization)
    }

    /// Builds the single-message request carrying all documents.
    pub fn build_request(&self, documents: &[Document], question: &str) -> MessageRequest {
        let mut content: Vec<ContentBlock> = documents.iter().map(document_block).collect();
        content.push(ContentBlock::Text {
            text: QUESTION_TEMPLATE.replace("{question}", question),
        });

        MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: Role::User,
                content,
            }],
        }
    }
}

/// Plain text goes inline; everything else is sent as the original bytes.
fn document_block(document: &Document) -> ContentBlock {
    let media_type = document.media_type.as_str().to_string();
    let source = if document.media_type.is_plain_text() {
        DocumentSource::Text {
            media_type,
            data: document.content.clone(),
        }
    } else {
        DocumentSource::Base64 {
            media_type,
            data: document.original_data.clone(),
        }
    };

    ContentBlock::Document {
        source,
        title: document.title.clone(),
        citations: CitationsConfig { enabled: true },
    }
}

fn segments_from_response(response: MessageResponse) -> Vec<AnswerSegment> {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text, citations } => {
                let citations = citations
                    .unwrap_or_default()
                    .into_iter()
                    .map(decode_citation)
                    .collect();
                Some(AnswerSegment::new(text, citations))
            }
            ResponseBlock::Other => None,
        })
        .collect()
}

/// Page fields win over char fields; a missing end repeats the start.
fn decode_citation(wire: WireCitation) -> Citation {
    let location = match (wire.start_page_number, wire.start_char_index) {
        (Some(start), _) => Some(CitationLocation::PageRange {
            start,
            end: wire.end_page_number.unwrap_or(start),
        }),
        (None, Some(start)) => Some(CitationLocation::CharRange {
            start,
            end: wire.end_char_index.unwrap_or(start),
        }),
        (None, None) => None,
    };

    let citation = Citation::new(
        wire.cited_text.unwrap_or_default(),
        wire.document_index,
        location,
    );
    match wire.kind {
        Some(kind) => citation.with_kind(kind),
        None => citation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentBuilder, MediaType};
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clear_env() {
        unsafe {
            std::env::remove_var("ANTHROPIC_MODEL");
            std::env::remove_var("DOCQA_MAX_TOKENS");
        }
    }

    struct MockClient {
        response: String,
        calls: AtomicUsize,
    }

    impl MockClient {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AnthropicClientTrait for MockClient {
        fn create_message(
            &self,
            _request: &MessageRequest,
        ) -> Result<MessageResponse, AnthropicError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            serde_json::from_str(&self.response).map_err(AnthropicError::Serialization)
        }
    }

    struct FailingClient;

    impl AnthropicClientTrait for FailingClient {
        fn create_message(
            &self,
            _request: &MessageRequest,
        ) -> Result<MessageResponse, AnthropicError> {
            Err(AnthropicError::Http { status: 529 })
        }
    }

    fn engine(client: Arc<dyn AnthropicClientTrait>) -> AnswerEngine {
        AnswerEngineBuilder::new(client)
            .model("test-model")
            .max_tokens(1000)
            .build()
    }

    fn sample_store() -> DocumentStore {
        let mut store = DocumentStore::new();
        store.push(
            DocumentBuilder::new()
                .title("notes.txt")
                .content("Paris is the capital of France.")
                .build(),
        );
        store.push(
            DocumentBuilder::new()
                .title("paper.pdf")
                .content("extracted text")
                .original_bytes(b"%PDF-1.4".to_vec())
                .build(),
        );
        store
    }

    #[test]
    fn empty_store_returns_sentinel_without_calling_provider() {
        let mock = Arc::new(MockClient::new(r#"{"content": []}"#));
        let engine = engine(mock.clone());

        let text = engine.ask(&DocumentStore::new(), "anything?").unwrap();

        assert_eq!(text, "No documents available to answer from");
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn request_sends_plain_text_inline_and_other_types_as_base64() {
        let engine = engine(Arc::new(FailingClient));
        let store = sample_store();

        let request = engine.build_request(store.documents(), "What is the capital?");
        let content = &request.messages[0].content;

        assert_eq!(content.len(), 3);
        match &content[0] {
            ContentBlock::Document {
                source,
                title,
                citations,
            } => {
                assert_eq!(source.kind(), "text");
                assert_eq!(source.media_type(), "text/plain");
                assert_eq!(source.data(), "Paris is the capital of France.");
                assert_eq!(title, "notes.txt");
                assert!(citations.enabled);
            }
            other => panic!("expected document block, got {other:?}"),
        }
        match &content[1] {
            ContentBlock::Document { source, .. } => {
                assert_eq!(source.kind(), "base64");
                assert_eq!(source.media_type(), MediaType::Pdf.as_str());
                assert_eq!(source.data(), "JVBERi0xLjQ=");
            }
            other => panic!("expected document block, got {other:?}"),
        }
    }

    #[test]
    fn request_ends_with_question_prompt() {
        let engine = engine(Arc::new(FailingClient));
        let store = sample_store();

        let request = engine.build_request(store.documents(), "What is RAG?");

        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(
            request.messages[0].content.last(),
            Some(&ContentBlock::Text {
                text: "Answer this question using the provided documents: What is RAG?.You are an Q&A system that can answer questions about the documents.Just return the answer.".to_string()
            })
        );
    }

    #[test]
    fn response_citations_are_decoded_into_locations() {
        let mock = Arc::new(MockClient::new(
            r#"{
                "content": [
                    {"type": "text", "text": "Paris."},
                    {
                        "type": "text",
                        "text": "It is the capital.",
                        "citations": [
                            {
                                "type": "char_location",
                                "cited_text": "Paris is the capital of France.",
                                "document_index": 0,
                                "start_char_index": 0,
                                "end_char_index": 31
                            },
                            {
                                "type": "page_location",
                                "cited_text": "p",
                                "document_index": 1,
                                "start_page_number": 2
                            },
                            {"type": "content_block_location", "cited_text": "b"}
                        ]
                    }
                ]
            }"#,
        ));
        let engine = engine(mock.clone());

        let answer = engine.answer(&sample_store(), "capital?").unwrap();
        let segments = answer.segments();

        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].citations().is_empty());

        let citations = segments[1].citations();
        assert_eq!(
            citations[0].location(),
            Some(CitationLocation::CharRange { start: 0, end: 31 })
        );
        assert_eq!(
            citations[1].location(),
            Some(CitationLocation::PageRange { start: 2, end: 2 })
        );
        assert_eq!(citations[2].location(), None);
        assert_eq!(citations[2].document_index(), None);
        assert_eq!(citations[2].kind(), Some("content_block_location"));
        assert_eq!(citations[1].kind(), Some("page_location"));
    }

    #[test]
    fn ask_formats_titles_from_store() {
        let mock = Arc::new(MockClient::new(
            r#"{"content": [{"type": "text", "text": "Paris.", "citations": [
                {"type": "page_location", "cited_text": "q", "document_index": 1,
                 "start_page_number": 3, "end_page_number": 4}
            ]}]}"#,
        ));
        let engine = engine(mock);

        let text = engine.ask(&sample_store(), "capital?").unwrap();

        assert!(text.contains("Document: paper.pdf"));
        assert!(text.contains("Location: Page 3"));
    }

    #[test]
    fn empty_response_gives_no_answer_sentinel() {
        let engine = engine(Arc::new(MockClient::new(r#"{"content": []}"#)));
        let text = engine.ask(&sample_store(), "q").unwrap();
        assert_eq!(text, "No answer generated");
    }

    #[test]
    fn provider_errors_propagate() {
        let engine = engine(Arc::new(FailingClient));
        let result = engine.ask(&sample_store(), "q");
        assert!(matches!(result, Err(AnthropicError::Http { status: 529 })));
    }

    #[test]
    fn ask_json_keeps_provider_citation_type() {
        let mock = Arc::new(MockClient::new(
            r#"{"content": [{"type": "text", "text": "Paris.", "citations": [
                {"type": "content_block_location", "cited_text": "Paris", "document_index": 0,
                 "start_block_index": 0, "end_block_index": 1}
            ]}]}"#,
        ));
        let engine = engine(mock);

        let json = engine.ask_json(&sample_store(), "capital?").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let citation = &value["content"][0]["citations"][0];
        assert_eq!(citation["type"], "content_block_location");
        assert_eq!(citation["document_title"], "notes.txt");
    }

    #[test]
    #[serial]
    fn builder_uses_defaults_without_environment() {
        clear_env();

        let engine = AnswerEngineBuilder::new(Arc::new(FailingClient)).build();
        assert_eq!(engine.model(), DEFAULT_MODEL);
        assert_eq!(engine.max_tokens(), DEFAULT_MAX_TOKENS);
    }

    #[test]
    #[serial]
    fn builder_reads_environment_variables() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_MODEL", "claude-3-5-haiku-20241022");
            std::env::set_var("DOCQA_MAX_TOKENS", " 2048 ");
        }

        let engine = AnswerEngineBuilder::new(Arc::new(FailingClient)).build();
        assert_eq!(engine.model(), "claude-3-5-haiku-20241022");
        assert_eq!(engine.max_tokens(), 2048);

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_ignores_invalid_max_tokens() {
        clear_env();
        for raw in ["lots", "0", "-5"] {
            unsafe {
                std::env::set_var("DOCQA_MAX_TOKENS", raw);
            }
            let engine = AnswerEngineBuilder::new(Arc::new(FailingClient)).build();
            assert_eq!(engine.max_tokens(), DEFAULT_MAX_TOKENS, "value {raw:?}");
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_values_take_precedence_over_environment() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_MODEL", "env-model");
            std::env::set_var("DOCQA_MAX_TOKENS", "50");
        }

        let engine = AnswerEngineBuilder::new(Arc::new(FailingClient))
            .model("builder-model")
            .max_tokens(700)
            .build();
        assert_eq!(engine.model(), "builder-model");
        assert_eq!(engine.max_tokens(), 700);

        clear_env();
    }

    #[test]
    #[serial]
    fn blank_model_variable_falls_back_to_default() {
        clear_env();
        unsafe {
            std::env::set_var("ANTHROPIC_MODEL", "   ");
        }

        let engine = AnswerEngineBuilder::new(Arc::new(FailingClient)).build();
        assert_eq!(engine.model(), DEFAULT_MODEL);

        clear_env();
    }

    #[test]
    fn ask_json_of_empty_store_is_sentinel() {
        let engine = engine(Arc::new(FailingClient));
        let text = engine.ask_json(&DocumentStore::new(), "q").unwrap();
        assert_eq!(text, NO_DOCUMENTS_MESSAGE);
    }
}
