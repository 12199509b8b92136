use crate::models::ChatEntry;
use crate::session::Session;

/// Application state for the TUI.
///
/// Wraps the [`Session`] together with the input buffer, panel focus, the
/// selected history entry and the status line.
pub struct App {
    session: Session,
    /// Question input buffer
    input: String,
    /// Currently focused panel
    focus: Focus,
    /// Selected row in the history list (newest first)
    selected_index: Option<usize>,
    /// Scroll offset for detail view
    detail_scroll: u16,
    /// Outcome of the last command, shown in the shortcut bar
    status: Option<String>,
}

/// Panel focus state for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Question input is focused (typing edits the buffer, Enter submits)
    QuestionInput,
    /// History list is focused (j/k navigation, c toggles citations)
    History,
    /// Detail view is focused (j/k scrolling, c toggles citations)
    DetailView,
}

impl App {
    /// Creates the app around a session. Focus starts on the question input.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            input: String::new(),
            focus: Focus::QuestionInput,
            selected_index: None,
            detail_scroll: 0,
            status: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Returns the chat history, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ChatEntry> {
        self.session.history().iter().rev()
    }

    /// Maps a row of the newest-first list to its position in the history.
    fn history_index(&self, row: usize) -> Option<usize> {
        let len = self.session.history().len();
        (row < len).then(|| len - 1 - row)
    }

    /// Returns the selected entry, if any.
    pub fn selected_entry(&self) -> Option<&ChatEntry> {
        let index = self.history_index(self.selected_index?)?;
        self.session.history().get(index)
    }

    /// Returns whether citations are expanded for the selected entry.
    pub fn selected_citations_visible(&self) -> bool {
        self.selected_index
            .and_then(|row| self.history_index(row))
            .is_some_and(|index| self.session.citations_visible(index))
    }

    /// Toggles citation visibility for the selected entry.
    pub fn toggle_selected_citations(&mut self) {
        if let Some(index) = self.selected_index.and_then(|row| self.history_index(row)) {
            self.session.toggle_citations(index);
        }
    }

    /// Cycles focus: `QuestionInput` -> `History` -> `DetailView`.
    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::QuestionInput => Focus::History,
            Focus::History => Focus::DetailView,
            Focus::DetailView => Focus::QuestionInput,
        };
        self.auto_select_on_history_focus();
    }

    /// Cycles focus in reverse order.
    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::QuestionInput => Focus::DetailView,
            Focus::History => Focus::QuestionInput,
            Focus::DetailView => Focus::History,
        };
        self.auto_select_on_history_focus();
    }

    fn auto_select_on_history_focus(&mut self) {
        if self.focus == Focus::History
            && self.selected_index.is_none()
            && !self.session.history().is_empty()
        {
            self.selected_index = Some(0);
        }
    }

    /// Moves selection down the history list, wrapping at the end.
    pub fn select_next(&mut self) {
        let len = self.session.history().len();
        if len == 0 {
            self.selected_index = None;
            return;
        }

        self.selected_index = Some(match self.selected_index {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        });
        self.detail_scroll = 0;
    }

    /// Moves selection up the history list, wrapping at the start.
    pub fn select_previous(&mut self) {
        let len = self.session.history().len();
        if len == 0 {
            self.selected_index = None;
            return;
        }

        self.selected_index = Some(match self.selected_index {
            None | Some(0) => len - 1,
            Some(i) => i - 1,
        });
        self.detail_scroll = 0;
    }

    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_add(amount);
    }

    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Takes the input buffer, leaving it empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Returns focus to the question input (Esc key behavior).
    pub fn reset_focus(&mut self) {
        self.focus = Focus::QuestionInput;
    }

    /// Runs a submitted input line.
    ///
    /// `/add <path>...` ingests files; anything else non-blank is asked as a
    /// question. The outcome is reported through the status line.
    ///
    /// Paths are separated by whitespace; wrap a path containing spaces in
    /// single or double quotes.
    pub fn submit(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }

        if let Some(rest) = input
            .strip_prefix("/add")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            let paths = split_paths(rest);
            if paths.is_empty() {
                self.set_status("Usage: /add <path>...");
                return;
            }
            let added = self.session.add_paths(&paths);
            self.set_status(format!(
                "Processed {added} of {} document(s); {} loaded",
                paths.len(),
                self.session.store().len()
            ));
            return;
        }

        match self.session.ask(input) {
            Ok(entry) => {
                let citations = entry.citation_count();
                self.selected_index = Some(0);
                self.detail_scroll = 0;
                self.set_status(format!("Answered with {citations} citation(s)"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "question failed");
                self.set_status(format!("Error: {e}"));
            }
        }
    }
}

/// Splits `/add` arguments on whitespace, keeping quoted runs together.
fn split_paths(input: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    paths.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        paths.push(current);
    }

    paths
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::answerer::AnswerEngineBuilder;
    use crate::anthropic::types::{MessageRequest, MessageResponse};
    use crate::anthropic::{AnthropicClientTrait, AnthropicError};
    use crate::session::UploadedFile;
    use std::sync::Arc;

    pub(crate) struct CannedClient(pub &'static str);

    impl AnthropicClientTrait for CannedClient {
        fn create_message(
            &self,
            _request: &MessageRequest,
        ) -> Result<MessageResponse, AnthropicError> {
            serde_json::from_str(self.0).map_err(AnthropicError::Serialization)
        }
    }

    struct FailingClient;

    impl AnthropicClientTrait for FailingClient {
        fn create_message(
            &self,
            _request: &MessageRequest,
        ) -> Result<MessageResponse, AnthropicError> {
            Err(AnthropicError::Http { status: 500 })
        }
    }

    pub(crate) const CITED_RESPONSE: &str = r#"{"content": [{"type": "text", "text": "Blue.", "citations": [
        {"type": "char_location", "cited_text": "The sky is blue.", "document_index": 0,
         "start_char_index": 0, "end_char_index": 16}
    ]}]}"#;

    pub(crate) fn test_app(client: Arc<dyn AnthropicClientTrait>) -> App {
        let engine = AnswerEngineBuilder::new(client).model("test-model").build();
        let mut session = Session::new(engine);
        session.upload(&[UploadedFile::new("sky.txt", "The sky is blue.")]);
        App::new(session)
    }

    #[test]
    fn new_app_starts_on_question_input() {
        let app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));
        assert_eq!(app.focus(), Focus::QuestionInput);
        assert_eq!(app.selected_index(), None);
        assert!(app.input().is_empty());
        assert_eq!(app.session().store().len(), 1);
    }

    #[test]
    fn focus_cycles_both_directions() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));

        app.next_focus();
        assert_eq!(app.focus(), Focus::History);
        app.next_focus();
        assert_eq!(app.focus(), Focus::DetailView);
        app.next_focus();
        assert_eq!(app.focus(), Focus::QuestionInput);

        app.prev_focus();
        assert_eq!(app.focus(), Focus::DetailView);
        app.prev_focus();
        assert_eq!(app.focus(), Focus::History);
    }

    #[test]
    fn submit_question_selects_newest_entry() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));

        app.submit("first?");
        app.submit("second?");

        assert_eq!(app.selected_index(), Some(0));
        assert_eq!(app.selected_entry().unwrap().question(), "second?");
        assert_eq!(app.status(), Some("Answered with 1 citation(s)"));

        let questions: Vec<&str> = app.entries().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["second?", "first?"]);
    }

    #[test]
    fn submit_blank_input_does_nothing() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));
        app.submit("   ");
        assert!(app.session().history().is_empty());
        assert_eq!(app.status(), None);
    }

    #[test]
    fn failed_question_reports_error_in_status() {
        let mut app = test_app(Arc::new(FailingClient));
        app.submit("anything?");

        assert!(app.session().history().is_empty());
        assert!(app.status().unwrap().starts_with("Error:"));
    }

    #[test]
    fn add_command_ingests_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.txt");
        std::fs::write(&path, "More text.").unwrap();
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));

        app.submit(&format!("/add {} {}", path.display(), "/missing/nope.txt"));

        assert_eq!(app.session().store().len(), 2);
        assert_eq!(app.status(), Some("Processed 1 of 2 document(s); 2 loaded"));
    }

    #[test]
    fn add_command_rejects_spreadsheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.xlsx");
        std::fs::write(&path, "not really a workbook").unwrap();
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));

        app.submit(&format!("/add {}", path.display()));

        assert_eq!(app.session().store().len(), 1);
        assert_eq!(app.status(), Some("Processed 0 of 1 document(s); 1 loaded"));
    }

    #[test]
    fn add_command_accepts_quoted_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting notes.txt");
        std::fs::write(&path, "Minutes.").unwrap();
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));

        app.submit(&format!("/add \"{}\"", path.display()));

        assert_eq!(app.session().store().len(), 2);
        assert_eq!(app.session().store().title_for(1), Some("meeting notes.txt"));
    }

    #[test]
    fn split_paths_handles_quotes_and_extra_whitespace() {
        assert_eq!(
            split_paths("  a.txt  'b c.pdf' \"d e.docx\"f.txt \"\" "),
            vec!["a.txt", "b c.pdf", "d e.docxf.txt", ""]
        );
        assert!(split_paths("   ").is_empty());
    }

    #[test]
    fn add_command_without_paths_shows_usage() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));
        app.submit("/add");
        assert_eq!(app.status(), Some("Usage: /add <path>..."));
    }

    #[test]
    fn selection_wraps_and_toggles_follow_selection() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));
        app.submit("one");
        app.submit("two");

        app.select_next();
        assert_eq!(app.selected_index(), Some(1));
        assert_eq!(app.selected_entry().unwrap().question(), "one");
        app.select_next();
        assert_eq!(app.selected_index(), Some(0));
        app.select_previous();
        assert_eq!(app.selected_index(), Some(1));

        app.toggle_selected_citations();
        assert!(app.selected_citations_visible());
        assert!(app.session().citations_visible(0));
        assert!(!app.session().citations_visible(1));
    }

    #[test]
    fn selection_on_empty_history_stays_none() {
        let mut app = test_app(Arc::new(CannedClient(CITED_RESPONSE)));
        app.select_next();
        assert_eq!(app.selected_index(), None);
        app.select_previous();
        assert_eq!(app.selected_index(), None);
        app.toggle_selected_citations();
        assert!(!app.selected_citations_visible());
    }
}
