//! UI rendering functions for the TUI.
//!
//! Question input on top, chat history and answer detail side by side, and a
//! shortcut/status bar at the bottom.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use time::macros::format_description;

use crate::answerer::{AnswerSegment, Citation};
use crate::ingest::DocumentStore;
use crate::models::ChatEntry;

use super::app::{App, Focus};

/// Maximum characters of a question shown in the history list.
const PREVIEW_CHARS: usize = 40;

/// Draws the full layout for the current app state.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(main_chunks[1]);

    render_question_input(frame, app, main_chunks[0]);
    render_history(frame, app, content_chunks[0]);
    render_detail_view(frame, app, content_chunks[1]);
    render_shortcut_bar(frame, app, main_chunks[2]);
}

fn panel(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn render_question_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::QuestionInput;
    let title = format!(
        "Ask ({} document(s) loaded, /add <path> to add more)",
        app.session().store().len()
    );

    let mut content = app.input().to_string();
    if is_focused {
        content.push('█');
    }

    frame.render_widget(
        Paragraph::new(content).block(panel(title, is_focused)),
        area,
    );
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::History;
    let time_format = format_description!("[hour]:[minute]:[second]");

    let items: Vec<ListItem> = app
        .entries()
        .map(|entry| {
            let asked_at = entry
                .asked_at()
                .format(time_format)
                .unwrap_or_else(|_| "??:??:??".to_string());

            ListItem::new(Line::from(vec![
                Span::raw(preview(entry.question())),
                Span::raw(" "),
                Span::styled(
                    format!("[{asked_at} | {} cited]", entry.citation_count()),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(panel("History".to_string(), is_focused))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::REVERSED),
        );

    let mut list_state = ListState::default();
    list_state.select(app.selected_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Truncates on a character boundary.
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::DetailView;

    let content = match app.selected_entry() {
        Some(entry) => detail_text(
            entry,
            app.session().store(),
            app.selected_citations_visible(),
        ),
        None => Text::from("No question selected"),
    };

    let paragraph = Paragraph::new(content)
        .block(panel("Answer".to_string(), is_focused))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn bold(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().add_modifier(Modifier::BOLD))
}

/// Builds the detail view for one entry.
fn detail_text(entry: &ChatEntry, store: &DocumentStore, show_citations: bool) -> Text<'static> {
    let mut text = Text::default();

    text.lines.push(Line::from(bold("Question:")));
    text.lines.push(Line::from(entry.question().to_string()));
    text.lines.push(Line::from(""));
    text.lines.push(Line::from(bold("Answer:")));

    if entry.segments().is_empty() {
        text.lines.push(Line::from(entry.response().to_string()));
        return text;
    }

    let answer: String = entry.segments().iter().map(AnswerSegment::text).collect();
    for line in answer.lines() {
        text.lines.push(Line::from(line.to_string()));
    }

    let count = entry.citation_count();
    if count == 0 {
        return text;
    }

    text.lines.push(Line::from(""));
    if !show_citations {
        text.lines.push(Line::from(Span::styled(
            format!("{count} citation(s) hidden, press c to show"),
            Style::default().fg(Color::DarkGray),
        )));
        return text;
    }

    text.lines.push(Line::from(bold("Citations:")));
    for citation in entry.segments().iter().flat_map(AnswerSegment::citations) {
        push_citation(&mut text, citation, store);
    }

    text
}

fn push_citation(text: &mut Text<'static>, citation: &Citation, store: &DocumentStore) {
    let title = citation
        .document_index()
        .and_then(|index| store.title_for(index))
        .unwrap_or("")
        .to_string();

    text.lines.push(Line::from(""));
    text.lines.push(Line::from(Span::styled(
        format!("\"{}\"", citation.cited_text()),
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let mut source = vec![
        Span::raw("  - "),
        Span::styled(title, Style::default().fg(Color::Cyan)),
    ];
    if let Some(location) = citation.location() {
        source.push(Span::styled(
            format!(" ({location})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    text.lines.push(Line::from(source));
}

fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled("Ctrl+C", key_style),
        Span::raw(": quit"),
        Span::styled(" | ", sep_style),
        Span::styled("Tab", key_style),
        Span::raw(": next panel"),
        Span::styled(" | ", sep_style),
        Span::styled("Esc", key_style),
        Span::raw(": input"),
    ];

    match app.focus() {
        Focus::QuestionInput => {
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("Enter", key_style));
            spans.push(Span::raw(": ask"));
        }
        Focus::History | Focus::DetailView => {
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("j/k", key_style));
            spans.push(Span::raw(if app.focus() == Focus::History {
                ": navigate"
            } else {
                ": scroll"
            }));
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("c", key_style));
            spans.push(Span::raw(": citations"));
        }
    }

    if let Some(status) = app.status() {
        spans.push(Span::styled(" | ", sep_style));
        spans.push(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
