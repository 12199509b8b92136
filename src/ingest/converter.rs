//! File to text conversion.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use calamine::Reader as _;
use thiserror::Error;

use crate::models::MediaType;

/// Upper bound on PDF text extraction before giving up on a file.
pub const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while ingesting a file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No converter handles this kind of file
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The file was read but its contents could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The file has no content
    #[error("{0} is empty")]
    Empty(String),
}

impl IngestError {
    fn parse(path: &Path, message: impl ToString) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

/// Trait for turning a file's bytes into normalized text.
///
/// The store calls this once per file; implementations receive the path only
/// to decide the format and to label errors.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, path: &Path, data: &[u8]) -> Result<String, IngestError>;
}

/// Converter for plain text, PDF, Word, PowerPoint and Excel files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConverter;

impl DocumentConverter for FileConverter {
    fn convert(&self, path: &Path, data: &[u8]) -> Result<String, IngestError> {
        if data.is_empty() {
            return Err(IngestError::Empty(path.display().to_string()));
        }

        match MediaType::from_path(path) {
            MediaType::PlainText => Ok(String::from_utf8_lossy(data).into_owned()),
            MediaType::Pdf => extract_pdf(path, data),
            MediaType::Docx => extract_docx(path, data),
            MediaType::Pptx => extract_pptx(path, data),
            MediaType::Xlsx => extract_xlsx(path, data),
            MediaType::OctetStream => Err(IngestError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Runs pdf-extract on a worker thread so a pathological file cannot hang
/// ingestion. A panic inside the extractor unwinds the worker and surfaces
/// as a parse error, so release builds must keep `panic = "unwind"`.
fn extract_pdf(path: &Path, data: &[u8]) -> Result<String, IngestError> {
    let bytes = data.to_vec();
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let result = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
        Ok(result) => {
            let _ = handle.join();
            result.map_err(|e| IngestError::parse(path, e))
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::error!(path = %path.display(), "PDF extraction timed out");
            Err(IngestError::parse(path, "text extraction timed out"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = handle.join();
            Err(IngestError::parse(path, "text extraction crashed"))
        }
    }
}

fn extract_docx(path: &Path, data: &[u8]) -> Result<String, IngestError> {
    let docx = docx_rs::read_docx(data).map_err(|e| IngestError::parse(path, e))?;

    let mut content = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(text) = child {
                            content.push_str(&text.text);
                        }
                    }
                }
            }
            content.push('\n');
        }
    }

    Ok(content)
}

fn extract_pptx(path: &Path, data: &[u8]) -> Result<String, IngestError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| IngestError::parse(path, e))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut content = String::new();
    for (number, name) in slides {
        let mut xml = String::new();
        archive
            .by_name(&name)
            .map_err(|e| IngestError::parse(path, e))?
            .read_to_string(&mut xml)
            .map_err(|e| IngestError::parse(path, e))?;

        let text = slide_text(&xml);
        if !text.is_empty() {
            content.push_str(&format!("Slide {number}:\n{text}\n\n"));
        }
    }

    Ok(content)
}

/// Collects `<a:t>` runs, one line per `<a:p>` paragraph.
fn slide_text(xml: &str) -> String {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines = Vec::new();
    let mut line = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    line.push(text.trim().to_string());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let joined = line.join(" ");
                    if !joined.trim().is_empty() {
                        lines.push(joined);
                    }
                    line.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    if !line.is_empty() {
        lines.push(line.join(" "));
    }

    lines.join("\n")
}

fn extract_xlsx(path: &Path, data: &[u8]) -> Result<String, IngestError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| IngestError::parse(path, e))?;

    let mut content = String::new();
    for sheet in workbook.sheet_names().to_vec() {
        let Ok(range) = workbook.worksheet_range(&sheet) else {
            tracing::warn!(path = %path.display(), sheet = %sheet, "skipping unreadable sheet");
            continue;
        };

        content.push_str(&format!("Sheet: {sheet}\n"));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            if cells.iter().any(|c| !c.is_empty()) {
                content.push_str(&cells.join(" | "));
                content.push('\n');
            }
        }
        content.push('\n');
    }

    Ok(content)
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Bool(b) => b.to_string(),
        calamine::Data::DateTime(dt) => dt.to_string(),
        _ => String::new(),
    }
}
