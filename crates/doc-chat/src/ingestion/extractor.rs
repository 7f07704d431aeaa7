//! Per-MIME text extraction
//!
//! Extraction never fails: parser errors and unsupported formats degrade to a
//! human-readable placeholder that is stored as the document content.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::types::FileType;

/// Content stored when a PDF has no extractable text
pub const PDF_NO_TEXT: &str =
    "No text content found in PDF. The document may contain only images or scanned pages.";
/// Upper bound on PDF parsing; some fonts send the parsers into very long loops
pub const PDF_TIMEOUT: Duration = Duration::from_secs(60);
/// Content stored when a DOCX has no extractable text
pub const DOCX_NO_TEXT: &str = "No text content found in Word document.";

/// Text produced for a file
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Text to persist as document content
    pub text: String,
    /// True when `text` is a placeholder rather than document content
    pub degraded: bool,
    /// Why extraction degraded
    pub reason: Option<String>,
}

impl Extraction {
    fn content(text: String) -> Self {
        Self {
            text,
            degraded: false,
            reason: None,
        }
    }

    fn placeholder(text: String, reason: impl Into<String>) -> Self {
        Self {
            text,
            degraded: true,
            reason: Some(reason.into()),
        }
    }
}

/// Multi-format text extractor
pub struct FileExtractor;

impl FileExtractor {
    /// Extract text from raw bytes according to the declared MIME type
    pub fn extract(data: &[u8], mime_type: &str) -> Extraction {
        match FileType::from_mime(mime_type) {
            FileType::Text => Self::extract_text(data),
            FileType::Pdf => Self::extract_pdf(data),
            FileType::Docx => Self::extract_docx(data),
            FileType::Pptx => Extraction::placeholder(
                format!(
                    "PowerPoint presentation ({}). Text extraction from PPTX files is not \
                     supported yet. Please export the presentation to PDF or save its text as a \
                     plain text file and upload that instead.",
                    format_file_size(data.len() as u64)
                ),
                "pptx extraction not implemented",
            ),
            FileType::Image => Extraction::placeholder(
                format!(
                    "Image file ({}). Text in images cannot be extracted without OCR. Please run \
                     the image through an external OCR service or transcribe its text manually \
                     and upload it as a text file.",
                    format_file_size(data.len() as u64)
                ),
                "image OCR not implemented",
            ),
            FileType::Unsupported => Extraction::placeholder(
                format!("Unsupported file type: {}", mime_type),
                "unsupported mime type",
            ),
        }
    }

    /// Run [`FileExtractor::extract`] on the blocking pool.
    ///
    /// A panicking parser degrades like any other parser error.
    pub async fn extract_blocking(data: bytes::Bytes, mime_type: String) -> Extraction {
        let fallback_mime = mime_type.clone();
        match tokio::task::spawn_blocking(move || Self::extract(&data, &mime_type)).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::error!("Extraction task for {} failed: {}", fallback_mime, e);
                let reason = format!("extraction task failed: {}", e);
                Extraction::placeholder(format!("Error extracting text: {}", reason), reason)
            }
        }
    }

    /// Plain text, decoded as UTF-8 (invalid sequences replaced)
    fn extract_text(data: &[u8]) -> Extraction {
        Extraction::content(String::from_utf8_lossy(data).into_owned())
    }

    /// PDF text, page by page
    fn extract_pdf(data: &[u8]) -> Extraction {
        let owned = data.to_vec();
        let pages = with_deadline(PDF_TIMEOUT, move || Self::pdf_pages(&owned))
            .and_then(|pages| pages);
        match pages {
            Ok(pages) if pages.is_empty() => {
                Extraction::placeholder(PDF_NO_TEXT.to_string(), "pdf has no text layer")
            }
            Ok(pages) => Extraction::content(pages.join("\n\n")),
            Err(reason) => {
                tracing::warn!("PDF extraction failed: {}", reason);
                Extraction::placeholder(format!("Error extracting PDF text: {}", reason), reason)
            }
        }
    }

    /// Non-empty page texts, each page's items joined by single spaces
    fn pdf_pages(data: &[u8]) -> std::result::Result<Vec<String>, String> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => {
                    let page = join_items(&text);
                    if !page.is_empty() {
                        pages.push(page);
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                }
            }
        }

        if pages.is_empty() {
            // pdf-extract decodes more font encodings than lopdf; pages are form-feed separated
            let fallback = panic::catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem(data)
            }));
            match fallback {
                Ok(Ok(text)) => {
                    pages = text
                        .split('\u{c}')
                        .map(join_items)
                        .filter(|page| !page.is_empty())
                        .collect();
                }
                Ok(Err(e)) => tracing::debug!("pdf-extract fallback failed: {}", e),
                Err(_) => tracing::warn!("pdf-extract fallback panicked"),
            }
        }

        Ok(pages)
    }

    /// Raw paragraph text of a Word document
    fn extract_docx(data: &[u8]) -> Extraction {
        let doc = match docx_rs::read_docx(data) {
            Ok(doc) => doc,
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("DOCX extraction failed: {}", reason);
                return Extraction::placeholder(
                    format!("Error extracting DOCX text: {}", reason),
                    reason,
                );
            }
        };

        let mut paragraphs = Vec::new();
        for child in &doc.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(&p.children)),
                docx_rs::DocumentChild::Table(table) => collect_table(table, &mut paragraphs),
                _ => {}
            }
        }

        let content = paragraphs.join("\n\n").trim().to_string();
        if content.is_empty() {
            return Extraction::placeholder(DOCX_NO_TEXT.to_string(), "docx has no text");
        }
        Extraction::content(content)
    }
}

/// Run `work` on its own thread, giving up after `timeout`.
///
/// A timed-out thread cannot be killed; it is detached and its result dropped.
fn with_deadline<T, F>(timeout: Duration, work: F) -> std::result::Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let _ = tx.send(work());
    });

    match rx.recv_timeout(timeout) {
        Ok(value) => {
            let _ = handle.join();
            Ok(value)
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::error!("Extraction did not finish within {:?}", timeout);
            Err("timeout".to_string())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            tracing::error!("Extraction thread crashed");
            Err("extraction thread crashed".to_string())
        }
    }
}

/// Text of a paragraph's runs, including runs nested in hyperlinks
fn paragraph_text(children: &[docx_rs::ParagraphChild]) -> String {
    let mut text = String::new();
    push_runs(children, &mut text);
    text
}

fn push_runs(children: &[docx_rs::ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for child in &run.children {
                    match child {
                        docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => text.push('\t'),
                        docx_rs::RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => push_runs(&link.children, text),
            _ => {}
        }
    }
}

/// Cell paragraphs in row order; nested tables are flattened in place
fn collect_table(table: &docx_rs::Table, paragraphs: &mut Vec<String>) {
    for docx_rs::TableChild::TableRow(row) in &table.rows {
        for docx_rs::TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    docx_rs::TableCellContent::Paragraph(p) => {
                        paragraphs.push(paragraph_text(&p.children))
                    }
                    docx_rs::TableCellContent::Table(nested) => collect_table(nested, paragraphs),
                    _ => {}
                }
            }
        }
    }
}

/// Collapse a page's text items into one space-separated line
fn join_items(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human-readable file size for guidance messages
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size >= MB {
        format!("{:.1} MB", size / MB)
    } else if size >= KB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{} bytes", bytes)
    }
}
