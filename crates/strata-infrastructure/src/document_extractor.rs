//! Built-in document text extraction.
//!
//! PDF text comes from `pdf-extract`, DOCX paragraphs from the
//! `word/document.xml` entry of the archive, and anything that looks like
//! plain text is decoded as UTF-8. Other formats are reported as unsupported.

use async_trait::async_trait;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use strata_core::extractor::{DocumentExtractor, ExtractionError};

/// Maximum document size accepted for extraction (50MB)
const MAX_DOC_SIZE: usize = 50 * 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    fn detect(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            ext if TEXT_EXTENSIONS.contains(&ext) => Ok(DocumentKind::Text),
            _ if mime_guess::from_path(file_name)
                .first()
                .is_some_and(|mime| mime.type_() == mime_guess::mime::TEXT) =>
            {
                Ok(DocumentKind::Text)
            }
            _ => Err(ExtractionError::Unsupported { extension }),
        }
    }
}

/// The default `DocumentExtractor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDocumentExtractor;

impl BuiltinDocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for BuiltinDocumentExtractor {
    async fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let kind = DocumentKind::detect(file_name)?;
        if bytes.len() > MAX_DOC_SIZE {
            return Err(ExtractionError::Failed {
                reason: format!(
                    "File too large: {:.1} MB (max {:.1} MB)",
                    bytes.len() as f64 / (1024.0 * 1024.0),
                    MAX_DOC_SIZE as f64 / (1024.0 * 1024.0)
                ),
            });
        }

        tracing::debug!("Extracting {:?} text from {} ({} bytes)", kind, file_name, bytes.len());
        let text = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => extract_pdf(&bytes),
            DocumentKind::Docx => extract_docx(&bytes),
            DocumentKind::Text => extract_plain(bytes),
        })
        .await
        .map_err(|e| ExtractionError::Failed {
            reason: format!("Extraction task failed: {}", e),
        })??;

        Ok(text.trim().to_string())
    }
}

fn failed(reason: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Failed {
        reason: reason.to_string(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| failed(format!("Failed to extract PDF text: {}", e)))?;
    if text.trim().is_empty() {
        return Err(failed("PDF contains no extractable text"));
    }
    Ok(text)
}

fn extract_plain(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    String::from_utf8(bytes).map_err(|e| failed(format!("File is not valid UTF-8: {}", e)))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| failed(format!("Failed to read DOCX as ZIP: {}", e)))?;

    let mut doc_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| failed("Invalid DOCX: missing word/document.xml"))?
        .read_to_string(&mut doc_xml)
        .map_err(|e| failed(format!("Failed to read document.xml: {}", e)))?;

    docx_paragraphs(&doc_xml)
}

/// Collects the `<w:t>` runs of each `<w:p>` into one paragraph per line pair.
fn docx_paragraphs(doc_xml: &str) -> Result<String, ExtractionError> {
    let mut reader = quick_xml::Reader::from_str(doc_xml);
    let mut output = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if !paragraph.is_empty() {
                        output.push_str(&paragraph);
                        output.push_str("\n\n");
                        paragraph.clear();
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.decode().map_err(|e| failed(format!("XML decode error: {}", e)))?;
                paragraph.push_str(&text);
            }
            Ok(Event::GeneralRef(e)) if in_text => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    paragraph.push(ch);
                } else if let Ok(name) = e.decode()
                    && let Some(resolved) = quick_xml::escape::resolve_xml_entity(&name)
                {
                    paragraph.push_str(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(failed(format!("XML parse error: {}", e))),
            _ => {}
        }
    }

    Ok(output)
}
