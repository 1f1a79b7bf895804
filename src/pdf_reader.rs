use crate::error::{Error, Result};
use crate::html;
use crate::reader::{Chapter, DocumentReader, Extraction};
use crate::scratch::Scratch;
use lopdf::Document;
use std::path::Path;

pub struct PdfData {
    doc: Document,
}

impl PdfData {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| Error::unreadable(path, e))?;
        if doc.is_encrypted() {
            return Err(Error::unreadable(path, "document is encrypted"));
        }
        Ok(Self { doc })
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of a single page, or `None` when nothing usable came out.
    ///
    /// Extraction failures are folded into `None`: a page whose content
    /// stream cannot be read is treated exactly like a page without text.
    fn page_text(&self, page_num: u32) -> Option<String> {
        match self.doc.extract_text(&[page_num]) {
            Ok(text) => {
                let text = html::normalize_newlines(&html::strip_control(&text));
                (!text.trim().is_empty()).then_some(text)
            }
            Err(e) => {
                tracing::debug!("Text extraction failed on page {}: {}", page_num, e);
                None
            }
        }
    }
}

impl DocumentReader for PdfData {
    fn extract(&self, _scratch: &Scratch) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        // get_pages is keyed and ordered by 1-based page number
        for page_num in self.doc.get_pages().into_keys() {
            let Some(text) = self.page_text(page_num) else {
                tracing::debug!("Skipping page {}: no extractable text", page_num);
                extraction.skipped_pages.push(page_num);
                continue;
            };
            extraction.chapters.push(page_chapter(page_num, &text));
        }

        if !extraction.skipped_pages.is_empty() {
            tracing::info!(
                "Skipped {} of {} PDF pages without text",
                extraction.skipped_pages.len(),
                self.page_count()
            );
        }

        Ok(extraction)
    }
}

/// Build the chapter for one page of extracted text
pub fn page_chapter(page_num: u32, text: &str) -> Chapter {
    let title = format!("Page {}", page_num);

    let mut body = html::heading(1, &title);
    for para in html::split_paragraphs(text) {
        let para = html::strip_control(para);
        if !para.trim().is_empty() {
            body.push_str(&html::paragraph(para.trim()));
        }
    }

    Chapter {
        title,
        filename: format!("page_{}.xhtml", page_num),
        body,
    }
}
