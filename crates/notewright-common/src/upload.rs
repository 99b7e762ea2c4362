//! Files and prompt collected on the create page before a generation request.

use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use mime_sniffer::MimeTypeSniffer;
use smol_str::{SmolStr, ToSmolStr};

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
use regex_lite::Regex;
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
use regex::Regex;

use crate::error::ValidationError;

/// Page budget shared by every file in one generation request.
pub const MAX_TOTAL_PAGES: u32 = 10;

/// Prompt length limit, counted in characters.
pub const MAX_PROMPT_CHARS: usize = 1000;

const PDF_MIME: &str = "application/pdf";

/// `/Type /Page` object markers, excluding the `/Pages` tree nodes.
static PAGE_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page[^s]").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Pdf,
}

impl UploadKind {
    /// Material Symbols icon shown next to the file in the upload list.
    pub fn icon(self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Pdf => "picture_as_pdf",
        }
    }
}

/// A file as handed over by the picker, before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// MIME type reported by the browser or guessed from the extension.
    /// Empty when unknown.
    pub declared_mime: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, declared_mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime: declared_mime.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadEntry {
    pub name: String,
    pub kind: UploadKind,
    pub mime: SmolStr,
    pub page_count: u32,
    pub bytes: Vec<u8>,
    /// `data:` URL for image thumbnails. PDFs have none.
    pub preview_url: Option<String>,
}

impl UploadEntry {
    pub fn pages_label(&self) -> String {
        if self.page_count == 1 {
            "1 page".to_string()
        } else {
            format!("{} pages", self.page_count)
        }
    }
}

/// Result of one `add_files` call. Files accepted before a failure stay
/// accepted; `error` holds the last problem encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub error: Option<ValidationError>,
}

/// Ordered set of uploads whose page counts never sum past [`MAX_TOTAL_PAGES`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadBatch {
    entries: Vec<UploadEntry>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.entries.iter().map(|e| e.page_count).sum()
    }

    /// Validate and append files in order.
    ///
    /// An unsupported type or unreadable PDF skips that file and moves on.
    /// The first file that would overflow the page budget stops the batch.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = IncomingFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let mut total = self.total_pages();

        for file in files {
            let Some((kind, mime)) = classify(&file) else {
                tracing::debug!(name = %file.name, "rejected upload with unsupported type");
                outcome.error = Some(ValidationError::UnsupportedFileType { name: file.name });
                continue;
            };

            let page_count = match kind {
                UploadKind::Image => 1,
                UploadKind::Pdf => match count_pdf_pages(&file.bytes) {
                    Some(pages) => pages,
                    None => {
                        tracing::warn!(name = %file.name, "could not count pdf pages");
                        outcome.error = Some(ValidationError::UnreadablePdf { name: file.name });
                        continue;
                    }
                },
            };

            if total + page_count > MAX_TOTAL_PAGES {
                outcome.error = Some(ValidationError::PageLimitExceeded {
                    name: file.name,
                    limit: MAX_TOTAL_PAGES,
                    current: total,
                });
                break;
            }

            let preview_url = match kind {
                UploadKind::Image => Some(format!(
                    "data:{};base64,{}",
                    mime,
                    STANDARD.encode(&file.bytes)
                )),
                UploadKind::Pdf => None,
            };

            total += page_count;
            outcome.accepted += 1;
            self.entries.push(UploadEntry {
                name: file.name,
                kind,
                mime,
                page_count,
                bytes: file.bytes,
                preview_url,
            });
        }

        tracing::debug!(
            accepted = outcome.accepted,
            total_pages = total,
            "upload batch updated"
        );
        outcome
    }

    /// Drop an entry along with its preview. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<UploadEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Image or PDF, trusting the declared type first and the file magic second.
pub fn classify(file: &IncomingFile) -> Option<(UploadKind, SmolStr)> {
    let from_mime = |mime: &str| {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some((UploadKind::Image, mime.to_smolstr()))
        } else if mime == PDF_MIME {
            Some((UploadKind::Pdf, mime.to_smolstr()))
        } else {
            None
        }
    };

    from_mime(&file.declared_mime).or_else(|| {
        file.bytes
            .as_slice()
            .sniff_mime_type()
            .and_then(from_mime)
    })
}

/// Count pages by scanning for page objects. `None` when the bytes are not a PDF.
///
/// Compressed object streams hide their markers, so this undercounts some
/// files; anything that looks like a PDF counts as at least one page.
pub fn count_pdf_pages(bytes: &[u8]) -> Option<u32> {
    let head = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    if !bytes[head..].starts_with(b"%PDF") {
        return None;
    }
    let re = PAGE_MARKER.as_ref()?;
    let text = String::from_utf8_lossy(bytes);
    let pages = re.find_iter(&text).count() as u32;
    Some(pages.max(1))
}

/// Trim-checks the prompt. Returns the text to send unchanged.
pub fn validate_prompt(prompt: &str) -> Result<&str, ValidationError> {
    if prompt.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong {
            max: MAX_PROMPT_CHARS,
        });
    }
    Ok(prompt)
}

/// Applies an edit from the prompt box, refusing input past the limit the
/// way the textarea does.
pub fn accept_prompt_edit(current: &mut String, next: String) -> bool {
    if next.chars().count() > MAX_PROMPT_CHARS {
        return false;
    }
    *current = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(pages: usize) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n1 0 obj << /Type /Pages /Count 0 >> endobj\n".to_vec();
        for i in 0..pages {
            out.extend_from_slice(format!("{} 0 obj << /Type /Page /Parent 1 0 R >> endobj\n", i + 2).as_bytes());
        }
        out
    }

    fn png() -> Vec<u8> {
        b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec()
    }

    #[test]
    fn counts_page_objects_not_page_tree() {
        assert_eq!(count_pdf_pages(&pdf(3)), Some(3));
        assert_eq!(count_pdf_pages(&pdf(0)), Some(1));
        assert_eq!(count_pdf_pages(b"<html></html>"), None);
        assert_eq!(count_pdf_pages(b""), None);
    }

    #[test]
    fn compact_type_marker_is_counted() {
        let bytes = b"%PDF-1.7\n<</Type/Page/MediaBox[0 0 612 792]>>\n<</Type/Page>>\n".to_vec();
        assert_eq!(count_pdf_pages(&bytes), Some(2));
    }

    #[test]
    fn unsupported_type_is_skipped_and_later_files_still_added() {
        let mut batch = UploadBatch::new();
        let outcome = batch.add_files([
            IncomingFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            IncomingFile::new("figure.png", "image/png", png()),
        ]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(
            outcome.error,
            Some(ValidationError::UnsupportedFileType {
                name: "notes.txt".into()
            })
        );
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entries()[0].kind, UploadKind::Image);
        assert!(
            batch.entries()[0]
                .preview_url
                .as_deref()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn sniffs_type_when_browser_reports_none() {
        let mut batch = UploadBatch::new();
        let outcome = batch.add_files([IncomingFile::new("scan", "", pdf(2))]);
        assert_eq!(outcome.error, None);
        assert_eq!(batch.entries()[0].kind, UploadKind::Pdf);
        assert_eq!(batch.total_pages(), 2);
        assert!(batch.entries()[0].preview_url.is_none());
    }

    #[test]
    fn page_limit_stops_batch_and_keeps_earlier_files() {
        let mut batch = UploadBatch::new();
        batch.add_files([IncomingFile::new("a.pdf", PDF_MIME, pdf(6))]);

        let outcome = batch.add_files([
            IncomingFile::new("b.pdf", PDF_MIME, pdf(3)),
            IncomingFile::new("c.pdf", PDF_MIME, pdf(4)),
            IncomingFile::new("d.png", "image/png", png()),
        ]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(
            outcome.error,
            Some(ValidationError::PageLimitExceeded {
                name: "c.pdf".into(),
                limit: 10,
                current: 9,
            })
        );
        assert_eq!(batch.total_pages(), 9);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn total_never_exceeds_limit() {
        let mut batch = UploadBatch::new();
        for round in 0..15 {
            let file = if round % 3 == 0 {
                IncomingFile::new(format!("{round}.pdf"), PDF_MIME, pdf(round % 4 + 1))
            } else {
                IncomingFile::new(format!("{round}.png"), "image/png", png())
            };
            batch.add_files([file]);
            assert!(batch.total_pages() <= MAX_TOTAL_PAGES);
        }
        assert_eq!(batch.total_pages(), MAX_TOTAL_PAGES);
    }

    #[test]
    fn unreadable_pdf_is_skipped() {
        let mut batch = UploadBatch::new();
        let outcome = batch.add_files([
            IncomingFile::new("broken.pdf", PDF_MIME, Vec::new()),
            IncomingFile::new("ok.pdf", PDF_MIME, pdf(1)),
        ]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(
            outcome.error,
            Some(ValidationError::UnreadablePdf {
                name: "broken.pdf".into()
            })
        );
    }

    #[test]
    fn remove_releases_pages() {
        let mut batch = UploadBatch::new();
        batch.add_files([
            IncomingFile::new("a.pdf", PDF_MIME, pdf(4)),
            IncomingFile::new("b.png", "image/png", png()),
        ]);
        let removed = batch.remove(0).unwrap();
        assert_eq!(removed.name, "a.pdf");
        assert_eq!(batch.total_pages(), 1);
        assert!(batch.remove(5).is_none());
    }

    #[test]
    fn prompt_rules() {
        assert_eq!(validate_prompt("   \n"), Err(ValidationError::EmptyPrompt));
        assert_eq!(validate_prompt("Solve for X"), Ok("Solve for X"));
        let long = "x".repeat(MAX_PROMPT_CHARS + 1);
        assert_eq!(
            validate_prompt(&long),
            Err(ValidationError::PromptTooLong { max: 1000 })
        );

        let mut current = String::from("abc");
        assert!(!accept_prompt_edit(&mut current, long));
        assert_eq!(current, "abc");
        assert!(accept_prompt_edit(&mut current, "abcd".into()));
        assert_eq!(current, "abcd");
    }
}
