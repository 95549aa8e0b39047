use anyhow::{bail, Context, Result};
use lopdf::{Document, ObjectId};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::plan::PageSpan;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A PDF handed to us for splitting, together with its raw bytes
pub struct SourcePdf {
    pub doc: Document,
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourcePdf {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Self::from_bytes(name, bytes)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        if !looks_like_pdf(&bytes) {
            bail!("{} is not a PDF file", name);
        }

        let doc = Document::load_mem(&bytes).with_context(|| {
            format!(
                "The selected file could not be processed. Please try another PDF. ({})",
                name
            )
        })?;
        debug!(name = %name, size = bytes.len(), "loaded pdf");

        Ok(SourcePdf { doc, name, bytes })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    pub fn summary(&self) -> PdfSummary {
        PdfSummary {
            name: self.name.clone(),
            page_count: self.page_count(),
            size_bytes: self.size_bytes(),
        }
    }

    /// Build a standalone document holding exactly the pages of `span`
    pub fn extract_span(&self, span: PageSpan) -> Result<Document> {
        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        if span.start == 0 || span.start > span.end || span.end > total {
            bail!(
                "Pages {}-{} are out of range (1-{})",
                span.start,
                span.end,
                total
            );
        }

        let pages_to_delete: Vec<u32> = all_pages
            .iter()
            .map(|(num, _)| *num)
            .filter(|num| *num < span.start || *num > span.end)
            .collect();

        let mut new_doc = self.doc.clone();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
            new_doc.prune_objects();
        }

        Ok(new_doc)
    }

    /// Serialize the pages of `span` as a new PDF
    pub fn span_bytes(&self, span: PageSpan) -> Result<Vec<u8>> {
        let mut new_doc = self.extract_span(span)?;
        let mut out = Vec::new();
        new_doc
            .save_to(&mut out)
            .with_context(|| format!("Failed to write pages {}-{}", span.start, span.end))?;
        Ok(out)
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    // the header may be preceded by a little junk; readers tolerate up to 1024 bytes
    let window = &bytes[..bytes.len().min(1024)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// What the user sees once a file is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfSummary {
    pub name: String,
    pub page_count: u32,
    pub size_bytes: u64,
}

impl PdfSummary {
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

impl std::fmt::Display for PdfSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{} pages \u{2022} {} MB",
            self.name,
            self.page_count,
            self.size_mb()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_texts, sample_pdf};

    #[test]
    fn test_open_counts_pages() {
        let pdf = SourcePdf::from_bytes("book.pdf", sample_pdf(&["a", "b", "c"])).unwrap();
        assert_eq!(pdf.page_count(), 3);
        assert_eq!(pdf.summary().name, "book.pdf");
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, sample_pdf(&["one", "two"])).unwrap();

        let pdf = SourcePdf::open(&path).unwrap();
        assert_eq!(pdf.name, "scan.pdf");
        assert_eq!(pdf.page_count(), 2);
        assert_eq!(pdf.size_bytes(), std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = SourcePdf::from_bytes("notes.txt", b"hello world".to_vec())
            .err()
            .unwrap();
        assert!(err.to_string().contains("not a PDF"));
    }

    #[test]
    fn test_header_after_leading_junk() {
        let mut bytes = b"\r\n\x00junk".to_vec();
        bytes.extend(sample_pdf(&["a"]));
        assert!(looks_like_pdf(&bytes));

        let mut late = vec![b' '; 1024];
        late.extend(sample_pdf(&["a"]));
        assert!(!looks_like_pdf(&late));
    }

    #[test]
    fn test_rejects_broken_pdf() {
        let err = SourcePdf::from_bytes("broken.pdf", b"%PDF-1.5\ngarbage".to_vec())
            .err()
            .unwrap();
        assert!(err.to_string().contains("could not be processed"));
    }

    #[test]
    fn test_extract_span() {
        let pdf = SourcePdf::from_bytes("x.pdf", sample_pdf(&["p1", "p2", "p3", "p4"])).unwrap();
        let part = pdf.extract_span(PageSpan::new(2, 3)).unwrap();
        assert_eq!(part.get_pages().len(), 2);
        assert_eq!(page_texts(&part), vec!["p2", "p3"]);
    }

    #[test]
    fn test_span_bytes_reload() {
        let pdf = SourcePdf::from_bytes("x.pdf", sample_pdf(&["p1", "p2", "p3"])).unwrap();
        let bytes = pdf.span_bytes(PageSpan::new(3, 3)).unwrap();
        let part = Document::load_mem(&bytes).unwrap();
        assert_eq!(page_texts(&part), vec!["p3"]);
    }

    #[test]
    fn test_extract_span_out_of_range() {
        let pdf = SourcePdf::from_bytes("x.pdf", sample_pdf(&["p1", "p2"])).unwrap();
        assert!(pdf.extract_span(PageSpan::new(2, 3)).is_err());
        assert!(pdf.extract_span(PageSpan::new(0, 1)).is_err());
    }

    #[test]
    fn test_summary_display() {
        let summary = PdfSummary {
            name: "big.pdf".to_string(),
            page_count: 12,
            size_bytes: 3 * 1024 * 1024 / 2,
        };
        assert_eq!(summary.size_mb(), "1.50");
        assert_eq!(summary.to_string(), "big.pdf\n12 pages \u{2022} 1.50 MB");
    }
}
