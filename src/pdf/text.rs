use anyhow::{Context, Result};
use regex::Regex;

use super::SourcePdf;

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Extract the text of every page, in page order
pub fn extract_text_pages(pdf: &SourcePdf) -> Result<Vec<PageText>> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(&pdf.bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", pdf.name))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(idx, text)| PageText {
            page: (idx + 1) as u32,
            text,
        })
        .collect())
}

/// Pages whose text, ignoring leading whitespace, matches `pattern`
pub fn pages_starting_with(pages: &[PageText], pattern: &Regex) -> Vec<u32> {
    pages
        .iter()
        .filter(|p| pattern.is_match(p.text.trim_start()))
        .map(|p| p.page)
        .collect()
}
