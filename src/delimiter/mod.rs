mod llm;

pub use llm::LlmDetector;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::config::{DetectorKind, LlmConfig};
use crate::pdf::text::{extract_text_pages, pages_starting_with};
use crate::pdf::SourcePdf;

/// Locates the pages where a new section begins
#[derive(Clone)]
pub enum Detector {
    Llm(LlmDetector),
    Text,
}

impl Detector {
    pub fn new(kind: DetectorKind, config: &LlmConfig) -> Result<Self> {
        match kind {
            DetectorKind::Llm => Ok(Detector::Llm(LlmDetector::new(config.clone())?)),
            DetectorKind::Text => Ok(Detector::Text),
        }
    }

    /// Start pages (1-based) of every section matching `pattern`
    pub async fn detect(&self, pdf: &SourcePdf, pattern: &str) -> Result<Vec<u32>> {
        match self {
            Detector::Llm(llm) => llm.detect(pdf, pattern).await,
            Detector::Text => {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid delimiter regex: {}", pattern))?;
                let pages = extract_text_pages(pdf)?;
                let starts = pages_starting_with(&pages, &regex);
                debug!(?starts, "delimiter pages from text");
                Ok(starts)
            }
        }
    }
}
