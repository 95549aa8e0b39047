use anyhow::{bail, Result};
use std::fmt;
use tracing::info;

use crate::archive::PartArchive;
use crate::delimiter::Detector;
use crate::pdf::SourcePdf;
use crate::plan::{
    chunk_by_page_count, parse_pages_per_split, spans_from_start_pages, SplitPlan,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitMethod {
    #[default]
    Pages,
    Delimiter,
}

/// The split form as typed: a method and its raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    pub method: SplitMethod,
    pub value: String,
}

impl Default for SplitRequest {
    fn default() -> Self {
        SplitRequest {
            method: SplitMethod::Pages,
            value: "1".to_string(),
        }
    }
}

impl SplitRequest {
    pub fn pages(value: impl Into<String>) -> Self {
        SplitRequest {
            method: SplitMethod::Pages,
            value: value.into(),
        }
    }

    pub fn delimiter(value: impl Into<String>) -> Self {
        SplitRequest {
            method: SplitMethod::Delimiter,
            value: value.into(),
        }
    }
}

/// Where a long-running step is at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Previewing,
    Splitting,
    Creating { current: usize, total: usize },
    Compressing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Analyzing => write!(f, "Analyzing PDF..."),
            Stage::Previewing => write!(f, "Generating preview..."),
            Stage::Splitting => write!(f, "Splitting PDF..."),
            Stage::Creating { current, total } => {
                write!(f, "Creating document {} of {}...", current, total)
            }
            Stage::Compressing => write!(f, "Compressing files..."),
        }
    }
}

/// Compute the page spans `request` would produce for `pdf`
pub async fn preview(
    pdf: &SourcePdf,
    request: &SplitRequest,
    detector: Option<&Detector>,
) -> Result<SplitPlan> {
    let total = pdf.page_count();
    let spans = match request.method {
        SplitMethod::Pages => {
            let per_split = parse_pages_per_split(&request.value)?;
            chunk_by_page_count(total, per_split)?
        }
        SplitMethod::Delimiter => {
            if request.value.trim().is_empty() {
                bail!("Please enter a delimiter regular expression.");
            }
            let Some(detector) = detector else {
                bail!("No delimiter detector configured");
            };
            let starts = detector.detect(pdf, &request.value).await?;
            spans_from_start_pages(&starts, total)?
        }
    };

    let plan = SplitPlan::new(spans, &pdf.name);
    info!(file = %pdf.name, parts = plan.len(), "preview ready");
    Ok(plan)
}

/// Cut `pdf` along `plan` and zip the parts, in plan order
pub fn split_to_archive<F>(pdf: &SourcePdf, plan: &SplitPlan, mut progress: F) -> Result<Vec<u8>>
where
    F: FnMut(Stage),
{
    if plan.is_empty() {
        bail!("Nothing to split: the preview is empty");
    }

    progress(Stage::Splitting);
    let mut archive = PartArchive::new();
    for (i, span) in plan.spans.iter().enumerate() {
        progress(Stage::Creating {
            current: i + 1,
            total: plan.len(),
        });
        let bytes = pdf.span_bytes(*span)?;
        archive.add_part(&plan.part_name(i), &bytes)?;
    }

    progress(Stage::Compressing);
    let parts = archive.len();
    let bytes = archive.finish()?;
    info!(
        archive = %plan.archive_name(),
        parts,
        size = bytes.len(),
        "archive built"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::delimiter::LlmDetector;
    use crate::pdf::testing::{page_texts, sample_pdf};
    use crate::plan::PageSpan;
    use lopdf::Document;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn source(pages: &[&str]) -> SourcePdf {
        SourcePdf::from_bytes("Book.pdf", sample_pdf(pages)).unwrap()
    }

    #[test]
    fn test_default_request() {
        let req = SplitRequest::default();
        assert_eq!(req.method, SplitMethod::Pages);
        assert_eq!(req.value, "1");
    }

    #[test]
    fn test_stage_messages() {
        assert_eq!(Stage::Analyzing.to_string(), "Analyzing PDF...");
        assert_eq!(
            Stage::Creating {
                current: 2,
                total: 5
            }
            .to_string(),
            "Creating document 2 of 5..."
        );
        assert_eq!(Stage::Compressing.to_string(), "Compressing files...");
    }

    #[tokio::test]
    async fn test_preview_by_pages() {
        let pdf = source(&["1", "2", "3", "4", "5"]);
        let plan = preview(&pdf, &SplitRequest::pages("2"), None).await.unwrap();
        assert_eq!(
            plan.spans,
            vec![
                PageSpan::new(1, 2),
                PageSpan::new(3, 4),
                PageSpan::new(5, 5)
            ]
        );
        assert_eq!(plan.part_name(2), "Book_part_3.pdf");
    }

    #[tokio::test]
    async fn test_preview_rejects_bad_page_count() {
        let pdf = source(&["1"]);
        let err = preview(&pdf, &SplitRequest::pages("0"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please enter a valid number of pages greater than 0."
        );
    }

    #[tokio::test]
    async fn test_preview_rejects_blank_delimiter() {
        let pdf = source(&["1"]);
        let err = preview(&pdf, &SplitRequest::delimiter("   "), Some(&Detector::Text))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please enter a delimiter regular expression."
        );
    }

    #[tokio::test]
    async fn test_preview_by_text_delimiter() {
        let pdf = source(&["Chapter 1", "body", "Chapter 2", "more"]);
        let plan = preview(
            &pdf,
            &SplitRequest::delimiter(r"^Chapter \d+"),
            Some(&Detector::Text),
        )
        .await
        .unwrap();
        assert_eq!(plan.spans, vec![PageSpan::new(1, 2), PageSpan::new(3, 4)]);
        assert_eq!(plan.part_name(1), "Book_part_2.pdf");
    }

    #[tokio::test]
    async fn test_preview_text_delimiter_without_match() {
        let pdf = source(&["Chapter 1", "body"]);
        let err = preview(
            &pdf,
            &SplitRequest::delimiter("^Appendix"),
            Some(&Detector::Text),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "AI could not determine split points. Try a different delimiter."
        );
    }

    #[tokio::test]
    async fn test_preview_sends_pattern_untrimmed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .match_body(mockito::Matcher::Regex(
                r#"Delimiter Regex:   Part  ""#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"[1, 2]"}]}}]}"#)
            .create_async()
            .await;

        let detector = Detector::Llm(
            LlmDetector::new(LlmConfig {
                api_key: Some("k".to_string()),
                api_base: server.url(),
                ..LlmConfig::default()
            })
            .unwrap_or_else(|e| panic!("{e}")),
        );
        let pdf = source(&["a", "b", "c"]);
        let plan = preview(&pdf, &SplitRequest::delimiter("  Part  "), Some(&detector))
            .await
            .unwrap();

        assert_eq!(plan.spans, vec![PageSpan::new(1, 1), PageSpan::new(2, 3)]);
        mock.assert_async().await;
    }

    #[test]
    fn test_split_to_archive() {
        let pdf = source(&["p1", "p2", "p3", "p4", "p5"]);
        let plan = SplitPlan::new(
            vec![PageSpan::new(1, 2), PageSpan::new(3, 5)],
            &pdf.name,
        );

        let mut stages = Vec::new();
        let bytes = split_to_archive(&pdf, &plan, |s| stages.push(s)).unwrap();

        assert_eq!(
            stages,
            vec![
                Stage::Splitting,
                Stage::Creating {
                    current: 1,
                    total: 2
                },
                Stage::Creating {
                    current: 2,
                    total: 2
                },
                Stage::Compressing,
            ]
        );

        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut expected = vec![vec!["p1", "p2"], vec!["p3", "p4", "p5"]].into_iter();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).unwrap();
            assert_eq!(entry.name(), format!("Book_part_{}.pdf", i + 1));
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).unwrap();
            let part = Document::load_mem(&buf).unwrap();
            assert_eq!(page_texts(&part), expected.next().unwrap());
        }
    }

    #[test]
    fn test_split_empty_plan() {
        let pdf = source(&["p1"]);
        let plan = SplitPlan::new(Vec::new(), &pdf.name);
        assert!(split_to_archive(&pdf, &plan, |_| {}).is_err());
    }
}
