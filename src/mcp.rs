use anyhow::{bail, Context, Result};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::config::{DetectorKind, LlmConfig};
use crate::delimiter::Detector;
use crate::pdf::SourcePdf;
use crate::plan::SplitPlan;
use crate::split::{preview, split_to_archive, SplitMethod, SplitRequest};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfPreviewRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages per output file (e.g., '10'). Exclusive with delimiter.")]
    pub pages: Option<String>,
    #[schemars(description = "Regular expression marking the first page of each section (e.g., '^Chapter \\d+'). Exclusive with pages.")]
    pub delimiter: Option<String>,
    #[schemars(description = "How delimiter pages are found: 'llm' (default) or 'text'")]
    pub detector: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages per output file (e.g., '10'). Exclusive with delimiter.")]
    pub pages: Option<String>,
    #[schemars(description = "Regular expression marking the first page of each section (e.g., '^Chapter \\d+'). Exclusive with pages.")]
    pub delimiter: Option<String>,
    #[schemars(description = "How delimiter pages are found: 'llm' (default) or 'text'")]
    pub detector: Option<String>,
    #[schemars(description = "Directory to write the zip archive to (default: the PDF's directory)")]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
    llm: LlmConfig,
}

impl PdfServer {
    pub fn new(llm: LlmConfig) -> Self {
        Self {
            tool_router: Self::tool_router(),
            llm,
        }
    }

    async fn plan(
        &self,
        path: &str,
        pages: Option<String>,
        delimiter: Option<String>,
        detector: Option<String>,
    ) -> Result<(SourcePdf, SplitPlan)> {
        let request = split_request(pages, delimiter)?;
        let pdf = SourcePdf::open(path)?;
        let detector = match request.method {
            SplitMethod::Delimiter => Some(Detector::new(
                detector_kind(detector.as_deref())?,
                &self.llm,
            )?),
            SplitMethod::Pages => None,
        };
        let plan = preview(&pdf, &request, detector.as_ref()).await?;
        Ok((pdf, plan))
    }

    async fn split(&self, req: PdfSplitRequest) -> Result<SplitResult> {
        let (pdf, plan) = self
            .plan(&req.path, req.pages, req.delimiter, req.detector)
            .await?;
        let bytes = split_to_archive(&pdf, &plan, |stage| info!("{}", stage))?;

        let output_dir = match req.output_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(&req.path)
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default(),
        };
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
        let output_path = output_dir.join(plan.archive_name());
        std::fs::write(&output_path, &bytes)
            .with_context(|| format!("Failed to write archive: {}", output_path.display()))?;

        Ok(SplitResult {
            output_path: output_path.display().to_string(),
            parts: parts_of(&plan),
        })
    }
}

fn split_request(pages: Option<String>, delimiter: Option<String>) -> Result<SplitRequest> {
    match (pages, delimiter) {
        (Some(pages), None) => Ok(SplitRequest::pages(pages)),
        (None, Some(pattern)) => Ok(SplitRequest::delimiter(pattern)),
        (Some(_), Some(_)) => bail!("Give either pages or delimiter, not both"),
        (None, None) => bail!("Give either pages or delimiter"),
    }
}

fn detector_kind(name: Option<&str>) -> Result<DetectorKind> {
    match name.map(str::trim) {
        None | Some("") | Some("llm") => Ok(DetectorKind::Llm),
        Some("text") => Ok(DetectorKind::Text),
        Some(other) => bail!("Unknown detector '{}', expected 'llm' or 'text'", other),
    }
}

fn parts_of(plan: &SplitPlan) -> Vec<PartResult> {
    plan.spans
        .iter()
        .enumerate()
        .map(|(i, span)| PartResult {
            name: plan.part_name(i),
            start: span.start,
            end: span.end,
            page_count: span.page_count(),
        })
        .collect()
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the file name, page count and size of a PDF")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match SourcePdf::open(&path) {
            Ok(pdf) => {
                let summary = pdf.summary();
                let result = PdfInfoResult {
                    path,
                    name: summary.name.clone(),
                    page_count: summary.page_count,
                    size_bytes: summary.size_bytes,
                    size_mb: summary.size_mb(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Preview how a PDF would be split, either every N pages or at pages starting with a delimiter regex. Returns the part names and page ranges.")]
    async fn pdf_split_preview(&self, Parameters(req): Parameters<PdfPreviewRequest>) -> String {
        match self
            .plan(&req.path, req.pages, req.delimiter, req.detector)
            .await
        {
            Ok((_, plan)) => {
                let result = PreviewResult {
                    archive_name: plan.archive_name(),
                    parts: parts_of(&plan),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Split a PDF every N pages or at pages starting with a delimiter regex, and write the parts as a zip archive")]
    async fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        match self.split(req).await {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub name: String,
    pub page_count: u32,
    pub size_bytes: u64,
    pub size_mb: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartResult {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PreviewResult {
    pub archive_name: String,
    pub parts: Vec<PartResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitResult {
    pub output_path: String,
    pub parts: Vec<PartResult>,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF splitting tools. Use pdf_info to see how many pages a PDF has, \
                 pdf_split_preview to see which page ranges a split produces, and pdf_split \
                 to write the parts as a zip archive. Split either by page count ('pages') \
                 or by a delimiter regex ('delimiter') matched against section start pages."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(llm: LlmConfig) -> Result<()> {
    let server = PdfServer::new(llm);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
