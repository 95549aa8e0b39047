use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::pdf::SourcePdf;

const PROMPT: &str = "You are a PDF splitting expert.

You will receive a PDF and a regular expression to use as a delimiter.

Your job is to analyze the PDF and determine the page numbers where the PDF should be split, \
such that each split begins with a matching delimiter.

Return a JSON object with a single field \"splitInstructions\" containing a JSON array of the \
page numbers where the PDF should be split. The first element of the array should be 1.";

/// Finds delimiter pages by asking a Gemini model about the whole document
#[derive(Clone)]
pub struct LlmDetector {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl LlmDetector {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("No API key configured; set GEMINI_API_KEY or pass --api-key")
            })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(LlmDetector {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    pub async fn detect(&self, pdf: &SourcePdf, pattern: &str) -> Result<Vec<u32>> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text {
                        text: format!("{}\n\nDelimiter Regex: {}", PROMPT, pattern),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "application/pdf",
                            data: STANDARD.encode(&pdf.bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
            },
        };

        info!(model = %self.config.model, file = %pdf.name, "asking model for split points");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach the model endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Model request failed with {}: {}", status, body.trim());
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Model returned an unreadable response")?;
        let text = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        debug!(response = %text, "model answered");

        parse_split_instructions(&text)
    }
}

/// Pull the start-page list out of the model's answer
pub fn parse_split_instructions(text: &str) -> Result<Vec<u32>> {
    let text = strip_code_fence(text.trim());
    let value: JsonValue = serde_json::from_str(text)
        .with_context(|| format!("Model answer is not JSON: {}", text))?;

    let pages = match value {
        JsonValue::Object(mut map) => match map.remove("splitInstructions") {
            // the instructions themselves are a JSON-encoded array
            Some(JsonValue::String(inner)) => serde_json::from_str::<JsonValue>(inner.trim())
                .with_context(|| format!("splitInstructions is not a JSON array: {}", inner))?,
            Some(other) => other,
            None => bail!("Model answer has no splitInstructions field"),
        },
        other => other,
    };

    match pages {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| anyhow!("Invalid page number in model answer: {}", item))
            })
            .collect(),
        other => bail!("Expected an array of page numbers, got: {}", other),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
