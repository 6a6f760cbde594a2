// Ollama-style generate endpoint as a semantic detector.
//
// Sends `{model, prompt, format: "json"}` to `{base_url}/api/generate` and
// asks the model for `{"hits": [{term, start, end, severity}]}` over the
// original text, so any offsets it returns can be used for censoring as-is.
// The endpoint may stream NDJSON chunks; parse.rs stitches them back together.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::parse::parse_generate_response;
use super::traits::SemanticDetector;
use crate::moderation::models::Hit;
use crate::output::truncate_chars;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "mistral";

/// Semantic detector backed by a local or remote Ollama server.
pub struct OllamaDetector {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaDetector {
    /// Create a detector. `timeout` bounds the whole HTTP round trip.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for semantic detector")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SemanticDetector for OllamaDetector {
    async fn detect(&self, text: &str) -> Result<Vec<Hit>> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(text),
            format: "json",
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to call semantic detector")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Semantic detector returned {}: {}",
                status,
                truncate_chars(&body, 200)
            );
        }

        let body = response
            .text()
            .await
            .context("Failed to read semantic detector response")?;
        let hits = parse_generate_response(&body)?;

        debug!(
            model = %self.model,
            hits = hits.len(),
            text_preview = %truncate_chars(text, 50),
            "Semantic detection finished"
        );

        Ok(hits)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// The instruction sent to the model. Offsets are requested as character
/// positions in the text exactly as given.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Detect profanity, slurs and insults in the text below and reply ONLY with valid JSON:\n\
         {{\"hits\":[{{\"term\":\"...\",\"start\":0,\"end\":4,\"severity\":2}}]}}\n\
         \"start\" and \"end\" are zero-based character offsets into the text (end exclusive).\n\
         \"severity\" is 1 (mild), 2 (strong) or 3 (slur or severe).\n\
         Reply {{\"hits\":[]}} if there is nothing offensive.\n\n\
         Text:\n{text}\n"
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    format: &'a str,
}
