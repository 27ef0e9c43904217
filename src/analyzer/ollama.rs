//! Ollama-backed report analyzer — local LLM inference over HTTP.

use serde::{Deserialize, Serialize};

use super::prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use super::{parse_analysis_response, AnalysisError, ReportAnalysis, ReportAnalyzer};

/// Preferred analysis models in order of preference.
const ANALYSIS_MODELS: &[&str] = &[
    "medgemma",
    "medgemma:27b",
    "medgemma:4b",
    "medgemma:latest",
    "llama3.1:8b",
];

/// Ollama HTTP client for local report analysis.
pub struct OllamaAnalyzer {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaAnalyzer {
    /// Create a new analyzer pointing at an Ollama instance.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local(model: &str) -> Self {
        Self::new("http://localhost:11434", model, 300)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Find the best available analysis model on this instance.
    pub fn find_best_model(&self) -> Result<String, AnalysisError> {
        let available = self.list_models()?;
        for preferred in ANALYSIS_MODELS {
            if available.iter().any(|m| m.starts_with(preferred)) {
                return Ok(preferred.to_string());
            }
        }
        Err(AnalysisError::Unavailable(
            "No analysis-capable model installed".into(),
        ))
    }

    /// List model names installed on the Ollama instance.
    pub fn list_models(&self) -> Result<Vec<String>, AnalysisError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_transport_error(e))?;
        let tags: OllamaTagsResponse = response
            .json()
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system: ANALYSIS_SYSTEM_PROMPT,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(AnalysisError::Unavailable(format!(
                "HTTP {} from {}",
                response.status(),
                self.base_url
            )));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        Ok(parsed.response)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_connect() {
            AnalysisError::Unavailable(format!("Cannot reach Ollama at {}", self.base_url))
        } else if e.is_timeout() {
            AnalysisError::Unavailable(format!(
                "Request timed out after {}s",
                self.timeout_secs
            ))
        } else {
            AnalysisError::Unavailable(e.to_string())
        }
    }
}

impl ReportAnalyzer for OllamaAnalyzer {
    fn analyze(&self, report_text: &str) -> Result<ReportAnalysis, AnalysisError> {
        tracing::info!(
            model = %self.model,
            text_length = report_text.len(),
            "Analyzing health report"
        );
        let response = self.generate(&build_analysis_prompt(report_text))?;
        let analysis = parse_analysis_response(&response)?;
        tracing::info!(
            score = analysis.score,
            suggestions = analysis.suggestions.len(),
            plan_days = analysis.daily_plan.len(),
            "Report analysis complete"
        );
        Ok(analysis)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}
