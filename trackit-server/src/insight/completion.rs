//! Chat-completion backed provider
//!
//! Posts an OpenAI-style chat completion to `<base_url>/chat/completions`
//! and reads the first choice's message content as a JSON analysis. Content
//! that is not a valid analysis object yields the canned analysis instead.
//! Face images are never sent; face analysis always comes from the canned
//! provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use trackit_common::config::InsightConfig;

use super::{
    canned, AnalysisTarget, AttendanceAnalysis, Insight, InsightProvider, InsightRequest,
    ProviderError,
};

const SYSTEM_PROMPT: &str =
    "You are an expert educational data analyst specializing in attendance patterns and student engagement.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct CompletionInsightProvider {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl CompletionInsightProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
        })
    }

    /// Build from the `[insight]` config section; `base_url` is required
    pub fn from_config(config: &InsightConfig) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::Config("insight.base_url is not set".to_string()))?;

        Self::new(
            base_url,
            config.resolved_api_key(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, prompt: String) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Requesting completion");

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Parse("completion has no choices".to_string()))
    }
}

fn attendance_prompt(
    target: AnalysisTarget,
    stats: &serde_json::Value,
    time_range: Option<&str>,
) -> String {
    let target = match target {
        AnalysisTarget::Student => "Student",
        AnalysisTarget::Class => "Class",
    };
    format!(
        "Analyze the following attendance data and provide insights.\n\
         \n\
         Data: {stats}\n\
         Target: {target}\n\
         Time Range: {}\n\
         \n\
         Cover overall performance, key patterns, recommendations, risk and trends.\n\
         Respond with only a JSON object of this shape:\n\
         {{\"summary\": \"...\", \"insights\": [\"...\"], \"recommendations\": [\"...\"], \
         \"riskLevel\": \"low|medium|high\", \"trends\": \"...\", \"prediction\": \"...\"}}",
        time_range.unwrap_or("All time"),
    )
}

/// Read completion content as an analysis, canned when it does not parse
fn parse_attendance_content(content: &str) -> AttendanceAnalysis {
    match serde_json::from_str::<AttendanceAnalysis>(content.trim()) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "Completion content is not an analysis object, using fallback");
            canned::attendance_analysis()
        }
    }
}

#[async_trait]
impl InsightProvider for CompletionInsightProvider {
    fn name(&self) -> &'static str {
        "completion"
    }

    async fn analyze(&self, request: &InsightRequest) -> Result<Insight, ProviderError> {
        match request {
            InsightRequest::Face { .. } => Ok(Insight::Face(canned::face_analysis())),
            InsightRequest::Attendance {
                target,
                stats,
                time_range,
            } => {
                let content = self
                    .complete(attendance_prompt(*target, stats, time_range.as_deref()))
                    .await?;
                Ok(Insight::Attendance(parse_attendance_content(&content)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_base_url() {
        let provider = CompletionInsightProvider::new(
            "http://localhost:9999/v1/",
            None,
            "m",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let config = InsightConfig::default();
        assert!(matches!(
            CompletionInsightProvider::from_config(&config),
            Err(ProviderError::Config(_))
        ));
    }

    #[test]
    fn test_prompt_mentions_target_and_range() {
        let prompt = attendance_prompt(AnalysisTarget::Student, &json!({"totalRecords": 3}), None);
        assert!(prompt.contains("Target: Student"));
        assert!(prompt.contains("Time Range: All time"));
        assert!(prompt.contains("\"totalRecords\":3"));
    }

    #[test]
    fn test_unparseable_content_falls_back() {
        assert_eq!(
            parse_attendance_content("Sure! Here is your analysis."),
            canned::attendance_analysis()
        );
    }
}
