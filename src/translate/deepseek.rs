use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::{TranslateConfig, API_KEY_ENV};
use crate::error::{Result, SetmError};
use super::TextTranslator;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

/// DeepSeek chat-completions translator
pub struct DeepSeekTranslator {
    client: Client,
    config: TranslateConfig,
    api_key: Option<String>,
}

impl DeepSeekTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = config.resolve_api_key();

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a translation assistant. Translate the given English or Japanese text into {}. \
             Provide only the direct translation without any explanations.",
            self.config.target_language
        )
    }

    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: self.config.temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

/// Pull the answer out of a chat-completions response body.
pub fn extract_translation(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| SetmError::Translation("Response contained no choices".to_string()))?;

    if text.is_empty() {
        return Err(SetmError::Translation("Empty translation received".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl TextTranslator for DeepSeekTranslator {
    async fn translate_text(&self, text: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SetmError::Translation(format!("API key is missing. Set {} or translate.api_key", API_KEY_ENV))
        })?;

        let url = self.completions_url();
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| SetmError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SetmError::Translation(format!(
                "Translation API error {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SetmError::Translation(format!("Failed to parse response: {}", e)))?;

        extract_translation(body)
    }

    fn check_availability(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(SetmError::Config(format!(
                "Translation API key is required for video processing. Set {} or translate.api_key",
                API_KEY_ENV
            )));
        }
        Ok(())
    }
}
