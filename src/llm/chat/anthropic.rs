use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ ProviderConfig, ProviderError, ProviderKind, PROVIDER_TIMEOUT_SECS };
use crate::models::chat::ChatTurn;
use crate::models::session::ROLE_SYSTEM;

pub struct AnthropicChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

// The Messages API takes system instructions as a top-level field, not as
// a message role.
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, ProviderError> {
        let chat_model = model.unwrap_or_else(|| "claude-3-5-sonnet-20241022".to_string());
        let api_url = base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key).map_err(|e|
                ProviderError::Configuration(format!("Invalid API key format: {}", e))
            )?
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| ProviderError::Configuration("Anthropic API key is required".to_string()))?;

        Self::new(api_key, config.model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let system = turns
            .iter()
            .filter(|t| t.role == ROLE_SYSTEM)
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let messages = turns
            .iter()
            .filter(|t| t.role != ROLE_SYSTEM)
            .map(|t| AnthropicMessage {
                role: t.role.clone(),
                content: t.content.clone(),
            })
            .collect();

        let req = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: (!system.is_empty()).then_some(system),
            messages,
            temperature: 0.7,
        };

        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await?
            .error_for_status()?
            .json::<AnthropicResponse>().await?;

        let content = resp.content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(ProviderError::Malformed("no text content in Anthropic response".to_string()));
        }

        Ok(CompletionResponse { response: content })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}
