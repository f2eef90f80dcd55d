use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ ProviderConfig, ProviderError, ProviderKind, PROVIDER_TIMEOUT_SECS };
use crate::models::chat::ChatTurn;

pub struct DeepSeekChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct DeepSeekRequest {
    messages: Vec<DeepSeekMessage>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekMessage,
}

impl DeepSeekChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, ProviderError> {
        let chat_model = model.unwrap_or_else(|| "deepseek-chat".to_string());
        let api_url = base_url.unwrap_or_else(|| "https://api.deepseek.com".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
                ProviderError::Configuration(format!("Invalid API key format: {}", e))
            )?
        );

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
            .ok_or_else(|| ProviderError::Configuration("DeepSeek API key is required".to_string()))?;

        Self::new(api_key, config.model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for DeepSeekChatClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let messages = turns
            .iter()
            .map(|t| DeepSeekMessage {
                role: t.role.clone(),
                content: t.content.clone(),
            })
            .collect();

        let req = DeepSeekRequest {
            messages,
            model: self.model.clone(),
            temperature: 0.7,
            max_tokens: 1024,
        };

        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await?
            .error_for_status()?
            .json::<DeepSeekResponse>().await?;

        let content = resp.choices
            .first()
            .ok_or_else(|| ProviderError::Malformed("no choices in DeepSeek response".to_string()))?
            .message.content.clone();

        Ok(CompletionResponse { response: content })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }
}
