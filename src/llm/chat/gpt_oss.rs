use std::time::Duration;

use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ ProviderConfig, ProviderError, ProviderKind, PROVIDER_TIMEOUT_SECS };
use crate::models::chat::ChatTurn;

// gpt-oss served through Groq's OpenAI-compatible endpoint.
pub struct GptOssChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct GptOssMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct GptOssRequest {
    messages: Vec<GptOssMessage>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GptOssResponse {
    choices: Vec<GptOssChoice>,
}

#[derive(Deserialize)]
struct GptOssChoice {
    message: GptOssMessage,
}

impl GptOssChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, ProviderError> {
        let chat_model = model.unwrap_or_else(|| "openai/gpt-oss-120b".to_string());
        let api_url = base_url.unwrap_or_else(|| "https://api.groq.com".to_string());

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
            .ok_or_else(|| ProviderError::Configuration("gpt-oss API key is required".to_string()))?;

        Self::new(api_key, config.model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for GptOssChatClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/openai/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let messages = turns
            .iter()
            .map(|t| GptOssMessage {
                role: t.role.clone(),
                content: t.content.clone(),
            })
            .collect();

        let req = GptOssRequest {
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
            .json::<GptOssResponse>().await?;

        let content = resp.choices
            .first()
            .ok_or_else(|| ProviderError::Malformed("no choices in gpt-oss response".to_string()))?
            .message.content.clone();

        Ok(CompletionResponse { response: content })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::GptOss
    }
}
