pub mod anthropic;
pub mod deepseek;
pub mod gpt_oss;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use self::anthropic::AnthropicChatClient;
use self::deepseek::DeepSeekChatClient;
use self::gpt_oss::GptOssChatClient;
use self::openai::OpenAIChatClient;
use super::{ ProviderConfig, ProviderError, ProviderKind };
use crate::models::chat::ChatTurn;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<CompletionResponse, ProviderError>;

    fn kind(&self) -> ProviderKind;
}

pub fn new_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let client: Arc<dyn ChatClient> = match config.kind {
        ProviderKind::DeepSeek => {
            let specific_client = DeepSeekChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        ProviderKind::GptOss => {
            let specific_client = GptOssChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        ProviderKind::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        ProviderKind::Anthropic => {
            let specific_client = AnthropicChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
