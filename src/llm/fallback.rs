use std::sync::Arc;

use log::{ info, warn };

use super::chat::{ new_client, ChatClient };
use super::offline;
use super::{ ProviderConfig, ProviderError, ProviderKind, ProviderPreference, AUTO_PROVIDER_ORDER };
use crate::cli::Args;
use crate::memory::ConversationMemory;
use crate::models::chat::ChatTurn;
use crate::persona::Persona;

// provider is None when the offline generator produced the text.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
    pub provider: Option<ProviderKind>,
}

pub struct FallbackGenerator {
    providers: Vec<Arc<dyn ChatClient>>,
}

fn provider_config(args: &Args, kind: ProviderKind) -> ProviderConfig {
    let (api_key, model, base_url) = match kind {
        ProviderKind::DeepSeek =>
            (args.deepseek_api_key.clone(), args.deepseek_model.clone(), args.deepseek_base_url.clone()),
        ProviderKind::GptOss =>
            (args.gpt_oss_api_key.clone(), args.gpt_oss_model.clone(), args.gpt_oss_base_url.clone()),
        ProviderKind::OpenAI =>
            (args.openai_api_key.clone(), args.openai_model.clone(), args.openai_base_url.clone()),
        ProviderKind::Anthropic =>
            (args.anthropic_api_key.clone(), args.anthropic_model.clone(), args.anthropic_base_url.clone()),
    };
    ProviderConfig { kind, api_key, model, base_url }
}

impl FallbackGenerator {
    // Callers pass providers already in priority order.
    pub fn new(providers: Vec<Arc<dyn ChatClient>>) -> Self {
        Self { providers }
    }

    pub fn from_args(args: &Args) -> Result<Self, ProviderError> {
        let mut providers: Vec<Arc<dyn ChatClient>> = Vec::new();
        for kind in AUTO_PROVIDER_ORDER {
            let config = provider_config(args, *kind);
            if config.api_key.is_none() {
                continue;
            }
            providers.push(new_client(&config)?);
            info!("Text provider configured: {}", kind);
        }
        if providers.is_empty() {
            info!("No text providers configured, replies will use the offline generator");
        }
        Ok(Self { providers })
    }

    fn candidates(&self, preference: ProviderPreference) -> Vec<Arc<dyn ChatClient>> {
        match preference {
            ProviderPreference::Auto => self.providers.clone(),
            // An explicit choice is honored exactly: only that provider is
            // attempted, and its failure drops straight to offline.
            ProviderPreference::Exact(kind) =>
                self.providers
                    .iter()
                    .filter(|client| client.kind() == kind)
                    .cloned()
                    .collect(),
        }
    }

    pub async fn generate(
        &self,
        turns: &[ChatTurn],
        preference: ProviderPreference,
        persona: &Persona,
        memory: &ConversationMemory,
        message: &str
    ) -> GeneratedReply {
        for client in self.candidates(preference) {
            match client.complete(turns).await {
                Ok(completion) if !completion.response.trim().is_empty() => {
                    return GeneratedReply {
                        text: completion.response,
                        provider: Some(client.kind()),
                    };
                }
                Ok(_) => {
                    warn!("{} returned an empty completion, trying next provider", client.kind());
                }
                Err(e) => {
                    warn!("{} completion failed: {}", client.kind(), e);
                }
            }
        }

        info!("Falling back to offline reply generator");
        GeneratedReply {
            text: offline::generate_reply(persona, memory, message),
            provider: None,
        }
    }
}
