use super::types::*;
use super::Enricher;
use crate::config::EnricherConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct OpenAiEnricher {
    client: Client,
    /// Without a key every `generate` call fails; the rest of the tool works.
    api_key: Option<String>,
    base_url: String,
    model: String,
}

fn insights_prompt(profile_url: &str, social_url: &str) -> String {
    format!(
        "Please analyze the following social media profiles and provide insights about the person and their company:\n\
         LinkedIn: {}\n\
         Facebook: {}\n\
         \n\
         Please provide a summary of:\n\
         1. Company information\n\
         2. Personal interests and hobbies\n\
         3. Notable achievements\n\
         4. Potential conversation starters",
        profile_url, social_url
    )
}

/// Content of the first choice, if the model returned any.
fn first_content(resp: ChatResponse) -> Option<String> {
    resp.choices.into_iter().next().and_then(|c| c.message.content)
}

impl OpenAiEnricher {
    pub fn new(api_key: Option<String>, config: &EnricherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    async fn generate(&self, profile_url_a: &str, profile_url_b: &str) -> Result<Option<String>> {
        let Some(api_key) = self.api_key.as_deref() else {
            anyhow::bail!("OPENAI_API_KEY is not set; enrichment is disabled");
        };
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(insights_prompt(profile_url_a, profile_url_b)),
            }],
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completion failed ({}): {}", status, body);
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .context("failed to parse chat completion response")?;

        Ok(first_content(parsed))
    }
}
