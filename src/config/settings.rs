use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::llm_client::{GeminiClient, OpenAiCompatibleClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    OpenAiCompatible,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-flash-latest",
            Provider::OpenAiCompatible => "local-model",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Gemini => GeminiClient::DEFAULT_ENDPOINT,
            Provider::OpenAiCompatible => OpenAiCompatibleClient::DEFAULT_ENDPOINT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabSettings {
    pub provider: Provider,

    /// Falls back to the provider's default model when unset.
    pub model: Option<String>,
    pub endpoint: Option<String>,

    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub request_timeout_secs: u64,

    /// Name of a built-in template pack ("classic" or "script").
    pub template_pack: String,
    /// A TOML template pack on disk; takes precedence over `template_pack`.
    pub template_file: Option<PathBuf>,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            endpoint: None,
            temperature: 0.7,
            max_output_tokens: None,
            request_timeout_secs: 120,
            template_pack: "classic".into(),
            template_file: None,
        }
    }
}

impl LabSettings {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_provider() {
        let mut settings = LabSettings::default();
        assert_eq!(settings.model(), "gemini-flash-latest");
        assert_eq!(settings.endpoint(), GeminiClient::DEFAULT_ENDPOINT);

        settings.provider = Provider::OpenAiCompatible;
        assert_eq!(settings.model(), "local-model");
        assert_eq!(settings.endpoint(), "http://localhost:1234");
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: LabSettings =
            serde_json::from_str(r#"{"provider":"open_ai_compatible","model":"mistral"}"#)
                .unwrap();
        assert_eq!(settings.provider, Provider::OpenAiCompatible);
        assert_eq!(settings.model(), "mistral");
        assert_eq!(settings.template_pack, "classic");
        assert_eq!(settings.request_timeout_secs, 120);
    }
}
