use std::fmt;

use crate::config::settings::Provider;
use crate::error::{LabError, LabResult};

pub const API_KEY_VAR: &str = "NARRATIVE_LAB_API_KEY";
pub const ACCESS_CODE_VAR: &str = "NARRATIVE_LAB_ACCESS_CODE";

fn fallback_key_var(provider: Provider) -> &'static str {
    match provider {
        Provider::Gemini => "GOOGLE_API_KEY",
        Provider::OpenAiCompatible => "OPENAI_API_KEY",
    }
}

/// Resolves the API key for `provider`. Gemini requires one; local
/// OpenAI-compatible servers usually don't.
pub fn resolve_api_key(
    provider: Provider,
    lookup: impl Fn(&str) -> Option<String>,
) -> LabResult<Option<String>> {
    let key = [API_KEY_VAR, fallback_key_var(provider)]
        .into_iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty());

    match (key, provider) {
        (None, Provider::Gemini) => Err(LabError::Configuration(format!(
            "API key missing, set {API_KEY_VAR} or {}",
            fallback_key_var(provider)
        ))),
        (key, _) => Ok(key),
    }
}

/// Credentials supplied from outside the program. Never printed.
#[derive(Clone)]
pub struct Secrets {
    api_key: Option<String>,
    access_code: String,
}

impl Secrets {
    pub fn new(api_key: Option<String>, access_code: impl Into<String>) -> Self {
        Self {
            api_key,
            access_code: access_code.into(),
        }
    }

    pub fn from_env(provider: Provider) -> LabResult<Self> {
        Self::from_lookup(provider, |var| std::env::var(var).ok())
    }

    pub fn from_lookup(
        provider: Provider,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LabResult<Self> {
        let api_key = resolve_api_key(provider, &lookup)?;
        let access_code = lookup(ACCESS_CODE_VAR)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                LabError::Configuration(format!("access code missing, set {ACCESS_CODE_VAR}"))
            })?;

        Ok(Self::new(api_key, access_code))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn access_code(&self) -> &str {
        &self.access_code
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_code", &"<redacted>")
            .finish()
    }
}
