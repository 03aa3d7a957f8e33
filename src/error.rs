use thiserror::Error;

use crate::engine::llm_client::ServiceError;

pub type LabResult<T> = Result<T, LabError>;

/// Errors surfaced by lab operations.
///
/// Only `Configuration` is meant to stop the program; everything else leaves
/// the session usable.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("incorrect access code")]
    AuthFailure,

    #[error("enter the access code first")]
    NotAuthenticated,

    #[error("the character has not been approved yet")]
    NotApproved,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// No rulebook was supplied, or the character name is the empty string.
    /// An empty rulebook file and a whitespace-only name are not missing.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("generation failed: {0}")]
    Service(#[from] ServiceError),

    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("invalid template pack: {0}")]
    TemplatePack(#[from] toml::de::Error),

    #[error("could not write template pack: {0}")]
    TemplatePackWrite(#[from] toml::ser::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("rulebook `{0}` is not valid UTF-8 text")]
    RulebookEncoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
