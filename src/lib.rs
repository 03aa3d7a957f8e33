//! Character dramaturgy lab: assess a character arc against a rulebook with a
//! generative text service, then stage a duel scene and interview the
//! character once the arc is approved.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;

pub use engine::engine::Dramaturg;
pub use engine::llm_client::{LlmClient, ServiceError, TextGenerator};
pub use engine::protocol::{Assessment, ChatReply, LabCommand, LabResponse};
pub use error::{LabError, LabResult};
pub use model::session::{Session, SessionState};
