use crate::model::character::{Antagonist, CharacterProfile, Rulebook};

pub enum LabCommand {
    Authenticate(String),
    Assess {
        rulebook: Rulebook,
        profile: CharacterProfile,
    },
    Duel(Antagonist),
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabResponse {
    Authenticated,
    Verdict(Assessment),
    Scene(String),
    Reply(ChatReply),
}

/// Result of one assessment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub approved: bool,
    pub text: String,
}

/// The character's answer to one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    /// Whether the exposure check fired for the message.
    pub exposed: bool,
}
