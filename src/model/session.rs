use crate::model::character::CharacterProfile;
use crate::model::message::{ChatLog, Turn};

/// Coarse lifecycle of a session, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Unapproved,
    Approved,
}

/// Everything one user session knows. Owned by a single host context and
/// handed to every lab operation as `&mut Session`.
///
/// Fields are private so that `approved` can only move through the
/// transitions defined here.
#[derive(Debug, Clone, Default)]
pub struct Session {
    authenticated: bool,
    approved: bool,
    verdict_text: Option<String>,
    profile: Option<CharacterProfile>,
    chat_log: ChatLog,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (self.authenticated, self.approved) {
            (false, _) => SessionState::Unauthenticated,
            (true, false) => SessionState::Unapproved,
            (true, true) => SessionState::Approved,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn verdict_text(&self) -> Option<&str> {
        self.verdict_text.as_deref()
    }

    /// The profile captured by the most recent successful assessment.
    pub fn profile(&self) -> Option<&CharacterProfile> {
        self.profile.as_ref()
    }

    pub fn chat_log(&self) -> &ChatLog {
        &self.chat_log
    }

    pub(crate) fn mark_authenticated(&mut self) {
        self.authenticated = true;
    }

    /// Records a completed assessment. The chat log is left untouched, so
    /// earlier interview turns stay visible after a re-assessment.
    pub(crate) fn record_assessment(
        &mut self,
        profile: CharacterProfile,
        verdict_text: String,
        approved: bool,
    ) {
        self.profile = Some(profile);
        self.verdict_text = Some(verdict_text);
        self.approved = approved;
    }

    pub(crate) fn append_turn(&mut self, turn: Turn) {
        self.chat_log.push(turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_unauthenticated() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.verdict_text().is_none());
        assert!(session.chat_log().is_empty());
    }

    #[test]
    fn weak_reassessment_demotes_but_keeps_transcript() {
        let mut session = Session::new();
        session.mark_authenticated();
        session.record_assessment(CharacterProfile::default(), "SOLID".into(), true);
        assert_eq!(session.state(), SessionState::Approved);

        session.append_turn(Turn::user("Hello?"));
        session.append_turn(Turn::character("Good evening."));

        session.record_assessment(CharacterProfile::default(), "WEAK".into(), false);
        assert_eq!(session.state(), SessionState::Unapproved);
        assert_eq!(session.chat_log().len(), 2);
        assert_eq!(session.verdict_text(), Some("WEAK"));
    }
}
