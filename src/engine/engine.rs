use crate::config::templates::TemplatePack;
use crate::engine::classifier::{ExposureClassifier, VerdictClassifier};
use crate::engine::llm_client::TextGenerator;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::{Assessment, ChatReply, LabCommand, LabResponse};
use crate::error::{LabError, LabResult};
use crate::model::character::{Antagonist, CharacterProfile, Rulebook};
use crate::model::message::Turn;
use crate::model::session::Session;

/// Runs lab operations against a session.
///
/// The dramaturg holds no per-user state. Every operation takes the session
/// it acts on, runs to completion (one or two blocking calls to the
/// generator), and leaves the session as it was if the generator fails,
/// except for a chat message, which stays in the log without a reply.
pub struct Dramaturg<G> {
    generator: G,
    prompts: PromptBuilder,
    verdict: VerdictClassifier,
    exposure: ExposureClassifier,
    access_code: String,
}

impl<G: TextGenerator> Dramaturg<G> {
    pub fn new(generator: G, pack: &TemplatePack, access_code: impl Into<String>) -> LabResult<Self> {
        pack.validate()?;
        Ok(Self {
            generator,
            prompts: PromptBuilder::new(pack)?,
            verdict: pack.verdict.clone(),
            exposure: pack.exposure.clone(),
            access_code: access_code.into(),
        })
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn handle(&self, session: &mut Session, command: LabCommand) -> LabResult<LabResponse> {
        match command {
            LabCommand::Authenticate(code) => {
                self.authenticate(session, &code)?;
                Ok(LabResponse::Authenticated)
            }
            LabCommand::Assess { rulebook, profile } => {
                self.assess(session, &rulebook, profile).map(LabResponse::Verdict)
            }
            LabCommand::Duel(antagonist) => self.duel(session, &antagonist).map(LabResponse::Scene),
            LabCommand::Chat(message) => self.chat(session, &message).map(LabResponse::Reply),
        }
    }

    /// No retry limit or lockout.
    pub fn authenticate(&self, session: &mut Session, code: &str) -> LabResult<()> {
        if code != self.access_code {
            log::warn!("rejected access code attempt");
            return Err(LabError::AuthFailure);
        }
        session.mark_authenticated();
        log::info!("session authenticated");
        Ok(())
    }

    pub fn assess(
        &self,
        session: &mut Session,
        rulebook: &Rulebook,
        profile: CharacterProfile,
    ) -> LabResult<Assessment> {
        require_authenticated(session)?;
        // A rulebook with no text is still assessed; only a missing name stops it.
        if profile.name.is_empty() {
            return Err(LabError::MissingInput("character name"));
        }

        let prompt = self.prompts.assessment(rulebook, &profile)?;
        log::info!(
            "assessing `{}` against {}",
            profile.name,
            rulebook.file_name
        );

        let text = self.generator.generate(&prompt).inspect_err(|err| {
            log::warn!("assessment call failed: {err}");
        })?;

        let approved = self.verdict.is_approved(&text);
        log::info!(
            "verdict for `{}`: {}",
            profile.name,
            if approved { "approved" } else { "needs revision" }
        );

        session.record_assessment(profile, text.clone(), approved);
        Ok(Assessment { approved, text })
    }

    pub fn duel(&self, session: &Session, antagonist: &Antagonist) -> LabResult<String> {
        let profile = approved_profile(session)?;
        let prompt = self.prompts.duel(profile, antagonist)?;
        log::info!("writing duel: `{}` vs `{}`", profile.name, antagonist.name);

        let scene = self.generator.generate(&prompt).inspect_err(|err| {
            log::warn!("duel call failed: {err}");
        })?;
        Ok(scene)
    }

    /// Appends the user's message, runs the exposure check, asks for the
    /// in-character answer and appends it.
    pub fn chat(&self, session: &mut Session, message: &str) -> LabResult<ChatReply> {
        let profile = approved_profile(session)?.clone();
        if message.trim().is_empty() {
            return Err(LabError::MissingInput("message"));
        }

        session.append_turn(Turn::user(message));

        let exposed = self.check_exposure(&profile, message);
        let prompt = self.prompts.reply(&profile, message, exposed)?;

        let content = self.generator.generate(&prompt).inspect_err(|err| {
            log::warn!("reply call failed, user turn left unanswered: {err}");
        })?;

        session.append_turn(Turn::character(content.clone()));
        Ok(ChatReply { content, exposed })
    }

    /// A failed check counts as "not exposed".
    fn check_exposure(&self, profile: &CharacterProfile, message: &str) -> bool {
        let prompt = match self.prompts.exposure_check(profile, message) {
            Ok(prompt) => prompt,
            Err(err) => {
                log::warn!("exposure check skipped: {err}");
                return false;
            }
        };

        match self.generator.generate(&prompt) {
            Ok(response) => {
                let triggered = self.exposure.is_triggered(&response);
                log::debug!("exposure check triggered: {triggered}");
                triggered
            }
            Err(err) => {
                log::warn!("exposure check failed, staying guarded: {err}");
                false
            }
        }
    }
}

fn require_authenticated(session: &Session) -> LabResult<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(LabError::NotAuthenticated)
    }
}

fn approved_profile(session: &Session) -> LabResult<&CharacterProfile> {
    require_authenticated(session)?;
    match session.profile() {
        Some(profile) if session.is_approved() => Ok(profile),
        _ => Err(LabError::NotApproved),
    }
}
