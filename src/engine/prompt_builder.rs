use handlebars::{no_escape, Handlebars};
use serde::Serialize;

use crate::config::templates::TemplatePack;
use crate::error::LabResult;
use crate::model::character::{Antagonist, CharacterProfile, Rulebook};

const ASSESSMENT: &str = "assessment";
const DUEL: &str = "duel";
const EXPOSURE_CHECK: &str = "exposure_check";
const PERSONA_EXPOSED: &str = "persona_exposed";
const PERSONA_GUARDED: &str = "persona_guarded";
const REPLY: &str = "reply";

#[derive(Serialize)]
struct RulebookView<'a> {
    file_name: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct AssessmentContext<'a> {
    rulebook: RulebookView<'a>,
    character: &'a CharacterProfile,
}

#[derive(Serialize)]
struct DuelContext<'a> {
    character: &'a CharacterProfile,
    antagonist: &'a Antagonist,
}

#[derive(Serialize)]
struct MessageContext<'a> {
    character: &'a CharacterProfile,
    message: &'a str,
}

#[derive(Serialize)]
struct ReplyContext<'a> {
    persona: &'a str,
    message: &'a str,
}

/// Renders the prompts sent to the text service.
/// This struct only formats text: no networking, no classification.
///
/// Escaping is disabled, so user text and rulebook contents reach the
/// prompt byte for byte. Strict mode turns a misspelled placeholder in a
/// template pack into an error instead of an empty string.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    pub fn new(pack: &TemplatePack) -> LabResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);

        registry.register_template_string(ASSESSMENT, &pack.assessment)?;
        registry.register_template_string(DUEL, &pack.duel)?;
        registry.register_template_string(EXPOSURE_CHECK, &pack.exposure_check)?;
        registry.register_template_string(PERSONA_EXPOSED, &pack.persona_exposed)?;
        registry.register_template_string(PERSONA_GUARDED, &pack.persona_guarded)?;
        registry.register_template_string(REPLY, &pack.reply)?;

        Ok(Self { registry })
    }

    pub fn assessment(
        &self,
        rulebook: &Rulebook,
        character: &CharacterProfile,
    ) -> LabResult<String> {
        let context = AssessmentContext {
            rulebook: RulebookView {
                file_name: &rulebook.file_name,
                text: &rulebook.text,
            },
            character,
        };
        self.render(ASSESSMENT, &context)
    }

    pub fn duel(&self, character: &CharacterProfile, antagonist: &Antagonist) -> LabResult<String> {
        self.render(DUEL, &DuelContext { character, antagonist })
    }

    pub fn exposure_check(&self, character: &CharacterProfile, message: &str) -> LabResult<String> {
        self.render(EXPOSURE_CHECK, &MessageContext { character, message })
    }

    /// The in-character reply prompt: persona instruction for the branch,
    /// framed together with the user's message.
    pub fn reply(
        &self,
        character: &CharacterProfile,
        message: &str,
        exposed: bool,
    ) -> LabResult<String> {
        let persona_template = if exposed { PERSONA_EXPOSED } else { PERSONA_GUARDED };
        let persona = self.render(persona_template, &MessageContext { character, message })?;
        self.render(
            REPLY,
            &ReplyContext {
                persona: &persona,
                message,
            },
        )
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> LabResult<String> {
        let prompt = self.registry.render(name, data)?;
        log::debug!("rendered {name} prompt ({} bytes)", prompt.len());
        Ok(prompt)
    }
}
