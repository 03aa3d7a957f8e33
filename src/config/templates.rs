//! Prompt template packs.
//!
//! A pack holds the wording of every prompt the lab sends, plus the markers
//! the classifiers look for. Packs are plain data: they can be written to
//! TOML, edited, and loaded back without touching any control flow.
//!
//! Placeholders use Handlebars syntax. Available fields:
//! - `assessment`: `rulebook.file_name`, `rulebook.text`, `character.*`
//! - `duel`: `character.*`, `antagonist.name`, `antagonist.opposing_belief`
//! - `exposure_check`, `persona_exposed`, `persona_guarded`: `character.*`, `message`
//! - `reply`: `persona`, `message`
//!
//! where `character.*` is `name`, `conscious_goal`, `hidden_truth`, `inner_need`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::settings::LabSettings;
use crate::engine::classifier::{ExposureClassifier, VerdictClassifier};
use crate::error::{LabError, LabResult};

pub const BUILTIN_PACKS: &[&str] = &["classic", "script"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePack {
    pub name: String,
    pub version: u32,

    pub assessment: String,
    pub duel: String,
    pub exposure_check: String,
    pub persona_exposed: String,
    pub persona_guarded: String,
    pub reply: String,

    #[serde(default)]
    pub verdict: VerdictClassifier,
    #[serde(default)]
    pub exposure: ExposureClassifier,
}

/* =========================
   classic
   ========================= */

const CLASSIC_ASSESSMENT: &str = "You are a strict Dramaturg using the rules of: \"{{rulebook.file_name}}\".\n\
RULES: {{rulebook.text}}\n\
\n\
CANDIDATE: Name: {{character.name}}, Goal: {{character.conscious_goal}}, Truth: {{character.hidden_truth}}, Need: {{character.inner_need}}\n\
\n\
TASK: Analyze if this arc works. Start with SOLID or WEAK.\n\
OUTPUT:\n\
1. The Verdict (SOLID/WEAK).\n\
2. A detailed paragraph explaining why, citing the text.\n";

const CLASSIC_DUEL: &str = "Write a dramatic dialogue scene between {{character.name}} and {{antagonist.name}}.\n\
\n\
CHARACTER 1: {{character.name}}\n\
Goal: {{character.conscious_goal}}\n\
Deep Need: {{character.inner_need}}\n\
\n\
CHARACTER 2: {{antagonist.name}}\n\
Opposing Belief: {{antagonist.opposing_belief}}\n\
\n\
SETTING: A tense location relevant to the story.\n\
\n\
INSTRUCTION:\n\
They must argue. {{antagonist.name}} should attack {{character.name}}'s goal using their opposing belief.\n\
{{character.name}} must defend their goal but struggle against the validity of the antagonist's point.\n\
Show the conflict rising.\n";

const EXPOSURE_CHECK: &str = "Secret: \"{{character.hidden_truth}}\"\n\
Input: \"{{message}}\"\n\
Is this an EXPLICIT exposure of the secret? Output YES or NO.\n";

const CLASSIC_PERSONA_EXPOSED: &str = "You are {{character.name}}. Your secret '{{character.hidden_truth}}' was just exposed! \
Break down emotionally. Confess you need '{{character.inner_need}}'.";

const CLASSIC_PERSONA_GUARDED: &str = "You are {{character.name}}. Goal: {{character.conscious_goal}}. \
Hide secret: {{character.hidden_truth}}. Be polite but distant.";

const REPLY: &str = "{{persona}}\nUser: {{message}}";

/* =========================
   script
   ========================= */

const SCRIPT_ASSESSMENT: &str = "You are a strict Dramaturg. Judge the candidate ONLY by the rulebook \"{{rulebook.file_name}}\".\n\
\n\
RULEBOOK:\n\
{{rulebook.text}}\n\
\n\
CANDIDATE:\n\
- Name: {{character.name}}\n\
- Conscious Goal: {{character.conscious_goal}}\n\
- Hidden Truth/Lie: {{character.hidden_truth}}\n\
- Inner Need: {{character.inner_need}}\n\
\n\
TASK: Decide whether this arc works under the rulebook.\n\
\n\
OUTPUT FORMAT (follow exactly):\n\
# VERDICT: SOLID or WEAK\n\
## Reasoning\n\
One paragraph that cites the rulebook by name.\n\
## Revision Hint\n\
One sentence. Write \"None\" if the verdict is SOLID.\n";

const SCRIPT_DUEL: &str = "Write a dialogue scene between {{character.name}} and {{antagonist.name}}.\n\
\n\
CHARACTER 1: {{character.name}}\n\
Goal: {{character.conscious_goal}}\n\
Deep Need: {{character.inner_need}}\n\
\n\
CHARACTER 2: {{antagonist.name}}\n\
Opposing Belief: {{antagonist.opposing_belief}}\n\
\n\
{{antagonist.name}} attacks {{character.name}}'s goal with their opposing belief. \
{{character.name}} defends the goal but cannot fully dismiss the other side. The conflict must rise.\n\
\n\
STRICT SCRIPT FORMAT:\n\
- Every line is `**SPEAKER NAME:** dialogue`.\n\
- Bold speaker names, followed by a colon.\n\
- No stage directions, no parentheticals, no scene headings.\n\
- No markdown other than the bold speaker names. No HTML.\n\
- Between 10 and 16 lines of dialogue.\n";

const SCRIPT_PERSONA_EXPOSED: &str = "You are {{character.name}}. Someone has just named your secret: '{{character.hidden_truth}}'. \
Your defenses collapse. Answer in the first person, break down emotionally, and admit that what you need is '{{character.inner_need}}'. \
Keep it under 120 words.";

const SCRIPT_PERSONA_GUARDED: &str = "You are {{character.name}}. Your goal: {{character.conscious_goal}}. \
You are hiding this: {{character.hidden_truth}}. Never state it. Be polite but distant. \
Answer in the first person and keep it under 80 words.";

impl TemplatePack {
    pub fn classic() -> Self {
        Self {
            name: "classic".into(),
            version: 1,
            assessment: CLASSIC_ASSESSMENT.into(),
            duel: CLASSIC_DUEL.into(),
            exposure_check: EXPOSURE_CHECK.into(),
            persona_exposed: CLASSIC_PERSONA_EXPOSED.into(),
            persona_guarded: CLASSIC_PERSONA_GUARDED.into(),
            reply: REPLY.into(),
            verdict: VerdictClassifier::default(),
            exposure: ExposureClassifier::default(),
        }
    }

    pub fn script() -> Self {
        Self {
            name: "script".into(),
            version: 2,
            assessment: SCRIPT_ASSESSMENT.into(),
            duel: SCRIPT_DUEL.into(),
            exposure_check: EXPOSURE_CHECK.into(),
            persona_exposed: SCRIPT_PERSONA_EXPOSED.into(),
            persona_guarded: SCRIPT_PERSONA_GUARDED.into(),
            reply: REPLY.into(),
            // The `# VERDICT:` heading is not parsed; the marker search is the same.
            verdict: VerdictClassifier::default(),
            exposure: ExposureClassifier::default(),
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "script" => Some(Self::script()),
            _ => None,
        }
    }

    pub fn from_toml_str(s: &str) -> LabResult<Self> {
        let pack: Self = toml::from_str(s)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Rejects blank classifier markers. Every response contains the empty
    /// string, so a blank verdict marker would approve anything.
    pub fn validate(&self) -> LabResult<()> {
        let markers = [
            ("verdict", &self.verdict.marker),
            ("exposure", &self.exposure.marker),
        ];
        for (section, marker) in markers {
            if marker.trim().is_empty() {
                return Err(LabError::Configuration(format!(
                    "template pack `{}`: [{section}] marker must not be blank",
                    self.name
                )));
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> LabResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> LabResult<Self> {
        let pack = Self::from_toml_str(&fs::read_to_string(path)?)?;
        log::info!(
            "loaded template pack `{}` v{} from {}",
            pack.name,
            pack.version,
            path.display()
        );
        Ok(pack)
    }
}

/// Picks the pack named by the settings, preferring an explicit file.
pub fn resolve_pack(settings: &LabSettings) -> LabResult<TemplatePack> {
    if let Some(path) = &settings.template_file {
        return TemplatePack::load(path);
    }

    TemplatePack::builtin(&settings.template_pack).ok_or_else(|| {
        LabError::Configuration(format!(
            "unknown template pack `{}` (built-in packs: {})",
            settings.template_pack,
            BUILTIN_PACKS.join(", ")
        ))
    })
}
