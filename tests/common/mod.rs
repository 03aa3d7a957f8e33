#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use narrative_lab::config::templates::TemplatePack;
use narrative_lab::model::character::{CharacterProfile, Rulebook};
use narrative_lab::{Dramaturg, ServiceError, Session, TextGenerator};

pub const ACCESS_CODE: &str = "CSU2025";

/// Replies from a script in order and records every prompt it was given.
/// Once the script runs out every call fails.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<Result<String, ServiceError>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.borrow_mut().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self) -> Self {
        self.replies.borrow_mut().push_back(Err(ServiceError::Status {
            status: 503,
            body: "model overloaded".into(),
        }));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.borrow().last().cloned()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ServiceError::EmptyResponse))
    }
}

pub fn lab(generator: ScriptedGenerator) -> Dramaturg<ScriptedGenerator> {
    lab_with_pack(generator, &TemplatePack::classic())
}

pub fn lab_with_pack(
    generator: ScriptedGenerator,
    pack: &TemplatePack,
) -> Dramaturg<ScriptedGenerator> {
    Dramaturg::new(generator, pack, ACCESS_CODE).expect("built-in pack compiles")
}

pub fn paula() -> CharacterProfile {
    CharacterProfile {
        name: "Paula Dahlen".into(),
        conscious_goal: "Find her missing sister".into(),
        hidden_truth: "She is obsessed and guilty".into(),
        inner_need: "To forgive herself".into(),
    }
}

pub fn rulebook() -> Rulebook {
    Rulebook::new(
        "aristotle_poetics.txt",
        "A tragic hero falls through a flaw of judgment.",
    )
}

/// An authenticated session that has passed assessment with "SOLID". The
/// generator must have the SOLID reply queued first.
pub fn approved_session(lab: &Dramaturg<ScriptedGenerator>) -> Session {
    let mut session = Session::new();
    lab.authenticate(&mut session, ACCESS_CODE).unwrap();
    let assessment = lab.assess(&mut session, &rulebook(), paula()).unwrap();
    assert!(assessment.approved);
    session
}
