use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};

/* =========================
   Character Profile
   ========================= */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub conscious_goal: String,
    /// The secret or lie the character protects.
    pub hidden_truth: String,
    pub inner_need: String,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            name: "Paula Dahlen".into(),
            conscious_goal: "Find her missing sister".into(),
            hidden_truth: "She is obsessed and guilty".into(),
            inner_need: "To forgive herself".into(),
        }
    }
}

/* =========================
   Antagonist
   ========================= */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Antagonist {
    pub name: String,
    pub opposing_belief: String,
}

impl Default for Antagonist {
    fn default() -> Self {
        Self {
            name: "The Father".into(),
            opposing_belief: "The past should remain buried.".into(),
        }
    }
}

/* =========================
   Rulebook
   ========================= */

/// An uploaded plain-text rulebook, used for a single assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rulebook {
    pub file_name: String,
    pub text: String,
}

impl Rulebook {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }

    /// Decodes raw uploaded bytes. Anything that is not UTF-8 is rejected
    /// rather than lossily converted.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> LabResult<Self> {
        let file_name = file_name.into();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self { file_name, text }),
            Err(_) => Err(LabError::RulebookEncoding(file_name)),
        }
    }

    pub fn from_path(path: &Path) -> LabResult<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(file_name, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rulebook_from_path_keeps_file_name_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poetics.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "Plot is the soul of tragedy.").unwrap();

        let rulebook = Rulebook::from_path(&path).unwrap();
        assert_eq!(rulebook.file_name, "poetics.txt");
        assert_eq!(rulebook.text, "Plot is the soul of tragedy.");
    }

    #[test]
    fn rulebook_rejects_invalid_utf8() {
        let err = Rulebook::from_bytes("bad.txt", vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, LabError::RulebookEncoding(name) if name == "bad.txt"));
    }

    #[test]
    fn missing_rulebook_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Rulebook::from_path(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, LabError::Io(_)));
    }
}
