//! Substring classifiers for model output.
//!
//! Both classifiers look for a marker anywhere in the text. They do not parse
//! the response, so a WEAK verdict that happens to quote "SOLID" still counts
//! as approved, and "Yesterday" counts as a YES.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictClassifier {
    pub marker: String,
    pub case_sensitive: bool,
}

impl Default for VerdictClassifier {
    fn default() -> Self {
        Self {
            marker: "SOLID".into(),
            case_sensitive: true,
        }
    }
}

impl VerdictClassifier {
    pub fn is_approved(&self, response: &str) -> bool {
        if self.case_sensitive {
            response.contains(&self.marker)
        } else {
            response
                .to_uppercase()
                .contains(&self.marker.to_uppercase())
        }
    }
}

/// Decides whether a chat message exposed the character's secret.
/// Always case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureClassifier {
    pub marker: String,
}

impl Default for ExposureClassifier {
    fn default() -> Self {
        Self {
            marker: "YES".into(),
        }
    }
}

impl ExposureClassifier {
    pub fn is_triggered(&self, response: &str) -> bool {
        response
            .to_uppercase()
            .contains(&self.marker.to_uppercase())
    }
}
