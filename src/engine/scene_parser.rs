#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneLine {
    Dialogue { speaker: String, text: String },
    Narration(String),
}

/// Splits a generated duel scene into speaker lines for display.
///
/// Bold speakers (`**Name:**`) are always dialogue. A bare `NAME:` line is
/// dialogue only when `NAME` is one of `speakers` (case-insensitive), so
/// notes like `NOTE:` stay narration. With no speakers given, any all-caps
/// name of two or more letters is accepted.
pub fn parse_scene(scene: &str, speakers: &[&str]) -> Vec<SceneLine> {
    let mut lines = Vec::new();

    for line in scene.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // **Name:** text  /  **Name**: text
        if let Some(rest) = line.strip_prefix("**") {
            if let Some((name, text)) = rest.split_once("**") {
                let has_colon = name.ends_with(':') || text.trim_start().starts_with(':');
                let speaker = name.trim().trim_end_matches(':').trim();
                let text = text.trim_start().trim_start_matches(':').trim();
                if has_colon && !speaker.is_empty() {
                    lines.push(SceneLine::Dialogue {
                        speaker: speaker.to_string(),
                        text: text.to_string(),
                    });
                    continue;
                }
            }
        }

        // NAME: text
        if let Some((name, text)) = line.split_once(':') {
            if is_screenplay_name(name, speakers) {
                lines.push(SceneLine::Dialogue {
                    speaker: name.trim().to_string(),
                    text: text.trim().to_string(),
                });
                continue;
            }
        }

        // Fallback
        lines.push(SceneLine::Narration(line.to_string()));
    }

    lines
}

fn is_screenplay_name(name: &str, speakers: &[&str]) -> bool {
    let name = name.trim();
    let caps = name.len() <= 40
        && name.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && name
            .chars()
            .all(|c| c.is_uppercase() || c == ' ' || c == '.' || c == '\'' || c == '-');
    if !caps {
        return false;
    }

    speakers.is_empty()
        || speakers
            .iter()
            .any(|speaker| speaker.trim().to_uppercase() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue(speaker: &str, text: &str) -> SceneLine {
        SceneLine::Dialogue {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    #[test]
    fn bold_speakers_become_dialogue() {
        let scene = "**PAULA:** Where is she?\n\n**The Father**: Let it rest.";
        assert_eq!(
            parse_scene(scene, &[]),
            vec![
                dialogue("PAULA", "Where is she?"),
                dialogue("The Father", "Let it rest."),
            ]
        );
    }

    #[test]
    fn screenplay_caps_become_dialogue() {
        let lines = parse_scene("THE FATHER: You were there that night.", &[]);
        assert_eq!(lines, vec![dialogue("THE FATHER", "You were there that night.")]);
    }

    #[test]
    fn everything_else_is_narration() {
        let lines = parse_scene(
            "### The Scene\nA kitchen. Rain: heavy and loud.\n**Bold claim** without colon",
            &[],
        );
        assert_eq!(
            lines,
            vec![
                SceneLine::Narration("### The Scene".into()),
                SceneLine::Narration("A kitchen. Rain: heavy and loud.".into()),
                SceneLine::Narration("**Bold claim** without colon".into()),
            ]
        );
    }

    #[test]
    fn single_letter_caps_are_narration() {
        let lines = parse_scene("I: thought so.", &[]);
        assert_eq!(lines, vec![SceneLine::Narration("I: thought so.".into())]);
    }

    #[test]
    fn known_speakers_filter_caps_lines() {
        let scene = "PAULA DAHLEN: Tell me.\nNOTE: the lights dim.\nTHE FATHER: No.";
        assert_eq!(
            parse_scene(scene, &["Paula Dahlen", "The Father"]),
            vec![
                dialogue("PAULA DAHLEN", "Tell me."),
                SceneLine::Narration("NOTE: the lights dim.".into()),
                dialogue("THE FATHER", "No."),
            ]
        );
    }

    #[test]
    fn bold_speakers_ignore_the_speaker_list() {
        let lines = parse_scene("**Narrator:** Night falls.", &["Paula Dahlen"]);
        assert_eq!(lines, vec![dialogue("Narrator", "Night falls.")]);
    }
}
