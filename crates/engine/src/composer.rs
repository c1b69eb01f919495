//! Prompt composition.
//!
//! Builds the single prompt string sent to the model: persona
//! instruction, the most recent history turns rendered as
//! `"<Role>: <message>"` lines, the new message as `"User: ..."`, and a
//! trailing cue marking where the assistant's reply begins.
//!
//! Composition is a pure function: same history and message always
//! produce the same prompt.

use mindmate_core::history::{READ_WINDOW, Turn};

/// The fixed persona and format instruction prefixed to every prompt.
const INSTRUCTION: &str = "You are MindMate, an emotionally intelligent AI mental wellness assistant.\n\
Respond in 1-3 concise lines separated by '\n'.\n\
Do NOT prefix lines with any labels.";

/// The cue token the model continues from.
const CUE: &str = "MindMate:";

/// Assembles inference prompts from history and a new message.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    instruction: String,
    cue: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            instruction: INSTRUCTION.to_string(),
            cue: CUE.to_string(),
        }
    }
}

impl PromptComposer {
    /// Create a composer with a custom instruction block. The cue stays
    /// fixed; the refiner strips it back out of echoed output.
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    /// Compose the full prompt. Turns beyond the most recent
    /// [`READ_WINDOW`] are silently dropped, oldest first.
    pub fn compose(&self, history: &[Turn], message: &str) -> String {
        let start = history.len().saturating_sub(READ_WINDOW);
        let history_txt = history[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.message))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n{}\nUser: {}\n{}",
            self.instruction, history_txt, message, self.cue
        )
    }
}
