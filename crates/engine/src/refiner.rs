//! Response refinement.
//!
//! Raw model output tends to echo role labels and the cue token, repeat
//! itself, and run long. The refiner cleans it into a bounded reply:
//!
//! 1. strip a fixed, ordered list of banned tokens (literal substring
//!    removal, not a general regex strip);
//! 2. split into lines and trim each;
//! 3. drop empty lines, de-duplicate preserving first occurrence;
//! 4. keep the first three lines, newline-joined;
//! 5. append at most one contextual tail line, chosen by scanning the
//!    *original user message* against an ordered keyword rule list.
//!
//! Both the banned tokens and the tail rules are plain data on the
//! [`Refiner`] value, so behavior extends without touching the control
//! flow. Rule order is the tie-break: the first matching rule wins.
//!
//! Refinement never fails; empty or fully-duplicate input yields an
//! empty reply.

/// Maximum number of lines a refined reply may keep.
const MAX_REPLY_LINES: usize = 3;

/// One tail-injection rule: if any keyword occurs in the lower-cased
/// user message, `line` is appended to the reply.
#[derive(Debug, Clone)]
pub struct TailRule {
    pub keywords: Vec<String>,
    pub line: String,
}

impl TailRule {
    fn matches(&self, lowered_message: &str) -> bool {
        self.keywords.iter().any(|k| lowered_message.contains(k.as_str()))
    }
}

/// Cleans and bounds raw model output.
#[derive(Debug, Clone)]
pub struct Refiner {
    banned_tokens: Vec<String>,
    tail_rules: Vec<TailRule>,
}

impl Default for Refiner {
    fn default() -> Self {
        Self {
            banned_tokens: ["Bot:", "MindMate:", "bot:", "mindmate:", "\u{1F60A}", "\u{1F917}"]
                .map(String::from)
                .to_vec(),
            tail_rules: vec![
                // Breakup keywords take priority over the success set
                TailRule {
                    keywords: ["breakup", "heartbreak", "rejected", "broke up"]
                        .map(String::from)
                        .to_vec(),
                    line: "\nKeep going—each step forward is progress. \u{1F4AA}".to_string(),
                },
                TailRule {
                    keywords: ["succeed", "success", "goal", "motivation"]
                        .map(String::from)
                        .to_vec(),
                    line: "\nYou have what it takes—keep believing in yourself. \u{1F680}"
                        .to_string(),
                },
            ],
        }
    }
}

impl Refiner {
    /// Create a refiner with explicit token and rule lists.
    pub fn new(banned_tokens: Vec<String>, tail_rules: Vec<TailRule>) -> Self {
        Self {
            banned_tokens,
            tail_rules,
        }
    }

    /// Clean raw model output: strip banned tokens, normalize lines,
    /// de-duplicate, and cap at three lines.
    pub fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for token in &self.banned_tokens {
            text = text.replace(token.as_str(), "");
        }

        let mut seen: Vec<&str> = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || seen.contains(&line) {
                continue;
            }
            seen.push(line);
            if seen.len() == MAX_REPLY_LINES {
                break;
            }
        }
        seen.join("\n")
    }

    /// Pick the tail line for a user message, if any rule matches.
    /// The returned line carries its own leading newline.
    pub fn tail(&self, user_message: &str) -> Option<&str> {
        let lowered = user_message.to_lowercase();
        self.tail_rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.line.as_str())
    }

    /// Full refinement: cleaned reply plus the optional tail.
    pub fn refine(&self, raw: &str, user_message: &str) -> String {
        let mut reply = self.clean(raw);
        if let Some(tail) = self.tail(user_message) {
            reply.push_str(tail);
        }
        reply
    }
}
