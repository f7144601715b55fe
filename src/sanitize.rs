//! Reply normalization chokepoint.
//!
//! Applies an ordered list of deletion rules to generated text before
//! delivery: leading greetings, the service-goal trailer line, and any
//! configured banned topic words. The rules are a syntactic guarantee only:
//! paraphrases pass through.

use regex::Regex;
use tracing::warn;

/// Leading greeting tokens, start-anchored, with optional trailing
/// punctuation and whitespace. Checked before the trailer rule.
const GREETING_PATTERNS: &[&str] = &[
    r"(?i)^здравствуй(?:те)?[.,!]*\s*",
    r"(?i)^привет[.,!]*\s*",
    r"(?i)^добр(?:ый|ое)\s+(?:день|вечер|утро)[.,!]*\s*",
];

/// The banned trailer phrase, matched to end of line wherever it occurs.
const TRAILER_PATTERN: &str = r"(?i)цель клиента:[^\n]*";

/// Deletes disallowed phrases from generated replies.
///
/// Rules are compiled once and applied in a fixed order; every rule replaces
/// its match with the empty string. The result is trimmed of surrounding
/// whitespace. Total: an input with no matches comes back unchanged
/// (post-trim).
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<Regex>,
}

impl Sanitizer {
    /// Build the rule set, appending banned topic words from configuration.
    ///
    /// Banned words are deleted as whole tokens, case-insensitively. The
    /// deletion leaves surrounding punctuation in place, which can produce
    /// stray whitespace; a cosmetic limitation, not a correctness target.
    pub fn new(banned_terms: &[String]) -> Self {
        let mut rules: Vec<Regex> = Vec::new();

        for pattern in GREETING_PATTERNS {
            if let Some(rule) = compile(pattern) {
                rules.push(rule);
            }
        }
        if let Some(rule) = compile(TRAILER_PATTERN) {
            rules.push(rule);
        }
        for term in banned_terms {
            if term.is_empty() {
                continue;
            }
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            if let Some(rule) = compile(&pattern) {
                rules.push(rule);
            }
        }

        Self { rules }
    }

    /// Apply every rule in order and trim the result. Never fails.
    pub fn apply(&self, text: &str) -> String {
        let mut sanitized = text.to_owned();
        for rule in &self.rules {
            sanitized = rule.replace_all(&sanitized, "").into_owned();
        }
        sanitized.trim().to_owned()
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!(pattern, error = %e, "skipping unparsable filter pattern");
            None
        }
    }
}
