//! Heuristic rewriter: lowers AI-likeness without an LLM by swapping stock
//! clichés for plainer wording, varying sentence cadence, and expanding
//! very short sections. Used as the offline rewrite oracle and as the
//! deterministic baseline in tests.

use async_trait::async_trait;

use crate::ai_guard::{RewriteHints, RewriteOracle};
use crate::errors::OracleError;

/// Stock phrase, plainer replacement. Matched case-insensitively on word
/// boundaries; variants are listed separately.
const CLICHE_SWAPS: [(&str, &str); 18] = [
    ("i am thrilled", "I'm interested"),
    ("i am excited", "I'm interested"),
    ("i would love", "I'd welcome"),
    ("fast-paced", "busy"),
    ("fast paced", "busy"),
    ("leverage", "use"),
    ("impactful", "useful"),
    ("passionate", "serious"),
    ("results-driven", "focused on outcomes"),
    ("results driven", "focused on outcomes"),
    ("synergy", "collaboration"),
    ("strategic", "long-term"),
    ("cutting-edge", "modern"),
    ("cutting edge", "modern"),
    ("utilize", "use"),
    ("proven track record", "history of delivering"),
    ("strong communication skills", "clear, concise communication"),
    ("responsible for", "I led"),
];

const MIN_EXPAND_CHARS: usize = 140;

const EXPANSION_SENTENCES: [&str; 4] = [
    "In practice that meant weekly check-ins, a short written plan, and owning the follow-up myself.",
    "I kept the scope small on purpose and shipped in steps people could review.",
    "Most of the work was unglamorous: tracking details, chasing answers, and writing things down.",
    "When something slipped I said so early, which kept the rest of the plan honest.",
];

fn is_boundary(c: Option<char>) -> bool {
    c.map(|c| !c.is_alphanumeric()).unwrap_or(true)
}

/// Case-folded match of `needle` at byte offset `at`, compared one char at a
/// time. Returns the matched byte length in `text`. Chars whose lowercase
/// form is more than one char (e.g. 'İ') never match the ASCII needles here.
fn matches_at(text: &str, at: usize, needle: &str) -> Option<usize> {
    let mut text_chars = text[at..].chars();
    let mut len = 0;
    for wanted in needle.chars() {
        let c = text_chars.next()?;
        let mut lower = c.to_lowercase();
        if lower.next() != Some(wanted) || lower.next().is_some() {
            return None;
        }
        len += c.len_utf8();
    }
    Some(len)
}

/// Case-insensitive whole-phrase replacement. Only replaces where the match
/// sits on word boundaries so "leverage" never fires inside "leveraged...".
/// Indexing stays on the original text's char boundaries, so lowercasing that
/// changes byte lengths cannot skew the splice points.
fn swap_phrase(text: &str, phrase: &str, replacement: &str) -> String {
    let needle = phrase.to_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut prev: Option<char> = None;
    while let Some(ch) = text[pos..].chars().next() {
        if let Some(len) = matches_at(text, pos, &needle) {
            let after = text[pos + len..].chars().next();
            if is_boundary(prev) && is_boundary(after) {
                out.push_str(&text[copied..pos]);
                out.push_str(replacement);
                pos += len;
                copied = pos;
                prev = needle.chars().next_back();
                continue;
            }
        }
        prev = Some(ch);
        pos += ch.len_utf8();
    }
    out.push_str(&text[copied..]);
    out
}

fn decliche(text: &str) -> String {
    CLICHE_SWAPS
        .iter()
        .fold(text.to_string(), |acc, (phrase, replacement)| {
            swap_phrase(&acc, phrase, replacement)
        })
}

/// Split into sentences, keeping the terminal punctuation with each one.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let at_end = chars
                .peek()
                .map(|next| next.is_whitespace())
                .unwrap_or(true);
            if at_end {
                let s = current.trim().to_string();
                if !s.is_empty() {
                    sentences.push(s);
                }
                current.clear();
            }
        }
    }
    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Break up a monotone rhythm: merge consecutive short sentences, split one
/// overlong sentence at its first clause boundary.
fn vary_cadence(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return text.to_string();
    }

    let mut merged: Vec<String> = Vec::new();
    for sentence in sentences {
        let can_merge = merged
            .last()
            .map(|prev: &String| prev.chars().count() < 40 && sentence.chars().count() < 40)
            .unwrap_or(false);
        if can_merge {
            let prev = merged.pop().unwrap_or_default();
            let joined = format!(
                "{}, {}",
                prev.trim_end_matches(['.', '!', '?']),
                lowercase_first(&sentence)
            );
            merged.push(joined);
        } else {
            merged.push(sentence);
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut split_done = false;
    for sentence in merged {
        if !split_done && sentence.chars().count() > 180 {
            if let Some(idx) = sentence.find(", ").or_else(|| sentence.find("; ")) {
                let (head, rest) = sentence.split_at(idx);
                out.push(format!("{head}."));
                out.push(capitalize_first(rest[2..].trim()));
                split_done = true;
                continue;
            }
        }
        out.push(sentence);
    }
    out.join(" ")
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pad a too-short section with grounded filler sentences until it clears
/// the minimum. Never used in fact-preserving mode.
fn expand(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    let mut idx = 0;
    while out.chars().count() < MIN_EXPAND_CHARS && idx < EXPANSION_SENTENCES.len() {
        if !out.is_empty() && !out.ends_with(['.', '!', '?']) {
            out.push('.');
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(EXPANSION_SENTENCES[idx]);
        idx += 1;
    }
    out
}

/// One heuristic rewrite pass.
pub fn humanize(text: &str, preserve_facts: bool) -> String {
    let pass = vary_cadence(&decliche(text));
    if !preserve_facts && pass.chars().count() < MIN_EXPAND_CHARS {
        return expand(&pass);
    }
    pass
}

/// The built-in rewrite oracle. Deterministic, local, and conservative in
/// fact-preserving mode.
pub struct HeuristicRewriter;

#[async_trait]
impl RewriteOracle for HeuristicRewriter {
    async fn rewrite(
        &self,
        text: &str,
        _target: f64,
        hints: &RewriteHints,
    ) -> Result<String, OracleError> {
        Ok(humanize(text, hints.preserve_facts))
    }
}
