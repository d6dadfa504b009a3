//! Inline syntax extensions recognized on top of the host grammar.
//!
//! | Syntax | Token |
//! |---|---|
//! | `^text^` | superscript |
//! | `~text~` | subscript |
//! | `[^label]` | footnote marker |
//! | `![[video]](url)` | video embed |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::Token;

static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\^([^\^]+)\^").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^~([^~]+)~").unwrap());
static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\^([^\]]+)\]").unwrap());
static VIDEO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!\[\[video\]\]\(([^)\s]+)\)").unwrap());

/// A successful match at the start of the remaining input.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineMatch {
    /// Byte length of the consumed source.
    pub len: usize,
    pub token: Token,
}

/// An inline construct layered onto the host grammar.
pub trait InlineRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Byte index of the earliest position in `src` where this construct
    /// could start.
    fn start(&self, src: &str) -> Option<usize>;

    /// Try to match the construct at the very beginning of `src`.
    fn scan(&self, src: &str) -> Option<InlineMatch>;
}

/// Shared shape of the four built-in recognizers: a leading marker and an
/// anchored pattern with one capture group.
struct PatternRecognizer {
    name: &'static str,
    marker: &'static str,
    pattern: &'static Lazy<Regex>,
    make: fn(raw: String, text: String) -> Token,
}

impl InlineRecognizer for PatternRecognizer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn start(&self, src: &str) -> Option<usize> {
        src.find(self.marker)
    }

    fn scan(&self, src: &str) -> Option<InlineMatch> {
        let caps = self.pattern.captures(src)?;
        let whole = caps.get(0)?;
        let text = caps.get(1)?.as_str().trim();
        // An empty capture is not a construct; leave it to the host grammar.
        if text.is_empty() {
            return None;
        }
        Some(InlineMatch {
            len: whole.end(),
            token: (self.make)(whole.as_str().to_string(), text.to_string()),
        })
    }
}

pub fn superscript() -> Box<dyn InlineRecognizer> {
    Box::new(PatternRecognizer {
        name: "superscript",
        marker: "^",
        pattern: &SUPERSCRIPT,
        make: |raw, text| Token::Superscript { raw, text },
    })
}

pub fn subscript() -> Box<dyn InlineRecognizer> {
    Box::new(PatternRecognizer {
        name: "subscript",
        marker: "~",
        pattern: &SUBSCRIPT,
        make: |raw, text| Token::Subscript { raw, text },
    })
}

pub fn footnote() -> Box<dyn InlineRecognizer> {
    Box::new(PatternRecognizer {
        name: "footnote",
        marker: "[^",
        pattern: &FOOTNOTE,
        make: |raw, text| Token::Footnote { raw, text },
    })
}

pub fn video() -> Box<dyn InlineRecognizer> {
    Box::new(PatternRecognizer {
        name: "video",
        marker: "![[video]](",
        pattern: &VIDEO,
        make: |raw, href| Token::Video { raw, href },
    })
}

/// The built-in recognizers in registration order.
pub fn default_recognizers() -> Vec<Box<dyn InlineRecognizer>> {
    vec![superscript(), subscript(), footnote(), video()]
}

/// Split a run of plain text into literal `text` tokens and extension tokens.
///
/// Scanning jumps to the earliest candidate reported by any recognizer and
/// tries every recognizer there in order; the first match wins. When none
/// matches, a single character is kept as literal text.
pub fn scan_text(recognizers: &[Box<dyn InlineRecognizer>], text: &str, out: &mut Vec<Token>) {
    let mut literal = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(pos) = recognizers.iter().filter_map(|r| r.start(rest)).min() else {
            break;
        };
        literal.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match recognizers.iter().find_map(|r| r.scan(rest)) {
            Some(found) => {
                flush_literal(&mut literal, out);
                out.push(found.token);
                rest = &rest[found.len..];
            }
            None => {
                let step = rest.chars().next().map_or(rest.len(), char::len_utf8);
                literal.push_str(&rest[..step]);
                rest = &rest[step..];
            }
        }
    }

    literal.push_str(rest);
    flush_literal(&mut literal, out);
}

/// Try the recognizers against a span the host grammar already claimed.
/// Only a match covering the whole span is accepted.
pub fn claim_span(recognizers: &[Box<dyn InlineRecognizer>], span: &str) -> Option<Token> {
    recognizers
        .iter()
        .find_map(|r| r.scan(span).filter(|found| found.len == span.len()))
        .map(|found| found.token)
}

fn flush_literal(literal: &mut String, out: &mut Vec<Token>) {
    if literal.is_empty() {
        return;
    }
    let text = std::mem::take(literal);
    // Adjacent literals stay one token.
    if let Some(Token::Text { text: prev, tokens: None }) = out.last_mut() {
        prev.push_str(&text);
    } else {
        out.push(Token::Text { text, tokens: None });
    }
}
