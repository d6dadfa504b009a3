use serde::Serialize;

/// A node of the token tree produced by the tokenizer.
///
/// Container kinds carry their inline children in `tokens`. When `tokens` is
/// absent the `text` field is the only content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    Heading {
        depth: u8,
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Paragraph {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Text {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Strong {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Em {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Del {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Link {
        href: String,
        title: Option<String>,
        text: String,
        tokens: Option<Vec<Token>>,
    },
    Image {
        href: String,
        title: Option<String>,
        text: String,
    },
    Video {
        raw: String,
        href: String,
    },
    Code {
        lang: Option<String>,
        text: String,
    },
    Codespan {
        text: String,
    },
    Blockquote {
        text: String,
        tokens: Option<Vec<Token>>,
    },
    List(List),
    Table(Table),
    Hr,
    Br,
    Space,
    Footnote {
        raw: String,
        text: String,
    },
    Superscript {
        raw: String,
        text: String,
    },
    Subscript {
        raw: String,
        text: String,
    },
    /// Anything the host grammar produced that has no render mapping
    /// (raw HTML, footnote definitions, math, ...).
    Other {
        kind: String,
        raw: String,
    },
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub ordered: bool,
    /// Number written in the source for the first item. Rendering
    /// renumbers from 1 regardless.
    pub start: Option<u64>,
    pub loose: bool,
    pub items: Vec<ListItem>,
}

/// A single list item, which can contain nested lists among its tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub task: bool,
    pub checked: bool,
    pub text: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub align: Vec<Alignment>,
    pub header: Option<Vec<TableCell>>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Token {
    /// Kind name as it appears in the serialized `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Token::Heading { .. } => "heading",
            Token::Paragraph { .. } => "paragraph",
            Token::Text { .. } => "text",
            Token::Strong { .. } => "strong",
            Token::Em { .. } => "em",
            Token::Del { .. } => "del",
            Token::Link { .. } => "link",
            Token::Image { .. } => "image",
            Token::Video { .. } => "video",
            Token::Code { .. } => "code",
            Token::Codespan { .. } => "codespan",
            Token::Blockquote { .. } => "blockquote",
            Token::List(_) => "list",
            Token::Table(_) => "table",
            Token::Hr => "hr",
            Token::Br => "br",
            Token::Space => "space",
            Token::Footnote { .. } => "footnote",
            Token::Superscript { .. } => "superscript",
            Token::Subscript { .. } => "subscript",
            Token::Other { kind, .. } => kind.as_str(),
        }
    }

    /// Plain-text rendering of the token, used for accessibility labels and
    /// the `text` field of containers.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Token::Heading { text, .. }
            | Token::Paragraph { text, .. }
            | Token::Text { text, .. }
            | Token::Strong { text, .. }
            | Token::Em { text, .. }
            | Token::Del { text, .. }
            | Token::Link { text, .. }
            | Token::Image { text, .. }
            | Token::Code { text, .. }
            | Token::Codespan { text }
            | Token::Blockquote { text, .. }
            | Token::Superscript { text, .. }
            | Token::Subscript { text, .. } => out.push_str(text),
            Token::Footnote { text, .. } => {
                out.push('[');
                out.push_str(text);
                out.push(']');
            }
            Token::Br => out.push('\n'),
            Token::List(list) => {
                for item in &list.items {
                    out.push_str(&item.text);
                }
            }
            Token::Video { .. }
            | Token::Table(_)
            | Token::Hr
            | Token::Space
            | Token::Other { .. } => {}
        }
    }

    /// Whether the token lays out inside a run of text rather than as a block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Token::Text { .. }
                | Token::Strong { .. }
                | Token::Em { .. }
                | Token::Del { .. }
                | Token::Link { .. }
                | Token::Codespan { .. }
                | Token::Br
                | Token::Footnote { .. }
                | Token::Superscript { .. }
                | Token::Subscript { .. }
        )
    }
}

/// Concatenated plain text of a token sequence.
pub fn plain_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.push_plain_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Token {
        Token::Text {
            text: text.to_string(),
            tokens: None,
        }
    }

    #[test]
    fn kind_names() {
        assert_eq!(Token::Hr.kind(), "hr");
        assert_eq!(
            Token::Superscript {
                raw: "^a^".into(),
                text: "a".into()
            }
            .kind(),
            "superscript"
        );
        assert_eq!(
            Token::Other {
                kind: "html".into(),
                raw: String::new()
            }
            .kind(),
            "html"
        );
    }

    #[test]
    fn plain_text_of_sequence() {
        let tokens = vec![
            literal("see "),
            Token::Footnote {
                raw: "[^1]".into(),
                text: "1".into(),
            },
            Token::Br,
            Token::Codespan { text: "x".into() },
        ];
        assert_eq!(plain_text(&tokens), "see [1]\nx");
        assert_eq!(tokens[1].plain_text(), "[1]");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Token::Codespan { text: "x".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "codespan", "text": "x"}));
        let json = serde_json::to_value(Token::Hr).unwrap();
        assert_eq!(json, serde_json::json!({"type": "hr"}));
    }
}
