use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::config::TokenizerConfig;
use crate::extensions::{self, InlineRecognizer};
use crate::token::{self, Alignment, List, ListItem, Table, TableCell, Token};

/// Markdown tokenizer: the host grammar plus an ordered list of inline
/// recognizers. Build one and reuse it; it holds no per-call state.
pub struct Tokenizer {
    config: TokenizerConfig,
    recognizers: Vec<Box<dyn InlineRecognizer>>,
}

impl Tokenizer {
    /// Tokenizer with the built-in recognizers registered.
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            recognizers: extensions::default_recognizers(),
        }
    }

    /// Tokenizer with no inline extensions, only the host grammar.
    pub fn bare(config: TokenizerConfig) -> Self {
        Self {
            config,
            recognizers: Vec::new(),
        }
    }

    /// Register another recognizer after the existing ones.
    pub fn register(mut self, recognizer: Box<dyn InlineRecognizer>) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    pub fn recognizer_names(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    fn options(&self) -> Options {
        let mut options = Options::empty();
        if self.config.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.config.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.config.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }

    /// Tokenize a whole Markdown document.
    pub fn tokenize(&self, markdown: &str) -> Vec<Token> {
        let normalized = normalize_line_endings(markdown);
        let source = if self.config.strip_front_matter {
            strip_front_matter(&normalized)
        } else {
            &normalized
        };

        let parser = Parser::new_ext(source, self.options()).into_offset_iter();
        let mut state = ParseState::new(&self.recognizers, source);
        for (event, range) in parser {
            state.process(event, range);
        }
        let tokens = state.finish();
        tracing::debug!(count = tokens.len(), "tokenized markdown");
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("config", &self.config)
            .field("recognizers", &self.recognizer_names())
            .finish()
    }
}

/// Rewrite `\r\n` and lone `\r` as `\n`.
pub fn normalize_line_endings(markdown: &str) -> Cow<'_, str> {
    if !markdown.contains('\r') {
        return Cow::Borrowed(markdown);
    }
    Cow::Owned(markdown.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Strip YAML frontmatter from the beginning of markdown content
fn strip_front_matter(markdown: &str) -> &str {
    if !markdown.starts_with("---") {
        return markdown;
    }
    // Find the closing ---
    if let Some(end) = markdown[3..].find("\n---") {
        // Skip past the closing --- and any trailing newline
        let after_front_matter = &markdown[3 + end + 4..];
        after_front_matter.trim_start_matches('\n')
    } else {
        markdown
    }
}

struct ParseState<'a> {
    recognizers: &'a [Box<dyn InlineRecognizer>],
    source: &'a str,
    // frames[0] is the document itself
    frames: Vec<Frame>,
    // Consecutive text events are merged here before recognizers see them
    pending_text: String,
    // Where each piece of `pending_text` came from in the source
    pending_pieces: Vec<PendingPiece>,
    // Nesting depth inside a host construct whose events are being dropped
    skip_depth: usize,
    // Source offset up to which a recognizer took over the input
    claimed_until: usize,
    // Constructs opened inside the claimed span and not yet closed
    claimed_depth: usize,
}

struct PendingPiece {
    offset: usize,
    source: Range<usize>,
    // The text is byte-for-byte the source slice (no escapes, no breaks)
    verbatim: bool,
}

struct Frame {
    kind: FrameKind,
    children: Vec<Token>,
    // End of the construct in the source
    end: usize,
    // Source span of the last block child, for blank-line detection
    last_block: Option<Range<usize>>,
}

enum FrameKind {
    Document,
    Heading(u8),
    Paragraph,
    BlockQuote,
    CodeBlock {
        lang: Option<String>,
        content: String,
    },
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item {
        checked: Option<bool>,
    },
    Table {
        align: Vec<Alignment>,
        header: Option<Vec<TableCell>>,
        rows: Vec<Vec<TableCell>>,
    },
    TableHead {
        cells: Vec<TableCell>,
    },
    TableRow {
        cells: Vec<TableCell>,
    },
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        href: String,
        title: Option<String>,
    },
    Image {
        href: String,
        title: Option<String>,
    },
}

impl Frame {
    fn new(kind: FrameKind, end: usize) -> Self {
        Self {
            kind,
            children: Vec::new(),
            end,
            last_block: None,
        }
    }
}

impl<'a> ParseState<'a> {
    fn new(recognizers: &'a [Box<dyn InlineRecognizer>], source: &'a str) -> Self {
        Self {
            recognizers,
            source,
            frames: vec![Frame::new(FrameKind::Document, source.len())],
            pending_text: String::new(),
            pending_pieces: Vec::new(),
            skip_depth: 0,
            claimed_until: 0,
            claimed_depth: 0,
        }
    }

    fn process(&mut self, event: Event, range: Range<usize>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return;
        }

        if opens_inline(&event) {
            self.claim_pending(range.start);
        }
        let event = if range.start < self.claimed_until {
            match self.consume_claimed(event, &range) {
                Some(event) => event,
                None => return,
            }
        } else {
            event
        };

        match event {
            Event::Text(text) => {
                if let Some(Frame {
                    kind: FrameKind::CodeBlock { content, .. },
                    ..
                }) = self.frames.last_mut()
                {
                    content.push_str(&text);
                } else {
                    self.push_pending(&text, range);
                }
            }
            Event::SoftBreak => {
                self.push_pending(" ", range);
            }
            Event::Start(tag) => {
                self.flush_text();
                if is_block(&tag) {
                    self.separate_block(&range);
                }
                self.open(tag, range);
            }
            Event::End(_) => {
                self.flush_text();
                self.close();
            }
            Event::Code(code) => {
                self.flush_text();
                self.push(Token::Codespan {
                    text: code.into_string(),
                });
            }
            Event::HardBreak => {
                self.flush_text();
                self.push(Token::Br);
            }
            Event::Rule => {
                self.flush_text();
                self.separate_block(&range);
                self.push(Token::Hr);
            }
            Event::TaskListMarker(checked) => {
                // In loose lists the marker arrives inside the item's paragraph.
                let item = self.frames.iter_mut().rev().find_map(|frame| match &mut frame.kind {
                    FrameKind::Item { checked: state } => Some(state),
                    _ => None,
                });
                if let Some(slot) = item {
                    *slot = Some(checked);
                }
            }
            Event::Html(_) => {
                self.flush_text();
                self.push_other("html", &range);
            }
            Event::InlineHtml(_) => {
                self.flush_text();
                self.push_other("inline_html", &range);
            }
            _ => {
                self.flush_text();
                self.push_other("unsupported", &range);
            }
        }
    }

    fn open(&mut self, tag: Tag, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(heading_level_to_u8(level)),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(lang) => {
                        let lang = lang.into_string();
                        if lang.is_empty() { None } else { Some(lang) }
                    }
                    CodeBlockKind::Indented => None,
                },
                content: String::new(),
            },
            Tag::List(start) => FrameKind::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => FrameKind::Item { checked: None },
            Tag::Table(align) => FrameKind::Table {
                align: align.into_iter().map(convert_alignment).collect(),
                header: None,
                rows: Vec::new(),
            },
            Tag::TableHead => FrameKind::TableHead { cells: Vec::new() },
            Tag::TableRow => FrameKind::TableRow { cells: Vec::new() },
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => {
                if self.claim(&range) {
                    return;
                }
                FrameKind::Strikethrough
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                // `[^label]` resolved against a reference definition
                if self.claim(&range) {
                    return;
                }
                FrameKind::Link {
                    href: dest_url.into_string(),
                    title: non_empty(title.into_string()),
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                if self.claim(&range) {
                    return;
                }
                FrameKind::Image {
                    href: dest_url.into_string(),
                    title: non_empty(title.into_string()),
                }
            }
            other => {
                self.push_other(tag_kind(&other), &range);
                self.skip_depth = 1;
                return;
            }
        };
        self.frames.push(Frame::new(kind, range.end));
    }

    /// Let a recognizer take over a host construct spanning `range`.
    fn claim(&mut self, range: &Range<usize>) -> bool {
        let Some(token) = extensions::claim_span(self.recognizers, self.slice(range)) else {
            return false;
        };
        self.push(token);
        self.skip_depth = 1;
        true
    }

    /// Look for a recognizer match that starts in the pending text and runs
    /// past `at`, where an inline construct is about to open. The match is
    /// taken against the raw source, so the construct becomes part of it.
    fn claim_pending(&mut self, at: usize) {
        let Some(run_start) = self.pending_pieces.first().map(|p| p.source.start) else {
            return;
        };
        let source = self.source;
        let limit = self.frames.last().map_or(source.len(), |f| f.end);
        let mut pos = run_start;

        while pos < at {
            let Some(window) = source.get(pos..at) else {
                return;
            };
            let Some(found) = self.recognizers.iter().filter_map(|r| r.start(window)).min() else {
                return;
            };
            let candidate = pos + found;
            let step = source[candidate..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            if source[..candidate].ends_with('\\') {
                pos = candidate + step;
                continue;
            }

            let rest = source.get(candidate..limit).unwrap_or_default();
            match self.recognizers.iter().find_map(|r| r.scan(rest)) {
                Some(found) if candidate + found.len > at => {
                    if let Some(prefix) = self.pending_prefix(candidate) {
                        self.pending_text.truncate(prefix);
                        self.flush_text();
                        self.push(found.token);
                        self.claimed_until = candidate + found.len;
                        self.claimed_depth = 0;
                        return;
                    }
                    pos = candidate + step;
                }
                // Self-contained; scanning the merged text will find it.
                Some(found) => pos = candidate + found.len,
                None => pos = candidate + step,
            }
        }
    }

    /// Length of the pending text that precedes source offset `at`.
    fn pending_prefix(&self, at: usize) -> Option<usize> {
        self.pending_pieces
            .iter()
            .find(|piece| piece.verbatim && piece.source.contains(&at))
            .map(|piece| piece.offset + (at - piece.source.start))
    }

    /// Handle an event that starts inside a claimed span. Events of
    /// enclosing constructs are handed back.
    fn consume_claimed<'e>(&mut self, event: Event<'e>, range: &Range<usize>) -> Option<Event<'e>> {
        match event {
            Event::Start(_) => {
                self.claimed_depth += 1;
                None
            }
            Event::End(_) if self.claimed_depth > 0 => {
                self.claimed_depth -= 1;
                None
            }
            Event::End(_) => Some(event),
            Event::Text(_) if range.end > self.claimed_until => {
                // Keep what follows the claimed span.
                let tail = self.claimed_until..range.end;
                let text = self.slice(&tail);
                self.push_pending(text, tail);
                None
            }
            _ => None,
        }
    }

    /// Emit a `space` token when a blank line separates the block starting at
    /// `range` from the previous block of the same container.
    fn separate_block(&mut self, range: &Range<usize>) {
        let source = self.source;
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if !matches!(frame.kind, FrameKind::Document | FrameKind::BlockQuote) {
            return;
        }
        let previous = frame.last_block.replace(range.clone());
        let Some(previous) = previous else {
            return;
        };
        let content_end = source
            .get(previous.clone())
            .map_or(previous.end, |block| previous.start + block.trim_end().len());
        let gap = source.get(content_end..range.start).unwrap_or_default();
        if gap.matches('\n').count() >= 2 {
            frame.children.push(Token::Space);
        }
    }

    fn close(&mut self) {
        // The document frame is never closed by an event.
        if self.frames.len() < 2 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let children = frame.children;

        match frame.kind {
            FrameKind::Document => {}
            FrameKind::Heading(depth) => self.push(Token::Heading {
                depth,
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::Paragraph => self.push(Token::Paragraph {
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::BlockQuote => self.push(Token::Blockquote {
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::CodeBlock { lang, content } => self.push(Token::Code {
                lang,
                text: content,
            }),
            FrameKind::List { start, items } => {
                let loose = items.iter().any(|item| {
                    item.tokens
                        .iter()
                        .any(|t| matches!(t, Token::Paragraph { .. }))
                });
                self.push(Token::List(List {
                    ordered: start.is_some(),
                    start,
                    loose,
                    items,
                }));
            }
            FrameKind::Item { checked } => {
                let tokens = wrap_tight_content(children);
                let text = token::plain_text(
                    &tokens
                        .iter()
                        .filter(|t| !matches!(t, Token::List(_)))
                        .cloned()
                        .collect::<Vec<_>>(),
                );
                let item = ListItem {
                    task: checked.is_some(),
                    checked: checked.unwrap_or(false),
                    text,
                    tokens,
                };
                if let Some(Frame {
                    kind: FrameKind::List { items, .. },
                    ..
                }) = self.frames.last_mut()
                {
                    items.push(item);
                }
            }
            FrameKind::Table {
                align,
                header,
                rows,
            } => self.push(Token::Table(Table {
                align,
                header,
                rows,
            })),
            FrameKind::TableHead { cells } => {
                if let Some(Frame {
                    kind: FrameKind::Table { header, .. },
                    ..
                }) = self.frames.last_mut()
                {
                    *header = Some(cells);
                }
            }
            FrameKind::TableRow { cells } => {
                if let Some(Frame {
                    kind: FrameKind::Table { rows, .. },
                    ..
                }) = self.frames.last_mut()
                {
                    rows.push(cells);
                }
            }
            FrameKind::TableCell => {
                let cell = TableCell {
                    text: token::plain_text(&children),
                    tokens: children,
                };
                if let Some(Frame {
                    kind: FrameKind::TableHead { cells } | FrameKind::TableRow { cells },
                    ..
                }) = self.frames.last_mut()
                {
                    cells.push(cell);
                }
            }
            FrameKind::Emphasis => self.push(Token::Em {
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::Strong => self.push(Token::Strong {
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::Strikethrough => self.push(Token::Del {
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::Link { href, title } => self.push(Token::Link {
                href,
                title,
                text: token::plain_text(&children),
                tokens: Some(children),
            }),
            FrameKind::Image { href, title } => self.push(Token::Image {
                href,
                title,
                text: token::plain_text(&children),
            }),
        }
    }

    fn push_pending(&mut self, text: &str, source: Range<usize>) {
        let verbatim = self.slice(&source) == text;
        self.pending_pieces.push(PendingPiece {
            offset: self.pending_text.len(),
            source,
            verbatim,
        });
        self.pending_text.push_str(text);
    }

    fn flush_text(&mut self) {
        self.pending_pieces.clear();
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        if let Some(frame) = self.frames.last_mut() {
            extensions::scan_text(self.recognizers, &text, &mut frame.children);
        }
    }

    fn push(&mut self, token: Token) {
        if let Some(frame) = self.frames.last_mut() {
            frame.children.push(token);
        }
    }

    fn push_other(&mut self, kind: &str, range: &Range<usize>) {
        let raw = self.slice(range).to_string();
        self.push(Token::Other {
            kind: kind.to_string(),
            raw,
        });
    }

    fn slice(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or_default()
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_text();
        while self.frames.len() > 1 {
            self.close();
        }
        self.frames
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default()
    }
}

/// Inline content sitting directly in a tight list item is wrapped in a
/// `text` token carrying the inline children.
fn wrap_tight_content(children: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::new();
    let mut run = Vec::new();

    for child in children {
        if child.is_inline() || matches!(child, Token::Image { .. } | Token::Video { .. }) {
            run.push(child);
        } else {
            flush_run(&mut run, &mut out);
            out.push(child);
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut Vec<Token>, out: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }
    let tokens = std::mem::take(run);
    out.push(Token::Text {
        text: token::plain_text(&tokens),
        tokens: Some(tokens),
    });
}

/// Kind name for a host construct that has no token of its own.
fn tag_kind(tag: &Tag) -> &'static str {
    match tag {
        Tag::HtmlBlock => "html",
        _ => "unsupported",
    }
}

/// Events that open an inline construct inside a run of text.
fn opens_inline(event: &Event) -> bool {
    matches!(
        event,
        Event::Start(
            Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Link { .. }
                | Tag::Image { .. }
        ) | Event::Code(_)
            | Event::InlineHtml(_)
    )
}

fn is_block(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Table(_)
    )
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn convert_alignment(align: pulldown_cmark::Alignment) -> Alignment {
    match align {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(markdown: &str) -> Vec<Token> {
        Tokenizer::default().tokenize(markdown)
    }

    fn literal(text: &str) -> Token {
        Token::Text {
            text: text.to_string(),
            tokens: None,
        }
    }

    fn inline(markdown: &str) -> Vec<Token> {
        match tokenize(markdown).into_iter().next() {
            Some(Token::Paragraph {
                tokens: Some(tokens),
                ..
            }) => tokens,
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    #[test]
    fn heading() {
        assert_eq!(
            tokenize("## Hello"),
            vec![Token::Heading {
                depth: 2,
                text: "Hello".into(),
                tokens: Some(vec![literal("Hello")]),
            }]
        );
    }

    #[test]
    fn emphasis_nests() {
        let tokens = inline("a **b *c***");
        assert_eq!(tokens[0], literal("a "));
        let Token::Strong {
            text,
            tokens: Some(children),
        } = &tokens[1]
        else {
            panic!("expected strong, got {:?}", tokens[1]);
        };
        assert_eq!(text, "b c");
        assert!(matches!(&children[1], Token::Em { text, .. } if text == "c"));
    }

    #[test]
    fn soft_break_becomes_space() {
        assert_eq!(inline("one\ntwo"), vec![literal("one two")]);
    }

    #[test]
    fn hard_break() {
        assert_eq!(
            inline("one  \ntwo"),
            vec![literal("one"), Token::Br, literal("two")]
        );
    }

    #[test]
    fn double_tilde_is_del() {
        assert!(matches!(&inline("~~gone~~")[0], Token::Del { text, .. } if text == "gone"));
    }

    #[test]
    fn single_tilde_is_subscript() {
        assert_eq!(
            inline("H~2~O"),
            vec![
                literal("H"),
                Token::Subscript {
                    raw: "~2~".into(),
                    text: "2".into()
                },
                literal("O"),
            ]
        );
    }

    #[test]
    fn superscript_in_paragraph() {
        assert_eq!(
            inline("E = mc^2^"),
            vec![
                literal("E = mc"),
                Token::Superscript {
                    raw: "^2^".into(),
                    text: "2".into()
                },
            ]
        );
    }

    #[test]
    fn footnote_marker() {
        assert_eq!(
            inline("Claim[^1]"),
            vec![
                literal("Claim"),
                Token::Footnote {
                    raw: "[^1]".into(),
                    text: "1".into()
                },
            ]
        );
    }

    #[test]
    fn video_replaces_image() {
        assert_eq!(
            inline("![[video]](https://x/y.mp4)"),
            vec![Token::Video {
                raw: "![[video]](https://x/y.mp4)".into(),
                href: "https://x/y.mp4".into()
            }]
        );
    }

    #[test]
    fn image_keeps_alt_text() {
        assert_eq!(
            inline("![a cat](cat.png \"Cat\")"),
            vec![Token::Image {
                href: "cat.png".into(),
                title: Some("Cat".into()),
                text: "a cat".into()
            }]
        );
    }

    #[test]
    fn link() {
        let tokens = inline("[docs](https://example.com)");
        assert_eq!(
            tokens,
            vec![Token::Link {
                href: "https://example.com".into(),
                title: None,
                text: "docs".into(),
                tokens: Some(vec![literal("docs")]),
            }]
        );
    }

    #[test]
    fn code_is_not_scanned() {
        assert_eq!(
            tokenize("```\n^not^ ~sub~\n```"),
            vec![Token::Code {
                lang: None,
                text: "^not^ ~sub~\n".into()
            }]
        );
        assert_eq!(
            inline("`^x^`"),
            vec![Token::Codespan { text: "^x^".into() }]
        );
    }

    #[test]
    fn tight_list_items_wrap_text() {
        let tokens = tokenize("- a\n- **b**");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {:?}", tokens[0]);
        };
        assert!(!list.ordered);
        assert!(!list.loose);
        assert_eq!(
            list.items[0].tokens,
            vec![Token::Text {
                text: "a".into(),
                tokens: Some(vec![literal("a")]),
            }]
        );
        assert_eq!(list.items[1].text, "b");
    }

    #[test]
    fn nested_list_stays_in_item() {
        let tokens = tokenize("1. a\n   - b");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {:?}", tokens[0]);
        };
        assert!(list.ordered);
        assert_eq!(list.start, Some(1));
        let item = &list.items[0];
        assert_eq!(item.text, "a");
        assert!(matches!(item.tokens.last(), Some(Token::List(nested)) if !nested.ordered));
    }

    #[test]
    fn task_items() {
        let tokens = tokenize("- [x] done\n- [ ] todo\n- plain");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {:?}", tokens[0]);
        };
        let flags: Vec<_> = list.items.iter().map(|i| (i.task, i.checked)).collect();
        assert_eq!(flags, vec![(true, true), (true, false), (false, false)]);
    }

    #[test]
    fn table() {
        let tokens = tokenize("| A | B |\n|:--|--:|\n| 1 | 2 |\n| 3 | 4 |");
        let Token::Table(table) = &tokens[0] else {
            panic!("expected table, got {:?}", tokens[0]);
        };
        assert_eq!(table.align, vec![Alignment::Left, Alignment::Right]);
        let header = table.header.as_ref().expect("header");
        assert_eq!(header.len(), 2);
        assert_eq!(header[0].text, "A");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1].text, "4");
    }

    #[test]
    fn blockquote_holds_blocks() {
        let tokens = tokenize("> quoted\n>\n> more");
        let Token::Blockquote {
            tokens: Some(children),
            ..
        } = &tokens[0]
        else {
            panic!("expected blockquote, got {:?}", tokens[0]);
        };
        assert_eq!(children.len(), 3);
        assert_eq!(children[1], Token::Space);
    }

    #[test]
    fn html_is_other() {
        let tokens = tokenize("<div>hi</div>\n\ntext");
        assert!(matches!(&tokens[0], Token::Other { kind, .. } if kind == "html"));
        assert_eq!(tokens[1], Token::Space);
        assert!(matches!(&tokens[2], Token::Paragraph { .. }));
    }

    #[test]
    fn rule() {
        let kinds: Vec<_> = tokenize("a\n\n---\n\nb")
            .iter()
            .map(|t| t.kind().to_string())
            .collect();
        assert_eq!(kinds, vec!["paragraph", "space", "hr", "space", "paragraph"]);
    }

    #[test]
    fn blank_lines_separate_blocks() {
        let kinds = |markdown: &str| -> Vec<String> {
            tokenize(markdown)
                .iter()
                .map(|t| t.kind().to_string())
                .collect()
        };
        assert_eq!(kinds("# A\nbody"), vec!["heading", "paragraph"]);
        assert_eq!(kinds("# A\n\n\n\nbody"), vec!["heading", "space", "paragraph"]);
        assert_eq!(
            kinds("- a\n- b\n\n```\ncode\n```\n\n| x |\n|---|\n| 1 |"),
            vec!["list", "space", "code", "space", "table"]
        );
        // Items of a list are not separated by spaces.
        let tokens = tokenize("- a\n\n- b");
        let Token::List(list) = &tokens[0] else {
            panic!("expected list, got {:?}", tokens[0]);
        };
        assert!(list
            .items
            .iter()
            .all(|item| !item.tokens.contains(&Token::Space)));
    }

    #[test]
    fn footnote_with_reference_definition() {
        let tokens = tokenize("See[^src].\n\n[^src]: https://example.com/paper\n");
        assert_eq!(
            tokens,
            vec![Token::Paragraph {
                text: "See[src].".into(),
                tokens: Some(vec![
                    literal("See"),
                    Token::Footnote {
                        raw: "[^src]".into(),
                        text: "src".into()
                    },
                    literal("."),
                ]),
            }]
        );
    }

    #[test]
    fn superscript_spans_emphasis() {
        assert_eq!(
            inline("^a *b* c^"),
            vec![Token::Superscript {
                raw: "^a *b* c^".into(),
                text: "a *b* c".into()
            }]
        );
        assert_eq!(
            inline("x ^a `b` c^ y"),
            vec![
                literal("x "),
                Token::Superscript {
                    raw: "^a `b` c^".into(),
                    text: "a `b` c".into()
                },
                literal(" y"),
            ]
        );
    }

    #[test]
    fn footnote_spans_emphasis() {
        assert_eq!(
            inline("note[^a *b*] end"),
            vec![
                literal("note"),
                Token::Footnote {
                    raw: "[^a *b*]".into(),
                    text: "a *b*".into()
                },
                literal(" end"),
            ]
        );
    }

    #[test]
    fn closed_match_before_emphasis_stays_put() {
        let tokens = inline("x^2^ and *y*");
        assert!(matches!(&tokens[1], Token::Superscript { text, .. } if text == "2"));
        assert_eq!(tokens[2], literal(" and "));
        assert!(matches!(&tokens[3], Token::Em { text, .. } if text == "y"));
    }

    #[test]
    fn escaped_marker_does_not_span_emphasis() {
        let tokens = inline(r"\^a *b* c^");
        assert!(tokens.iter().any(|t| matches!(t, Token::Em { .. })));
        assert!(!tokens.iter().any(|t| matches!(t, Token::Superscript { .. })));
    }

    #[test]
    fn line_endings_are_normalized() {
        let source = "# Title\n\n- a\n  - b\n\ntext  \nmore ^x^";
        assert_eq!(tokenize(source), tokenize(&source.replace('\n', "\r\n")));
        assert_eq!(tokenize(source), tokenize(&source.replace('\n', "\r")));
    }

    #[test]
    fn front_matter_is_stripped() {
        assert_eq!(
            tokenize("---\ntitle: x\n---\n\nbody"),
            tokenize("body")
        );
    }

    struct Mention;

    impl InlineRecognizer for Mention {
        fn name(&self) -> &'static str {
            "mention"
        }

        fn start(&self, src: &str) -> Option<usize> {
            src.find('@')
        }

        fn scan(&self, src: &str) -> Option<extensions::InlineMatch> {
            let len = 1 + src[1..]
                .find(|c: char| !c.is_alphanumeric())
                .unwrap_or(src.len() - 1);
            (len > 1).then(|| extensions::InlineMatch {
                len,
                token: Token::Other {
                    kind: "mention".into(),
                    raw: src[..len].to_string(),
                },
            })
        }
    }

    #[test]
    fn registered_recognizer_runs_after_builtins() {
        let tokenizer = Tokenizer::default().register(Box::new(Mention));
        assert_eq!(
            tokenizer.recognizer_names(),
            vec!["superscript", "subscript", "footnote", "video", "mention"]
        );
        let Some(Token::Paragraph {
            tokens: Some(tokens),
            ..
        }) = tokenizer.tokenize("hi @sam ^1^").into_iter().next()
        else {
            panic!("expected a paragraph");
        };
        assert!(matches!(&tokens[1], Token::Other { kind, raw } if kind == "mention" && raw == "@sam"));
        assert!(matches!(&tokens[3], Token::Superscript { .. }));
    }

    #[test]
    fn bare_tokenizer_has_no_extensions() {
        let tokens = Tokenizer::bare(TokenizerConfig::default()).tokenize("x^2^");
        assert_eq!(
            tokens,
            vec![Token::Paragraph {
                text: "x^2^".into(),
                tokens: Some(vec![literal("x^2^")]),
            }]
        );
    }
}
