//! Render Markdown as a tree of native UI element descriptors.
//!
//! Markdown is tokenized with `pulldown-cmark` plus a few inline extensions
//! (`^sup^`, `~sub~`, `[^note]`, `![[video]](url)`), then mapped to
//! [`RenderNode`]s that a host UI layer turns into platform widgets.
//!
//! ```
//! use mdnative::{render_markdown, RenderNode};
//!
//! let tree = render_markdown("# Hello, **world**!");
//! assert!(matches!(tree, RenderNode::View { .. }));
//! ```

mod action;
mod config;
mod error;
mod extensions;
mod node;
mod render;
mod style;
mod token;
mod tokenizer;
mod view;

pub use action::{Action, UrlOpener};
pub use config::{Config, FallbackConfig, LayoutConfig, TokenizerConfig};
pub use error::{BuildError, ConfigError, OpenError};
pub use extensions::{InlineMatch, InlineRecognizer};
pub use node::{Inline, RenderNode, TableCellNode, TableRow, VIDEO_LABEL};
pub use render::{bullet, heading_font_size};
pub use style::{NamedStyles, Slot, Style, StyleSheet, StyleValue};
pub use token::{Alignment, List, ListItem, Table, TableCell, Token};
pub use tokenizer::{Tokenizer, normalize_line_endings};
pub use view::MarkdownView;

/// Tokenize markdown with the default grammar options and extensions.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(markdown)
}

/// Build a render tree from tokens using default layout.
pub fn build(tokens: &[Token], styles: &StyleSheet) -> Result<RenderNode, BuildError> {
    render::build(tokens, styles, &LayoutConfig::default())
}

/// Build a render tree from tokens with custom layout.
pub fn build_with_layout(
    tokens: &[Token],
    styles: &StyleSheet,
    layout: &LayoutConfig,
) -> Result<RenderNode, BuildError> {
    render::build(tokens, styles, layout)
}

/// Render markdown with the built-in styles, falling back to a single
/// message node if the build fails.
pub fn render_markdown(markdown: &str) -> RenderNode {
    render_markdown_with_config(markdown, &Config::default())
}

/// Render markdown with custom config.
pub fn render_markdown_with_config(markdown: &str, config: &Config) -> RenderNode {
    let mut view = MarkdownView::new(config);
    view.set_source(markdown);
    view.render()
}
