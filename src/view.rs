use crate::config::{Config, LayoutConfig};
use crate::error::BuildError;
use crate::node::RenderNode;
use crate::render;
use crate::style::StyleSheet;
use crate::token::Token;
use crate::tokenizer::Tokenizer;

/// A Markdown document bound to a tokenizer and a style sheet.
///
/// The token tree is cached by source text, so re-rendering after a style
/// change, or after setting the same source again, does not retokenize.
#[derive(Debug)]
pub struct MarkdownView {
    tokenizer: Tokenizer,
    styles: StyleSheet,
    layout: LayoutConfig,
    fallback_message: String,
    cached: Option<CachedTokens>,
}

#[derive(Debug)]
struct CachedTokens {
    source: String,
    tokens: Vec<Token>,
}

impl MarkdownView {
    pub fn new(config: &Config) -> Self {
        Self {
            tokenizer: Tokenizer::new(config.tokenizer.clone()),
            styles: config.style_sheet(),
            layout: config.layout.clone(),
            fallback_message: config.fallback.message.clone(),
            cached: None,
        }
    }

    /// Set the Markdown source. Returns `true` when the source was tokenized,
    /// `false` when the cached tokens for the same text were kept.
    pub fn set_source(&mut self, markdown: &str) -> bool {
        if let Some(cached) = &self.cached {
            if cached.source == markdown {
                tracing::debug!("markdown unchanged, reusing tokens");
                return false;
            }
        }
        let tokens = self.tokenizer.tokenize(markdown);
        self.cached = Some(CachedTokens {
            source: markdown.to_string(),
            tokens,
        });
        true
    }

    pub fn set_styles(&mut self, styles: StyleSheet) {
        self.styles = styles;
    }

    pub fn styles_mut(&mut self) -> &mut StyleSheet {
        &mut self.styles
    }

    pub fn tokens(&self) -> &[Token] {
        self.cached
            .as_ref()
            .map(|cached| cached.tokens.as_slice())
            .unwrap_or_default()
    }

    /// Build the render tree for the current source.
    pub fn build(&self) -> Result<RenderNode, BuildError> {
        render::build(self.tokens(), &self.styles, &self.layout)
    }

    /// Build the render tree, or the fallback node when the build fails.
    pub fn render(&self) -> RenderNode {
        match self.build() {
            Ok(node) => node,
            Err(e) => {
                tracing::error!("failed to render markdown: {e}");
                RenderNode::Fallback {
                    message: self.fallback_message.clone(),
                }
            }
        }
    }
}

impl Default for MarkdownView {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Slot, StyleValue};

    #[test]
    fn same_source_is_not_retokenized() {
        let mut view = MarkdownView::default();
        assert!(view.set_source("# Title"));
        assert!(!view.set_source("# Title"));
        assert!(view.set_source("# Other"));
        assert_eq!(view.tokens().len(), 1);
    }

    #[test]
    fn empty_view_renders_empty_container() {
        let view = MarkdownView::default();
        assert!(view.tokens().is_empty());
        assert!(matches!(
            view.render(),
            RenderNode::View { slot: Slot::Container, children, .. } if children.is_empty()
        ));
    }

    #[test]
    fn style_change_rebuilds_without_retokenizing() {
        let mut view = MarkdownView::default();
        view.set_source("hello");
        let before = view.render();
        view.styles_mut()
            .set_override(Slot::Paragraph, "color", "#333333");
        let after = view.render();
        assert_ne!(before, after);
        assert!(!view.set_source("hello"));
        let RenderNode::View { children, .. } = &after else {
            panic!("expected view");
        };
        let RenderNode::Text { style, .. } = &children[0] else {
            panic!("expected text");
        };
        assert_eq!(style.get("color"), Some(&StyleValue::from("#333333")));
    }

    #[test]
    fn render_is_repeatable() {
        let mut view = MarkdownView::default();
        view.set_source("- a\n  - b\n\n| x |\n|---|\n| 1 |\n\n[l](u) ^s^");
        assert_eq!(view.render(), view.render());
    }

    #[test]
    fn fallback_uses_configured_message() {
        let mut config = Config::default();
        config.fallback.message = "Nope".to_string();
        let mut view = MarkdownView::new(&config);
        view.set_source("ok");
        assert!(view.build().is_ok());
        view.cached = Some(CachedTokens {
            source: "broken".to_string(),
            tokens: vec![Token::Table(crate::token::Table {
                align: Vec::new(),
                header: None,
                rows: Vec::new(),
            })],
        });
        assert_eq!(
            view.render(),
            RenderNode::Fallback {
                message: "Nope".to_string()
            }
        );
    }
}
