use crate::action::Action;
use crate::config::LayoutConfig;
use crate::error::BuildError;
use crate::node::{Inline, RenderNode, TableCellNode, TableRow, VIDEO_LABEL};
use crate::style::{Slot, Style, StyleSheet, StyleValue};
use crate::token::{List, ListItem, Table, TableCell, Token};

/// Convert a token tree to a render tree.
///
/// Unknown token kinds are dropped with a warning. A token missing a field
/// its kind requires fails the whole build.
pub fn build(
    tokens: &[Token],
    styles: &StyleSheet,
    layout: &LayoutConfig,
) -> Result<RenderNode, BuildError> {
    let builder = Builder { styles, layout };
    let children = builder.blocks(tokens)?;
    Ok(RenderNode::View {
        slot: Slot::Container,
        style: styles.style(Slot::Container),
        children,
    })
}

/// Font size for a heading depth.
pub fn heading_font_size(depth: u8) -> f64 {
    match depth {
        1 => 32.0,
        2 => 28.0,
        3 => 24.0,
        4 => 20.0,
        5 => 16.0,
        _ => 14.0,
    }
}

/// Bullet text for the item at `index` (0-based).
pub fn bullet(ordered: bool, index: usize, item: &ListItem) -> String {
    if ordered {
        format!("{}. ", index + 1)
    } else if item.task {
        let mark = if item.checked { "☑ " } else { "☐ " };
        mark.to_string()
    } else {
        "• ".to_string()
    }
}

struct Builder<'a> {
    styles: &'a StyleSheet,
    layout: &'a LayoutConfig,
}

/// A list being built on the explicit stack.
struct ListFrame<'t> {
    list: &'t List,
    level: usize,
    next: usize,
    items: Vec<RenderNode>,
    open: Option<OpenItem<'t>>,
}

/// An item whose nested lists are still being built.
struct OpenItem<'t> {
    children: Vec<RenderNode>,
    nested: std::vec::IntoIter<&'t List>,
}

impl<'t> ListFrame<'t> {
    fn new(list: &'t List, level: usize) -> Self {
        Self {
            list,
            level,
            next: 0,
            items: Vec::new(),
            open: None,
        }
    }
}

impl Builder<'_> {
    fn blocks(&self, tokens: &[Token]) -> Result<Vec<RenderNode>, BuildError> {
        let mut nodes = Vec::new();
        for token in tokens {
            if let Some(node) = self.block(token)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn block(&self, token: &Token) -> Result<Option<RenderNode>, BuildError> {
        let node = match token {
            Token::Heading {
                depth,
                text,
                tokens,
            } => {
                let size = Style::from([(
                    "fontSize".to_string(),
                    StyleValue::Number(heading_font_size(*depth)),
                )]);
                RenderNode::Text {
                    slot: Slot::Heading,
                    style: self.styles.style_with(Slot::Heading, size),
                    runs: self.inline_children(tokens.as_deref(), text)?,
                }
            }
            Token::Paragraph { text, tokens } => RenderNode::Text {
                slot: Slot::Paragraph,
                style: self.styles.style(Slot::Paragraph),
                runs: self.inline_children(tokens.as_deref(), text)?,
            },
            Token::Blockquote { text, tokens } => {
                let children = match tokens {
                    Some(tokens) => self.blocks(tokens)?,
                    None => vec![self.text_node(Slot::Paragraph, vec![Inline::literal(text)])],
                };
                RenderNode::View {
                    slot: Slot::Blockquote,
                    style: self.styles.style(Slot::Blockquote),
                    children,
                }
            }
            Token::Code { text, .. } => RenderNode::View {
                slot: Slot::CodeBlock,
                style: self.styles.style(Slot::CodeBlock),
                children: vec![self.text_node(Slot::CodeText, vec![Inline::literal(text)])],
            },
            Token::List(list) => self.list(list)?,
            Token::Table(table) => self.table(table)?,
            Token::Image { href, text, .. } => self.image(href, text),
            Token::Video { href, .. } => self.video(href),
            Token::Hr => self.spacer(Slot::HorizontalRule),
            Token::Br => self.spacer(Slot::LineBreak),
            Token::Space => self.spacer(Slot::Spacer),
            Token::Text { .. }
            | Token::Strong { .. }
            | Token::Em { .. }
            | Token::Del { .. }
            | Token::Link { .. }
            | Token::Codespan { .. }
            | Token::Footnote { .. }
            | Token::Superscript { .. }
            | Token::Subscript { .. } => {
                let mut runs = Vec::new();
                self.inline(token, &mut runs)?;
                self.text_node(Slot::Paragraph, runs)
            }
            Token::Other { .. } => {
                tracing::warn!(kind = token.kind(), "skipping token with no render mapping");
                return Ok(None);
            }
        };
        Ok(Some(node))
    }

    /// Append the inline fragments for `token` to `out`.
    fn inline(&self, token: &Token, out: &mut Vec<Inline>) -> Result<(), BuildError> {
        match token {
            Token::Text {
                tokens: Some(tokens),
                ..
            } => {
                for child in tokens {
                    self.inline(child, out)?;
                }
            }
            Token::Text { text, tokens: None } => out.push(Inline::literal(text)),
            Token::Paragraph { text, tokens } => {
                out.extend(self.inline_children(tokens.as_deref(), text)?);
            }
            Token::Strong { text, tokens } => {
                out.push(self.run(Slot::Strong, self.inline_children(tokens.as_deref(), text)?))
            }
            Token::Em { text, tokens } => {
                out.push(self.run(Slot::Em, self.inline_children(tokens.as_deref(), text)?))
            }
            Token::Del { text, tokens } => {
                out.push(self.run(Slot::Del, self.inline_children(tokens.as_deref(), text)?))
            }
            Token::Link {
                href, text, tokens, ..
            } => out.push(Inline::Link {
                href: href.clone(),
                label: text.clone(),
                action: Action::OpenUrl { url: href.clone() },
                style: self.styles.style(Slot::Link),
                children: self.inline_children(tokens.as_deref(), text)?,
            }),
            Token::Codespan { text } => {
                out.push(self.run(Slot::InlineCode, vec![Inline::literal(text)]))
            }
            Token::Footnote { text, .. } => out.push(self.run(
                Slot::Footnote,
                vec![Inline::literal(format!("[{text}]"))],
            )),
            Token::Superscript { text, .. } => {
                out.push(self.run(Slot::Superscript, vec![Inline::literal(text)]))
            }
            Token::Subscript { text, .. } => {
                out.push(self.run(Slot::Subscript, vec![Inline::literal(text)]))
            }
            Token::Other { .. } => {
                tracing::warn!(kind = token.kind(), "skipping inline token with no render mapping");
            }
            Token::Heading { .. }
            | Token::Image { .. }
            | Token::Video { .. }
            | Token::Code { .. }
            | Token::Blockquote { .. }
            | Token::List(_)
            | Token::Table(_)
            | Token::Hr
            | Token::Br
            | Token::Space => {
                if let Some(node) = self.block(token)? {
                    out.push(Inline::Embed {
                        node: Box::new(node),
                    });
                }
            }
        }
        Ok(())
    }

    /// Inline fragments for a container: its child tokens, or its `text` as a
    /// single literal when it has none.
    fn inline_children(
        &self,
        tokens: Option<&[Token]>,
        text: &str,
    ) -> Result<Vec<Inline>, BuildError> {
        let mut runs = Vec::new();
        match tokens {
            Some(tokens) => {
                for token in tokens {
                    self.inline(token, &mut runs)?;
                }
            }
            None => runs.push(Inline::literal(text)),
        }
        Ok(runs)
    }

    fn list(&self, root: &List) -> Result<RenderNode, BuildError> {
        let mut stack = vec![ListFrame::new(root, 0)];

        while let Some(frame) = stack.last_mut() {
            if let Some(open) = frame.open.as_mut() {
                // Descend into the open item's next nested list.
                if let Some(nested) = open.nested.next() {
                    let level = frame.level + 1;
                    stack.push(ListFrame::new(nested, level));
                    continue;
                }
                if let Some(done) = frame.open.take() {
                    frame.items.push(RenderNode::View {
                        slot: Slot::ListItemContainer,
                        style: self.styles.style(Slot::ListItemContainer),
                        children: done.children,
                    });
                }
                continue;
            }

            let list = frame.list;
            if let Some(item) = list.items.get(frame.next) {
                frame.open = Some(self.open_item(list.ordered, frame.next, item)?);
                frame.next += 1;
                continue;
            }

            let level = frame.level;
            let node = RenderNode::View {
                slot: Slot::List,
                style: self.styles.style(Slot::List),
                children: std::mem::take(&mut frame.items),
            };
            stack.pop();
            match stack.last_mut().and_then(|parent| parent.open.as_mut()) {
                Some(parent) => parent.children.push(self.nested_container(node, level)),
                None => return Ok(node),
            }
        }

        Ok(RenderNode::View {
            slot: Slot::List,
            style: self.styles.style(Slot::List),
            children: Vec::new(),
        })
    }

    /// Bullet plus inline content in one text node, then any other blocks.
    /// Nested lists are attached later by the list walk.
    fn open_item<'t>(
        &self,
        ordered: bool,
        index: usize,
        item: &'t ListItem,
    ) -> Result<OpenItem<'t>, BuildError> {
        let marker = bullet(ordered, index, item);
        let mut runs = vec![if item.task && !ordered {
            self.run(Slot::Checkbox, vec![Inline::literal(marker)])
        } else {
            Inline::literal(marker)
        }];
        let mut blocks = Vec::new();
        let mut nested = Vec::new();
        let mut paragraphs = 0;

        for token in &item.tokens {
            match token {
                Token::List(list) => nested.push(list),
                Token::Paragraph { .. } => {
                    // Loose items: keep paragraphs apart inside the one run.
                    if paragraphs > 0 {
                        runs.push(Inline::literal("\n"));
                    }
                    paragraphs += 1;
                    self.inline(token, &mut runs)?;
                }
                Token::Image { .. } | Token::Video { .. } => self.inline(token, &mut runs)?,
                token if token.is_inline() => self.inline(token, &mut runs)?,
                token => blocks.extend(self.block(token)?),
            }
        }

        let mut children = vec![self.text_node(Slot::ListItem, runs)];
        children.extend(blocks);
        Ok(OpenItem {
            children,
            nested: nested.into_iter(),
        })
    }

    fn nested_container(&self, list: RenderNode, level: usize) -> RenderNode {
        let indent = Style::from([(
            "marginLeft".to_string(),
            StyleValue::Number(self.layout.indent_per_level * level as f64),
        )]);
        RenderNode::View {
            slot: Slot::NestedListContainer,
            style: self.styles.style_with(Slot::NestedListContainer, indent),
            children: vec![list],
        }
    }

    fn table(&self, table: &Table) -> Result<RenderNode, BuildError> {
        let header = table.header.as_deref().ok_or(BuildError::MissingField {
            kind: "table",
            field: "header",
        })?;
        let header = self.table_row(header, true)?;
        let rows = table
            .rows
            .iter()
            .map(|row| self.table_row(row, false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RenderNode::Table {
            style: self.styles.style(Slot::Table),
            header,
            rows,
        })
    }

    fn table_row(&self, cells: &[TableCell], header: bool) -> Result<TableRow, BuildError> {
        let slot = if header {
            Slot::TableHeaderCell
        } else {
            Slot::TableCell
        };
        let cells = cells
            .iter()
            .map(|cell| -> Result<TableCellNode, BuildError> {
                let mut runs = Vec::new();
                for token in &cell.tokens {
                    self.inline(token, &mut runs)?;
                }
                Ok(TableCellNode {
                    header,
                    style: self.styles.style(slot),
                    runs,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TableRow {
            style: self.styles.style(Slot::TableRow),
            cells,
        })
    }

    fn image(&self, href: &str, label: &str) -> RenderNode {
        RenderNode::Image {
            source: href.to_string(),
            label: label.to_string(),
            style: self.styles.style(Slot::Image),
        }
    }

    fn video(&self, href: &str) -> RenderNode {
        RenderNode::Video {
            source: href.to_string(),
            paused: true,
            controls: true,
            label: VIDEO_LABEL.to_string(),
            style: self.styles.style(Slot::VideoContainer),
        }
    }

    fn spacer(&self, slot: Slot) -> RenderNode {
        RenderNode::Spacer {
            slot,
            style: self.styles.style(slot),
        }
    }

    fn text_node(&self, slot: Slot, runs: Vec<Inline>) -> RenderNode {
        RenderNode::Text {
            slot,
            style: self.styles.style(slot),
            runs,
        }
    }

    fn run(&self, slot: Slot, children: Vec<Inline>) -> Inline {
        Inline::Run {
            slot,
            style: self.styles.style(slot),
            children,
        }
    }
}
