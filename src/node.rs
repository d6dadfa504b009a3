use serde::Serialize;

use crate::action::Action;
use crate::style::{Slot, Style};

/// Accessibility label given to every video node.
pub const VIDEO_LABEL: &str = "video content";

/// A UI primitive descriptor produced by the builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    /// Rectangular container of block children.
    View {
        slot: Slot,
        style: Style,
        children: Vec<RenderNode>,
    },
    /// Styled text container laid out as one wrapped paragraph.
    Text {
        slot: Slot,
        style: Style,
        runs: Vec<Inline>,
    },
    Image {
        source: String,
        label: String,
        style: Style,
    },
    Video {
        source: String,
        paused: bool,
        controls: bool,
        label: String,
        style: Style,
    },
    Table {
        style: Style,
        header: TableRow,
        rows: Vec<TableRow>,
    },
    /// Fixed-size structural spacer (rule, break, blank space).
    Spacer { slot: Slot, style: Style },
    /// Shown in place of the whole document when a build fails.
    Fallback { message: String },
}

/// One fragment of a text container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "inline", rename_all = "snake_case")]
pub enum Inline {
    Literal {
        text: String,
    },
    Run {
        slot: Slot,
        style: Style,
        children: Vec<Inline>,
    },
    Link {
        href: String,
        label: String,
        action: Action,
        style: Style,
        children: Vec<Inline>,
    },
    /// A non-text node (image, video, spacer, ...) sitting in the run.
    Embed { node: Box<RenderNode> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub style: Style,
    pub cells: Vec<TableCellNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCellNode {
    pub header: bool,
    pub style: Style,
    pub runs: Vec<Inline>,
}

impl Inline {
    pub fn literal(text: impl Into<String>) -> Self {
        Inline::Literal { text: text.into() }
    }
}

impl RenderNode {
    /// All visible text in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_node_text(self, &mut out);
        out
    }

    /// Link actions in document order.
    pub fn actions(&self) -> Vec<&Action> {
        let mut out = Vec::new();
        collect_node_actions(self, &mut out);
        out
    }

    /// Indented one-line-per-node description of the tree.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        outline_node(self, 0, &mut out);
        out
    }
}

fn push_node_text(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::View { children, .. } => {
            for child in children {
                push_node_text(child, out);
            }
        }
        RenderNode::Text { runs, .. } => push_runs_text(runs, out),
        RenderNode::Table { header, rows, .. } => {
            for row in std::iter::once(header).chain(rows) {
                for cell in &row.cells {
                    push_runs_text(&cell.runs, out);
                }
            }
        }
        RenderNode::Fallback { message } => out.push_str(message),
        RenderNode::Image { .. } | RenderNode::Video { .. } | RenderNode::Spacer { .. } => {}
    }
}

fn push_runs_text(runs: &[Inline], out: &mut String) {
    for run in runs {
        match run {
            Inline::Literal { text } => out.push_str(text),
            Inline::Run { children, .. } | Inline::Link { children, .. } => {
                push_runs_text(children, out)
            }
            Inline::Embed { node } => push_node_text(node, out),
        }
    }
}

fn collect_node_actions<'a>(node: &'a RenderNode, out: &mut Vec<&'a Action>) {
    match node {
        RenderNode::View { children, .. } => {
            for child in children {
                collect_node_actions(child, out);
            }
        }
        RenderNode::Text { runs, .. } => collect_run_actions(runs, out),
        RenderNode::Table { header, rows, .. } => {
            for row in std::iter::once(header).chain(rows) {
                for cell in &row.cells {
                    collect_run_actions(&cell.runs, out);
                }
            }
        }
        _ => {}
    }
}

fn collect_run_actions<'a>(runs: &'a [Inline], out: &mut Vec<&'a Action>) {
    for run in runs {
        match run {
            Inline::Link {
                action, children, ..
            } => {
                out.push(action);
                collect_run_actions(children, out);
            }
            Inline::Run { children, .. } => collect_run_actions(children, out),
            Inline::Embed { node } => collect_node_actions(node, out),
            Inline::Literal { .. } => {}
        }
    }
}

fn outline_node(node: &RenderNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        RenderNode::View { slot, children, .. } => {
            out.push_str(&format!("{indent}view {}\n", slot.name()));
            for child in children {
                outline_node(child, depth + 1, out);
            }
        }
        RenderNode::Text { slot, runs, .. } => {
            out.push_str(&format!("{indent}text {}: ", slot.name()));
            outline_runs(runs, out);
            out.push('\n');
        }
        RenderNode::Image { source, label, .. } => {
            out.push_str(&format!("{indent}image {source} \"{label}\"\n"));
        }
        RenderNode::Video { source, .. } => {
            out.push_str(&format!("{indent}video {source}\n"));
        }
        RenderNode::Table { header, rows, .. } => {
            out.push_str(&format!(
                "{indent}table {}x{}\n",
                rows.len() + 1,
                header.cells.len()
            ));
            for row in std::iter::once(header).chain(rows) {
                out.push_str(&format!("{indent}  |"));
                for cell in &row.cells {
                    out.push(' ');
                    outline_runs(&cell.runs, out);
                    out.push_str(" |");
                }
                out.push('\n');
            }
        }
        RenderNode::Spacer { slot, .. } => {
            out.push_str(&format!("{indent}spacer {}\n", slot.name()));
        }
        RenderNode::Fallback { message } => {
            out.push_str(&format!("{indent}fallback: {message}\n"));
        }
    }
}

fn outline_runs(runs: &[Inline], out: &mut String) {
    for run in runs {
        match run {
            Inline::Literal { text } => out.push_str(text),
            Inline::Run { slot, children, .. } => {
                out.push_str(&format!("<{}>", slot.name()));
                outline_runs(children, out);
                out.push_str(&format!("</{}>", slot.name()));
            }
            Inline::Link { href, children, .. } => {
                out.push('[');
                outline_runs(children, out);
                out.push_str(&format!("]({href})"));
            }
            Inline::Embed { node } => match node.as_ref() {
                RenderNode::Image { source, .. } => out.push_str(&format!("<image {source}>")),
                RenderNode::Video { source, .. } => out.push_str(&format!("<video {source}>")),
                RenderNode::Spacer { slot, .. } => out.push_str(&format!("<{}>", slot.name())),
                _ => out.push_str("<block>"),
            },
        }
    }
}
