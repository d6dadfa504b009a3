use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static DEFAULT_STYLES: &str = include_str!("default_styles.toml");

/// Named points in the render tree that take a style fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Container,
    Heading,
    Paragraph,
    Strong,
    Em,
    Del,
    Link,
    Image,
    VideoContainer,
    CodeBlock,
    CodeText,
    InlineCode,
    Blockquote,
    List,
    ListItem,
    ListItemContainer,
    NestedListContainer,
    Table,
    TableRow,
    TableCell,
    TableHeaderCell,
    HorizontalRule,
    LineBreak,
    Spacer,
    Footnote,
    Superscript,
    Subscript,
    Checkbox,
}

impl Slot {
    pub const ALL: [Slot; 28] = [
        Slot::Container,
        Slot::Heading,
        Slot::Paragraph,
        Slot::Strong,
        Slot::Em,
        Slot::Del,
        Slot::Link,
        Slot::Image,
        Slot::VideoContainer,
        Slot::CodeBlock,
        Slot::CodeText,
        Slot::InlineCode,
        Slot::Blockquote,
        Slot::List,
        Slot::ListItem,
        Slot::ListItemContainer,
        Slot::NestedListContainer,
        Slot::Table,
        Slot::TableRow,
        Slot::TableCell,
        Slot::TableHeaderCell,
        Slot::HorizontalRule,
        Slot::LineBreak,
        Slot::Spacer,
        Slot::Footnote,
        Slot::Superscript,
        Slot::Subscript,
        Slot::Checkbox,
    ];

    /// Name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Container => "container",
            Slot::Heading => "heading",
            Slot::Paragraph => "paragraph",
            Slot::Strong => "strong",
            Slot::Em => "em",
            Slot::Del => "del",
            Slot::Link => "link",
            Slot::Image => "image",
            Slot::VideoContainer => "video_container",
            Slot::CodeBlock => "code_block",
            Slot::CodeText => "code_text",
            Slot::InlineCode => "inline_code",
            Slot::Blockquote => "blockquote",
            Slot::List => "list",
            Slot::ListItem => "list_item",
            Slot::ListItemContainer => "list_item_container",
            Slot::NestedListContainer => "nested_list_container",
            Slot::Table => "table",
            Slot::TableRow => "table_row",
            Slot::TableCell => "table_cell",
            Slot::TableHeaderCell => "table_header_cell",
            Slot::HorizontalRule => "horizontal_rule",
            Slot::LineBreak => "line_break",
            Slot::Spacer => "spacer",
            Slot::Footnote => "footnote",
            Slot::Superscript => "superscript",
            Slot::Subscript => "subscript",
            Slot::Checkbox => "checkbox",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

/// A single style property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        StyleValue::Bool(value)
    }
}

/// A style fragment: property name to value, in a stable order.
pub type Style = BTreeMap<String, StyleValue>;

/// Style fragments keyed by slot name, as written in configuration files.
pub type NamedStyles = BTreeMap<String, Style>;

/// Built-in slot styles plus caller overrides.
///
/// Overrides are applied after the defaults, property by property, so an
/// override only replaces the properties it names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    defaults: BTreeMap<Slot, Style>,
    overrides: BTreeMap<Slot, Style>,
}

impl StyleSheet {
    /// The built-in styles compiled into the crate.
    pub fn compiled_default() -> Self {
        let defaults = match toml::from_str::<NamedStyles>(DEFAULT_STYLES) {
            Ok(named) => resolve_lenient(named),
            Err(e) => {
                tracing::error!("invalid built-in styles: {e}");
                BTreeMap::new()
            }
        };
        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Replace the overrides with slot-named fragments, skipping unknown
    /// slot names.
    pub fn with_overrides(mut self, overrides: NamedStyles) -> Self {
        self.overrides = resolve_lenient(overrides);
        self
    }

    /// Like [`StyleSheet::with_overrides`] but rejects unknown slot names.
    pub fn try_with_overrides(mut self, overrides: NamedStyles) -> Result<Self, ConfigError> {
        let mut resolved = BTreeMap::new();
        for (name, style) in overrides {
            let slot = Slot::from_name(&name).ok_or(ConfigError::UnknownSlot(name))?;
            resolved.insert(slot, style);
        }
        self.overrides = resolved;
        Ok(self)
    }

    /// Set a single override property.
    pub fn set_override(&mut self, slot: Slot, property: &str, value: impl Into<StyleValue>) {
        self.overrides
            .entry(slot)
            .or_default()
            .insert(property.to_string(), value.into());
    }

    /// Effective style for a slot.
    pub fn style(&self, slot: Slot) -> Style {
        self.style_with(slot, Style::new())
    }

    /// Effective style for a slot with computed properties layered between
    /// the defaults and the overrides.
    pub fn style_with(&self, slot: Slot, computed: Style) -> Style {
        let mut style = self.defaults.get(&slot).cloned().unwrap_or_default();
        style.extend(computed);
        if let Some(overrides) = self.overrides.get(&slot) {
            style.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        style
    }
}

fn resolve_lenient(named: NamedStyles) -> BTreeMap<Slot, Style> {
    let mut resolved = BTreeMap::new();
    for (name, style) in named {
        match Slot::from_name(&name) {
            Some(slot) => {
                resolved.insert(slot, style);
            }
            None => tracing::warn!(slot = %name, "ignoring styles for unknown slot"),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_name(slot.name()), Some(slot));
        }
        assert_eq!(Slot::from_name("sidebar"), None);
    }

    #[test]
    fn compiled_default_covers_every_slot() {
        let sheet = StyleSheet::compiled_default();
        for slot in Slot::ALL {
            assert!(
                !sheet.style(slot).is_empty(),
                "no default style for {}",
                slot.name()
            );
        }
    }

    #[test]
    fn override_merges_over_default() {
        let mut sheet = StyleSheet::compiled_default();
        let before = sheet.style(Slot::Link);
        sheet.set_override(Slot::Link, "color", "#ff0000");

        let after = sheet.style(Slot::Link);
        assert_eq!(after.get("color"), Some(&StyleValue::from("#ff0000")));
        // Properties the override does not name survive.
        for (key, value) in &before {
            if key != "color" {
                assert_eq!(after.get(key), Some(value));
            }
        }
    }

    #[test]
    fn computed_properties_sit_between_default_and_override() {
        let mut sheet = StyleSheet::default();
        let computed = Style::from([("fontSize".to_string(), StyleValue::from(32.0))]);
        assert_eq!(
            sheet.style_with(Slot::Heading, computed.clone()).get("fontSize"),
            Some(&StyleValue::Number(32.0))
        );

        sheet.set_override(Slot::Heading, "fontSize", 40.0);
        assert_eq!(
            sheet.style_with(Slot::Heading, computed).get("fontSize"),
            Some(&StyleValue::Number(40.0))
        );
    }

    #[test]
    fn unknown_slots() {
        let named = NamedStyles::from([("sidebar".to_string(), Style::new())]);
        assert_eq!(
            StyleSheet::default().with_overrides(named.clone()),
            StyleSheet::default()
        );
        assert!(matches!(
            StyleSheet::default().try_with_overrides(named),
            Err(ConfigError::UnknownSlot(name)) if name == "sidebar"
        ));
    }
}
