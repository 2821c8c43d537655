//! `<md-select>` widgets.

use formextra_core::Value;

use super::{
    base_context, AttrValue, Attrs, OptGroup, OptionContext, Widget, WidgetContext, WidgetType,
};
use crate::form::FormData;

/// A single selectable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// The option value. `None` renders as an empty string.
    pub value: Option<String>,
    /// The display label.
    pub label: String,
}

impl SelectOption {
    /// An option with a value.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: label.into(),
        }
    }

    /// An option without a value, selected when the field is empty.
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
        }
    }
}

impl<V: Into<String>, L: Into<String>> From<(V, L)> for SelectOption {
    fn from((value, label): (V, L)) -> Self {
        Self::new(value, label)
    }
}

/// A choice: either one option or a labelled group of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// A top-level option.
    Option(SelectOption),
    /// An `<md-optgroup>`.
    Group {
        /// The group label.
        label: String,
        /// The options inside the group.
        options: Vec<SelectOption>,
    },
}

impl Choice {
    /// A top-level option.
    pub fn option(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Option(SelectOption::new(value, label))
    }

    /// A top-level option without a value.
    pub fn empty(label: impl Into<String>) -> Self {
        Self::Option(SelectOption::empty(label))
    }

    /// A labelled group.
    pub fn group<O: Into<SelectOption>>(
        label: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        Self::Group {
            label: label.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

impl<V: Into<String>, L: Into<String>> From<(V, L)> for Choice {
    fn from(pair: (V, L)) -> Self {
        Self::Option(pair.into())
    }
}

/// An Angular Material `<md-select>`.
///
/// The matching option is marked with a bare `data-selected` attribute
/// unless `disable_select` is set, in which case no option is ever marked.
#[derive(Debug, Clone, Default)]
pub struct MdSelect {
    /// The available choices.
    pub choices: Vec<Choice>,
    /// Never mark an option as selected.
    pub disable_select: bool,
    allow_multiple: bool,
    attrs: Attrs,
}

impl MdSelect {
    /// A select over `choices`.
    pub fn new(choices: impl IntoIterator<Item = Choice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Sets `disable_select`.
    #[must_use]
    pub fn disable_select(mut self, disable: bool) -> Self {
        self.disable_select = disable;
        self
    }

    /// Whether more than one option may be selected.
    pub const fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// The string values considered selected for `value`.
    fn selected_values(&self, value: &Value) -> Vec<String> {
        let as_option = |v: &Value| self.format_value(v).unwrap_or_default();
        match value {
            Value::Null if self.allow_multiple => Vec::new(),
            Value::List(items) => items.iter().map(as_option).collect(),
            other => vec![as_option(other)],
        }
    }

    fn optgroups(&self, selected: &[String]) -> Vec<OptGroup> {
        let mut has_selected = false;
        let mut option_context = |option: &SelectOption| {
            let value = option.value.clone().unwrap_or_default();
            let is_selected =
                (!has_selected || self.allow_multiple) && selected.iter().any(|s| *s == value);
            has_selected |= is_selected;
            let mut attrs = Attrs::new();
            if is_selected && !self.disable_select {
                attrs.insert("data-selected".into(), AttrValue::Flag(true));
            }
            OptionContext {
                value,
                label: option.label.clone(),
                selected: is_selected,
                attrs,
                template_name: "md_select_option.html".into(),
            }
        };

        self.choices
            .iter()
            .map(|choice| match choice {
                Choice::Option(option) => OptGroup {
                    label: None,
                    options: vec![option_context(option)],
                },
                Choice::Group { label, options } => OptGroup {
                    label: Some(label.clone()),
                    options: options.iter().map(&mut option_context).collect(),
                },
            })
            .collect()
    }
}

impl Widget for MdSelect {
    fn widget_type(&self) -> WidgetType {
        WidgetType::MdSelect
    }

    fn template_name(&self) -> &str {
        "md_select.html"
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        let mut ctx = base_context(self, name, value, attrs);
        ctx.value = None;
        ctx.optgroups = self.optgroups(&self.selected_values(value));
        if self.allow_multiple {
            ctx.attrs.insert("data-multiple".into(), AttrValue::Flag(true));
        }
        ctx
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<serde_json::Value> {
        let raw = data.get(name)?;
        if !self.allow_multiple {
            return Some(raw.clone());
        }
        match raw {
            serde_json::Value::Null => None,
            serde_json::Value::Array(_) => Some(raw.clone()),
            scalar => Some(serde_json::Value::Array(vec![scalar.clone()])),
        }
    }
}

/// An `<md-select>` allowing several options, marked with `data-multiple`.
///
/// A null value selects nothing.
#[derive(Debug, Clone, Default)]
pub struct MdMultiSelect(MdSelect);

impl MdMultiSelect {
    /// A multi-select over `choices`.
    pub fn new(choices: impl IntoIterator<Item = Choice>) -> Self {
        Self(MdSelect {
            allow_multiple: true,
            ..MdSelect::new(choices)
        })
    }

    /// Sets `disable_select`.
    #[must_use]
    pub fn disable_select(self, disable: bool) -> Self {
        Self(self.0.disable_select(disable))
    }

    /// The underlying select.
    pub const fn select(&self) -> &MdSelect {
        &self.0
    }
}

impl Widget for MdMultiSelect {
    fn widget_type(&self) -> WidgetType {
        WidgetType::MdMultiSelect
    }

    fn template_name(&self) -> &str {
        self.0.template_name()
    }

    fn attrs(&self) -> &Attrs {
        self.0.attrs()
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        self.0.attrs_mut()
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        self.0.get_context(name, value, attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<serde_json::Value> {
        self.0.value_from_data(data, name)
    }
}
