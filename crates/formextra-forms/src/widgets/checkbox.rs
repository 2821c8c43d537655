//! `<md-checkbox>` widget.

use formextra_core::Value;

use super::{base_context, AttrValue, Attrs, Widget, WidgetContext, WidgetType};
use crate::form::FormData;

/// An Angular Material checkbox with a label and optional tooltip.
///
/// A checked box carries a bare `data-checked` attribute. Values other than
/// booleans are also rendered as `data-value`.
#[derive(Debug, Clone, Default)]
pub struct MdCheckbox {
    /// Text shown next to the box.
    pub label: String,
    /// Tooltip text; empty for none.
    pub help_text: String,
    attrs: Attrs,
}

impl MdCheckbox {
    /// A checkbox with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the tooltip text.
    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }
}

/// Everything except `false`, null and `""` is checked.
fn is_checked(value: &Value) -> bool {
    !matches!(value, Value::Bool(false) | Value::Null) && *value != Value::String(String::new())
}

impl Widget for MdCheckbox {
    fn widget_type(&self) -> WidgetType {
        WidgetType::MdCheckbox
    }

    fn template_name(&self) -> &str {
        "md_checkbox.html"
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    fn format_value(&self, value: &Value) -> Option<String> {
        match value {
            Value::Bool(_) => None,
            other => super::format_value(other),
        }
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        let mut ctx = base_context(self, name, value, attrs);
        let checked = ctx.attrs.remove("checked");
        if is_checked(value) {
            ctx.attrs.insert("data-checked".into(), AttrValue::Flag(true));
        } else if let Some(checked) = checked {
            ctx.attrs.insert("data-checked".into(), checked);
        }
        ctx.extra.insert("label".into(), self.label.clone().into());
        ctx.extra.insert("help_text".into(), self.help_text.clone().into());
        ctx
    }

    /// Unchecked boxes are not submitted, so a missing key reads as `false`.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<serde_json::Value> {
        let checked = match data.get(name) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => match s.to_lowercase().as_str() {
                "true" => true,
                "false" | "" => false,
                _ => true,
            },
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(other) => !formextra_core::value::json_is_empty(other),
        };
        Some(serde_json::Value::Bool(checked))
    }
}
