//! Widget system for rendering form fields.
//!
//! A widget turns a field name, a [`Value`] and a set of attributes into a
//! [`WidgetContext`], which is rendered to HTML by the tera engine in
//! [`renderer`]. The Angular Material widgets emit `md-*` elements whose
//! attributes are all `data-` prefixed.
//!
//! Attributes are held in an ordered [`Attrs`] map so that rendered output
//! is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use formextra_core::{FormExtraResult, Value, SETTINGS};

use crate::form::FormData;

pub mod checkbox;
pub mod date;
pub mod input;
pub mod renderer;
pub mod select;

pub use checkbox::MdCheckbox;
pub use date::{MdDatePicker, MdDateSelect};
pub use input::Input;
pub use renderer::render_context;
pub use select::{Choice, MdMultiSelect, MdSelect, SelectOption};

/// An HTML attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Rendered as `key="value"`, escaped.
    Text(String),
    /// `true` renders the bare key, `false` omits the attribute.
    Flag(bool),
}

impl AttrValue {
    /// Returns the text, if this is a text attribute.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Ordered HTML attributes.
pub type Attrs = BTreeMap<String, AttrValue>;

/// Enumerates the built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    /// A plain `<input>` of some type.
    Input,
    /// `<md-select>`.
    MdSelect,
    /// `<md-select data-multiple>`.
    MdMultiSelect,
    /// `<md-datepicker>`.
    MdDatePicker,
    /// Three `<md-select>` elements for year, month and day.
    MdDateSelect,
    /// `<md-checkbox>`.
    MdCheckbox,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "Input",
            Self::MdSelect => "MdSelect",
            Self::MdMultiSelect => "MdMultiSelect",
            Self::MdDatePicker => "MdDatePicker",
            Self::MdDateSelect => "MdDateSelect",
            Self::MdCheckbox => "MdCheckbox",
        };
        write!(f, "{name}")
    }
}

/// One `<md-option>` of a select widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionContext {
    /// The submitted value; a `None` choice renders as `""`.
    pub value: String,
    /// The display label.
    pub label: String,
    /// Whether this option matches the current value.
    pub selected: bool,
    /// Option attributes (`data-selected` when selected).
    pub attrs: Attrs,
    /// Template used to render the option.
    pub template_name: String,
}

/// A run of options, optionally under an `<md-optgroup>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptGroup {
    /// The group label; `None` for ungrouped options.
    pub label: Option<String>,
    /// The options in this group.
    pub options: Vec<OptionContext>,
}

/// Everything a template needs to render one widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetContext {
    /// The field's HTML name.
    pub name: String,
    /// The formatted value, if any.
    pub value: Option<String>,
    /// Final attributes: the widget's own, overridden by per-call ones.
    pub attrs: Attrs,
    /// Template used to render the widget.
    pub template_name: String,
    /// Option groups of select widgets.
    pub optgroups: Vec<OptGroup>,
    /// Nested widgets, rendered before this one.
    pub subwidgets: Vec<WidgetContext>,
    /// Widget-specific template variables.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WidgetContext {
    /// Renders the attributes as ` key="value"` pairs in key order.
    pub fn attrs_html(&self) -> String {
        render_attrs(&self.attrs)
    }
}

/// A trait for form widgets.
///
/// Implementors provide the template name and attribute storage; context
/// building and rendering have defaults that most widgets extend rather
/// than replace.
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the widget type enum variant.
    fn widget_type(&self) -> WidgetType;

    /// Returns the template used to render this widget.
    fn template_name(&self) -> &str;

    /// The widget's own attributes.
    fn attrs(&self) -> &Attrs;

    /// Mutable access to the widget's own attributes.
    fn attrs_mut(&mut self) -> &mut Attrs;

    /// Formats a value for display. `None` renders no value.
    fn format_value(&self, value: &Value) -> Option<String> {
        format_value(value)
    }

    /// Builds the rendering context. `attrs` override the widget's own.
    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        base_context(self, name, value, attrs)
    }

    /// Renders the widget to HTML.
    fn render(&self, name: &str, value: &Value, attrs: &Attrs) -> FormExtraResult<String> {
        render_context(&self.get_context(name, value, attrs))
    }

    /// Extracts this widget's raw value from submitted data.
    ///
    /// Returns `None` if nothing was submitted under `name`.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<serde_json::Value> {
        data.get(name).cloned()
    }

    /// Adds an attribute to the widget's own attributes.
    #[must_use]
    fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self
    where
        Self: Sized,
    {
        self.attrs_mut().insert(key.into(), value.into());
        self
    }
}

/// The context every widget starts from.
pub fn base_context<W: Widget + ?Sized>(
    widget: &W,
    name: &str,
    value: &Value,
    attrs: &Attrs,
) -> WidgetContext {
    let mut merged = widget.attrs().clone();
    merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
    WidgetContext {
        name: name.to_string(),
        value: widget.format_value(value),
        attrs: merged,
        template_name: widget.template_name().to_string(),
        ..WidgetContext::default()
    }
}

/// Default display formatting for values.
///
/// Dates use the configured `date_input_format`; lists are comma-joined.
pub fn format_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Date(d) => {
            let mut out = String::new();
            if write!(out, "{}", d.format(&SETTINGS.get().date_input_format)).is_err() {
                out = d.format("%Y-%m-%d").to_string();
            }
            Some(out)
        }
        Value::List(items) => Some(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Formats attributes as ` key="value"` pairs. `true` flags render bare.
pub fn render_attrs(attrs: &Attrs) -> String {
    let mut out = String::new();
    for (key, value) in attrs {
        match value {
            AttrValue::Text(text) => {
                let _ = write!(out, r#" {key}="{}""#, tera::escape_html(text));
            }
            AttrValue::Flag(true) => {
                let _ = write!(out, " {key}");
            }
            AttrValue::Flag(false) => {}
        }
    }
    out
}
