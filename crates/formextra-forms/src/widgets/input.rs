//! Plain `<input>` widgets used as field defaults.

use formextra_core::Value;

use super::{base_context, Attrs, Widget, WidgetContext, WidgetType};

/// An `<input>` element of a given `type`.
#[derive(Debug, Clone)]
pub struct Input {
    input_type: String,
    attrs: Attrs,
}

impl Input {
    /// An input with the given HTML `type`.
    pub fn new(input_type: impl Into<String>) -> Self {
        Self {
            input_type: input_type.into(),
            attrs: Attrs::new(),
        }
    }

    /// `<input type="text">`.
    pub fn text() -> Self {
        Self::new("text")
    }

    /// `<input type="number">`.
    pub fn number() -> Self {
        Self::new("number")
    }

    /// The HTML `type` attribute.
    pub fn input_type(&self) -> &str {
        &self.input_type
    }
}

impl Widget for Input {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Input
    }

    fn template_name(&self) -> &str {
        "input.html"
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        let mut ctx = base_context(self, name, value, attrs);
        ctx.extra
            .insert("input_type".into(), self.input_type.clone().into());
        ctx
    }
}
