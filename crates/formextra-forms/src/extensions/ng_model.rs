//! Angular model binding for form widgets.
//!
//! Every widget gets `data-ng-model="<prefix>.<field>"` unless it already
//! declares one. With `handle_ng_init`, each widget context also carries
//! `data-ng-init="<model> = <json>"` so the Angular model starts out with
//! the field's current value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formextra_core::{Value, SETTINGS};

use super::FormExtension;
use crate::fields::FormFieldDef;
use crate::form::BaseForm;
use crate::widgets::{AttrValue, Attrs};

const NG_MODEL: &str = "data-ng-model";
const NG_INIT: &str = "data-ng-init";

/// Converts a field value into the JSON used in `data-ng-init`.
pub type NgInitFormat = Arc<dyn Fn(&Value) -> serde_json::Value + Send + Sync>;

/// Binds widgets to an Angular model object.
#[derive(Clone)]
pub struct NgModelBinding {
    prefix: String,
    handle_ng_init: bool,
    formats: HashMap<String, NgInitFormat>,
}

impl fmt::Debug for NgModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<&String> = self.formats.keys().collect();
        formats.sort();
        f.debug_struct("NgModelBinding")
            .field("prefix", &self.prefix)
            .field("handle_ng_init", &self.handle_ng_init)
            .field("formats", &formats)
            .finish()
    }
}

impl Default for NgModelBinding {
    fn default() -> Self {
        Self {
            prefix: SETTINGS.get().ng_model_prefix.clone(),
            handle_ng_init: false,
            formats: HashMap::new(),
        }
    }
}

impl NgModelBinding {
    /// Binds to the model named by the `ng_model_prefix` setting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds to `prefix` instead.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Emits `data-ng-init` on every widget context.
    #[must_use]
    pub fn handle_ng_init(mut self, enabled: bool) -> Self {
        self.handle_ng_init = enabled;
        self
    }

    /// Formats the `data-ng-init` value of one field.
    #[must_use]
    pub fn format(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Value) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        self.formats.insert(name.into(), Arc::new(f));
        self
    }

    /// The model prefix in use.
    pub fn model_prefix(&self) -> &str {
        &self.prefix
    }

    /// Strings and temporal values go through the widget's formatting;
    /// everything else is serialized as is.
    fn ng_init_json(&self, field: &FormFieldDef, name: &str, value: &Value) -> serde_json::Value {
        if let Some(format) = self.formats.get(name) {
            return format(value);
        }
        match value {
            Value::String(_) | Value::Date(_) | Value::DateTime(_) | Value::Time(_) => field
                .widget
                .format_value(value)
                .map_or(serde_json::Value::Null, serde_json::Value::String),
            other => other.to_json(),
        }
    }
}

impl FormExtension for NgModelBinding {
    fn configure(&self, form: &mut BaseForm) {
        for field in form.fields_mut() {
            let model = format!("{}.{}", self.prefix, field.name);
            field
                .widget
                .attrs_mut()
                .entry(NG_MODEL.to_string())
                .or_insert(AttrValue::Text(model));
        }
    }

    fn adjust_attrs(
        &self,
        _form: &BaseForm,
        field: &FormFieldDef,
        name: &str,
        value: &Value,
        attrs: &mut Attrs,
    ) {
        if !self.handle_ng_init {
            return;
        }
        let model = field
            .widget
            .attrs()
            .get(NG_MODEL)
            .or_else(|| attrs.get(NG_MODEL))
            .and_then(AttrValue::as_text)
            .map(str::to_string);
        let Some(model) = model else {
            tracing::warn!(field = name, "no data-ng-model to initialize");
            return;
        };
        let json = self.ng_init_json(field, name, value);
        attrs.insert(NG_INIT.to_string(), AttrValue::Text(format!("{model} = {json}")));
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::fields::FieldType;
    use crate::form::Form;
    use crate::widgets::Widget;

    fn fields() -> Vec<FormFieldDef> {
        vec![
            FormFieldDef::new("name1", FieldType::char()).required(false),
            FormFieldDef::new("name2", FieldType::char()).required(false),
            FormFieldDef::new("number", FieldType::integer()).required(false),
        ]
    }

    fn model_of(form: &BaseForm, name: &str) -> Option<AttrValue> {
        form.field(name).and_then(|f| f.widget.attrs().get(NG_MODEL).cloned())
    }

    #[test]
    fn test_default_prefix() {
        let form = BaseForm::new(fields()).with_extension(NgModelBinding::new());
        for field in form.fields() {
            assert_eq!(
                model_of(&form, &field.name),
                Some(AttrValue::Text(format!("model.{}", field.name)))
            );
        }
    }

    #[test]
    fn test_custom_prefix() {
        let binding = NgModelBinding::new().prefix("pwn");
        assert_eq!(binding.model_prefix(), "pwn");
        let form = BaseForm::new(fields()).with_extension(binding);
        assert_eq!(model_of(&form, "number"), Some(AttrValue::from("pwn.number")));
    }

    #[test]
    fn test_existing_model_kept() {
        let field = FormFieldDef::new("q", FieldType::char())
            .widget(crate::widgets::Input::text().with_attr(NG_MODEL, "ctrl.query"));
        let form = BaseForm::new(vec![field]).with_extension(NgModelBinding::new());
        assert_eq!(model_of(&form, "q"), Some(AttrValue::from("ctrl.query")));
    }

    #[test]
    fn test_no_ng_init_by_default() {
        let form = BaseForm::new(fields()).with_extension(NgModelBinding::new());
        let ctx = form.widget_context("name1", &Value::from("test"), &Attrs::new()).unwrap();
        assert!(!ctx.attrs.contains_key(NG_INIT));
    }

    #[test]
    fn test_ng_init_values() {
        let mut all = fields();
        all.push(FormFieldDef::new("name3", FieldType::char()).required(false));
        all.push(FormFieldDef::new("date", FieldType::DateTime).required(false));
        let form = BaseForm::new(all).with_extension(
            NgModelBinding::new()
                .handle_ng_init(true)
                .format("name3", |v| serde_json::json!(format!("wrapped {v}"))),
        );

        let init = |name: &str, value: Value| {
            form.widget_context(name, &value, &Attrs::new()).unwrap().attrs[NG_INIT].clone()
        };

        assert_eq!(
            init("name1", Value::from("Test Value name1")),
            AttrValue::from(r#"model.name1 = "Test Value name1""#)
        );
        assert_eq!(init("number", Value::Int(7)), AttrValue::from("model.number = 7"));
        assert_eq!(init("number", Value::Null), AttrValue::from("model.number = null"));
        assert_eq!(
            init("name3", Value::from("x")),
            AttrValue::from(r#"model.name3 = "wrapped x""#)
        );
        let when = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            init("date", Value::DateTime(when)),
            AttrValue::from(r#"model.date = "2024-01-15T10:30:00""#)
        );
    }

    #[test]
    fn test_ng_init_rendered_escaped() {
        let form = BaseForm::new(fields()).with_extension(NgModelBinding::new().handle_ng_init(true));
        let ctx = form.widget_context("name1", &Value::from("hi"), &Attrs::new()).unwrap();
        assert!(ctx
            .attrs_html()
            .contains(r#"data-ng-init="model.name1 = &quot;hi&quot;""#));
    }
}
