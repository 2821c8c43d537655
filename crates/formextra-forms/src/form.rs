//! Form trait and `BaseForm` implementation.
//!
//! The [`Form`] trait covers binding submitted data, validating it and
//! exposing cleaned values and per-field errors. [`BaseForm`] implements it
//! over a list of field definitions and is where [`FormExtension`]s are
//! installed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formextra_core::logging::form_span;
use formextra_core::{FormExtraError, FormExtraResult, Value};

use crate::extensions::FormExtension;
use crate::fields::FormFieldDef;
use crate::validation;
use crate::widgets::{render_context, AttrValue, Attrs, WidgetContext};

/// Submitted form data, keyed by HTML field name.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// Errors keyed by field name. Form-level errors use `__all__`.
pub type FormErrors = HashMap<String, Vec<String>>;

/// Cross-field validation over cleaned data.
pub type CleanFn = Arc<dyn Fn(&HashMap<String, Value>) -> Result<(), FormErrors> + Send + Sync>;

/// The core form trait.
pub trait Form: Send + Sync {
    /// Returns the form's field definitions.
    fn fields(&self) -> &[FormFieldDef];

    /// Returns the initial (default) values for fields.
    fn initial(&self) -> &HashMap<String, Value>;

    /// Returns the form prefix (for namespacing multiple forms on one page).
    fn prefix(&self) -> Option<&str>;

    /// Binds submitted data to this form.
    fn bind(&mut self, data: &FormData);

    /// Returns `true` if this form has been bound to data.
    fn is_bound(&self) -> bool;

    /// Validates the form. Returns `true` if valid.
    ///
    /// After calling this, `errors()` and `cleaned_data()` are populated.
    fn is_valid(&mut self) -> bool;

    /// Returns per-field validation errors.
    fn errors(&self) -> &FormErrors;

    /// Returns the cleaned (validated and coerced) data.
    fn cleaned_data(&self) -> &HashMap<String, Value>;

    /// Cross-field validation hook, run after every field has been cleaned.
    fn clean(&self) -> Result<(), FormErrors> {
        Ok(())
    }
}

/// A general-purpose form implementation.
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial_data: HashMap<String, Value>,
    prefix: Option<String>,
    bound: bool,
    raw_data: HashMap<String, serde_json::Value>,
    errors: FormErrors,
    cleaned_data: HashMap<String, Value>,
    extensions: Vec<Arc<dyn FormExtension>>,
    clean_fn: Option<CleanFn>,
}

impl fmt::Debug for BaseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseForm")
            .field("fields", &self.field_defs)
            .field("prefix", &self.prefix)
            .field("bound", &self.bound)
            .field("errors", &self.errors)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl BaseForm {
    /// Creates a new `BaseForm` with the given field definitions.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            initial_data: HashMap::new(),
            prefix: None,
            bound: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
            extensions: Vec::new(),
            clean_fn: None,
        }
    }

    /// Sets initial (default) values for fields.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial_data = initial;
        self
    }

    /// Sets the form prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Installs an extension. Its `configure` step runs immediately.
    #[must_use]
    pub fn with_extension(mut self, extension: impl FormExtension + 'static) -> Self {
        extension.configure(&mut self);
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Sets a cross-field validation function.
    #[must_use]
    pub fn with_clean(
        mut self,
        clean: impl Fn(&HashMap<String, Value>) -> Result<(), FormErrors> + Send + Sync + 'static,
    ) -> Self {
        self.clean_fn = Some(Arc::new(clean));
        self
    }

    /// Mutable access to all field definitions.
    pub fn fields_mut(&mut self) -> &mut [FormFieldDef] {
        &mut self.field_defs
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.field_defs.iter().find(|f| f.name == name)
    }

    /// Looks up a field by name for modification.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormFieldDef> {
        self.field_defs.iter_mut().find(|f| f.name == name)
    }

    /// The installed extensions, in installation order.
    pub fn extensions(&self) -> &[Arc<dyn FormExtension>] {
        &self.extensions
    }

    /// The HTML name of a field, including the prefix.
    pub fn html_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{p}-{name}"),
            None => name.to_string(),
        }
    }

    /// The value to display for a field: submitted data when bound,
    /// otherwise the form's or the field's initial value.
    pub fn field_value(&self, name: &str) -> Value {
        if self.bound {
            return self.raw_data.get(name).map_or(Value::Null, raw_to_value);
        }
        self.initial_data
            .get(name)
            .or_else(|| self.field(name).and_then(|f| f.initial.as_ref()))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Builds the widget context for a field.
    ///
    /// Installed extensions adjust `attrs` in order before the widget sees
    /// them; disabled fields also get a bare `disabled` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`FormExtraError::ImproperlyConfigured`] for an unknown field.
    pub fn widget_context(
        &self,
        name: &str,
        value: &Value,
        attrs: &Attrs,
    ) -> FormExtraResult<WidgetContext> {
        let field = self
            .field(name)
            .ok_or_else(|| FormExtraError::ImproperlyConfigured(format!("Unknown field '{name}'")))?;

        let mut attrs = attrs.clone();
        for extension in &self.extensions {
            extension.adjust_attrs(self, field, name, value, &mut attrs);
        }
        if field.disabled {
            attrs.insert("disabled".into(), AttrValue::Flag(true));
        }
        Ok(field.widget.get_context(&self.html_name(name), value, &attrs))
    }

    /// Renders a field's widget with its current value.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown field or a template failure.
    pub fn render_field(&self, name: &str) -> FormExtraResult<String> {
        let value = self.field_value(name);
        render_context(&self.widget_context(name, &value, &Attrs::new())?)
    }

    /// Returns the non-field (form-level) errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get("__all__").map_or(&[], Vec::as_slice)
    }
}

impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn initial(&self) -> &HashMap<String, Value> {
        &self.initial_data
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn bind(&mut self, data: &FormData) {
        self.bound = true;
        self.raw_data.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let html_name = self.html_name(&field.name);
            let value = field
                .widget
                .value_from_data(data, &html_name)
                .unwrap_or(serde_json::Value::Null);
            self.raw_data.insert(field.name.clone(), value);
        }
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }

        let span = form_span(self.prefix.as_deref().unwrap_or("form"), self.field_defs.len());
        let _guard = span.enter();

        self.errors.clear();
        self.cleaned_data.clear();

        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &mut self.cleaned_data,
            &mut self.errors,
        );

        if let Err(form_errors) = self.clean() {
            for (key, msgs) in form_errors {
                self.errors.entry(key).or_default().extend(msgs);
            }
        }

        tracing::debug!(
            valid = self.errors.is_empty(),
            invalid_fields = self.errors.len(),
            "form validated"
        );
        self.errors.is_empty()
    }

    fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.cleaned_data
    }

    fn clean(&self) -> Result<(), FormErrors> {
        match &self.clean_fn {
            Some(clean) if self.errors.is_empty() => clean(&self.cleaned_data),
            _ => Ok(()),
        }
    }
}

/// Converts submitted JSON into a display value.
fn raw_to_value(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(raw_to_value).collect()),
        serde_json::Value::Object(_) => Value::Json(raw.clone()),
    }
}
