//! Widget attributes declared on the form rather than on each widget.
//!
//! Common attributes apply to every field; per-field attributes are applied
//! after them and win on conflict. Dynamic sources are evaluated each time a
//! widget context is built and never stored on the widget.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use formextra_core::Value;

use super::FormExtension;
use crate::fields::FormFieldDef;
use crate::form::BaseForm;
use crate::widgets::{AttrValue, Attrs};

/// Computes an attribute from `(form, field, name, value)`.
pub type AttrFn = Arc<dyn Fn(&BaseForm, &FormFieldDef, &str, &Value) -> AttrValue + Send + Sync>;

/// Where an attribute value comes from.
#[derive(Clone)]
pub enum AttrSource {
    /// A fixed value.
    Static(AttrValue),
    /// A value computed per widget context.
    Dynamic(AttrFn),
}

impl AttrSource {
    /// A computed attribute.
    pub fn dynamic(
        f: impl Fn(&BaseForm, &FormFieldDef, &str, &Value) -> AttrValue + Send + Sync + 'static,
    ) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    fn evaluate(&self, form: &BaseForm, field: &FormFieldDef, name: &str, value: &Value) -> AttrValue {
        match self {
            Self::Static(v) => v.clone(),
            Self::Dynamic(f) => f(form, field, name, value),
        }
    }
}

impl fmt::Debug for AttrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<AttrValue> for AttrSource {
    fn from(v: AttrValue) -> Self {
        Self::Static(v)
    }
}

impl From<&str> for AttrSource {
    fn from(s: &str) -> Self {
        Self::Static(s.into())
    }
}

impl From<String> for AttrSource {
    fn from(s: String) -> Self {
        Self::Static(s.into())
    }
}

impl From<bool> for AttrSource {
    fn from(b: bool) -> Self {
        Self::Static(b.into())
    }
}

/// Adds common and per-field attributes to widget contexts.
///
/// # Examples
///
/// ```
/// use formextra_core::Value;
/// use formextra_forms::extensions::{AttrSource, FieldAttributes};
/// use formextra_forms::fields::{FieldType, FormFieldDef};
/// use formextra_forms::form::BaseForm;
/// use formextra_forms::widgets::{AttrValue, Attrs};
///
/// let form = BaseForm::new(vec![FormFieldDef::new("q", FieldType::char())]).with_extension(
///     FieldAttributes::new()
///         .common("data-on-load", "init()")
///         .field("q", "data-echo", AttrSource::dynamic(|_, _, _, v| AttrValue::Text(v.to_string()))),
/// );
/// let ctx = form.widget_context("q", &Value::from("hi"), &Attrs::new()).unwrap();
/// assert_eq!(ctx.attrs["data-echo"], AttrValue::from("hi"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldAttributes {
    common: Vec<(String, AttrSource)>,
    per_field: HashMap<String, Vec<(String, AttrSource)>>,
}

impl FieldAttributes {
    /// No attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute to every field.
    #[must_use]
    pub fn common(mut self, key: impl Into<String>, source: impl Into<AttrSource>) -> Self {
        self.common.push((key.into(), source.into()));
        self
    }

    /// Adds an attribute to one field.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<AttrSource>,
    ) -> Self {
        self.per_field
            .entry(name.into())
            .or_default()
            .push((key.into(), source.into()));
        self
    }
}

impl FormExtension for FieldAttributes {
    fn adjust_attrs(
        &self,
        form: &BaseForm,
        field: &FormFieldDef,
        name: &str,
        value: &Value,
        attrs: &mut Attrs,
    ) {
        let specific = self.per_field.get(name).map_or(&[][..], Vec::as_slice);
        for (key, source) in self.common.iter().chain(specific) {
            attrs.insert(key.clone(), source.evaluate(form, field, name, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

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

    #[test]
    fn test_attributes_not_stored_on_widgets() {
        let form = BaseForm::new(fields()).with_extension(
            FieldAttributes::new()
                .common("data-on-load", "test()")
                .field("name1", "data-test", "test1"),
        );
        for field in form.fields() {
            assert!(!field.widget.attrs().contains_key("data-on-load"));
            assert!(!field.widget.attrs().contains_key("data-test"));
        }
    }

    #[test]
    fn test_attributes_evaluated_per_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let counter = Arc::clone(&calls);
        let recorder = Arc::clone(&seen);

        let form = BaseForm::new(fields()).with_extension(
            FieldAttributes::new()
                .common("data-on-load", "test()")
                .common(
                    "data-on-delay",
                    AttrSource::dynamic(move |_, _, _, _| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        AttrValue::from("hello()")
                    }),
                )
                .field("name1", "data-test", "test1")
                .field(
                    "name2",
                    "data-test",
                    AttrSource::dynamic(move |_, field, name, value| {
                        recorder
                            .lock()
                            .unwrap()
                            .push((field.name.clone(), name.to_string(), value.clone()));
                        AttrValue::from("test2")
                    }),
                ),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        for name in ["name1", "name2", "number"] {
            let value = Value::String(format!("test_{name}"));
            let attrs = form.widget_context(name, &value, &Attrs::new()).unwrap().attrs;
            assert_eq!(attrs["data-on-load"], AttrValue::from("test()"));
            assert_eq!(attrs["data-on-delay"], AttrValue::from("hello()"));
            match name {
                "name1" => assert_eq!(attrs["data-test"], AttrValue::from("test1")),
                "name2" => assert_eq!(attrs["data-test"], AttrValue::from("test2")),
                _ => assert!(!attrs.contains_key("data-test")),
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(
                "name2".to_string(),
                "name2".to_string(),
                Value::String("test_name2".into())
            )]
        );
    }

    #[test]
    fn test_field_attribute_overrides_common() {
        let form = BaseForm::new(fields()).with_extension(
            FieldAttributes::new()
                .common("class", "wide")
                .field("number", "class", "narrow"),
        );
        let number = form.widget_context("number", &Value::Null, &Attrs::new()).unwrap();
        let name = form.widget_context("name1", &Value::Null, &Attrs::new()).unwrap();
        assert_eq!(number.attrs["class"], AttrValue::from("narrow"));
        assert_eq!(name.attrs["class"], AttrValue::from("wide"));
    }

    #[test]
    fn test_attr_source_debug() {
        assert_eq!(format!("{:?}", AttrSource::from("x")), r#"Static(Text("x"))"#);
        assert_eq!(
            format!("{:?}", AttrSource::dynamic(|_, _, _, _| AttrValue::Flag(true))),
            "Dynamic(..)"
        );
    }
}
