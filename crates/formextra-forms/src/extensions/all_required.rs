//! Makes every field required unless listed as optional.

use std::collections::HashSet;

use super::FormExtension;
use crate::form::BaseForm;

/// Sets `required` on every field not named optional.
///
/// Optional fields keep whatever `required` flag they were declared with.
///
/// # Examples
///
/// ```
/// use formextra_forms::extensions::AllRequired;
/// use formextra_forms::fields::{FieldType, FormFieldDef};
/// use formextra_forms::form::{BaseForm, Form};
///
/// let form = BaseForm::new(vec![
///     FormFieldDef::new("name", FieldType::char()).required(false),
///     FormFieldDef::new("nickname", FieldType::char()).required(false),
/// ])
/// .with_extension(AllRequired::new().optional(["nickname"]));
///
/// assert!(form.fields()[0].required);
/// assert!(!form.fields()[1].required);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllRequired {
    optional: HashSet<String>,
}

impl AllRequired {
    /// Requires every field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempts the named fields.
    #[must_use]
    pub fn optional<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.optional.extend(names.into_iter().map(Into::into));
        self
    }
}

impl FormExtension for AllRequired {
    fn configure(&self, form: &mut BaseForm) {
        for field in form.fields_mut() {
            if !self.optional.contains(&field.name) {
                field.required = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldType, FormFieldDef};
    use crate::form::Form;

    fn fields() -> Vec<FormFieldDef> {
        vec![
            FormFieldDef::new("name1", FieldType::char()).required(false),
            FormFieldDef::new("name2", FieldType::char()).required(false),
            FormFieldDef::new("name3", FieldType::char()).required(false),
            FormFieldDef::new("number", FieldType::integer()).required(false),
        ]
    }

    #[test]
    fn test_all_fields_required() {
        let form = BaseForm::new(fields()).with_extension(AllRequired::new());
        assert!(form.fields().iter().all(|f| f.required));
    }

    #[test]
    fn test_optional_fields_untouched() {
        let form = BaseForm::new(fields()).with_extension(AllRequired::new().optional(["name2", "name3"]));
        for field in form.fields() {
            let optional = field.name == "name2" || field.name == "name3";
            assert_eq!(field.required, !optional, "{}", field.name);
        }
    }

    #[test]
    fn test_optional_keeps_declared_required() {
        let form = BaseForm::new(vec![FormFieldDef::new("a", FieldType::char())])
            .with_extension(AllRequired::new().optional(["a"]));
        assert!(form.fields()[0].required);
    }
}
