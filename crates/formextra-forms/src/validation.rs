//! Validation pipeline for form processing.
//!
//! 1. Field-level validation: each field's `clean` (conversion, required
//!    check, validators)
//! 2. Form-level cross-field validation through [`Form::clean`]
//!
//! Errors accumulate rather than short-circuiting, so all validation
//! issues are reported at once.

use std::collections::HashMap;

use formextra_core::Value;

use crate::fields::FormFieldDef;
use crate::form::{Form, FormErrors};

/// Performs field-level validation for all fields.
///
/// Each field's raw value is cleaned; successes land in `cleaned_data` and
/// failures in `errors` as flattened messages. Disabled fields take their
/// initial value and are not validated.
pub fn clean_fields(
    field_defs: &[FormFieldDef],
    raw_data: &HashMap<String, serde_json::Value>,
    cleaned_data: &mut HashMap<String, Value>,
    errors: &mut FormErrors,
) {
    for field in field_defs {
        if field.disabled {
            if let Some(initial) = &field.initial {
                cleaned_data.insert(field.name.clone(), initial.clone());
            }
            continue;
        }

        match field.clean(raw_data.get(&field.name)) {
            Ok(value) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Err(err) => {
                tracing::trace!(field = %field.name, code = %err.code, "field failed validation");
                errors.insert(field.name.clone(), err.messages());
            }
        }
    }
}

/// Performs the full validation pipeline: field-level then form-level.
///
/// # Errors
///
/// Returns `(field_name, messages)` pairs sorted by field name if any
/// validation failed.
pub fn full_clean(form: &mut dyn Form) -> Result<(), Vec<(String, Vec<String>)>> {
    if form.is_valid() {
        Ok(())
    } else {
        let mut errors: Vec<(String, Vec<String>)> = form
            .errors()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        errors.sort_by(|a, b| a.0.cmp(&b.0));
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fields::FieldType;
    use crate::form::{BaseForm, FormData};
    use crate::list_field::ListField;

    #[test]
    fn test_clean_fields_valid() {
        let fields = vec![
            FormFieldDef::new("name", FieldType::char()),
            FormFieldDef::new(
                "age",
                FieldType::Integer {
                    min_value: Some(0),
                    max_value: None,
                },
            ),
        ];
        let mut raw = HashMap::new();
        raw.insert("name".to_string(), json!("Alice"));
        raw.insert("age".to_string(), json!("30"));

        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(&fields, &raw, &mut cleaned, &mut errors);

        assert!(errors.is_empty());
        assert_eq!(cleaned.get("name"), Some(&Value::String("Alice".into())));
        assert_eq!(cleaned.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_clean_fields_list_errors_flatten() {
        let fields = vec![FormFieldDef::new(
            "scores",
            FieldType::List(ListField::with_field(FieldType::integer())),
        )];
        let mut raw = HashMap::new();
        raw.insert("scores".to_string(), json!([1, "x", "y"]));

        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(&fields, &raw, &mut cleaned, &mut errors);

        assert_eq!(
            errors["scores"],
            vec!["Index 1: Enter a whole number.", "Index 2: Enter a whole number."]
        );
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_clean_fields_disabled_uses_initial() {
        let fields = vec![FormFieldDef::new("status", FieldType::char())
            .disabled(true)
            .initial(Value::String("draft".into()))];
        let mut raw = HashMap::new();
        raw.insert("status".to_string(), json!("published"));

        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(&fields, &raw, &mut cleaned, &mut errors);

        assert_eq!(cleaned.get("status"), Some(&Value::String("draft".into())));
    }

    #[test]
    fn test_full_clean_sorted_errors() {
        let mut form = BaseForm::new(vec![
            FormFieldDef::new("b", FieldType::char()),
            FormFieldDef::new("a", FieldType::char()),
        ]);
        form.bind(&FormData::new());
        let errors = full_clean(&mut form).unwrap_err();
        let names: Vec<&str> = errors.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(errors[0].1, vec!["This field is required."]);
    }

    #[test]
    fn test_full_clean_ok() {
        let mut form = BaseForm::new(vec![FormFieldDef::new("a", FieldType::char())]);
        let mut data = FormData::new();
        data.insert("a".into(), json!("x"));
        form.bind(&data);
        assert!(full_clean(&mut form).is_ok());
    }
}
