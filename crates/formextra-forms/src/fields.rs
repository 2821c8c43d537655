//! Form field definitions and type-level conversion.
//!
//! Each [`FormFieldDef`] describes a single form field: its type, widget,
//! validators and messages. Cleaning a raw submitted value runs three
//! stages, stopping at the first that fails:
//!
//! 1. [`FormFieldDef::to_python`] converts raw JSON into a [`Value`]
//! 2. [`FormFieldDef::validate`] enforces `required`
//! 3. [`FormFieldDef::run_validators`] runs the type's implicit validators
//!    followed by any custom ones, collecting every failure

use std::collections::HashMap;

use chrono::Datelike;
use formextra_core::{ValidationError, Value, SETTINGS};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::list_field::ListField;
use crate::validators::{
    EmailValidator, MaxLengthValidator, MaxValueValidator, MinLengthValidator,
    MinValueValidator, RegexValidator, SlugValidator, UrlValidator, Validator,
};
use crate::widgets::{Choice, Input, MdCheckbox, MdMultiSelect, MdSelect, Widget};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Years a date may carry.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// A trailing `.`, `.0`, `.00`... on an integer input.
static ZERO_FRACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.0*\s*$").expect("valid zero fraction regex"));

/// Defines the type of a form field, including type-specific parameters.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A character (string) field.
    Char {
        /// Minimum length (characters).
        min_length: Option<usize>,
        /// Maximum length (characters).
        max_length: Option<usize>,
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A floating-point field.
    Float {
        /// Minimum allowed value.
        min_value: Option<f64>,
        /// Maximum allowed value.
        max_value: Option<f64>,
    },
    /// A boolean field.
    Boolean,
    /// A date field.
    Date,
    /// A date-time field.
    DateTime,
    /// A time field.
    Time,
    /// An email address field.
    Email,
    /// A URL field.
    Url,
    /// A UUID field.
    Uuid,
    /// A slug field (letters, numbers, hyphens, underscores).
    Slug,
    /// A single-choice field.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A multiple-choice field; the raw value must be a list.
    MultipleChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A JSON field.
    Json,
    /// A field validated against a regular expression.
    Regex {
        /// The regex pattern string.
        regex: String,
    },
    /// A list of values, each handled by an item field.
    List(ListField),
}

impl FieldType {
    /// An unconstrained, whitespace-stripping character field.
    pub const fn char() -> Self {
        Self::Char {
            min_length: None,
            max_length: None,
            strip: true,
        }
    }

    /// An unbounded integer field.
    pub const fn integer() -> Self {
        Self::Integer {
            min_value: None,
            max_value: None,
        }
    }

    /// Converts a raw submitted value into a typed [`Value`].
    ///
    /// Null and the empty string convert to [`Value::Null`] (an empty list
    /// for list-shaped types). Conversion failures carry code `invalid`
    /// (`invalid_list` for list-shaped types given a non-list).
    ///
    /// Integers accept a zero fractional part (`"10.0"`, `10.0`). Dates and
    /// date/times outside years 1..=9999 are invalid.
    pub fn to_python(&self, raw: &serde_json::Value) -> Result<Value, ValidationError> {
        match self {
            Self::List(list) => list.to_python(Some(raw)).map(Value::List),

            Self::MultipleChoice { .. } if is_blank(raw) => Ok(Value::List(Vec::new())),

            _ if is_blank(raw) => Ok(Value::Null),

            Self::Char { strip, .. } => {
                let s = scalar_string(raw).ok_or_else(|| invalid("Enter a valid value."))?;
                let s = if *strip { s.trim().to_string() } else { s };
                Ok(if s.is_empty() {
                    Value::Null
                } else {
                    Value::String(s)
                })
            }

            Self::Integer { .. } => {
                let parsed = match raw {
                    serde_json::Value::Number(n) => n.as_i64().or_else(|| parse_integer(&n.to_string())),
                    serde_json::Value::String(s) => parse_integer(s),
                    _ => None,
                };
                parsed
                    .map(Value::Int)
                    .ok_or_else(|| invalid("Enter a whole number."))
            }

            Self::Float { .. } => {
                let parsed = match raw {
                    serde_json::Value::Number(n) => n.as_f64(),
                    serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                parsed
                    .filter(|f| f.is_finite())
                    .map(Value::Float)
                    .ok_or_else(|| invalid("Enter a number."))
            }

            Self::Boolean => Ok(Value::Bool(match raw {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::String(s) => {
                    !matches!(s.to_lowercase().as_str(), "false" | "0" | "off" | "no")
                }
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                serde_json::Value::Array(a) => !a.is_empty(),
                serde_json::Value::Object(o) => !o.is_empty(),
                serde_json::Value::Null => false,
            })),

            Self::Date => {
                let s = trimmed_string(raw).ok_or_else(|| invalid("Enter a valid date."))?;
                let format = SETTINGS.get().date_input_format.clone();
                chrono::NaiveDate::parse_from_str(&s, &format)
                    .or_else(|_| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
                    .ok()
                    .filter(|d| YEAR_RANGE.contains(&d.year()))
                    .map(Value::Date)
                    .ok_or_else(|| invalid("Enter a valid date."))
            }

            Self::DateTime => {
                let s = trimmed_string(raw).ok_or_else(|| invalid("Enter a valid date/time."))?;
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(&s, fmt).ok())
                    .filter(|dt| YEAR_RANGE.contains(&dt.year()))
                    .map(Value::DateTime)
                    .ok_or_else(|| invalid("Enter a valid date/time."))
            }

            Self::Time => {
                let s = trimmed_string(raw).ok_or_else(|| invalid("Enter a valid time."))?;
                TIME_FORMATS
                    .iter()
                    .find_map(|fmt| chrono::NaiveTime::parse_from_str(&s, fmt).ok())
                    .map(Value::Time)
                    .ok_or_else(|| invalid("Enter a valid time."))
            }

            Self::Email | Self::Url | Self::Slug | Self::Regex { .. } => trimmed_string(raw)
                .map(Value::String)
                .ok_or_else(|| invalid("Enter a valid value.")),

            Self::Uuid => trimmed_string(raw)
                .and_then(|s| uuid::Uuid::parse_str(&s).ok())
                .map(Value::Uuid)
                .ok_or_else(|| invalid("Enter a valid UUID.")),

            Self::Choice { .. } => scalar_string(raw)
                .map(Value::String)
                .ok_or_else(|| invalid("Enter a valid value.")),

            Self::MultipleChoice { .. } => match raw {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        scalar_string(item)
                            .map(Value::String)
                            .ok_or_else(|| invalid("Enter a valid value."))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                _ => Err(ValidationError::new("Enter a list of values.", "invalid_list")),
            },

            Self::Json => match raw {
                serde_json::Value::String(s) => serde_json::from_str(s)
                    .map(Value::Json)
                    .map_err(|_| invalid("Enter a valid JSON.")),
                other => Ok(Value::Json(other.clone())),
            },
        }
    }

    /// Runs the validators implied by this type's parameters.
    ///
    /// Returns every failure; an empty vector means the value passed.
    #[allow(clippy::cast_precision_loss)]
    pub fn type_validators(&self, value: &Value) -> Vec<ValidationError> {
        let mut validators: Vec<Box<dyn Validator>> = Vec::new();
        let mut errors = Vec::new();

        match self {
            Self::Char {
                min_length,
                max_length,
                ..
            } => {
                if let Some(min) = min_length {
                    validators.push(Box::new(MinLengthValidator::new(*min)));
                }
                if let Some(max) = max_length {
                    validators.push(Box::new(MaxLengthValidator::new(*max)));
                }
            }
            Self::Integer {
                min_value,
                max_value,
            } => {
                if let Some(min) = min_value {
                    validators.push(Box::new(MinValueValidator::new(*min as f64)));
                }
                if let Some(max) = max_value {
                    validators.push(Box::new(MaxValueValidator::new(*max as f64)));
                }
            }
            Self::Float {
                min_value,
                max_value,
            } => {
                if let Some(min) = min_value {
                    validators.push(Box::new(MinValueValidator::new(*min)));
                }
                if let Some(max) = max_value {
                    validators.push(Box::new(MaxValueValidator::new(*max)));
                }
            }
            Self::Email => validators.push(Box::new(EmailValidator)),
            Self::Url => validators.push(Box::new(UrlValidator)),
            Self::Slug => validators.push(Box::new(SlugValidator)),
            Self::Regex { regex } => match RegexValidator::new(regex) {
                Ok(v) => validators.push(Box::new(v)),
                Err(e) => errors.push(ValidationError::new(format!("Invalid regex: {e}"), "invalid")),
            },
            Self::Choice { choices } => {
                if let Value::String(s) = value {
                    check_choice(choices, s, &mut errors);
                }
            }
            Self::MultipleChoice { choices } => {
                for item in value.as_list().unwrap_or_default() {
                    if let Value::String(s) = item {
                        check_choice(choices, s, &mut errors);
                    }
                }
            }
            Self::List(list) => {
                if let Err(e) = list.run_validators(value.as_list().unwrap_or_default()) {
                    errors.push(e);
                }
            }
            Self::Boolean | Self::Date | Self::DateTime | Self::Time | Self::Uuid | Self::Json => {}
        }

        errors.extend(validators.iter().filter_map(|v| v.validate(value).err()));
        errors
    }
}

fn check_choice(choices: &[(String, String)], value: &str, errors: &mut Vec<ValidationError>) {
    if !choices.iter().any(|(v, _)| v == value) {
        errors.push(
            ValidationError::new(
                format!("Select a valid choice. {value} is not one of the available choices."),
                "invalid_choice",
            )
            .with_param("value", value),
        );
    }
}

fn invalid(message: &str) -> ValidationError {
    ValidationError::new(message, "invalid")
}

fn is_blank(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn scalar_string(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn trimmed_string(raw: &serde_json::Value) -> Option<String> {
    scalar_string(raw).map(|s| s.trim().to_string())
}

fn parse_integer(s: &str) -> Option<i64> {
    ZERO_FRACTION_RE.replace(s.trim(), "").parse().ok()
}

/// Folds a list of failures into one result.
pub(crate) fn collect_errors(mut errors: Vec<ValidationError>) -> Result<(), ValidationError> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::from_list(errors, "invalid")),
    }
}

/// Complete definition of a form field.
#[derive(Debug)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute).
    pub name: String,
    /// The field type, controlling conversion and implicit validation.
    pub field_type: FieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Value used when an optional field is submitted empty.
    pub initial: Option<Value>,
    /// Help text displayed alongside the field.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget used for rendering.
    pub widget: Box<dyn Widget>,
    /// Additional validators applied after the type's own.
    pub validators: Vec<Box<dyn Validator>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the field is disabled (rendered but not editable).
    pub disabled: bool,
}

impl FormFieldDef {
    /// Creates a new `FormFieldDef` with sensible defaults.
    ///
    /// The field is required, uses the default widget for its type, and has
    /// no validators beyond the type-level ones.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        let widget = default_widget(&field_type);
        Self {
            name,
            field_type,
            required: true,
            initial: None,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
        }
    }

    /// Sets whether this field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the widget.
    #[must_use]
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widget = Box::new(widget);
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Sets a custom error message for a given code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Sets whether this field is disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Converts a raw value, applying any custom message for the failure code.
    pub fn to_python(&self, raw: &serde_json::Value) -> Result<Value, ValidationError> {
        self.field_type
            .to_python(raw)
            .map_err(|err| self.with_custom_message(err))
    }

    /// Enforces `required`. A `false` boolean counts as missing.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let missing = value.is_empty()
            || (matches!(self.field_type, FieldType::Boolean) && *value == Value::Bool(false));
        if self.required && missing {
            return Err(self.with_custom_message(ValidationError::new(
                "This field is required.",
                "required",
            )));
        }
        Ok(())
    }

    /// Runs implicit and custom validators, reporting every failure.
    ///
    /// Empty values are not validated.
    pub fn run_validators(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }
        let mut errors = self.field_type.type_validators(value);
        errors.extend(self.validators.iter().filter_map(|v| v.validate(value).err()));
        collect_errors(errors).map_err(|err| self.with_custom_message(err))
    }

    /// Runs the full cleaning pipeline on a raw submitted value.
    pub fn clean(&self, raw: Option<&serde_json::Value>) -> Result<Value, ValidationError> {
        let raw = raw.unwrap_or(&serde_json::Value::Null);
        let mut value = self.to_python(raw)?;
        if value.is_empty() && !self.required {
            if let Some(initial) = &self.initial {
                value = initial.clone();
            }
        }
        self.validate(&value)?;
        self.run_validators(&value)?;
        Ok(value)
    }

    fn with_custom_message(&self, mut err: ValidationError) -> ValidationError {
        if !err.is_list() {
            if let Some(msg) = self.error_messages.get(&err.code) {
                err.message.clone_from(msg);
            }
        }
        err
    }
}

/// Returns the default widget for a given field type.
pub fn default_widget(field_type: &FieldType) -> Box<dyn Widget> {
    match field_type {
        FieldType::Integer { .. } | FieldType::Float { .. } => Box::new(Input::number()),
        FieldType::Boolean => Box::new(MdCheckbox::default()),
        FieldType::Date => Box::new(Input::new("date")),
        FieldType::DateTime => Box::new(Input::new("datetime-local")),
        FieldType::Time => Box::new(Input::new("time")),
        FieldType::Email => Box::new(Input::new("email")),
        FieldType::Url => Box::new(Input::new("url")),
        FieldType::Choice { choices } => Box::new(MdSelect::new(to_choices(choices))),
        FieldType::MultipleChoice { choices } => Box::new(MdMultiSelect::new(to_choices(choices))),
        FieldType::Char { .. }
        | FieldType::Uuid
        | FieldType::Slug
        | FieldType::Json
        | FieldType::Regex { .. }
        | FieldType::List(_) => Box::new(Input::text()),
    }
}

fn to_choices(choices: &[(String, String)]) -> Vec<Choice> {
    choices
        .iter()
        .map(|(value, label)| Choice::option(value.as_str(), label.as_str()))
        .collect()
}
