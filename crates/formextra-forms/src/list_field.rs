//! A field that accepts a list of values and validates each item.
//!
//! Items are handled by one or more item fields. With a single item field
//! every element uses it; with several, element `i` uses field
//! `i % fields.len()`, so `[name, age]` validates `["alice", 30, "bob", 41]`
//! as alternating name/age pairs.
//!
//! Both passes report every failing item at once. Each failure is prefixed
//! with the item's position, e.g. `Index 1: Enter a whole number.`, and the
//! validation pass only runs when conversion succeeded for every item.

use std::collections::HashMap;
use std::sync::Arc;

use formextra_core::{FormExtraError, FormExtraResult, ValidationError, Value};

use crate::fields::{collect_errors, FieldType, FormFieldDef};

const INVALID_LIST: &str = "Enter a list of values.";

/// One stage-able field used for the items of a [`ListField`].
///
/// Implemented by [`FieldType`] (implicit validators only) and by
/// [`FormFieldDef`] (implicit plus custom validators and messages).
pub trait ItemField: Send + Sync + std::fmt::Debug {
    /// Converts one raw item.
    fn normalize(&self, raw: &serde_json::Value) -> Result<Value, ValidationError>;

    /// Validates one converted item.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

impl ItemField for FieldType {
    fn normalize(&self, raw: &serde_json::Value) -> Result<Value, ValidationError> {
        self.to_python(raw)
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }
        collect_errors(self.type_validators(value))
    }
}

impl ItemField for FormFieldDef {
    fn normalize(&self, raw: &serde_json::Value) -> Result<Value, ValidationError> {
        self.to_python(raw)
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.run_validators(value)
    }
}

/// The item field(s) of a [`ListField`].
#[derive(Debug, Clone)]
pub enum ItemFields {
    /// Every item uses the same field.
    Single(Arc<dyn ItemField>),
    /// Item `i` uses field `i % len`. [`ListField`] rejects an empty cycle.
    Cycle(Vec<Arc<dyn ItemField>>),
}

impl ItemFields {
    /// Returns the field responsible for the item at `index`, or `None`
    /// for an empty cycle.
    pub fn field_for(&self, index: usize) -> Option<&dyn ItemField> {
        match self {
            Self::Single(field) => Some(field.as_ref()),
            Self::Cycle(fields) => index
                .checked_rem(fields.len())
                .and_then(|i| fields.get(i))
                .map(AsRef::as_ref),
        }
    }

    /// The item fields in item order, repeating forever. Empty for an empty
    /// cycle.
    fn cycle(&self) -> Box<dyn Iterator<Item = &dyn ItemField> + '_> {
        match self {
            Self::Single(field) => Box::new(std::iter::repeat(field.as_ref())),
            Self::Cycle(fields) => Box::new(fields.iter().map(AsRef::as_ref).cycle()),
        }
    }

    /// Number of distinct item fields.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Cycle(fields) => fields.len(),
        }
    }

    /// Whether this is an empty cycle.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ItemFields {
    fn default() -> Self {
        Self::Single(Arc::new(FieldType::char()))
    }
}

/// A list-valued field.
///
/// # Examples
///
/// ```
/// use formextra_forms::fields::FieldType;
/// use formextra_forms::list_field::ListField;
/// use serde_json::json;
///
/// let field = ListField::with_field(FieldType::integer());
/// let err = field.clean(Some(&json!([1, "x", 3]))).unwrap_err();
/// assert_eq!(err.messages(), vec!["Index 1: Enter a whole number."]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListField {
    fields: ItemFields,
    error_messages: HashMap<String, String>,
}

impl ListField {
    /// A list of whitespace-stripped strings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A list whose items all use `field`.
    pub fn with_field(field: impl ItemField + 'static) -> Self {
        Self {
            fields: ItemFields::Single(Arc::new(field)),
            error_messages: HashMap::new(),
        }
    }

    /// A list whose items cycle through `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`FormExtraError::ImproperlyConfigured`] if `fields` is empty.
    pub fn with_fields<F>(fields: impl IntoIterator<Item = F>) -> FormExtraResult<Self>
    where
        F: ItemField + 'static,
    {
        let fields = fields
            .into_iter()
            .map(|f| Arc::new(f) as Arc<dyn ItemField>)
            .collect();
        Self::from_item_fields(ItemFields::Cycle(fields))
    }

    /// Builds a list field from already-erased item fields.
    ///
    /// Use this to cycle through item fields of different concrete types.
    ///
    /// # Errors
    ///
    /// Returns [`FormExtraError::ImproperlyConfigured`] for an empty cycle.
    pub fn from_item_fields(fields: ItemFields) -> FormExtraResult<Self> {
        if fields.is_empty() {
            return Err(FormExtraError::ImproperlyConfigured(
                "ListField requires at least one item field".to_string(),
            ));
        }
        Ok(Self {
            fields,
            error_messages: HashMap::new(),
        })
    }

    /// Overrides the message for an error code. Only `invalid_list` is
    /// produced by the list itself.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Returns the configured item field(s).
    pub const fn item_fields(&self) -> &ItemFields {
        &self.fields
    }

    /// Converts every item of the raw list.
    ///
    /// Absent and falsy scalar input yields an empty list. Objects and truthy
    /// scalars fail with a single `invalid_list` error. Otherwise each item is
    /// converted by its item field and all failures are returned together.
    pub fn to_python(&self, raw: Option<&serde_json::Value>) -> Result<Vec<Value>, ValidationError> {
        let items = match raw {
            None => return Ok(Vec::new()),
            Some(serde_json::Value::Array(items)) => items,
            Some(serde_json::Value::Object(_)) => return Err(self.invalid_list()),
            Some(other) if is_falsy(other) => return Ok(Vec::new()),
            Some(_) => return Err(self.invalid_list()),
        };

        let mut values = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (index, (item, field)) in items.iter().zip(self.fields.cycle()).enumerate() {
            match field.normalize(item) {
                Ok(value) => values.push(value),
                Err(err) => {
                    tracing::trace!(index, code = %err.code, "list item failed conversion");
                    errors.push(index_error(index, &err));
                }
            }
        }

        tracing::debug!(items = items.len(), failed = errors.len(), "list conversion pass");
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(ValidationError::from_list(errors, "invalid"))
        }
    }

    /// Validates every converted item with its item field.
    pub fn run_validators(&self, values: &[Value]) -> Result<(), ValidationError> {
        let errors: Vec<ValidationError> = values
            .iter()
            .zip(self.fields.cycle())
            .enumerate()
            .filter_map(|(index, (value, field))| {
                field.validate(value).err().map(|err| index_error(index, &err))
            })
            .collect();

        tracing::debug!(items = values.len(), failed = errors.len(), "list validation pass");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_list(errors, "invalid"))
        }
    }

    /// Converts then validates. Validation is skipped if conversion failed.
    pub fn clean(&self, raw: Option<&serde_json::Value>) -> Result<Vec<Value>, ValidationError> {
        let values = self.to_python(raw)?;
        self.run_validators(&values)?;
        Ok(values)
    }

    fn invalid_list(&self) -> ValidationError {
        let message = self
            .error_messages
            .get("invalid_list")
            .map_or(INVALID_LIST, String::as_str);
        ValidationError::new(message, "invalid_list")
    }
}

fn is_falsy(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(_) => false,
    }
}

/// Prefixes an item failure with its position. Several messages for one
/// item are joined with a single space.
fn index_error(index: usize, err: &ValidationError) -> ValidationError {
    let detail = err.messages().join(" ");
    ValidationError::new(format!("Index {index}: {detail}"), err.code.clone())
        .with_param("index", index.to_string())
        .with_param("err_msg", detail)
}
