//! # formextra
//!
//! Extra building blocks for server-rendered forms: a list field that
//! validates every item, form extensions, and Angular Material widgets.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on it to
//! get everything, or on the individual crates for finer-grained control.

/// Settings, values, error types and logging setup.
pub use formextra_core as core;

/// List fields, form extensions and widgets.
#[cfg(feature = "forms")]
pub use formextra_forms as forms;

/// Re-exported for building form payloads.
pub use serde_json;

/// Re-exported for instrumenting code around forms.
pub use tracing;

/// Commonly used items.
pub mod prelude {
    pub use formextra_core::{FormExtraError, FormExtraResult, Settings, ValidationError, Value};

    #[cfg(feature = "forms")]
    pub use formextra_forms::{
        AllRequired, BaseForm, FieldAttributes, FieldType, Form, FormData, FormExtension,
        FormFieldDef, ItemField, ItemFields, ListField, NgModelBinding,
    };
}
