//! # formextra-forms
//!
//! Form building blocks: a list field with per-item validation, form
//! extensions, and Angular Material widgets.
//!
//! ## Modules
//!
//! - [`validators`] - Reusable value validators
//! - [`fields`] - Field types and definitions
//! - [`list_field`] - [`ListField`] and its item fields
//! - [`widgets`] - Widgets and the template renderer
//! - [`form`] - The [`Form`] trait and [`BaseForm`]
//! - [`validation`] - The form validation pipeline
//! - [`extensions`] - Behaviors installed on a [`BaseForm`]

pub mod extensions;
pub mod fields;
pub mod form;
pub mod list_field;
pub mod validation;
pub mod validators;
pub mod widgets;

pub use extensions::{AllRequired, FieldAttributes, FormExtension, NgModelBinding};
pub use fields::{FieldType, FormFieldDef};
pub use form::{BaseForm, Form, FormData};
pub use list_field::{ItemField, ItemFields, ListField};
