//! Behaviors installed on a [`BaseForm`].
//!
//! An extension gets two hooks: [`FormExtension::configure`] runs once when
//! it is installed with [`BaseForm::with_extension`], and
//! [`FormExtension::adjust_attrs`] runs every time the form builds a widget
//! context. Extensions adjust attrs in installation order.
//!
//! - [`AllRequired`] marks fields required
//! - [`FieldAttributes`] adds static or computed widget attributes
//! - [`NgModelBinding`] binds widgets to an Angular model

use std::fmt;

use formextra_core::Value;

use crate::fields::FormFieldDef;
use crate::form::BaseForm;
use crate::widgets::Attrs;

pub mod all_required;
pub mod field_attributes;
pub mod ng_model;

pub use all_required::AllRequired;
pub use field_attributes::{AttrFn, AttrSource, FieldAttributes};
pub use ng_model::{NgInitFormat, NgModelBinding};

/// A reusable form behavior.
pub trait FormExtension: Send + Sync + fmt::Debug {
    /// Adjusts the form once, when the extension is installed.
    fn configure(&self, _form: &mut BaseForm) {}

    /// Adjusts the attributes passed to a field's widget.
    ///
    /// `name` is the field name without the form prefix.
    fn adjust_attrs(
        &self,
        _form: &BaseForm,
        _field: &FormFieldDef,
        _name: &str,
        _value: &Value,
        _attrs: &mut Attrs,
    ) {
    }
}
