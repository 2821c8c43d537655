//! Integration tests for form extensions and widget rendering through forms.
//!
//! Covers:
//! 1. Stacking several extensions on one form
//! 2. Rendering bound and unbound fields with Material widgets
//! 3. Reading widget-specific submitted data during binding

use std::collections::HashMap;

use chrono::NaiveDate;
use formextra_core::Value;
use formextra_forms::extensions::{AllRequired, AttrSource, FieldAttributes, NgModelBinding};
use formextra_forms::fields::{FieldType, FormFieldDef};
use formextra_forms::form::{BaseForm, Form, FormData};
use formextra_forms::widgets::{AttrValue, Attrs, Choice, MdCheckbox, MdDatePicker, MdDateSelect, MdSelect};
use serde_json::json;

fn payload(value: serde_json::Value) -> FormData {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    }
}

fn profile_fields() -> Vec<FormFieldDef> {
    vec![
        FormFieldDef::new("name", FieldType::char()).required(false),
        FormFieldDef::new(
            "color",
            FieldType::Choice {
                choices: vec![
                    ("red".to_string(), "Red".to_string()),
                    ("blue".to_string(), "Blue".to_string()),
                ],
            },
        )
        .required(false)
        .widget(MdSelect::new([
            Choice::empty("---"),
            Choice::option("red", "Red"),
            Choice::option("blue", "Blue"),
        ])),
        FormFieldDef::new("birthday", FieldType::Date)
            .required(false)
            .widget(MdDatePicker::new()),
        FormFieldDef::new("subscribe", FieldType::Boolean)
            .required(false)
            .widget(MdCheckbox::new("Subscribe").help_text("Monthly, at most.")),
    ]
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn test_all_required_then_validation() {
    let mut form = BaseForm::new(profile_fields())
        .with_extension(AllRequired::new().optional(["subscribe", "birthday"]));
    form.bind(&payload(json!({"name": "Ann"})));

    assert!(!form.is_valid());
    let mut failed: Vec<&String> = form.errors().keys().collect();
    failed.sort();
    assert_eq!(failed, vec!["color"]);
}

#[test]
fn test_stacked_extensions_render() {
    let form = BaseForm::new(profile_fields())
        .with_extension(NgModelBinding::new().prefix("vm").handle_ng_init(true))
        .with_extension(
            FieldAttributes::new()
                .common("data-ng-change", "touched()")
                .field(
                    "name",
                    "data-placeholder",
                    AttrSource::dynamic(|_, field, _, _| AttrValue::Text(field.label.to_uppercase())),
                ),
        );

    let html = form.render_field("name").unwrap();
    assert_eq!(
        html.trim_end(),
        concat!(
            r#"<input type="text" name="name""#,
            r#" data-ng-change="touched()""#,
            r#" data-ng-init="vm.name = null""#,
            r#" data-ng-model="vm.name""#,
            r#" data-placeholder="NAME" />"#,
        )
    );
}

#[test]
fn test_ng_init_uses_bound_value() {
    let mut form = BaseForm::new(profile_fields())
        .with_extension(NgModelBinding::new().handle_ng_init(true));
    form.bind(&payload(json!({"name": "Ann", "birthday": "2020-02-29"})));

    let ctx = form
        .widget_context("name", &form.field_value("name"), &Attrs::new())
        .unwrap();
    assert_eq!(ctx.attrs["data-ng-init"], AttrValue::from(r#"model.name = "Ann""#));

    let html = form.render_field("birthday").unwrap();
    assert!(html.contains(r#"data-value="2020-02-29""#));
    assert!(html.contains(r#"data-ng-model="model.birthday""#));
}

// ============================================================================
// Widgets through forms
// ============================================================================

#[test]
fn test_unbound_select_uses_initial() {
    let mut initial = HashMap::new();
    initial.insert("color".to_string(), Value::from("blue"));
    let form = BaseForm::new(profile_fields()).with_initial(initial);

    let html = form.render_field("color").unwrap().replace('\n', "");
    assert_eq!(
        html,
        concat!(
            r#"<md-select data-name="color">"#,
            r#"<md-option data-value="">---</md-option>"#,
            r#"<md-option data-value="red">Red</md-option>"#,
            r#"<md-option data-value="blue" data-selected>Blue</md-option>"#,
            "</md-select>",
        )
    );
}

#[test]
fn test_prefixed_form_renders_prefixed_names() {
    let form = BaseForm::new(profile_fields()).with_prefix("p");
    let html = form.render_field("subscribe").unwrap().replace('\n', "");
    assert_eq!(
        html,
        r#"<md-checkbox data-name="p-subscribe"> Subscribe <md-tooltip>Monthly, at most.</md-tooltip> </md-checkbox>"#
    );
}

#[test]
fn test_checkbox_binding_reads_missing_as_false() {
    let mut form = BaseForm::new(profile_fields());
    form.bind(&payload(json!({"color": "red"})));

    assert!(form.is_valid());
    assert_eq!(form.cleaned_data()["subscribe"], Value::Bool(false));
    assert_eq!(form.cleaned_data()["color"], Value::from("red"));
}

#[test]
fn test_date_select_binding() {
    let mut form = BaseForm::new(vec![
        FormFieldDef::new("start", FieldType::Date).widget(MdDateSelect::new(2020..2030)),
    ]);
    form.bind(&payload(json!({"start_year": "2024", "start_month": "6", "start_day": "1"})));
    assert!(form.is_valid());
    assert_eq!(
        form.cleaned_data()["start"],
        Value::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    );

    form.bind(&payload(json!({"start_year": "2024", "start_month": "2", "start_day": "30"})));
    assert!(!form.is_valid());
    assert_eq!(form.errors()["start"], vec!["Enter a valid date."]);
}

#[test]
fn test_date_select_missing_part_is_invalid() {
    let mut form = BaseForm::new(vec![
        FormFieldDef::new("d", FieldType::Date).widget(MdDateSelect::new(2020..2030)),
    ]);
    let partials = [
        json!({"d_month": "5", "d_day": "3"}),
        json!({"d_year": "2024", "d_day": "3"}),
        json!({"d_year": "2024", "d_month": "5"}),
    ];
    for submitted in partials {
        form.bind(&payload(submitted.clone()));
        assert!(!form.is_valid(), "{submitted}");
        assert_eq!(form.errors()["d"], vec!["Enter a valid date."], "{submitted}");
        assert!(form.cleaned_data().get("d").is_none());
    }
}

#[test]
fn test_multiple_choice_with_multi_select() {
    let mut form = BaseForm::new(vec![FormFieldDef::new(
        "tags",
        FieldType::MultipleChoice {
            choices: vec![
                ("a".to_string(), "A".to_string()),
                ("b".to_string(), "B".to_string()),
            ],
        },
    )]);
    form.bind(&payload(json!({"tags": "a"})));
    assert!(form.is_valid());
    assert_eq!(form.cleaned_data()["tags"], Value::List(vec![Value::from("a")]));

    let html = form.render_field("tags").unwrap().replace('\n', "");
    assert!(html.starts_with(r#"<md-select data-name="tags" data-multiple>"#));
    assert!(html.contains(r#"<md-option data-value="a" data-selected>A</md-option>"#));
    assert!(html.contains(r#"<md-option data-value="b">B</md-option>"#));
}
