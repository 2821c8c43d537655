//! Date widgets: a material datepicker and a three-select date picker.

use chrono::{Datelike, NaiveDate};
use formextra_core::Value;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{base_context, Attrs, Choice, MdSelect, Widget, WidgetContext, WidgetType};
use crate::form::FormData;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}|0)-(\d\d?)-(\d\d?)$").expect("valid date regex"));

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// An Angular Material `<md-datepicker>`.
#[derive(Debug, Clone, Default)]
pub struct MdDatePicker {
    attrs: Attrs,
}

impl MdDatePicker {
    /// A new datepicker.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for MdDatePicker {
    fn widget_type(&self) -> WidgetType {
        WidgetType::MdDatePicker
    }

    fn template_name(&self) -> &str {
        "md_datepicker.html"
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }
}

/// A date entered through three `<md-select>` elements.
///
/// The selects are named `<name>_year`, `<name>_month` and `<name>_day`.
/// Submitted parts are reassembled into `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub struct MdDateSelect {
    years: Vec<i32>,
    empty_label: Option<String>,
    attrs: Attrs,
}

impl Default for MdDateSelect {
    fn default() -> Self {
        let this_year = chrono::Local::now().year();
        Self::new(this_year..this_year + 10)
    }
}

impl MdDateSelect {
    /// A date select offering `years`.
    pub fn new(years: impl IntoIterator<Item = i32>) -> Self {
        Self {
            years: years.into_iter().collect(),
            empty_label: Some("---".to_string()),
            attrs: Attrs::new(),
        }
    }

    /// Sets the label of the leading empty option; `None` removes it.
    #[must_use]
    pub fn empty_label(mut self, label: Option<&str>) -> Self {
        self.empty_label = label.map(str::to_string);
        self
    }

    fn select(&self, options: impl Iterator<Item = Choice>) -> MdSelect {
        let mut choices: Vec<Choice> = self.empty_label.iter().map(Choice::empty).collect();
        choices.extend(options);
        MdSelect::new(choices)
    }

    /// Splits a value into year, month and day strings.
    fn parts(value: &Value) -> Option<(String, String, String)> {
        match value {
            Value::Date(d) => Some((d.year().to_string(), d.month().to_string(), d.day().to_string())),
            Value::DateTime(dt) => Some((
                dt.year().to_string(),
                dt.month().to_string(),
                dt.day().to_string(),
            )),
            Value::String(s) => DATE_RE.captures(s).map(|caps| {
                let part = |i: usize| {
                    caps[i]
                        .parse::<u32>()
                        .map_or_else(|_| caps[i].to_string(), |n| n.to_string())
                };
                (part(1), part(2), part(3))
            }),
            _ => None,
        }
    }
}

impl Widget for MdDateSelect {
    fn widget_type(&self) -> WidgetType {
        WidgetType::MdDateSelect
    }

    fn template_name(&self) -> &str {
        "md_date_select.html"
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    fn get_context(&self, name: &str, value: &Value, attrs: &Attrs) -> WidgetContext {
        let mut ctx = base_context(self, name, value, attrs);
        let (year, month, day) = Self::parts(value).map_or((Value::Null, Value::Null, Value::Null), |(y, m, d)| {
            (Value::String(y), Value::String(m), Value::String(d))
        });

        let years = self.select(self.years.iter().map(|y| Choice::option(y.to_string(), y.to_string())));
        let months = self.select(
            MONTHS
                .iter()
                .enumerate()
                .map(|(i, label)| Choice::option((i + 1).to_string(), *label)),
        );
        let days = self.select((1..=31).map(|d: u32| Choice::option(d.to_string(), d.to_string())));

        ctx.subwidgets = vec![
            years.get_context(&format!("{name}_year"), &year, &ctx.attrs),
            months.get_context(&format!("{name}_month"), &month, &ctx.attrs),
            days.get_context(&format!("{name}_day"), &day, &ctx.attrs),
        ];
        ctx
    }

    /// Reassembles `YYYY-MM-DD` from the three selects.
    ///
    /// All parts blank yields `None`. Parts that do not form a real date are
    /// passed through as `Y-M-D` so the field reports it as invalid.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<serde_json::Value> {
        let part = |suffix: &str| {
            data.get(&format!("{name}_{suffix}")).and_then(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        let (year, month, day) = (part("year"), part("month"), part("day"));

        if year.is_none() && month.is_none() && day.is_none() {
            return data.get(name).cloned();
        }

        let date = match (&year, &month, &day) {
            (Some(y), Some(m), Some(d)) => match (y.parse(), m.parse(), d.parse()) {
                (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
                _ => None,
            },
            _ => None,
        };
        Some(serde_json::Value::String(date.map_or_else(
            || {
                let or_zero = |p: Option<String>| p.unwrap_or_else(|| "0".to_string());
                format!("{}-{}-{}", or_zero(year), or_zero(month), or_zero(day))
            },
            |d| d.format("%Y-%m-%d").to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_datepicker_render_empty() {
        let html = MdDatePicker::new()
            .render("result", &Value::Null, &Attrs::new())
            .unwrap()
            .replace('\n', "");
        assert_eq!(html, r#"<md-datepicker data-name="result"></md-datepicker>"#);
    }

    #[test]
    fn test_datepicker_render_value() {
        let now = "2024-01-15T10:30:00.123456";
        let html = MdDatePicker::new()
            .render("result", &Value::from(now), &Attrs::new())
            .unwrap()
            .replace('\n', "");
        assert_eq!(
            html,
            format!(r#"<md-datepicker data-name="result" data-value="{now}"></md-datepicker>"#)
        );
    }

    #[test]
    fn test_datepicker_formats_dates() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        let ctx = MdDatePicker::new().get_context("d", &Value::Date(date), &Attrs::new());
        assert_eq!(ctx.value.as_deref(), Some("2023-07-04"));
    }

    #[test]
    fn test_date_select_subwidgets() {
        let widget = MdDateSelect::new(2020..2023);
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        let ctx = widget.get_context("born", &Value::Date(date), &Attrs::new());
        let names: Vec<&str> = ctx.subwidgets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["born_year", "born_month", "born_day"]);

        let html = widget.render("born", &Value::Date(date), &Attrs::new()).unwrap();
        assert_eq!(html.matches("<md-select").count(), 3);
        assert!(html.contains(r#"<md-option data-value="2021" data-selected>2021</md-option>"#));
        assert!(html.contains(r#"<md-option data-value="3" data-selected>March</md-option>"#));
        assert!(html.contains(r#"<md-option data-value="9" data-selected>9</md-option>"#));
    }

    #[test]
    fn test_date_select_empty_value_selects_placeholder() {
        let widget = MdDateSelect::new([2024]);
        let html = widget.render("d", &Value::Null, &Attrs::new()).unwrap();
        assert_eq!(
            html.matches(r#"<md-option data-value="" data-selected>---</md-option>"#).count(),
            3
        );
        let bare = MdDateSelect::new([2024]).empty_label(None);
        assert!(!bare.render("d", &Value::Null, &Attrs::new()).unwrap().contains("---"));
    }

    #[test]
    fn test_date_select_parses_string_value() {
        let widget = MdDateSelect::new([2024]);
        let ctx = widget.get_context("d", &Value::from("2024-02-05"), &Attrs::new());
        let selected: Vec<&str> = ctx
            .subwidgets
            .iter()
            .flat_map(|s| s.optgroups.iter().flat_map(|g| g.options.iter()))
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["2024", "2", "5"]);
    }

    #[test]
    fn test_date_select_value_from_data() {
        let widget = MdDateSelect::default();
        let mut data = FormData::new();
        data.insert("d_year".into(), json!("2024"));
        data.insert("d_month".into(), json!("2"));
        data.insert("d_day".into(), json!(5));
        assert_eq!(widget.value_from_data(&data, "d"), Some(json!("2024-02-05")));

        data.insert("d_day".into(), json!("31"));
        assert_eq!(widget.value_from_data(&data, "d"), Some(json!("2024-2-31")));

        data.remove("d_month");
        assert_eq!(widget.value_from_data(&data, "d"), Some(json!("2024-0-31")));

        assert_eq!(widget.value_from_data(&FormData::new(), "d"), None);
    }
}
