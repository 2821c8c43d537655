//! Tera-backed widget rendering.
//!
//! Widget templates are embedded in the crate. Directories listed in
//! `Settings::template_dirs` are scanned for `*.html` files that replace
//! embedded templates of the same name. The engine is built on first use.

use std::path::{Path, PathBuf};

use formextra_core::{FormExtraError, FormExtraResult, SETTINGS};
use once_cell::sync::OnceCell;
use serde_json::json;
use tera::{Context, Tera};

use super::{render_attrs, OptionContext, WidgetContext};

const EMBEDDED: &[(&str, &str)] = &[
    ("input.html", include_str!("../../templates/input.html")),
    ("md_select.html", include_str!("../../templates/md_select.html")),
    (
        "md_select_option.html",
        include_str!("../../templates/md_select_option.html"),
    ),
    ("md_datepicker.html", include_str!("../../templates/md_datepicker.html")),
    ("md_date_select.html", include_str!("../../templates/md_date_select.html")),
    ("md_checkbox.html", include_str!("../../templates/md_checkbox.html")),
];

static ENGINE: OnceCell<Tera> = OnceCell::new();

/// Returns the shared engine, building it from the global settings.
///
/// # Errors
///
/// Returns an error if an embedded template fails to parse or an override
/// directory cannot be read.
pub fn engine() -> FormExtraResult<&'static Tera> {
    ENGINE.get_or_try_init(|| build_engine(&SETTINGS.get().template_dirs))
}

/// Builds an engine with the embedded templates and any overrides in `dirs`.
///
/// Later directories win over earlier ones. Missing directories are skipped
/// with a warning, as are override templates that fail to parse.
///
/// # Errors
///
/// Returns an error if an embedded template fails to parse or a file in an
/// existing override directory cannot be read.
pub fn build_engine(dirs: &[PathBuf]) -> FormExtraResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(EMBEDDED.iter().copied())
        .map_err(template_error)?;
    for dir in dirs {
        load_overrides(&mut tera, dir)?;
    }
    Ok(tera)
}

fn load_overrides(tera: &mut Tera, dir: &Path) -> FormExtraResult<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping template directory");
            return Ok(());
        }
    };

    for entry in entries {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "html") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let source = std::fs::read_to_string(&path)?;
        match tera.add_raw_template(name, &source) {
            Ok(()) => tracing::debug!(template = name, dir = %dir.display(), "template override loaded"),
            Err(e) => {
                tracing::warn!(template = name, error = %describe(&e), "ignoring template override");
            }
        }
    }
    Ok(())
}

/// Renders a widget context with the shared engine.
///
/// # Errors
///
/// Returns [`FormExtraError::TemplateDoesNotExist`] for an unknown template
/// and [`FormExtraError::TemplateError`] for any other rendering failure.
pub fn render_context(ctx: &WidgetContext) -> FormExtraResult<String> {
    render_with(engine()?, ctx)
}

/// Renders a widget context with the given engine.
///
/// Sub-widgets and options are rendered first and handed to the widget's
/// template as HTML strings.
///
/// # Errors
///
/// See [`render_context`].
pub fn render_with(tera: &Tera, ctx: &WidgetContext) -> FormExtraResult<String> {
    let subwidgets = ctx
        .subwidgets
        .iter()
        .map(|sub| render_with(tera, sub))
        .collect::<FormExtraResult<Vec<_>>>()?;

    let mut optgroups = Vec::with_capacity(ctx.optgroups.len());
    for group in &ctx.optgroups {
        let options = group
            .options
            .iter()
            .map(|option| render_option(tera, option))
            .collect::<FormExtraResult<Vec<_>>>()?;
        optgroups.push(json!({
            "grouped": group.label.is_some(),
            "label": group.label.clone().unwrap_or_default(),
            "options": options,
        }));
    }

    let mut widget = serde_json::Map::new();
    widget.insert("name".into(), json!(ctx.name));
    widget.insert("value".into(), json!(ctx.value.clone().unwrap_or_default()));
    widget.insert("has_value".into(), json!(ctx.value.is_some()));
    widget.insert("attrs_html".into(), json!(ctx.attrs_html()));
    widget.insert("template_name".into(), json!(ctx.template_name));
    widget.insert("optgroups".into(), json!(optgroups));
    widget.insert("subwidgets".into(), json!(subwidgets));
    for (key, value) in &ctx.extra {
        widget.insert(key.clone(), value.clone());
    }

    render_template(tera, &ctx.template_name, &serde_json::Value::Object(widget))
}

fn render_option(tera: &Tera, option: &OptionContext) -> FormExtraResult<String> {
    let widget = json!({
        "value": option.value,
        "label": option.label,
        "selected": option.selected,
        "attrs_html": render_attrs(&option.attrs),
    });
    render_template(tera, &option.template_name, &widget)
}

fn render_template(tera: &Tera, name: &str, widget: &serde_json::Value) -> FormExtraResult<String> {
    let mut context = Context::new();
    context.insert("widget", widget);
    tera.render(name, &context).map_err(template_error)
}

fn template_error(e: tera::Error) -> FormExtraError {
    match &e.kind {
        tera::ErrorKind::TemplateNotFound(name) => FormExtraError::TemplateDoesNotExist(name.clone()),
        _ => FormExtraError::TemplateError(describe(&e)),
    }
}

/// Joins an error with its sources; tera keeps the useful detail there.
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
