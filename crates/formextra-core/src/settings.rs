//! Settings for formextra.
//!
//! [`Settings`] holds the few knobs the form extensions read at runtime:
//! log level, the default client-side model prefix, extra widget template
//! directories and the date format used when rendering date values.
//! [`SETTINGS`] is an optional global; code that finds it unconfigured falls
//! back to [`Settings::default`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete set of formextra settings.
///
/// # Examples
///
/// ```
/// use formextra_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.ng_model_prefix, "model");
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Switches log output to a pretty format.
    pub debug: bool,
    /// The log filter (e.g. "info", "formextra_forms=debug").
    pub log_level: String,
    /// Default prefix for `data-ng-model` bindings (`<prefix>.<field>`).
    pub ng_model_prefix: String,
    /// Directories whose `*.html` files override the embedded widget templates.
    pub template_dirs: Vec<PathBuf>,
    /// `strftime` format used when a date widget renders a date value.
    pub date_input_format: String,
    /// Custom settings that don't fit into the above.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            ng_model_prefix: "model".to_string(),
            template_dirs: Vec::new(),
            date_input_format: "%Y-%m-%d".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called at most once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns the configured settings, or the defaults if none were configured.
    pub fn get(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured (or defaulted by `get`).
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.ng_model_prefix, "model");
        assert!(s.template_dirs.is_empty());
        assert_eq!(s.date_input_format, "%Y-%m-%d");
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());

        let settings = Settings {
            ng_model_prefix: "vm".to_string(),
            ..Settings::default()
        };
        lazy.configure(settings);
        assert!(lazy.is_configured());
        assert_eq!(lazy.get().ng_model_prefix, "vm");
    }

    #[test]
    fn test_lazy_settings_get_defaults_when_unconfigured() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get().ng_model_prefix, "model");
        assert!(lazy.is_configured());
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_double_configure_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }
}
