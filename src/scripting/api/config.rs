//! quill::config - Settings and themes
//!
//! Usage in Rhai:
//! ```rhai
//! quill::config::set_theme("nord");
//! quill::config::set_endpoint("https://example.com/api/generate");
//! quill::config::set_debounce_ms(1000);
//! ```

use rhai::plugin::*;
use std::sync::{Arc, RwLock};

use crate::config::Settings;

/// Create the config module with access to settings
pub fn create_module(settings: Arc<RwLock<Settings>>) -> rhai::Module {
    let mut module = rhai::Module::new();

    // set_theme(name: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_theme",
            move |name: &str| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.theme = name.to_string();
                }
                Ok(())
            },
        );
    }

    // get_theme() -> String
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_theme",
            move || -> Result<String, Box<EvalAltResult>> {
                Ok(s.read().map(|s| s.theme.clone()).unwrap_or_default())
            },
        );
    }

    // set_endpoint(url: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_endpoint",
            move |url: &str| -> Result<(), Box<EvalAltResult>> {
                if url.trim().is_empty() {
                    return Err("endpoint must not be empty".into());
                }
                if let Ok(mut settings) = s.write() {
                    settings.endpoint = url.trim().to_string();
                }
                Ok(())
            },
        );
    }

    // set_completion_id(id: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_completion_id",
            move |id: &str| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.completion_id = id.to_string();
                }
                Ok(())
            },
        );
    }

    // set_debounce_ms(ms: i64)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_debounce_ms",
            move |ms: i64| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.debounce_ms = ms.clamp(50, 10_000) as u64;
                }
                Ok(())
            },
        );
    }

    // get_debounce_ms() -> i64
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_debounce_ms",
            move || -> Result<i64, Box<EvalAltResult>> {
                Ok(s.read().map(|s| s.debounce_ms as i64).unwrap_or(750))
            },
        );
    }

    // set_saved_delay_ms(ms: i64)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_saved_delay_ms",
            move |ms: i64| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.saved_delay_ms = ms.clamp(0, 5_000) as u64;
                }
                Ok(())
            },
        );
    }

    // set_toast_ms(ms: i64)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_toast_ms",
            move |ms: i64| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.toast_ms = ms.clamp(500, 30_000) as u64;
                }
                Ok(())
            },
        );
    }

    // list_themes() -> Array
    module.set_native_fn(
        "list_themes",
        || -> Result<rhai::Array, Box<EvalAltResult>> {
            let themes = crate::theme::list_builtin_themes();
            Ok(themes
                .into_iter()
                .map(|s| rhai::Dynamic::from(s.to_string()))
                .collect())
        },
    );

    module
}
