//! Scripting module - Rhai runtime for configuration
//!
//! Editor functions are exposed under the `quill` namespace:
//! - `quill::config::*` - theme, completion endpoint, save timings

mod api;
mod engine;

pub use engine::ScriptEngine;
