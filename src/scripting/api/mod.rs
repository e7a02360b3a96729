//! API modules for the `quill` namespace
//!
//! Each submodule provides functions under `quill::<module>::*`

pub mod config;
