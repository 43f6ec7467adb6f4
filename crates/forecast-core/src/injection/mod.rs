//! Utilidades para combinar payloads JSON (result paths, trigger).

mod merge;

pub use merge::{merge_json, with_field};
