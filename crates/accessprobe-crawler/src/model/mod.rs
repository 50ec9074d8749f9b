//! Evidence model: immutable snapshots captured from one loaded page.
//!
//! Field names serialize in camelCase; the document is handed to a
//! JSON-consuming prompt builder downstream.

mod document;
mod records;

pub use document::*;
pub use records::*;
