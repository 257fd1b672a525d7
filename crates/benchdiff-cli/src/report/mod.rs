//! Presentation of comparison results. Read-only over core outputs.

pub mod json;
pub mod text;
