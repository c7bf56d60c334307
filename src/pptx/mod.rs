//! Minimal PPTX (Office Open XML) document codec.
//!
//! A `.pptx` file is a ZIP archive of XML parts. This module models the
//! subset the server writes — ordered slides built from two built-in layouts,
//! each with a title placeholder and a body placeholder — and round-trips it
//! through the package format. Saving always re-serializes the full package.

mod model;
mod reader;
mod writer;

pub use model::{Align, Paragraph, Presentation, Slide, SlideLayout};
