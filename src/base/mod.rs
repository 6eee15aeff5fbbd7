//! Foundation types for the resolution pass.
//!
//! - [`FileId`] - handle for a source file
//! - [`LineCol`], [`LineIndex`] - line/column positions and line ranges
//! - [`SourcePosition`] - the key every resolution result is stored under
//!
//! This module has NO dependencies on other scopebridge modules.

mod file_id;
mod position;

pub use file_id::FileId;
pub use position::{LineCol, LineIndex, SourcePosition};

pub use text_size::{TextRange, TextSize};
