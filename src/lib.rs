//! Core library for the ts-sheet-tools command line application.
//!
//! The library merges, filters and augments tabular files. IO adapters live
//! under [`ts::tools::io`] (file resolution, CSV/spreadsheet reading, workbook
//! writing), table and configuration types inside [`ts::tools::model`], the
//! row transformations in [`ts::tools::ops`], and the validate → read →
//! transform → write pipeline under [`ts::tools::orchestrate`].

pub mod ts;

pub use ts::tools::{Result, ToolError, error, io, model, ops, orchestrate};
