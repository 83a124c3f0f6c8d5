//! Table transformations. Each operation takes already-read tables and
//! returns the transformed table with its counters; no file IO happens here.

pub mod activity;
pub mod age;
pub mod filter;
pub mod han;
pub mod merge;
pub mod text;
pub mod update;
