pub mod error;
pub mod io;
pub mod model;
pub mod ops;
pub mod orchestrate;

pub use error::{Result, ToolError};
