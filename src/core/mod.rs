//! Core utilities and common types for rhop.

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::*;
pub use value::{Properties, Row, Value};
