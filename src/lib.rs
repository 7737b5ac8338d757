pub mod config;
pub mod convert;
pub mod error;
pub mod rules;

pub use error::{ConvertError, Result};
