//! The in-memory data model: [`Bundle`], [`Value`] and [`Date`].

pub mod bundle_base;
pub mod date;
pub mod value;

pub use bundle_base::Bundle;
pub use date::Date;
pub use value::{FieldValue, Value};
