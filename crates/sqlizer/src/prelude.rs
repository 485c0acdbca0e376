//! Convenience re-exports for typical usage.
//!
//! ```ignore
//! use sqlizer::prelude::*;
//! ```

pub use crate::builder::{Builder, OrderSpec, SortDir};
pub use crate::cast::{Arg, Cast};
pub use crate::error::{SqlizerError, SqlizerResult};
pub use crate::exec::Executor;
pub use crate::statement::Statement;
pub use crate::value::Value;

#[cfg(feature = "pool")]
pub use crate::pool::{create_pool, create_pool_with_config};
