//! # sqlizer
//!
//! A fluent, immutable SQL builder for Postgres.
//!
//! ## Features
//!
//! - **Immutable chains**: every method derives a new builder, so shared
//!   prefixes can branch into independent queries and a failed call never
//!   corrupts the chain it was called on
//! - **Validated assembly**: arguments and chain position are checked at
//!   every step; grammatically invalid sequences fail at the offending call
//! - **Parameterized output**: [`build`](Builder::build) produces a
//!   [`Statement`] of SQL text plus bound values, never inlined literals
//! - **Execution helpers**: the [`Executor`] trait runs statements against
//!   tokio-postgres clients, transactions, and pooled connections
//!
//! ## Example
//!
//! ```ignore
//! use sqlizer::prelude::*;
//!
//! let base = Builder::new().select_all()?.from("posts")?;
//!
//! let one = base.where_("post_id", "=", 7)?.build()?;
//! assert_eq!(one.text(), "SELECT * FROM posts WHERE post_id = ?;");
//!
//! let page = base
//!     .order_by(&[OrderSpec::desc("created_at")])?
//!     .limit(10)?
//!     .offset(20)?
//!     .build()?;
//!
//! let rows = client.query(&page).await?;
//! ```

pub mod builder;
pub mod cast;
pub mod error;
pub mod exec;
pub mod prelude;
pub mod state;
pub mod statement;
pub mod value;

pub use builder::{Builder, OrderSpec, SortDir};
pub use cast::{Arg, Cast, cast_value};
pub use error::{SqlizerError, SqlizerResult};
pub use exec::Executor;
pub use state::Context;
pub use statement::Statement;
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
