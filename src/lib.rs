//! # keyset-cursor
//!
//! Keyset (seek-based) pagination for ordered, multi-column SQL result sets.
//!
//! ## Core Types
//!
//! - **[`CursorQueryBuilder`]**: Turns a base query, sort fields and a
//!   continuation token into SQL with a seek predicate, ORDER BY and an
//!   over-fetching LIMIT
//! - **[`CursorToken`]**: Opaque, URL-safe snapshot of a boundary row's sort
//!   values plus a page direction
//! - **[`create_token`] / [`create_next_token`]**: Mint next/previous page
//!   tokens from a fetched page
//! - **[`Value`]**: Scalar sort and bind value
//! - **[`Error`]**: Error type for cursor operations
//!
//! ## Flow
//!
//! ```text
//! 1. CursorQueryBuilder::new(limit, token) → .sort(..) → .query(..) → .build()
//! 2. Execute the SQL with the returned binds (fetches up to limit + 1 rows)
//! 3. create_token(token, limit, rows.len(), sort_values, truncate)
//! 4. Hand next/prev tokens back to the client
//! ```
//!
//! Building SQL and minting tokens never touch a database; executing the
//! query is up to the caller.

mod builder;
mod config;
mod error;
mod token;
mod value;

pub use builder::{Comparator, CursorQueryBuilder, SortDirection, SortField};
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use token::{
   CursorToken, PageDirection, create_next_token, create_token, create_token_for_rows,
};
pub use value::Value;
