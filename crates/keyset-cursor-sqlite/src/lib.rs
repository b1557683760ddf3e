//! # keyset-cursor-sqlite
//!
//! Runs [`keyset_cursor`] pages against SQLite through SQLx.
//!
//! ## Core Types
//!
//! - **[`fetch_page`]**: Build the cursor query, execute it and mint the
//!   next/previous tokens in one call
//! - **[`CursorPage`]**: Rows of one page plus its continuation tokens
//! - **[`bind_value`] / [`decode_rows`]**: Scalar conversion in both
//!   directions, for callers that execute cursor queries themselves
//! - **[`Error`]**: Error type for page operations
//!
//! ## Example
//!
//! ```no_run
//! use keyset_cursor::{CursorQueryBuilder, SortDirection, Value};
//! use keyset_cursor_sqlite::fetch_page;
//!
//! # async fn example(pool: sqlx::SqlitePool, token: String) -> keyset_cursor_sqlite::Result<()> {
//! let cursor = CursorQueryBuilder::new(20, token)
//!    .query("SELECT id, title FROM posts")
//!    .where_clause("category = ?")
//!    .sort("id", SortDirection::Asc);
//!
//! let page = fetch_page(&pool, cursor)
//!    .bind(vec![Value::from("tech")])
//!    .await?;
//!
//! println!("{} rows, next token {:?}", page.rows.len(), page.next_token);
//! # Ok(())
//! # }
//! ```

mod decode;
mod error;
mod page;

pub use decode::{Row, bind_value, decode_rows};
pub use error::{Error, Result};
pub use page::{CursorPage, FetchPageBuilder, fetch_page};
