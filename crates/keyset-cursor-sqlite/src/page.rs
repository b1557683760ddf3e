//! Fetching one cursor page from SQLite

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use keyset_cursor::{CursorQueryBuilder, Value, create_token_for_rows};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::Error;
use crate::decode::{Row, bind_value, decode_rows};

/// A page of results with its continuation tokens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage {
   /// The rows in this page, in query order
   pub rows: Vec<Row>,
   /// Token for the following page, or empty when this is the last page
   pub next_token: String,
   /// Token for the preceding page, or empty on the first page
   pub prev_token: String,
   /// Whether a following page exists
   pub has_more: bool,
}

/// Builder for one keyset-paginated SELECT against a pool
pub struct FetchPageBuilder {
   pool: SqlitePool,
   cursor: CursorQueryBuilder,
   values: Vec<Value>,
}

impl FetchPageBuilder {
   pub(crate) fn new(pool: SqlitePool, cursor: CursorQueryBuilder) -> Self {
      Self {
         pool,
         cursor,
         values: Vec::new(),
      }
   }

   /// Bind values for placeholders in the base query or WHERE predicate.
   ///
   /// They are bound ahead of the seek predicate values.
   pub fn bind(mut self, values: Vec<Value>) -> Self {
      self.values = values;
      self
   }

   /// Execute the query and return a page of results
   pub async fn execute(self) -> Result<CursorPage, Error> {
      let (sql, binds) = self.cursor.build_with(self.values)?;

      let mut q = sqlx::query(&sql);
      for value in binds {
         q = bind_value(q, value);
      }
      let rows = q.fetch_all(&self.pool).await?;

      let mut rows = decode_rows(rows)?;

      let columns = resolve_sort_columns(&self.cursor, rows.first())?;
      let (next_token, prev_token) = create_token_for_rows(
         self.cursor.token(),
         self.cursor.limit(),
         &mut rows,
         |row| {
            columns
               .iter()
               .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
               .collect()
         },
      )?;

      let has_more = !next_token.is_empty();
      debug!(rows = rows.len(), has_more, "Fetched cursor page");

      Ok(CursorPage {
         rows,
         next_token,
         prev_token,
         has_more,
      })
   }
}

impl IntoFuture for FetchPageBuilder {
   type Output = Result<CursorPage, Error>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Start a page fetch for `cursor` on `pool`.
pub fn fetch_page(pool: &SqlitePool, cursor: CursorQueryBuilder) -> FetchPageBuilder {
   FetchPageBuilder::new(pool.clone(), cursor)
}

/// Map each sort field to the result column holding its value.
///
/// A qualified name such as `p.id` falls back to its bare column `id`, since
/// SQLite drops the qualifier from result column names.
fn resolve_sort_columns(
   cursor: &CursorQueryBuilder,
   first_row: Option<&Row>,
) -> Result<Vec<String>, Error> {
   let Some(row) = first_row else {
      // Nothing to mint tokens from
      return Ok(Vec::new());
   };

   cursor
      .sort_fields()
      .iter()
      .map(|field| {
         if row.contains_key(&field.name) {
            return Ok(field.name.clone());
         }

         match field.name.rsplit_once('.') {
            Some((_, bare)) if row.contains_key(bare) => Ok(bare.to_string()),
            _ => Err(Error::CursorColumnNotFound {
               column: field.name.clone(),
            }),
         }
      })
      .collect()
}
