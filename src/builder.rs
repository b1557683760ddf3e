//! Seek-predicate query building for keyset pagination.
//!
//! [`CursorQueryBuilder`] turns a base query, declared sort fields and a
//! continuation token into SQL that resumes a sorted scan right after (or
//! before) the token's boundary row, instead of skipping rows with OFFSET.
//!
//! # How It Works
//!
//! The builder decodes the token on construction. Each declared sort field
//! gets a comparator from its direction: `>` for ASC and `<` for DESC, both
//! flipped when resuming from a previous-page token. `build` then emits
//!
//! ```text
//! <query> <where> <seek predicate> <group by> ORDER BY … LIMIT <limit + 1>
//! ```
//!
//! The extra row in the LIMIT is a lookahead: if it comes back, a further
//! page exists (see [`create_token`](crate::create_token)).
//!
//! # Multi-column seek predicate
//!
//! For `n >= 2` sort fields the predicate is an OR-chain where every clause
//! repeats the primary field's comparison:
//!
//! ```text
//! (f0 c0 ? OR (f0 c0 ? AND f1 c1 ?) OR (f0 c0 ? AND f2 c2 ?) …)
//! ```
//!
//! This is the established wire behavior and existing callers depend on it.
//! It is not the lexicographic keyset formula: rows that tie with the
//! boundary on the primary column are never matched, so tie-breaking on
//! secondary columns does not take effect.
//!
//! # Example
//!
//! ```
//! use keyset_cursor::{CursorQueryBuilder, SortDirection};
//!
//! let (sql, binds) = CursorQueryBuilder::new(3, "kwCiYTShMQ")
//!    .sort("a", SortDirection::Desc)
//!    .sort("id", SortDirection::Asc)
//!    .query("SELECT * FROM user")
//!    .build()
//!    .unwrap();
//!
//! assert_eq!(
//!    sql,
//!    "SELECT * FROM user WHERE (a < ? OR (a < ? AND id > ?)) ORDER BY a DESC, id ASC LIMIT 4"
//! );
//! assert_eq!(binds.len(), 3);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CodecConfig, CursorToken, Error, PageDirection, Result, Value};

/// Sort direction for a sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   /// SQL keyword for this direction.
   pub fn as_sql(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }
}

/// Comparison operator used by a sort field in the seek predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
   /// `>`
   Gt,
   /// `<`
   Lt,
}

impl Comparator {
   fn for_direction(direction: SortDirection, resume_prev: bool) -> Self {
      match (direction, resume_prev) {
         (SortDirection::Asc, false) | (SortDirection::Desc, true) => Comparator::Gt,
         (SortDirection::Desc, false) | (SortDirection::Asc, true) => Comparator::Lt,
      }
   }

   /// SQL operator for this comparator.
   pub fn as_sql(self) -> &'static str {
      match self {
         Comparator::Gt => ">",
         Comparator::Lt => "<",
      }
   }
}

impl fmt::Display for Comparator {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_sql())
   }
}

/// One declared sort dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
   /// Column identifier, interpolated into the SQL as given
   pub name: String,
   /// Declared direction, used for ORDER BY
   pub direction: SortDirection,
   /// Operator used in the seek predicate
   pub comparator: Comparator,
}

/// Builder for keyset-paginated SELECT queries.
///
/// Construct it per request, chain configuration calls, then call
/// [`build`](Self::build) once.
#[derive(Debug, Clone)]
pub struct CursorQueryBuilder {
   sort_fields: Vec<SortField>,
   values: Option<Vec<Value>>,
   limit: usize,
   query: String,
   where_clause: Option<String>,
   group: Option<String>,
   token: String,
   is_prev_token: bool,
}

impl CursorQueryBuilder {
   /// Create a builder for pages of `limit` rows resuming from `token`.
   ///
   /// A negative `limit` is clamped to 0, meaning unlimited (no LIMIT clause
   /// and no over-fetch). An empty `token` means the first page.
   pub fn new(limit: i64, token: impl Into<String>) -> Self {
      Self::with_config(limit, token, &CodecConfig::default())
   }

   /// Like [`new`](Self::new), decoding the token with custom limits.
   pub fn with_config(limit: i64, token: impl Into<String>, config: &CodecConfig) -> Self {
      let token = token.into();
      let decoded = CursorToken::decode_with(&token, config);

      let is_prev_token = decoded
         .as_ref()
         .is_some_and(|t| t.direction == PageDirection::Prev);

      Self {
         sort_fields: Vec::with_capacity(3),
         values: decoded.map(|t| t.values),
         limit: usize::try_from(limit).unwrap_or(0),
         query: String::new(),
         where_clause: None,
         group: None,
         token,
         is_prev_token,
      }
   }

   /// Append a sort field. Call order defines sort priority and must match
   /// the order of values in the tokens.
   pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
      self.sort_fields.push(SortField {
         name: field.into(),
         direction,
         comparator: Comparator::for_direction(direction, self.is_prev_token),
      });
      self
   }

   /// Set the base query, e.g. `SELECT * FROM user`.
   pub fn query(mut self, query: impl Into<String>) -> Self {
      self.query = query.into();
      self
   }

   /// Set the caller's own predicate. It is wrapped as `WHERE (predicate)`.
   pub fn where_clause(mut self, predicate: impl AsRef<str>) -> Self {
      self.where_clause = Some(format!("WHERE ({})", predicate.as_ref()));
      self
   }

   /// Set the GROUP BY columns.
   pub fn group(mut self, columns: impl AsRef<str>) -> Self {
      self.group = Some(format!("GROUP BY {}", columns.as_ref()));
      self
   }

   /// Page size; 0 means unlimited.
   pub fn limit(&self) -> usize {
      self.limit
   }

   /// The raw token this builder was created with.
   pub fn token(&self) -> &str {
      &self.token
   }

   /// Whether the token resumes a previous page.
   pub fn is_prev_token(&self) -> bool {
      self.is_prev_token
   }

   /// Declared sort fields, in declaration order.
   pub fn sort_fields(&self) -> &[SortField] {
      &self.sort_fields
   }

   /// Build the SQL and its bind values.
   pub fn build(&self) -> Result<(String, Vec<Value>)> {
      self.build_with(std::iter::empty::<Value>())
   }

   /// Build the SQL with extra bind values for placeholders in the caller's
   /// query or predicate.
   ///
   /// The extra binds come first, in the given order, followed by the seek
   /// predicate binds.
   pub fn build_with<I, V>(&self, binds: I) -> Result<(String, Vec<Value>)>
   where
      I: IntoIterator<Item = V>,
      V: Into<Value>,
   {
      self.validate()?;

      let mut bind_values: Vec<Value> = binds.into_iter().map(Into::into).collect();
      let mut segments = Vec::with_capacity(6);

      segments.push(self.query.clone());

      // The WHERE slot is kept even when blank
      segments.push(match &self.where_clause {
         Some(where_clause) => where_clause.clone(),
         None if !self.token.is_empty() => "WHERE".to_string(),
         None => String::new(),
      });

      if let Some(values) = &self.values {
         segments.push(self.build_seek_predicate(values, &mut bind_values));
      }

      if let Some(group) = &self.group {
         segments.push(group.clone());
      }

      segments.push(build_order_by(&self.sort_fields));

      if self.limit > 0 {
         segments.push(format!("LIMIT {}", self.limit.saturating_add(1)));
      }

      let sql = segments.join(" ");
      trace!(sql = %sql, binds = bind_values.len(), "Built cursor query");

      Ok((sql, bind_values))
   }

   fn validate(&self) -> Result<()> {
      if self.query.is_empty() {
         return Err(Error::NoQuery);
      }

      if self.sort_fields.is_empty() {
         return Err(Error::NoSort);
      }

      if !self.token.is_empty() {
         let Some(values) = &self.values else {
            return Err(Error::NoDataInToken);
         };

         if values.len() < self.sort_fields.len() {
            return Err(Error::InsufficientTokenValue {
               token_len: values.len(),
               sort_len: self.sort_fields.len(),
            });
         }
      }

      Ok(())
   }

   /// Build the seek predicate, appending its binds in clause order.
   fn build_seek_predicate(&self, values: &[Value], binds: &mut Vec<Value>) -> String {
      let first = &self.sort_fields[0];

      let predicate = if self.sort_fields.len() == 1 {
         binds.push(values[0].clone());
         format!("({} {} ?)", first.name, first.comparator)
      } else {
         let mut clauses = Vec::with_capacity(self.sort_fields.len());

         binds.push(values[0].clone());
         clauses.push(format!("{} {} ?", first.name, first.comparator));

         for (i, field) in self.sort_fields.iter().enumerate().skip(1) {
            binds.push(values[0].clone());
            binds.push(values[i].clone());
            clauses.push(format!(
               "({} {} ? AND {} {} ?)",
               first.name, first.comparator, field.name, field.comparator
            ));
         }

         format!("({})", clauses.join(" OR "))
      };

      if self.where_clause.is_some() {
         format!("AND {predicate}")
      } else {
         predicate
      }
   }
}

/// Build the ORDER BY clause from the declared sort directions.
fn build_order_by(sort_fields: &[SortField]) -> String {
   let parts: Vec<String> = sort_fields
      .iter()
      .map(|f| format!("{} {}", f.name, f.direction.as_sql()))
      .collect();

   format!("ORDER BY {}", parts.join(", "))
}
