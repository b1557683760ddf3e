//! Conversion between SQLite values and cursor scalars

use indexmap::IndexMap;
use keyset_cursor::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow, SqliteValueRef};
use sqlx::{Decode, Sqlite, TypeInfo, ValueRef};

use crate::Error;

/// A decoded result row, keyed by column name in select order.
pub type Row = IndexMap<String, Value>;

/// Bind one cursor scalar onto a query.
pub fn bind_value<'a>(
   query: sqlx::query::Query<'a, Sqlite, SqliteArguments<'a>>,
   value: Value,
) -> sqlx::query::Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      Value::Null => query.bind(None::<i64>),
      Value::Bool(v) => query.bind(v),
      Value::Int(v) => query.bind(v),
      Value::Float(v) => query.bind(v),
      Value::Text(v) => query.bind(v),
   }
}

/// Decode SQLite rows into column-name → value maps.
pub fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<Row>, Error> {
   use sqlx::{Column, Row as _};

   let mut values = Vec::with_capacity(rows.len());
   for row in rows {
      let mut value = IndexMap::default();
      for (i, column) in row.columns().iter().enumerate() {
         let v = row.try_get_raw(i)?;
         value.insert(column.name().to_string(), to_value(v)?);
      }
      values.push(value);
   }
   Ok(values)
}

/// Map a raw SQLite value by its storage class.
fn to_value(raw: SqliteValueRef<'_>) -> Result<Value, Error> {
   if raw.is_null() {
      return Ok(Value::Null);
   }

   let type_name = raw.type_info().name().to_string();
   match type_name.as_str() {
      "INTEGER" | "BOOLEAN" => decode::<i64>(raw).map(Value::Int),
      "REAL" => decode::<f64>(raw).map(Value::Float),
      "TEXT" => decode::<String>(raw).map(Value::Text),
      other => Err(Error::UnsupportedDatatype(other.to_string())),
   }
}

fn decode<'r, T: Decode<'r, Sqlite>>(raw: SqliteValueRef<'r>) -> Result<T, Error> {
   T::decode(raw).map_err(|e| Error::Sqlx(sqlx::Error::Decode(e)))
}
