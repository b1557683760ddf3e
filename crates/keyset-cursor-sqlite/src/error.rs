/// Result type alias for SQLite page operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for running cursor pages against SQLite.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from building the cursor query or minting tokens.
   #[error(transparent)]
   Cursor(#[from] keyset_cursor::Error),

   /// SQLite storage class that cannot be mapped to a cursor value.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Sort column not found in query results.
   #[error("sort column '{column}' not found in query results")]
   CursorColumnNotFound { column: String },
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::Cursor(e) => e.error_code(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::CursorColumnNotFound { .. } => "CURSOR_COLUMN_NOT_FOUND".to_string(),
      }
   }
}
