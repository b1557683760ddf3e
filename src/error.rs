/// Result type alias for cursor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cursor token and query building operations.
///
/// Validation errors describe a malformed request and can be fixed by the
/// caller. Token creation errors are internal: the cursor could not be
/// produced even though the request itself was fine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// No base query was set on the builder.
   #[error("no query")]
   NoQuery,

   /// The builder has no sort fields.
   #[error("cursor requires at least one sort field")]
   NoSort,

   /// A token was supplied but carried no decodable data.
   #[error("no data in token")]
   NoDataInToken,

   /// The token carries fewer values than there are sort fields.
   #[error("token has {token_len} values but {sort_len} sort field(s) are declared")]
   InsufficientTokenValue { token_len: usize, sort_len: usize },

   /// The next-page token payload could not be serialized.
   #[error("unable to create next token: {0}")]
   UnableCreateNextToken(#[source] rmp_serde::encode::Error),

   /// A value cannot be represented as a cursor scalar.
   #[error("unsupported cursor value: {0}")]
   UnsupportedValue(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::NoQuery => "NO_QUERY".to_string(),
         Error::NoSort => "NO_SORT".to_string(),
         Error::NoDataInToken => "NO_DATA_IN_TOKEN".to_string(),
         Error::InsufficientTokenValue { .. } => "INSUFFICIENT_TOKEN_VALUE".to_string(),
         Error::UnableCreateNextToken(_) => "UNABLE_CREATE_NEXT_TOKEN".to_string(),
         Error::UnsupportedValue(_) => "UNSUPPORTED_VALUE".to_string(),
      }
   }

   /// Whether the error was caused by the request rather than by a failure
   /// to produce a cursor.
   pub fn is_validation(&self) -> bool {
      !matches!(self, Error::UnableCreateNextToken(_))
   }
}
