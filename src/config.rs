//! Configuration for cursor token decoding

/// Limits applied when decoding a cursor token.
///
/// Tokens travel through untrusted clients, so decoding is bounded. A token
/// that exceeds either limit is treated the same as a corrupt token: it
/// decodes to nothing and pagination restarts from the first page.
///
/// # Examples
///
/// ```
/// use keyset_cursor::CodecConfig;
///
/// // Use defaults
/// let config = CodecConfig::default();
///
/// // Override just one field
/// let config = CodecConfig {
///    max_values: 4,
///    ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CodecConfig {
   /// Maximum length of the encoded token string, in bytes
   ///
   /// Default: 4096
   pub max_token_len: usize,

   /// Maximum number of sort values a token may carry
   ///
   /// Default: 16
   pub max_values: usize,
}

impl Default for CodecConfig {
   fn default() -> Self {
      Self {
         max_token_len: 4 * 1024,
         max_values: 16,
      }
   }
}
