//! Cursor token codec and page token minting.
//!
//! A token is the tuple `[direction_flag, v1, v2, …, vn]` serialized as a
//! MessagePack array and encoded with the URL-safe base64 alphabet. The
//! values are the sort-column values of a page's boundary row, in sort-field
//! order.
//!
//! Decoding fails soft: an empty, oversized, corrupt or forged token decodes
//! to `None` and pagination restarts from the first page. Callers that must
//! detect tampering have to verify the token's provenance (e.g. a signature)
//! before handing it to this crate.
//!
//! Bytes trailing the MessagePack array are ignored, so a token stays readable
//! by decoders that tolerate leftover input.
//!
//! # Example
//!
//! ```
//! use keyset_cursor::{CursorToken, PageDirection, Value};
//!
//! let token = CursorToken::next(vec![Value::from("a4"), Value::from(1)]);
//! let encoded = token.encode().unwrap();
//!
//! let decoded = CursorToken::decode(&encoded).unwrap();
//! assert_eq!(decoded.direction, PageDirection::Next);
//! assert_eq!(decoded.values, token.values);
//! ```

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine as _, alphabet};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CodecConfig, Error, Result, Value};

/// URL-safe alphabet, unpadded on encode. Padded tokens are still accepted.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
   &alphabet::URL_SAFE,
   GeneralPurposeConfig::new()
      .with_encode_padding(false)
      .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Which page a token resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageDirection {
   /// Continue after the boundary row (flag `0`)
   Next,
   /// Go back before the boundary row (flag `1`)
   Prev,
}

impl PageDirection {
   /// Wire flag for this direction.
   pub fn flag(self) -> i64 {
      match self {
         PageDirection::Next => 0,
         PageDirection::Prev => 1,
      }
   }

   /// Parse a wire flag. Anything other than `0` or `1` is rejected.
   pub fn from_flag(flag: i64) -> Option<Self> {
      match flag {
         0 => Some(PageDirection::Next),
         1 => Some(PageDirection::Prev),
         _ => None,
      }
   }
}

/// A decoded cursor token: page direction plus boundary-row sort values.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorToken {
   /// Page direction the token resumes
   pub direction: PageDirection,
   /// Sort-column values of the boundary row, in sort-field order
   pub values: Vec<Value>,
}

impl CursorToken {
   /// Token for `direction` with the given boundary values.
   pub fn new(direction: PageDirection, values: Vec<Value>) -> Self {
      Self { direction, values }
   }

   /// Token that resumes after the given boundary values.
   pub fn next(values: Vec<Value>) -> Self {
      Self::new(PageDirection::Next, values)
   }

   /// Token that resumes before the given boundary values.
   pub fn prev(values: Vec<Value>) -> Self {
      Self::new(PageDirection::Prev, values)
   }

   /// Encode into an opaque, URL-safe string.
   ///
   /// Encoding is deterministic: equal tokens always produce equal strings.
   pub fn encode(&self) -> std::result::Result<String, rmp_serde::encode::Error> {
      let bytes = rmp_serde::to_vec(&TokenPayload {
         direction: self.direction,
         values: &self.values,
      })?;

      Ok(TOKEN_ENGINE.encode(bytes))
   }

   /// Decode a token using the default [`CodecConfig`].
   ///
   /// Returns `None` for an empty or undecodable token.
   pub fn decode(token: &str) -> Option<Self> {
      Self::decode_with(token, &CodecConfig::default())
   }

   /// Decode a token, enforcing the limits in `config`.
   pub fn decode_with(token: &str, config: &CodecConfig) -> Option<Self> {
      if token.is_empty() {
         return None;
      }

      if token.len() > config.max_token_len {
         debug!(
            len = token.len(),
            max = config.max_token_len,
            "Discarding oversized cursor token"
         );
         return None;
      }

      let bytes = match TOKEN_ENGINE.decode(token) {
         Ok(bytes) => bytes,
         Err(e) => {
            debug!(error = %e, "Discarding cursor token with invalid base64");
            return None;
         }
      };

      let mut fields: Vec<Value> = match rmp_serde::from_slice(&bytes) {
         Ok(fields) => fields,
         Err(e) => {
            debug!(error = %e, "Discarding cursor token with unreadable payload");
            return None;
         }
      };

      let direction = match fields.first() {
         Some(Value::Int(flag)) => PageDirection::from_flag(*flag),
         _ => None,
      };
      let Some(direction) = direction else {
         debug!("Discarding cursor token without a direction flag");
         return None;
      };

      if fields.len() - 1 > config.max_values {
         debug!(
            values = fields.len() - 1,
            max = config.max_values,
            "Discarding cursor token with too many values"
         );
         return None;
      }

      fields.remove(0);

      Some(Self {
         direction,
         values: fields,
      })
   }
}

/// Borrowed view serialized as the flat tuple `[flag, v1, …, vn]`.
struct TokenPayload<'a> {
   direction: PageDirection,
   values: &'a [Value],
}

impl Serialize for TokenPayload<'_> {
   fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
      let mut seq = serializer.serialize_seq(Some(self.values.len() + 1))?;
      seq.serialize_element(&self.direction.flag())?;
      for value in self.values {
         seq.serialize_element(value)?;
      }
      seq.end()
   }
}

/// Shape of a fetched page after over-fetch accounting.
struct PageWindow {
   /// Row count once the lookahead row is dropped
   len: usize,
   /// Whether the lookahead row was present
   has_more: bool,
}

/// Returns `None` when no token can be minted (unlimited query or empty page).
fn page_window(limit: usize, length: usize) -> Option<PageWindow> {
   if limit == 0 || length == 0 {
      return None;
   }

   let has_more = length > limit;
   let len = if has_more { length - 1 } else { length };

   Some(PageWindow { len, has_more })
}

fn mint_next_token(values: Vec<Value>) -> Result<String> {
   CursorToken::next(values)
      .encode()
      .map_err(Error::UnableCreateNextToken)
}

/// Previous-page tokens are best effort: a failure yields an empty token.
fn mint_prev_token(values: Vec<Value>) -> String {
   CursorToken::prev(values).encode().unwrap_or_else(|e| {
      debug!(error = %e, "Unable to create previous token");
      String::new()
   })
}

fn mint_tokens(
   current_token: &str,
   window: &PageWindow,
   mut sort_values: impl FnMut(usize) -> Vec<Value>,
) -> Result<(String, String)> {
   // The first page has nothing before it
   let wants_prev = !current_token.is_empty();

   let mut first_row = None;
   let next_token = if window.has_more {
      let boundary = window.len - 1;
      let values = sort_values(boundary);
      if boundary == 0 && wants_prev {
         // Single-row page: both tokens share row 0
         first_row = Some(values.clone());
      }
      mint_next_token(values)?
   } else {
      String::new()
   };

   let prev_token = if wants_prev {
      mint_prev_token(first_row.unwrap_or_else(|| sort_values(0)))
   } else {
      String::new()
   };

   Ok((next_token, prev_token))
}

/// Mint the next- and previous-page tokens for a fetched page.
///
/// `length` is the number of rows returned by a query built with
/// [`CursorQueryBuilder`](crate::CursorQueryBuilder), which over-fetches one
/// row. When `length > limit` the last row is only a lookahead:
/// `truncate(length - 1)` is called so the caller drops it, and the row
/// before it becomes the page boundary.
///
/// `sort_values(i)` must return the sort-column values of row `i`, in
/// sort-field order. It is only called for rows whose values end up in a
/// token.
///
/// - The next token is minted only when a further page exists.
/// - The previous token is minted only when `current_token` is non-empty.
/// - Both are empty when `limit` or `length` is zero.
///
/// Failing to serialize the next token is an error; failing to serialize the
/// previous token yields an empty previous token.
pub fn create_token<A, T>(
   current_token: &str,
   limit: usize,
   length: usize,
   sort_values: A,
   truncate: T,
) -> Result<(String, String)>
where
   A: FnMut(usize) -> Vec<Value>,
   T: FnOnce(usize),
{
   let Some(window) = page_window(limit, length) else {
      return Ok((String::new(), String::new()));
   };

   if window.has_more {
      truncate(window.len);
   }

   mint_tokens(current_token, &window, sort_values)
}

/// Mint only the next-page token, for forward-only cursors.
///
/// Over-fetch handling matches [`create_token`].
pub fn create_next_token<A, T>(
   _current_token: &str,
   limit: usize,
   length: usize,
   mut sort_values: A,
   truncate: T,
) -> Result<String>
where
   A: FnMut(usize) -> Vec<Value>,
   T: FnOnce(usize),
{
   let Some(window) = page_window(limit, length) else {
      return Ok(String::new());
   };

   if !window.has_more {
      return Ok(String::new());
   }

   truncate(window.len);
   mint_next_token(sort_values(window.len - 1))
}

/// [`create_token`] over an owned row vector.
///
/// Drops the lookahead row from `rows` in place and reads boundary values
/// with `sort_values`.
pub fn create_token_for_rows<R, K>(
   current_token: &str,
   limit: usize,
   rows: &mut Vec<R>,
   sort_values: K,
) -> Result<(String, String)>
where
   K: Fn(&R) -> Vec<Value>,
{
   let Some(window) = page_window(limit, rows.len()) else {
      return Ok((String::new(), String::new()));
   };

   if window.has_more {
      rows.truncate(window.len);
   }

   mint_tokens(current_token, &window, |i| sort_values(&rows[i]))
}

#[cfg(test)]
mod tests {
   use super::*;

   fn encode_raw(fields: Vec<Value>) -> String {
      TOKEN_ENGINE.encode(rmp_serde::to_vec(&fields).unwrap())
   }

   // ─── encode ───

   #[test]
   fn encodes_flat_msgpack_tuple() {
      let token = CursorToken::next(vec![Value::from("a4"), Value::from("1")]);

      // [0, "a4", "1"] = 93 00 a2 61 34 a1 31
      assert_eq!(token.encode().unwrap(), "kwCiYTShMQ");
   }

   #[test]
   fn encode_is_deterministic() {
      let token = CursorToken::prev(vec![Value::Int(42), Value::Float(1.5), Value::Bool(true)]);

      assert_eq!(token.encode().unwrap(), token.encode().unwrap());
   }

   #[test]
   fn encoded_token_is_url_safe() {
      let token = CursorToken::next(vec![Value::from("??>>~~\u{ff}\u{fe}")]);
      let encoded = token.encode().unwrap();

      assert!(
         encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
      );
   }

   // ─── decode ───

   #[test]
   fn decodes_padded_token() {
      let token = CursorToken::decode("kwCiYTShMQ==").unwrap();

      assert_eq!(token.direction, PageDirection::Next);
      assert_eq!(token.values, vec![Value::from("a4"), Value::from("1")]);
   }

   #[test]
   fn decodes_previous_direction() {
      let encoded = encode_raw(vec![Value::Int(1), Value::Int(9)]);
      let token = CursorToken::decode(&encoded).unwrap();

      assert_eq!(token.direction, PageDirection::Prev);
      assert_eq!(token.values, vec![Value::Int(9)]);
   }

   #[test]
   fn decode_preserves_value_types() {
      let values = vec![
         Value::Int(-7),
         Value::Float(2.0),
         Value::from("2"),
         Value::Bool(false),
         Value::Null,
      ];
      let encoded = CursorToken::next(values.clone()).encode().unwrap();

      assert_eq!(CursorToken::decode(&encoded).unwrap().values, values);
   }

   #[test]
   fn empty_token_decodes_to_none() {
      assert_eq!(CursorToken::decode(""), None);
   }

   #[test]
   fn invalid_base64_decodes_to_none() {
      assert_eq!(CursorToken::decode("not a token!"), None);
   }

   #[test]
   fn non_tuple_payload_decodes_to_none() {
      // A bare msgpack integer
      assert_eq!(CursorToken::decode(&TOKEN_ENGINE.encode([0x05u8])), None);
   }

   #[test]
   fn empty_tuple_decodes_to_none() {
      assert_eq!(CursorToken::decode(&encode_raw(vec![])), None);
   }

   #[test]
   fn unknown_direction_flag_decodes_to_none() {
      assert_eq!(
         CursorToken::decode(&encode_raw(vec![Value::Int(2), Value::from("a")])),
         None
      );
      assert_eq!(
         CursorToken::decode(&encode_raw(vec![Value::from("0"), Value::from("a")])),
         None
      );
   }

   #[test]
   fn oversized_token_decodes_to_none() {
      let values = vec![Value::from("x".repeat(128))];
      let encoded = CursorToken::next(values).encode().unwrap();
      let config = CodecConfig {
         max_token_len: 64,
         ..Default::default()
      };

      assert_eq!(CursorToken::decode_with(&encoded, &config), None);
      assert!(CursorToken::decode(&encoded).is_some());
   }

   #[test]
   fn too_many_values_decodes_to_none() {
      let values: Vec<Value> = (0..5).map(Value::from).collect();
      let encoded = CursorToken::next(values).encode().unwrap();
      let config = CodecConfig {
         max_values: 4,
         ..Default::default()
      };

      assert_eq!(CursorToken::decode_with(&encoded, &config), None);
   }

   // ─── page_window ───

   #[test]
   fn window_drops_lookahead_row() {
      let window = page_window(3, 4).unwrap();
      assert_eq!(window.len, 3);
      assert!(window.has_more);
   }

   #[test]
   fn window_without_lookahead() {
      let window = page_window(3, 2).unwrap();
      assert_eq!(window.len, 2);
      assert!(!window.has_more);
   }

   #[test]
   fn window_absent_for_unlimited_or_empty() {
      assert!(page_window(0, 4).is_none());
      assert!(page_window(3, 0).is_none());
   }

   // ─── PageDirection ───

   #[test]
   fn direction_flags() {
      assert_eq!(PageDirection::Next.flag(), 0);
      assert_eq!(PageDirection::Prev.flag(), 1);
      assert_eq!(PageDirection::from_flag(1), Some(PageDirection::Prev));
      assert_eq!(PageDirection::from_flag(-1), None);
   }
}
