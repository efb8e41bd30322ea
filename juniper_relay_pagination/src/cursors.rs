use crate::CursorValue;
use crate::cursor_errors::CursorError;
use base64::prelude::*;
use juniper::GraphQLScalar;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

fn codec_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Opaque pagination cursor.
///
/// A cursor points at a single record within an ordered connection. It carries the identifier of
/// the record and, when the connection is ordered by something other than the identifier, the
/// value(s) of the ordering field(s) for that record:
///
/// - ordered by identifier only: `value` is `None`
/// - ordered by one field: `value` is that field's value
/// - ordered by several fields: `value` is a `CursorValue::List` with one entry per field
///
/// On the wire a cursor is a compact binary record, base64 encoded with the url safe alphabet and
/// no padding. Clients must treat it as a black box.
///
/// Cursors minted through `OrderSpec::to_cursor` also carry a fingerprint of the ordering they were
/// minted under, so that they can be rejected if replayed against a different ordering.
#[derive(Debug, GraphQLScalar, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[graphql(
    name = "Cursor",
    description = "An opaque cursor pointing at an edge within a connection.",
    to_output_with = Self::to_output,
    from_input_with = Self::from_input,
    parse_token(String)
)]
pub struct Cursor {
    /// Identifier of the record this cursor points at.
    #[serde(rename = "i")]
    pub id: CursorValue,

    /// Value(s) of the ordering field(s) for the record.
    #[serde(rename = "v")]
    pub value: Option<CursorValue>,

    /// Fingerprint of the ordering the cursor was minted under.
    #[serde(rename = "o")]
    pub order: Option<u32>,
}

impl Cursor {
    /// A cursor for a connection ordered by identifier only.
    pub fn new(id: impl Into<CursorValue>) -> Self {
        Cursor {
            id: id.into(),
            value: None,
            order: None,
        }
    }

    /// A cursor carrying the value(s) of the ordering field(s) alongside the identifier.
    pub fn with_value(id: impl Into<CursorValue>, value: impl Into<CursorValue>) -> Self {
        Cursor {
            id: id.into(),
            value: Some(value.into()),
            order: None,
        }
    }

    /// Stamps the fingerprint of the ordering this cursor belongs to.
    pub fn with_order(mut self, fingerprint: u32) -> Self {
        self.order = Some(fingerprint);
        self
    }

    /// Builds the base64 encoded variant of the cursor.
    /// Uses the url safe alphabet without padding.
    pub fn to_encoded_string(&self) -> String {
        let payload = bincode::serde::encode_to_vec(self, codec_config())
            .expect("cursor values always encode");
        BASE64_URL_SAFE_NO_PAD.encode(payload)
    }

    /// Builds a cursor from its base64 encoded form.
    /// Returns a CursorError if the decoding fails.
    pub fn from_encoded_string(input: &str) -> Result<Cursor, CursorError> {
        let payload = BASE64_URL_SAFE_NO_PAD.decode(input)?;
        if payload.is_empty() {
            return Err(CursorError::MissingIdentifier);
        }

        let (cursor, read): (Cursor, usize) =
            bincode::serde::decode_from_slice(&payload, codec_config())?;
        if read != payload.len() {
            return Err(CursorError::InvalidRecord(format!(
                "{} trailing bytes",
                payload.len() - read
            )));
        }
        Ok(cursor)
    }

    // ------------- GraphQLScalar implementations --------------

    fn to_output(&self) -> String {
        self.to_encoded_string()
    }

    fn from_input(input: &str) -> Result<Self, Box<str>> {
        Self::from_encoded_string(input).map_err(|err| err.to_string().into_boxed_str())
    }
}

/// Decodes a cursor from its base64 encoded form.
///
/// ```rust
/// use juniper_relay_pagination::{cursor_from_encoded_string, Cursor};
///
/// let token = Cursor::with_value(2, "two").to_encoded_string();
/// let decoded = cursor_from_encoded_string(&token).unwrap();
/// assert_eq!(decoded, Cursor::with_value(2, "two"));
/// ```
pub fn cursor_from_encoded_string(input: &str) -> Result<Cursor, CursorError> {
    Cursor::from_encoded_string(input)
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_encoded_string())
    }
}
