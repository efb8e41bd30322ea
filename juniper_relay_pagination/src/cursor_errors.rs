/// Errors raised while decoding an opaque cursor string.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CursorError {
    /// The cursor string is not valid unpadded url-safe base64.
    #[error("cursor is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The cursor decoded to nothing, so there is no identifier to resume from.
    #[error("cursor is missing an identifier")]
    MissingIdentifier,

    /// The decoded bytes are not a cursor record.
    #[error("cursor payload is malformed: {0}")]
    InvalidRecord(String),
}

impl From<bincode::error::DecodeError> for CursorError {
    fn from(err: bincode::error::DecodeError) -> Self {
        CursorError::InvalidRecord(err.to_string())
    }
}
