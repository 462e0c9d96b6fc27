/// Errors that can occur while decoding an event batch.
///
/// Every variant is terminal for the stream it was raised on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A read requested more bytes than remain in the buffer.
    #[error("read of {needed} bytes at offset {offset} exceeds buffer ({remaining} remaining)")]
    OutOfBounds {
        needed: usize,
        remaining: usize,
        offset: usize,
    },

    /// The tag byte does not match any recognized encoding.
    #[error("unsupported format tag 0x{tag:02x} at offset {offset}")]
    UnsupportedFormatTag { tag: u8, offset: usize },

    /// A fixed-arity array carries the wrong number of elements.
    #[error("{context}: expected array of {expected} elements, found {found}")]
    UnexpectedArity {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A well-formed value of the wrong type sits in a fixed position.
    #[error("{context}: unexpected value (tag 0x{tag:02x}) at offset {offset}")]
    UnexpectedType {
        context: &'static str,
        tag: u8,
        offset: usize,
    },

    /// A map key is neither a string nor binary.
    #[error("map key at offset {offset} must be a string or binary (tag 0x{tag:02x})")]
    InvalidKey { tag: u8, offset: usize },

    /// A string payload is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// A map repeats a key while duplicates are rejected.
    #[error("duplicate map key {key:?}")]
    DuplicateKey { key: String },

    /// Arrays and maps are nested deeper than allowed.
    #[error("nesting exceeds maximum depth of {max}")]
    DepthLimitExceeded { max: usize },

    /// The decoder already failed; its cursor position is meaningless.
    #[error("decoder already failed and cannot be reused")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, DecodeError>;
