/// Default maximum nesting of arrays and maps inside one event.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How a map that repeats a key is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// Later values replace earlier ones; the key keeps its first position.
    #[default]
    LastWins,
    /// The first value is kept and later ones are dropped.
    FirstWins,
    /// A repeated key fails the decode with `DecodeError::DuplicateKey`.
    Reject,
}

/// How string payloads that are not UTF-8 are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Mode {
    /// Fail the decode with `DecodeError::InvalidUtf8`.
    #[default]
    Strict,
    /// Replace invalid sequences with U+FFFD.
    Lossy,
}

/// Controls decoder limits and policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting depth of arrays and maps. Default: 64.
    pub max_depth: usize,
    /// Duplicate map key resolution. Default: last write wins.
    pub duplicate_keys: DuplicateKeys,
    /// Handling of non-UTF-8 strings. Default: strict.
    pub utf8: Utf8Mode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeys::default(),
            utf8: Utf8Mode::default(),
        }
    }
}
