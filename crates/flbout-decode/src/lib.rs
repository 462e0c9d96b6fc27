//! Decoder for the event buffers Fluent Bit hands to output plugins.
//!
//! A flush delivers one contiguous batch of MessagePack-encoded events. Every
//! event is a two element array, `[timestamp, body]`, where the body is either
//! the record map itself or a `[metadata, record]` pair:
//! - The timestamp is a `fixext8` EventTime (big-endian seconds + nanoseconds)
//!   or a plain integer of seconds
//! - Metadata maps are validated and dropped, never surfaced
//! - Keys stay strings or raw binary exactly as the producer wrote them
//!
//! Decoding borrows the batch, never copies it wholesale, and stops hard at
//! the first malformed byte.

pub mod config;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod event;
pub mod time;
pub mod value;

pub use config::{DecoderConfig, DuplicateKeys, Utf8Mode, DEFAULT_MAX_DEPTH};
pub use cursor::BufferCursor;
pub use decoder::{DecodeStatus, EventStreamDecoder};
pub use error::{DecodeError, Result};
pub use event::{BodyShape, Event};
pub use time::{EventTime, TimeEncoding};
pub use value::{Key, Record, Value};
