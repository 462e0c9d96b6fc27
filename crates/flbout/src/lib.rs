//! Decode the event batches Fluent Bit hands to output plugins.
//!
//! # Crate Structure
//!
//! - [`decode`]: MessagePack event stream decoder and value model
//!
//! The C ABI lives in the separate `flbout-ffi` crate.

/// Re-export decoder types.
pub mod decode {
    pub use flbout_decode::*;
}
