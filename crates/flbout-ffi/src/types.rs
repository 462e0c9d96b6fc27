use std::ffi::c_void;
use std::os::raw::c_char;

use flbout_decode::EventStreamDecoder;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlbStatus {
    Ok = 0,
    EndOfStream = 1,
    DecodeError = 2,
    InvalidArgument = 3,
    Internal = 99,
}

#[allow(dead_code)]
pub const FLB_OK: FlbStatus = FlbStatus::Ok;
#[allow(dead_code)]
pub const FLB_END_OF_STREAM: FlbStatus = FlbStatus::EndOfStream;
#[allow(dead_code)]
pub const FLB_ERR_DECODE: FlbStatus = FlbStatus::DecodeError;
#[allow(dead_code)]
pub const FLB_ERR_INVALID_ARGUMENT: FlbStatus = FlbStatus::InvalidArgument;
#[allow(dead_code)]
pub const FLB_ERR_INTERNAL: FlbStatus = FlbStatus::Internal;

/// Bumped whenever `FlbEvent` or the status codes change.
pub const FLB_ABI_VERSION: u32 = 1;

/// Record body was the plain `[ts, record]` layout.
pub const FLB_SHAPE_PLAIN: u8 = 0;
/// Record body carried a metadata map, which was dropped.
pub const FLB_SHAPE_WITH_METADATA: u8 = 1;

/// One decoded event as seen from C.
///
/// `record_json` is a NUL-terminated JSON object owned by this library;
/// release it with `flb_event_free`.
#[repr(C)]
#[derive(Debug)]
pub struct FlbEvent {
    pub seconds: i64,
    pub nanoseconds: u32,
    pub shape: u8,
    pub record_json: *mut c_char,
    pub record_len: usize,
}

impl Default for FlbEvent {
    fn default() -> Self {
        Self {
            seconds: 0,
            nanoseconds: 0,
            shape: FLB_SHAPE_PLAIN,
            record_json: std::ptr::null_mut(),
            record_len: 0,
        }
    }
}

pub type FlbDecoderHandle = *mut c_void;

/// Decoder over a caller-owned buffer that outlives the handle.
pub(crate) struct DecoderHandle {
    pub(crate) decoder: EventStreamDecoder<'static>,
}
