//! flbout-ffi: C-ABI exports for decoding Fluent Bit output-plugin buffers.
//!
//! The host hands over `(data, len)` once per flush. The pointer is checked
//! and turned into a slice here; the decoder only ever sees that slice.
//!
//! Every export runs inside a panic guard. A panic surfaces as
//! `FlbStatus::Internal` (or a null handle) with its message in
//! `flb_last_error`.

mod args;
mod decoder;
mod error;
mod types;

use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};

pub use decoder::{
    flb_decode_count, flb_decoder_free, flb_decoder_new, flb_decoder_next, flb_event_free,
};
pub use types::{
    FlbDecoderHandle, FlbEvent, FlbStatus, FLB_ABI_VERSION, FLB_END_OF_STREAM, FLB_ERR_DECODE,
    FLB_ERR_INTERNAL, FLB_ERR_INVALID_ARGUMENT, FLB_OK, FLB_SHAPE_PLAIN, FLB_SHAPE_WITH_METADATA,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        error::set_panic_error(&*payload);
        on_panic
    })
}

/// Reset per-thread state. Call once per plugin instance.
#[no_mangle]
pub extern "C" fn flb_init() -> FlbStatus {
    ffi_boundary(FlbStatus::Internal, || {
        error::clear_error_state();
        FlbStatus::Ok
    })
}

#[no_mangle]
pub extern "C" fn flb_cleanup() {
    ffi_boundary((), error::clear_error_state);
}

/// Layout version of [`FlbEvent`] and the status codes.
///
/// Hosts compare it against the header they were built with.
#[no_mangle]
pub extern "C" fn flb_abi_version() -> u32 {
    FLB_ABI_VERSION
}

/// Message for the last failed call on this thread; empty after success.
///
/// The pointer stays valid until the next `flb_*` call on the same thread.
#[no_mangle]
pub extern "C" fn flb_last_error() -> *const c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
