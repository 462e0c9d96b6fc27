use std::ffi::CString;
use std::ptr;

use flbout_decode::{BodyShape, Event, EventStreamDecoder};

use crate::args;
use crate::error;
use crate::types::{
    DecoderHandle, FlbDecoderHandle, FlbEvent, FlbStatus, FLB_SHAPE_PLAIN, FLB_SHAPE_WITH_METADATA,
};

fn with_decoder_mut<T>(
    handle: FlbDecoderHandle,
    on_error: T,
    f: impl FnOnce(&mut DecoderHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("decoder handle cannot be null");
        return on_error;
    }

    let decoder_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut DecoderHandle) }
    };

    f(decoder_handle)
}

fn release_record(event: &mut FlbEvent) {
    if !event.record_json.is_null() {
        // SAFETY: `record_json` is only ever set from `CString::into_raw` below.
        unsafe {
            drop(CString::from_raw(event.record_json));
        }
    }
    *event = FlbEvent::default();
}

fn write_event_out(out: &mut FlbEvent, event: &Event) -> FlbStatus {
    release_record(out);

    let json = match serde_json::to_string(&event.record) {
        Ok(json) => json,
        Err(err) => return error::set_internal(format!("record serialization failed: {err}")),
    };
    let record_len = json.len();
    let record_json = match CString::new(json) {
        Ok(json) => json,
        Err(err) => return error::set_internal(format!("record serialization failed: {err}")),
    };

    out.seconds = event.timestamp.seconds();
    out.nanoseconds = event.timestamp.nanoseconds();
    out.shape = match event.shape {
        BodyShape::Plain => FLB_SHAPE_PLAIN,
        BodyShape::WithMetadata => FLB_SHAPE_WITH_METADATA,
    };
    out.record_json = record_json.into_raw();
    out.record_len = record_len;

    FlbStatus::Ok
}

/// Create a decoder over a delivered event buffer.
///
/// Returns null on invalid arguments; see `flb_last_error`.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes. The
/// buffer must stay alive and unmodified until `flb_decoder_free` is called.
#[no_mangle]
pub unsafe extern "C" fn flb_decoder_new(data: *const u8, len: usize) -> FlbDecoderHandle {
    crate::ffi_boundary(ptr::null_mut(), || {
        error::clear_error_state();

        let bytes = {
            // SAFETY: We validate pointer/length pairing in helper. The caller
            // keeps the buffer alive for the lifetime of the handle.
            match unsafe { args::bytes_arg(data, len, "data") } {
                Some(v) => v,
                None => return ptr::null_mut(),
            }
        };

        let handle = DecoderHandle {
            decoder: EventStreamDecoder::new(bytes),
        };
        Box::into_raw(Box::new(handle)) as FlbDecoderHandle
    })
}

/// Decode the next event into `out_event`.
///
/// Returns `Ok` with `out_event` filled, `EndOfStream` when the buffer is
/// consumed, or `DecodeError` when the buffer is malformed. After
/// `DecodeError` the decoder only returns `DecodeError`.
///
/// # Safety
/// `decoder` must be a handle returned by `flb_decoder_new`. `out_event` must
/// be valid for reads and writes; any `record_json` it holds must have come
/// from this library.
#[no_mangle]
pub unsafe extern "C" fn flb_decoder_next(
    decoder: FlbDecoderHandle,
    out_event: *mut FlbEvent,
) -> FlbStatus {
    crate::ffi_boundary(FlbStatus::Internal, || {
        error::clear_error_state();

        let out = {
            // SAFETY: Null is checked in helper; validity is guaranteed by the caller.
            match unsafe { args::out_arg(out_event, "out_event") } {
                Some(v) => v,
                None => return FlbStatus::InvalidArgument,
            }
        };

        with_decoder_mut(decoder, FlbStatus::InvalidArgument, |handle| {
            match handle.decoder.next_event() {
                Ok(Some(event)) => write_event_out(out, &event),
                Ok(None) => {
                    release_record(out);
                    FlbStatus::EndOfStream
                }
                Err(err) => {
                    release_record(out);
                    error::map_decode_error(&err)
                }
            }
        })
    })
}

/// Release the record held by an [`FlbEvent`] and reset it.
///
/// # Safety
/// `event` must be null or valid for reads and writes.
#[no_mangle]
pub unsafe extern "C" fn flb_event_free(event: *mut FlbEvent) {
    crate::ffi_boundary((), || {
        if event.is_null() {
            return;
        }

        let event_ref = {
            // SAFETY: Pointer validity is guaranteed by the caller.
            unsafe { &mut *event }
        };
        release_record(event_ref);
    });
}

/// Free a decoder handle. The input buffer may be released afterwards.
///
/// # Safety
/// `decoder` must be null or a handle previously returned by `flb_decoder_new`.
#[no_mangle]
pub unsafe extern "C" fn flb_decoder_free(decoder: FlbDecoderHandle) {
    crate::ffi_boundary((), || {
        if decoder.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by flb_decoder_new.
        unsafe {
            drop(Box::from_raw(decoder as *mut DecoderHandle));
        }
    });
}

/// Count the events in a buffer without materializing them for the caller.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
/// `out_count` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn flb_decode_count(
    data: *const u8,
    len: usize,
    out_count: *mut usize,
) -> FlbStatus {
    crate::ffi_boundary(FlbStatus::Internal, || {
        error::clear_error_state();

        let bytes = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(data, len, "data") } {
                Some(v) => v,
                None => return FlbStatus::InvalidArgument,
            }
        };
        let count = {
            // SAFETY: Null is checked in helper; validity is guaranteed by the caller.
            match unsafe { args::out_arg(out_count, "out_count") } {
                Some(v) => v,
                None => return FlbStatus::InvalidArgument,
            }
        };

        *count = 0;
        for result in EventStreamDecoder::new(bytes) {
            match result {
                Ok(_) => *count += 1,
                Err(err) => return error::map_decode_error(&err),
            }
        }
        FlbStatus::Ok
    })
}
