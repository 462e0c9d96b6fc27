use std::any::Any;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use flbout_decode::DecodeError;

use crate::types::FlbStatus;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> FlbStatus {
    set_error_message(message);
    FlbStatus::InvalidArgument
}

pub(crate) fn set_internal(message: impl Into<String>) -> FlbStatus {
    set_error_message(message);
    FlbStatus::Internal
}

pub(crate) fn set_panic_error(payload: &(dyn Any + Send)) {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => set_error_message(format!("panic in flbout: {detail}")),
        None => set_error_message("panic in flbout"),
    }
}

pub(crate) fn map_decode_error(err: &DecodeError) -> FlbStatus {
    set_error_message(err.to_string());
    FlbStatus::DecodeError
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
