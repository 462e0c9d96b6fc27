use crate::error;

/// Convert a byte pointer + length into a slice.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes for as
/// long as the returned slice is used.
pub(crate) unsafe fn bytes_arg<'a>(data: *const u8, len: usize, name: &str) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null when len > 0"));
        return None;
    }
    if len > isize::MAX as usize {
        let _ = error::set_invalid_argument(format!("{name} length {len} is too large"));
        return None;
    }

    // SAFETY: Pointer and length are validated above and owned by caller.
    Some(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Borrow a caller-provided out parameter.
///
/// # Safety
/// `ptr` must be null or valid for writes of `T`.
pub(crate) unsafe fn out_arg<'a, T>(ptr: *mut T, name: &str) -> Option<&'a mut T> {
    if ptr.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: Non-null validity is guaranteed by the caller.
    Some(unsafe { &mut *ptr })
}
