//! C ABI adapter for a native stitching engine.
//!
//! The embedding host registers two function pointers: one that stitches
//! and one that releases the error message it may return. Handles cross
//! the boundary as raw file descriptors, strings as NUL-terminated UTF-8.

use super::{NativeRequest, StitchEngine};
use std::ffi::{c_char, c_int, CStr, CString};
use std::os::fd::AsRawFd;
use tracing::{debug, warn};

/// Stitch entry point exported by the native engine.
///
/// Receives the options string, `input_count` descriptors and media types,
/// the output descriptor and its media type. Returns null on success or a
/// heap-allocated message that the caller releases with [`NativeFreeFn`].
/// Descriptors are borrowed and must not be closed by the engine.
pub type NativeStitchFn = unsafe extern "C" fn(
    options_json: *const c_char,
    input_fds: *const c_int,
    input_mimes: *const *const c_char,
    input_count: usize,
    output_fd: c_int,
    output_mime: *const c_char,
) -> *mut c_char;

/// Releases a message returned by [`NativeStitchFn`].
pub type NativeFreeFn = unsafe extern "C" fn(message: *mut c_char);

/// A [`StitchEngine`] backed by a native library.
#[derive(Debug, Clone, Copy)]
pub struct NativeEngine {
    stitch_fn: NativeStitchFn,
    free_fn: NativeFreeFn,
}

impl NativeEngine {
    /// Wrap the engine's exported functions.
    ///
    /// # Safety
    ///
    /// `stitch_fn` must honour the contract documented on [`NativeStitchFn`]:
    /// read exactly `input_count` entries from each array, not retain any
    /// pointer or descriptor past the call, and return either null or a
    /// NUL-terminated string that `free_fn` accepts exactly once.
    pub unsafe fn new(stitch_fn: NativeStitchFn, free_fn: NativeFreeFn) -> Self {
        Self { stitch_fn, free_fn }
    }
}

fn c_string(label: &str, value: &str) -> Result<CString, String> {
    CString::new(value).map_err(|_| format!("Internal error: {label} contains a NUL byte"))
}

impl StitchEngine for NativeEngine {
    fn stitch(&self, request: NativeRequest<'_>) -> Option<String> {
        if request.input_handles.len() != request.input_mimes.len() {
            return Some("Internal error: mismatch in file data".to_string());
        }

        let options = match c_string("options", request.options_json) {
            Ok(s) => s,
            Err(message) => return Some(message),
        };
        let output_mime = match c_string("output type", request.output_mime) {
            Ok(s) => s,
            Err(message) => return Some(message),
        };
        let mimes = match request
            .input_mimes
            .iter()
            .map(|m| c_string("input type", m))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(mimes) => mimes,
            Err(message) => return Some(message),
        };

        let mime_ptrs: Vec<*const c_char> = mimes.iter().map(|m| m.as_ptr()).collect();
        let fds: Vec<c_int> = request
            .input_handles
            .iter()
            .map(AsRawFd::as_raw_fd)
            .collect();

        debug!(inputs = fds.len(), "Calling native engine");

        // SAFETY: every pointer refers to memory owned by this frame that
        // outlives the call, both arrays hold `fds.len()` entries, and the
        // constructor's contract covers the callee's behaviour.
        let message = unsafe {
            (self.stitch_fn)(
                options.as_ptr(),
                fds.as_ptr(),
                mime_ptrs.as_ptr(),
                fds.len(),
                request.output_handle.as_raw_fd(),
                output_mime.as_ptr(),
            )
        };

        if message.is_null() {
            return None;
        }

        // SAFETY: non-null results are NUL-terminated strings owned by the
        // engine until released through `free_fn`, which happens once below.
        let text = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        unsafe { (self.free_fn)(message) };

        warn!(message = %text, "Native engine reported an error");
        Some(text)
    }
}
