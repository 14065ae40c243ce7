//! FFI bindings for Health Link
//!
//! C-compatible wrappers over [`crate::bridge`] for the native store bindings.
//! All functions take null-terminated C strings and return newly allocated JSON
//! strings that must be freed by the caller using `healthlink_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::bridge;
use crate::error::Result;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read every argument, failing with `"Invalid <name> string pointer"`
unsafe fn read_args<const N: usize>(args: [(&str, *const c_char); N]) -> Option<[String; N]> {
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, (name, ptr)) in out.iter_mut().zip(args) {
        match cstr_to_string(ptr) {
            Some(s) => *slot = s,
            None => {
                set_last_error(&format!("Invalid {name} string pointer"));
                return None;
            }
        }
    }
    Some(out)
}

fn finish(result: Result<String>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Codec API
// ============================================================================

/// Serialize a write request into the record to insert.
///
/// # Safety
/// - `platform`, `metric`, and `request_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `healthlink_free_string`.
///   The string is `null` when there is nothing to write.
/// - Returns NULL on error; call `healthlink_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlink_serialize_write(
    platform: *const c_char,
    metric: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some([platform, metric, request]) = read_args([
        ("platform", platform),
        ("metric", metric),
        ("request", request_json),
    ]) else {
        return ptr::null_mut();
    };

    finish(bridge::serialize_write(&platform, &metric, &request))
}

/// Normalize raw store records into a JSON array of results.
///
/// # Safety
/// - All arguments must be valid null-terminated C strings; `query_json` may be empty.
/// - Returns a newly allocated string that must be freed with `healthlink_free_string`.
/// - Returns NULL on error; call `healthlink_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlink_deserialize_read(
    platform: *const c_char,
    metric: *const c_char,
    query_json: *const c_char,
    records_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some([platform, metric, query, records]) = read_args([
        ("platform", platform),
        ("metric", metric),
        ("query", query_json),
        ("records", records_json),
    ]) else {
        return ptr::null_mut();
    };

    finish(bridge::deserialize_read(&platform, &metric, &query, &records))
}

/// Translate a read query into the platform query shape.
///
/// # Safety
/// - All arguments must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `healthlink_free_string`.
/// - Returns NULL on error; call `healthlink_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlink_translate_query(
    platform: *const c_char,
    metric: *const c_char,
    query_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some([platform, metric, query]) = read_args([
        ("platform", platform),
        ("metric", metric),
        ("query", query_json),
    ]) else {
        return ptr::null_mut();
    };

    finish(bridge::translate_query(&platform, &metric, &query))
}

/// Map `{read, write}` metric lists to the platform permission request.
///
/// # Safety
/// - `platform` and `permissions_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `healthlink_free_string`.
/// - Returns NULL on error; call `healthlink_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlink_map_permissions(
    platform: *const c_char,
    permissions_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some([platform, permissions]) =
        read_args([("platform", platform), ("permissions", permissions_json)])
    else {
        return ptr::null_mut();
    };

    finish(bridge::map_permissions(&platform, &permissions))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a Health Link function.
///
/// # Safety
/// - `ptr` must be a string returned by a Health Link function, or NULL.
/// - Must not be called twice on the same pointer.
#[no_mangle]
pub unsafe extern "C" fn healthlink_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Health Link call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn healthlink_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Health Link library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn healthlink_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
