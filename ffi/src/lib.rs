//! C-ABI wrapper around `msggo-core`.
//!
//! # Overview
//! Exposes the MsgGO event API through `extern "C"` functions so any language
//! with a C FFI can build inbox requests and parse inbox responses while doing
//! the HTTP round trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `msggo_build_event` / `msggo_parse_event` mirror the core's
//!   `build_event` / `parse_event` 1:1; the core transport is never used here.
//! - The C caller owns all returned pointers and must call the matching
//!   `msggo_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use msggo_core::{ClientConfig, HttpResponse, MsggoClient};

use types::*;

/// Borrow a C string as UTF-8, or `None` if it is not valid UTF-8.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client authenticated with `api_key`.
///
/// `base_url` may be null to use the public API origin. Returns null if
/// `api_key` is null, empty, or not UTF-8, if `base_url` is empty, or if an
/// internal panic occurs. The caller must free the returned pointer with
/// `msggo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_client_new(
    api_key: *const c_char,
    base_url: *const c_char,
) -> *mut FfiMsggoClient {
    catch_unwind(|| {
        if api_key.is_null() {
            return std::ptr::null_mut();
        }
        let Some(key) = (unsafe { str_arg(api_key) }) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::default();
        if !base_url.is_null() {
            match unsafe { str_arg(base_url) } {
                Some(url) => config.base_url = url.to_string(),
                None => return std::ptr::null_mut(),
            }
        }
        match MsggoClient::with_config(key, config) {
            Ok(client) => Box::into_raw(Box::new(FfiMsggoClient { inner: client })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `msggo_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_client_free(client: *mut FfiMsggoClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build / parse
// ---------------------------------------------------------------------------

/// Build the inbox request for an event given as a JSON object string.
///
/// Returns null if `client` or `payload_json` is null, or if the payload is
/// not valid JSON describing an object. The caller must free the returned
/// pointer with `msggo_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_build_event(
    client: *const FfiMsggoClient,
    payload_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || payload_json.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(raw) = (unsafe { str_arg(payload_json) }) else {
            return std::ptr::null_mut();
        };
        let payload: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return std::ptr::null_mut(),
        };
        match client.inner.build_event(&payload) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Interpret the response the caller received for a `msggo_build_event`
/// request.
///
/// Never returns null. The caller must free the returned pointer with
/// `msggo_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_parse_event(
    client: *const FfiMsggoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiEventResult {
    if client.is_null() {
        return FfiEventResult::null_arg("client");
    }
    if response.is_null() {
        return FfiEventResult::null_arg("response");
    }
    catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(resp.body) }
                .to_string_lossy()
                .into_owned()
        };
        match client.inner.parse_event(HttpResponse::new(resp.status, body)) {
            Ok(accepted) => FfiEventResult::accepted(accepted),
            Err(err) => FfiEventResult::from_error(err),
        }
    }))
    .unwrap_or_else(|_| FfiEventResult::panic("panic in msggo_parse_event"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `msggo_build_event`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        msggo_free_string(req.url);
        msggo_free_string(req.body);
        if !req.headers.is_null() {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for header in headers.iter() {
                msggo_free_string(header.key);
                msggo_free_string(header.value);
            }
        }
    });
}

/// Free a result returned by `msggo_parse_event`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_free_result(result: *mut FfiEventResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        msggo_free_string(result.error_message);
        msggo_free_string(result.error_kind);
        msggo_free_string(result.response_json);
    });
}

/// Free a string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn msggo_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
