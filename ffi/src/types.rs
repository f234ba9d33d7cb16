//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use msggo_core::{Accepted, HttpMethod, MsggoError};

/// Opaque handle to a `MsggoClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiMsggoClient {
    pub(crate) inner: msggo_core::MsggoClient,
}

/// Convert to a C string, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|&b| b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `msggo_build_event`. The C caller executes the request and passes
/// the response back through `msggo_parse_event`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: msggo_core::HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to `msggo_parse_event`. The FFI layer reads but does
/// not free these fields. A null `body` is treated as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiEventResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    Transport = 2,
    Api = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
}

/// Result envelope for `msggo_parse_event`.
///
/// On success `error_code` is `Ok`, `error_message` and `error_kind` are null,
/// and `response_json` holds the decoded response re-serialized as JSON.
/// On failure `error_code` describes the category and `error_message` is a
/// human-readable C string; for `Api` errors `error_kind` carries the
/// machine-readable identifier. `http_status` is the response status, or 0.
#[repr(C)]
pub struct FfiEventResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub error_kind: *mut c_char,
    pub http_status: u16,
    pub response_json: *mut c_char,
}

impl FfiEventResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        error_kind: *mut c_char,
        http_status: u16,
        response_json: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiEventResult {
            error_code,
            error_message,
            error_kind,
            http_status,
            response_json,
        }))
    }

    /// Build a success result carrying the decoded response.
    pub(crate) fn accepted(accepted: Accepted) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            accepted.status,
            c_string(accepted.response.to_string()),
        )
    }

    /// Build an error result from a `MsggoError`.
    pub(crate) fn from_error(err: MsggoError) -> *mut Self {
        let message = c_string(err.to_string());
        match err {
            MsggoError::Api(api) => Self::boxed(
                FfiErrorCode::Api,
                message,
                c_string(api.error_kind()),
                api.status_code(),
                std::ptr::null_mut(),
            ),
            MsggoError::InvalidArgument(_) => Self::error(FfiErrorCode::InvalidArgument, message),
            MsggoError::Transport(_) => Self::error(FfiErrorCode::Transport, message),
            MsggoError::Serialization(_) => Self::error(FfiErrorCode::Serialization, message),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, c_string(format!("null argument: {name}")))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, c_string(msg))
    }

    fn error(code: FfiErrorCode, message: *mut c_char) -> *mut Self {
        Self::boxed(code, message, std::ptr::null_mut(), 0, std::ptr::null_mut())
    }
}
