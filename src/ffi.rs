//! FFI bindings for Chartflow
//!
//! This module provides C-compatible functions for calling Chartflow from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `chartflow_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::aggregator::{AggregationOptions, DuplicatePolicy, MalformedPolicy};
use crate::colors::{Classifier, ExperimentKind};
use crate::error::ComputeError;
use crate::layers::{prepare_points, LayerData};
use crate::pipeline::{records_to_report_json, FinanceProcessor};

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

// ============================================================================
// Stateless API
// ============================================================================

/// Aggregate a JSON array of ledger rows into report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `chartflow_free_string`.
/// - Returns NULL on error; call `chartflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn chartflow_transform(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match records_to_report_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Color a label of an experiment kind.
///
/// `universe_json` is an optional JSON array of every label in the view; it
/// fixes categorical colors for kinds without a fixed palette.
///
/// # Safety
/// - `kind` and `label` must be valid null-terminated C strings.
/// - `universe_json` may be NULL.
/// - Returns a newly allocated string that must be freed with `chartflow_free_string`.
/// - Returns NULL on error; call `chartflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn chartflow_color_for(
    kind: *const c_char,
    label: *const c_char,
    universe_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let kind_str = match cstr_to_string(kind) {
        Some(s) => s,
        None => {
            set_last_error("Invalid kind string pointer");
            return ptr::null_mut();
        }
    };

    let label_str = match cstr_to_string(label) {
        Some(s) => s,
        None => {
            set_last_error("Invalid label string pointer");
            return ptr::null_mut();
        }
    };

    let universe: Option<Vec<String>> = if universe_json.is_null() {
        None
    } else {
        let raw = match cstr_to_string(universe_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid universe string pointer");
                return ptr::null_mut();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(labels) => Some(labels),
            Err(e) => {
                set_last_error(&format!("Invalid universe JSON: {e}"));
                return ptr::null_mut();
            }
        }
    };

    let kind = ExperimentKind::from_name(&kind_str);
    let color = Classifier::shared().color_for(&kind, &label_str, universe.as_deref());
    string_to_cstr(color.as_str())
}

/// Prepare colored plot points for a layer JSON object.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated JSON array that must be freed with `chartflow_free_string`.
/// - Returns NULL on error; call `chartflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn chartflow_prepare_points(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = serde_json::from_str::<LayerData>(&json_str)
        .map_err(ComputeError::from)
        .and_then(|layer| prepare_points(&layer))
        .and_then(|points| {
            serde_json::to_string(&points).map_err(|e| ComputeError::EncodingError(e.to_string()))
        });

    match result {
        Ok(points) => string_to_cstr(&points),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a FinanceProcessor
pub struct FinanceProcessorHandle {
    processor: FinanceProcessor,
}

/// Create a processor.
///
/// Non-zero `skip_malformed` drops defective rows instead of failing the batch.
/// Non-zero `strict_duplicates` fails on repeated title codes instead of overwriting.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `chartflow_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn chartflow_processor_new(
    skip_malformed: i32,
    strict_duplicates: i32,
) -> *mut FinanceProcessorHandle {
    clear_last_error();

    let options = AggregationOptions {
        malformed: if skip_malformed != 0 {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Reject
        },
        duplicates: if strict_duplicates != 0 {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Overwrite
        },
    };

    let handle = Box::new(FinanceProcessorHandle {
        processor: FinanceProcessor::with_options(options),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `chartflow_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn chartflow_processor_free(processor: *mut FinanceProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Aggregate rows with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `chartflow_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `chartflow_free_string`.
/// - Returns NULL on error; call `chartflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn chartflow_processor_process(
    processor: *const FinanceProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process_json(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Chartflow functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Chartflow function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn chartflow_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Chartflow function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn chartflow_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the Chartflow library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn chartflow_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
