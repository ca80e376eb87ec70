//! Common FFI utilities for the edgeflow C-compatible interface.
//!
//! Shared helpers for the engine's C ABI: string ownership transfer,
//! null-safe construction of byte slices from caller-owned buffers, and
//! macros for the exported boilerplate functions.
//!
//! # Memory Ownership
//!
//! - Functions returning `*mut c_char` transfer ownership to the caller
//! - Callers must use the corresponding `free_*` function to deallocate
//! - Pixel buffers are never owned here: slices borrow caller memory for
//!   the duration of one call
//! - NULL pointers are handled safely (no-op for free functions, `None` for
//!   slice constructors)

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::slice;

/// Convert a Rust string to a C string pointer, with a fallback on failure.
///
/// If the input contains null bytes, returns the fallback string instead.
/// The returned pointer is owned by the caller and must be freed.
///
/// # Example
/// ```
/// use edgeflow_ffi_common::{cstring_new_or_fallback, free_cstring};
///
/// let ptr = cstring_new_or_fallback("Frames: 0", "unavailable");
/// unsafe { free_cstring(ptr) };
/// ```
#[inline]
pub fn cstring_new_or_fallback(s: &str, fallback: &'static str) -> *mut c_char {
    CString::new(s)
        .or_else(|_| CString::new(fallback))
        .unwrap_or_default()
        .into_raw()
}

/// Safely free a C string pointer.
///
/// Does nothing if the pointer is null.
///
/// # Safety
/// The pointer must have been allocated by `CString::into_raw()` or be null.
#[inline]
pub unsafe fn free_cstring(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

/// Safely free a boxed value.
///
/// Does nothing if the pointer is null.
///
/// # Safety
/// The pointer must have been allocated by `Box::into_raw()` or be null.
#[inline]
pub unsafe fn free_boxed<T>(ptr: *mut T) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(ptr);
        }
    }
}

/// Safely convert a C string pointer to a Rust string reference.
///
/// # Returns
/// `Ok(&str)` on success, `Err(&'static str)` with error message on failure.
///
/// # Safety
/// The pointer must be valid and null-terminated, or null.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, &'static str> {
    if ptr.is_null() {
        return Err("null pointer");
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| "invalid UTF-8")
}

/// Borrow a caller-owned buffer as a byte slice.
///
/// Returns `None` for a null pointer or a zero length.
///
/// # Safety
/// `ptr` must point to at least `len` readable bytes that stay valid and
/// are not mutated for the lifetime `'a`.
#[inline]
pub unsafe fn bytes_from_raw<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() || len == 0 {
        return None;
    }
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// Borrow a caller-owned buffer as a mutable byte slice.
///
/// Returns `None` for a null pointer or a zero length.
///
/// # Safety
/// `ptr` must point to at least `len` writable bytes that stay valid and
/// are not aliased for the lifetime `'a`.
#[inline]
pub unsafe fn bytes_from_raw_mut<'a>(ptr: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if ptr.is_null() || len == 0 {
        return None;
    }
    Some(unsafe { slice::from_raw_parts_mut(ptr, len) })
}

/// Generate a version function that returns a static C string.
///
/// # Example
/// ```ignore
/// edgeflow_ffi_common::define_version_fn!(my_lib_version);
/// // Expands to:
/// // #[no_mangle]
/// // pub extern "C" fn my_lib_version() -> *const c_char {
/// //     concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
/// // }
/// ```
#[macro_export]
macro_rules! define_version_fn {
    ($fn_name:ident) => {
        #[no_mangle]
        pub extern "C" fn $fn_name() -> *const std::os::raw::c_char {
            concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const std::os::raw::c_char
        }
    };
}

/// Generate an engine free function for a given type.
///
/// # Example
/// ```ignore
/// edgeflow_ffi_common::define_engine_free!(my_engine_free, MyEngine);
/// // Expands to:
/// // #[no_mangle]
/// // #[allow(clippy::not_unsafe_ptr_arg_deref)]
/// // pub extern "C" fn my_engine_free(ptr: *mut MyEngine) {
/// //     edgeflow_ffi_common::free_boxed(ptr);
/// // }
/// ```
#[macro_export]
macro_rules! define_engine_free {
    ($fn_name:ident, $engine_type:ty) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(ptr: *mut $engine_type) {
            unsafe { $crate::free_boxed(ptr) };
        }
    };
}

/// Generate a string free function.
#[macro_export]
macro_rules! define_string_free {
    ($fn_name:ident) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(s: *mut std::os::raw::c_char) {
            unsafe { $crate::free_cstring(s) };
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_cstring_new_or_fallback() {
        let ptr = cstring_new_or_fallback("hello", "fallback");
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(s, "hello");
        unsafe { free_cstring(ptr) };
    }

    #[test]
    fn test_cstring_with_null_bytes_uses_fallback() {
        let ptr = cstring_new_or_fallback("hel\0lo", "fallback");
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(s, "fallback");
        unsafe { free_cstring(ptr) };
    }

    #[test]
    fn test_free_null_is_safe() {
        unsafe { free_cstring(ptr::null_mut()) };
        unsafe { free_boxed::<i32>(ptr::null_mut()) };
    }

    #[test]
    fn test_cstr_to_str() {
        assert_eq!(unsafe { cstr_to_str(ptr::null()) }, Err("null pointer"));
        let s = CString::new("{}").unwrap();
        assert_eq!(unsafe { cstr_to_str(s.as_ptr()) }, Ok("{}"));
    }

    #[test]
    fn test_bytes_from_raw_null_and_empty() {
        assert!(unsafe { bytes_from_raw(ptr::null(), 16) }.is_none());
        let data = [1u8, 2, 3];
        assert!(unsafe { bytes_from_raw(data.as_ptr(), 0) }.is_none());
        assert!(unsafe { bytes_from_raw_mut(ptr::null_mut(), 4) }.is_none());
    }

    #[test]
    fn test_bytes_from_raw_borrows_caller_memory() {
        let mut data = vec![7u8; 8];
        let view = unsafe { bytes_from_raw(data.as_ptr(), data.len()) }.unwrap();
        assert_eq!(view, &[7u8; 8]);

        let view = unsafe { bytes_from_raw_mut(data.as_mut_ptr(), 4) }.unwrap();
        view.fill(0);
        assert_eq!(data, vec![0, 0, 0, 0, 7, 7, 7, 7]);
    }
}
