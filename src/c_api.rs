//! C API.
//!
//! The decoder is exposed to C as an opaque pointer created with
//! `ldpc_list_decoder_ctor` and destroyed with `ldpc_list_decoder_dtor`. The
//! decoding functions return the number of message passing iterations if the
//! message passing converged, `-1` if it did not converge (the output is
//! written anyway), and `-2` if the inputs are not valid (the output is not
//! written).

use libc::size_t;
use std::ffi::{c_char, CStr};

mod decoder;

unsafe fn c_to_string(s: *const c_char) -> String {
    if s.is_null() {
        return String::new();
    }
    String::from_utf8_lossy(CStr::from_ptr(s).to_bytes()).to_string()
}

#[allow(clippy::useless_conversion)]
fn size_t_to_usize(n: size_t) -> Option<usize> {
    usize::try_from(n).ok()
}
