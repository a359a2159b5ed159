use super::{c_to_string, size_t_to_usize};
use crate::{
    cli::parse_frozen_bits,
    decoder::{self, Convergence, Decoder as BpDecoder, LdpcDecoder},
    graph::TannerGraph,
};
use libc::size_t;
use std::{
    error::Error,
    ffi::{c_char, c_void},
};

const INPUT_ERROR: i32 = -2;

#[derive(Debug)]
struct Decoder {
    decoder: Box<dyn LdpcDecoder>,
}

impl Decoder {
    fn new(alist: &str, frozen: &str, seed: u64) -> Result<Decoder, Box<dyn Error>> {
        let frozen = parse_frozen_bits(frozen)?;
        let graph = TannerGraph::from_alist(&std::fs::read_to_string(alist)?, frozen.iter())?;
        Ok(Decoder {
            decoder: Box::new(BpDecoder::from_seed(graph, seed)),
        })
    }

    fn decode_f64(&mut self, output: &mut [u8], llrs: &[f64]) -> i32 {
        if output.len() != self.decoder.graph().information_bits().len() {
            return INPUT_ERROR;
        }
        match self.decoder.decode(llrs) {
            Ok(decoded) => {
                output.copy_from_slice(&decoded.bits);
                return_code(decoded.convergence)
            }
            Err(e) => log_input_error(e),
        }
    }

    fn decode_f32(&mut self, output: &mut [u8], llrs: &[f32]) -> i32 {
        let llrs_f64 = llrs.iter().copied().map(f64::from).collect::<Vec<f64>>();
        self.decode_f64(output, &llrs_f64)
    }

    fn decode_codeword_f64(&mut self, output: &mut [u8], llrs: &[f64]) -> i32 {
        if output.len() != self.decoder.graph().code_length() {
            return INPUT_ERROR;
        }
        match self.decoder.decode_codeword(llrs) {
            Ok(decoded) => {
                output.copy_from_slice(&decoded.bits);
                return_code(decoded.convergence)
            }
            Err(e) => log_input_error(e),
        }
    }

    fn list_decode_f64(&mut self, output: &mut [u8], llrs: &[f64], list_size: usize) -> i32 {
        let k = self.decoder.graph().information_bits().len();
        let num_candidates = match decoder::list::ambiguous_bit_count(list_size, k) {
            Ok(flips) => 1usize << flips,
            Err(e) => return log_input_error(e),
        };
        if output.len() != num_candidates * k {
            return INPUT_ERROR;
        }
        match self.decoder.list_decode(llrs, list_size) {
            Ok(decoded) => {
                let chunks = output.chunks_exact_mut(k.max(1));
                for (chunk, candidate) in chunks.zip(&decoded.candidates) {
                    chunk.copy_from_slice(candidate);
                }
                return_code(decoded.convergence)
            }
            Err(e) => log_input_error(e),
        }
    }
}

fn return_code(convergence: Convergence) -> i32 {
    if convergence.converged {
        i32::try_from(convergence.iterations).unwrap_or(i32::MAX)
    } else {
        -1
    }
}

fn log_input_error(error: decoder::Error) -> i32 {
    tracing::warn!(%error, "invalid decoder input");
    INPUT_ERROR
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_ctor(
    alist: *const c_char,
    frozen: *const c_char,
    seed: u64,
) -> *mut c_void {
    let alist = c_to_string(alist);
    let frozen = c_to_string(frozen);
    match Decoder::new(&alist, &frozen, seed) {
        Ok(decoder) => Box::into_raw(Box::new(decoder)) as *mut c_void,
        Err(error) => {
            tracing::warn!(%error, alist = %alist, "could not create decoder");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_dtor(decoder: *mut c_void) {
    if !decoder.is_null() {
        drop(Box::from_raw(decoder as *mut Decoder));
    }
}

unsafe fn slices<'a, T>(
    output: *mut u8,
    output_len: size_t,
    llrs: *const T,
    llrs_len: size_t,
) -> Option<(&'a mut [u8], &'a [T])> {
    if output.is_null() || llrs.is_null() {
        return None;
    }
    let output = std::slice::from_raw_parts_mut(output, size_t_to_usize(output_len)?);
    let llrs = std::slice::from_raw_parts(llrs, size_t_to_usize(llrs_len)?);
    Some((output, llrs))
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_decode_f64(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f64,
    llrs_len: size_t,
) -> i32 {
    let Some((output, llrs)) = slices(output, output_len, llrs, llrs_len) else {
        return INPUT_ERROR;
    };
    let Some(decoder) = (decoder as *mut Decoder).as_mut() else {
        return INPUT_ERROR;
    };
    decoder.decode_f64(output, llrs)
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_decode_f32(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f32,
    llrs_len: size_t,
) -> i32 {
    let Some((output, llrs)) = slices(output, output_len, llrs, llrs_len) else {
        return INPUT_ERROR;
    };
    let Some(decoder) = (decoder as *mut Decoder).as_mut() else {
        return INPUT_ERROR;
    };
    decoder.decode_f32(output, llrs)
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_decode_codeword_f64(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f64,
    llrs_len: size_t,
) -> i32 {
    let Some((output, llrs)) = slices(output, output_len, llrs, llrs_len) else {
        return INPUT_ERROR;
    };
    let Some(decoder) = (decoder as *mut Decoder).as_mut() else {
        return INPUT_ERROR;
    };
    decoder.decode_codeword_f64(output, llrs)
}

#[no_mangle]
unsafe extern "C" fn ldpc_list_decoder_list_decode_f64(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f64,
    llrs_len: size_t,
    list_size: size_t,
) -> i32 {
    let Some((output, llrs)) = slices(output, output_len, llrs, llrs_len) else {
        return INPUT_ERROR;
    };
    let Some(list_size) = size_t_to_usize(list_size) else {
        return INPUT_ERROR;
    };
    let Some(decoder) = (decoder as *mut Decoder).as_mut() else {
        return INPUT_ERROR;
    };
    decoder.list_decode_f64(output, llrs, list_size)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::Edge;

    fn decoder() -> Decoder {
        // A single check over 6 bits, with 2 information bits
        let edges = (0..6).map(|variable| Edge { variable, check: 0 });
        let graph = TannerGraph::new(6, 1, edges, [2, 3, 4, 5].iter()).unwrap();
        Decoder {
            decoder: Box::new(BpDecoder::from_seed(graph, 0)),
        }
    }

    #[test]
    fn decode() {
        let mut decoder = decoder();
        let mut output = [9; 2];
        let ret = decoder.decode_f32(&mut output, &[-8.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        assert_eq!(ret, 1);
        assert_eq!(output, [1, 1]);
        let mut codeword = [9; 6];
        let ret = decoder.decode_codeword_f64(&mut codeword, &[5.0; 6]);
        assert_eq!(ret, 1);
        assert_eq!(codeword, [0; 6]);
    }

    #[test]
    fn list_decode() {
        let mut decoder = decoder();
        let mut output = [9; 8];
        let ret = decoder.list_decode_f64(&mut output, &[5.0; 6], 4);
        assert_eq!(ret, 1);
        assert_eq!(output, [0, 0, 1, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn input_errors() {
        let mut decoder = decoder();
        let mut output = [9; 2];
        assert_eq!(decoder.decode_f64(&mut output, &[5.0; 5]), INPUT_ERROR);
        assert_eq!(decoder.decode_f64(&mut output[..1], &[5.0; 6]), INPUT_ERROR);
        assert_eq!(decoder.list_decode_f64(&mut output, &[5.0; 6], 0), INPUT_ERROR);
        assert_eq!(decoder.list_decode_f64(&mut output, &[5.0; 6], 2), INPUT_ERROR);
        assert_eq!(output, [9; 2]);
    }

    #[test]
    fn ffi_roundtrip() {
        unsafe {
            let handle = ldpc_list_decoder_ctor(
                b"/nonexistent/code.alist\0".as_ptr() as *const c_char,
                b"\0".as_ptr() as *const c_char,
                0,
            );
            assert!(handle.is_null());
            ldpc_list_decoder_dtor(handle);

            let handle = Box::into_raw(Box::new(decoder())) as *mut c_void;
            let mut output = [9u8; 2];
            let llrs = [5.0f64; 6];
            let ret = ldpc_list_decoder_decode_f64(
                handle,
                output.as_mut_ptr(),
                output.len(),
                llrs.as_ptr(),
                llrs.len(),
            );
            assert_eq!(ret, 1);
            assert_eq!(output, [0, 0]);
            let ret = ldpc_list_decoder_decode_f64(
                handle,
                std::ptr::null_mut(),
                0,
                llrs.as_ptr(),
                llrs.len(),
            );
            assert_eq!(ret, INPUT_ERROR);
            let ret = ldpc_list_decoder_list_decode_f64(
                std::ptr::null_mut(),
                output.as_mut_ptr(),
                output.len(),
                llrs.as_ptr(),
                llrs.len(),
                1,
            );
            assert_eq!(ret, INPUT_ERROR);
            assert_eq!(output, [0, 0]);
            ldpc_list_decoder_dtor(handle);
        }
    }
}
