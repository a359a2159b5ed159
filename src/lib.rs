//! # LDPC list decoder
//!
//! `ldpc_list_decoder` is a belief propagation decoder for LDPC codes given by
//! their Tanner graph, with support for list decoding.
//!
//! The main elements of the library are:
//!
//! - [`graph::TannerGraph`], a bipartite graph of variable nodes and check
//!   nodes, together with the partition of the bit positions into information
//!   bits and frozen bits. Frozen bits are known to be zero by the receiver.
//! - [`regular`], which constructs random regular Tanner graphs.
//! - [`decoder::Decoder`], which runs the sum-product algorithm on the graph and
//!   produces hard decisions on the information bits, on the whole codeword, or
//!   a list of candidates obtained by flipping the least reliable bits.
//! - [`simulation`], which measures the BER and FER of the decoder on an AWGN
//!   channel.
//!
//! It can be used as a Rust library, as a C library, or as a CLI tool. See
//! [`cli`] for documentation about the usage of the CLI tool.

#![warn(missing_docs)]

mod c_api;
pub mod cli;
pub mod decoder;
pub mod graph;
pub mod rand;
pub mod regular;
pub mod simulation;
