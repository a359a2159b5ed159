//! Simulation.
//!
//! This module contains utilities to simulate the BER and FER of the list
//! decoder in an AWGN channel.

pub mod ber;
pub mod channel;
