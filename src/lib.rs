//! Radio signal-processing primitives for embedded amateur-radio use.
//!
//! - `fixed/` - saturating Q15/Q31 arithmetic, FFT, tone/correlation utilities
//! - `gsm/` - GSM 06.10 RPE-LTP speech codec (encoder, decoder, parameter packing)
//! - `fsk/` - FSK demodulator core, DLL/PLL clock recovery, transmit modulators
//! - `scamp/` - SCAMP 30-bit-framed, Golay(24,12)-protected data mode
//! - `rtty/` - Baudot (ITA2) RTTY framing and transmit formatting
//! - `morse` - Morse transmit formatting
//! - `wav` - mono 16-bit PCM WAV file I/O
//! - `listener` - receive-side event callbacks shared by SCAMP and RTTY
//! - `config` - run-time configuration for the CLI demo harness
//! - `error` - crate-wide error type for the ambient, allocating layers

pub mod config;
pub mod error;
pub mod fixed;
pub mod fsk;
pub mod gsm;
pub mod listener;
pub mod morse;
pub mod rtty;
pub mod scamp;
pub mod wav;
