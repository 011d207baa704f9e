//! GSM 06.10 RPE-LTP speech codec (components C1, C4-C6): full-rate GSM
//! speech coding at 13 kbit/s, 160 samples in/out per 20 ms frame.

pub mod decoder;
pub mod encoder;
pub mod parameters;
pub mod reflection;
pub mod tables;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use parameters::{Parameters, FRAME_BITS, FRAME_OCTETS};
