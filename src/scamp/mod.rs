//! SCAMP: a 30-bit-framed, Golay-protected FSK data mode (components
//! C9, C15).

pub mod codeword;
pub mod decoder;
pub mod frame;
pub mod symbol;

pub use codeword::{CodeWord12, CodeWord24};
pub use decoder::ScampDecoder;
pub use frame::Frame30;
pub use symbol::Symbol6;
