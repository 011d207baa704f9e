//! RTTY: Baudot (ITA2) 5-bit-character FSK data mode (components C10,
//! C12, C17).

pub mod baudot;
pub mod smoothing;

pub use baudot::{BaudotDecoder, BAUDOT_FIGS, BAUDOT_LTRS};
pub use smoothing::WindowAverage;
