//! Frequency-shift-keying plumbing shared by SCAMP and RTTY (components
//! C7, C8, C11, C14): spectral acquisition, symbol slicing, bit clock
//! recovery, and tone generation for transmit.

pub mod clock_recovery;
pub mod demodulator;
pub mod modulator;

pub use clock_recovery::{ClockRecovery, ClockRecoveryDll, ClockRecoveryPll};
pub use demodulator::Demodulator;
pub use modulator::{FskModulator, MemoryModulator, WavModulator};
