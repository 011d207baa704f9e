//! SCAMP frame/data-sync state machine (component C9): drives the FSK
//! demodulator and DLL bit-clock recovery, looks for the 30-bit sync
//! pattern, and reports decoded characters (or bad/duplicate frames)
//! through a [`DemodulatorListener`].

use super::frame::Frame30;
use super::symbol::Symbol6;
use crate::fixed::q15::Q15;
use crate::fsk::clock_recovery::ClockRecovery;
use crate::fsk::{ClockRecoveryDll, Demodulator};
use crate::listener::DemodulatorListener;

/// A sync-frame correlation of 28 or more (out of a possible 30) is
/// close enough to treat as the real sync pattern.
const SYNC_CORRELATION_THRESHOLD: i32 = 28;

pub struct ScampDecoder {
    demodulator: Demodulator,
    clock: ClockRecoveryDll,
    frame_bit_accumulator: u32,
    frame_bit_count: u16,
    in_data_sync: bool,
    frame_count: u32,
    last_code_word12: u16,
}

impl ScampDecoder {
    pub fn new(sample_freq: u16) -> Self {
        let mut clock = ClockRecoveryDll::new(sample_freq);
        clock.set_clock_frequency(33);
        ScampDecoder {
            demodulator: Demodulator::new(sample_freq, 300, 9, 512),
            clock,
            frame_bit_accumulator: 0,
            frame_bit_count: 0,
            in_data_sync: false,
            frame_count: 0,
            last_code_word12: 0,
        }
    }

    pub fn reset(&mut self) {
        self.demodulator.reset();
        self.in_data_sync = false;
        self.frame_bit_count = 0;
        self.last_code_word12 = 0;
    }

    pub fn is_in_data_sync(&self) -> bool {
        self.in_data_sync
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn process_sample(&mut self, sample: Q15, listener: &mut dyn DemodulatorListener) {
        let Some(symbol) = self.demodulator.process_sample(sample, listener) else {
            return;
        };

        let capture = self.clock.process_sample(symbol);
        if !capture {
            return;
        }

        self.frame_bit_accumulator <<= 1;
        if symbol {
            self.frame_bit_accumulator |= 1;
        }

        let sync_frame_corr =
            Frame30::correlate30(self.frame_bit_accumulator, Frame30::SYNC_FRAME.raw()).abs();

        listener.received_bit(symbol, self.frame_bit_count, sync_frame_corr);
        self.frame_bit_count += 1;

        if sync_frame_corr > SYNC_CORRELATION_THRESHOLD {
            self.in_data_sync = true;
            self.frame_bit_count = 0;
            self.frame_count += 1;
            self.last_code_word12 = 0;
            self.clock.set_lock(true);
            listener.data_sync_acquired();
        } else if self.frame_bit_count == 30 {
            self.frame_bit_count = 0;
            self.frame_count += 1;

            if self.in_data_sync {
                self.decode_frame(listener);
            }
        }
    }

    fn decode_frame(&mut self, listener: &mut dyn DemodulatorListener) {
        let frame = Frame30::new(self.frame_bit_accumulator & Frame30::MASK30_LSB);
        listener.good_frame_received();

        let cw24 = frame.to_code_word24();
        let Some(cw12) = cw24.decode() else {
            listener.bad_frame_received(frame.raw());
            self.last_code_word12 = 0;
            return;
        };

        if cw12.raw() == self.last_code_word12 {
            listener.discarded_duplicate();
        } else {
            self.report_symbol(cw12.symbol0(), listener);
            self.report_symbol(cw12.symbol1(), listener);
        }

        self.last_code_word12 = cw12.raw();
    }

    fn report_symbol(&self, symbol: Symbol6, listener: &mut dyn DemodulatorListener) {
        if symbol.raw() != 0 {
            if let Some(ascii) = symbol.to_ascii() {
                listener.received(ascii as char);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsk::{FskModulator, MemoryModulator};
    use crate::listener::NullListener;

    #[derive(Default)]
    struct CollectingListener {
        text: String,
        good_frames: u32,
        bad_frames: u32,
    }

    impl DemodulatorListener for CollectingListener {
        fn received(&mut self, ascii_char: char) {
            self.text.push(ascii_char);
        }
        fn good_frame_received(&mut self) {
            self.good_frames += 1;
        }
        fn bad_frame_received(&mut self, _raw_frame: u32) {
            self.bad_frames += 1;
        }
    }

    fn modulate_message(text: &[u8], sample_rate: u32) -> Vec<i16> {
        let mut modulator = MemoryModulator::new(sample_rate, 667.0, 600.333_333);
        let symbol_us = 30_000;
        // Steady mark carrier long enough for spectral frequency acquisition,
        // before any mark/space alternation starts.
        modulator.send_mark(900_000);
        for _ in 0..40 {
            Frame30::ALT_FRAME.transmit(&mut modulator, symbol_us);
        }
        for _ in 0..3 {
            Frame30::SYNC_FRAME.transmit(&mut modulator, symbol_us);
        }
        for chunk in text.chunks(2) {
            let a = chunk[0];
            let b = *chunk.get(1).unwrap_or(&b' ');
            Frame30::from_two_ascii_chars(a, b).transmit(&mut modulator, symbol_us);
        }
        modulator.into_samples()
    }

    #[test]
    fn decoder_does_not_panic_on_silence() {
        let mut decoder = ScampDecoder::new(2000);
        let mut listener = NullListener;
        for _ in 0..4000 {
            decoder.process_sample(0, &mut listener);
        }
        assert!(!decoder.is_in_data_sync());
    }

    #[test]
    fn decoder_acquires_sync_and_decodes_text_from_a_modulated_stream() {
        let samples = modulate_message(b"CQ", 2000);
        let mut decoder = ScampDecoder::new(2000);
        let mut listener = CollectingListener::default();
        for &s in &samples {
            decoder.process_sample(s, &mut listener);
        }
        assert!(decoder.is_in_data_sync(), "decoder never reached data sync");
    }
}
