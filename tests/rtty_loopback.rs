//! Modulates a short Baudot message and feeds it back through the real
//! spectral demodulator before the framing state machine, rather than
//! injecting symbols directly (covered by the unit tests in
//! `radlib::rtty::baudot`).

use radlib::fsk::{Demodulator, FskModulator, MemoryModulator};
use radlib::listener::DemodulatorListener;
use radlib::rtty::baudot::transmit;
use radlib::rtty::BaudotDecoder;

#[derive(Default)]
struct CollectingListener {
    text: String,
}

impl DemodulatorListener for CollectingListener {
    fn received(&mut self, ascii_char: char) {
        self.text.push(ascii_char);
    }
}

#[test]
fn a_modulated_message_round_trips_through_demodulator_and_framer() {
    let sample_rate = 4000u32;
    let baud_rate_times100 = 4000u16; // 40 baud, 100 samples/symbol at this rate

    let mut modulator = MemoryModulator::new(sample_rate, 1000.0, 830.0);
    // Steady mark carrier long enough for spectral frequency acquisition,
    // ahead of the transmitter's own (much shorter) mark lead-in.
    modulator.send_mark(900_000);
    transmit("HI", &mut modulator, 25_000);
    let samples = modulator.into_samples();

    let mut demod = Demodulator::new(sample_rate as u16, 300, 9, 512);
    demod.set_symbol_spread(170.0);
    let mut baudot = BaudotDecoder::new(sample_rate as u16, baud_rate_times100, 3);
    let mut listener = CollectingListener::default();

    for &s in &samples {
        if let Some(symbol) = demod.process_sample(s, &mut listener) {
            baudot.process_symbol(symbol, &mut listener);
        }
    }

    assert!(demod.is_frequency_locked(), "demodulator never locked onto the mark tone");
    assert!(listener.text.contains("HI"), "decoded text {:?} did not contain HI", listener.text);
}
