//! FSK modulation (components C11/C14): a generic mark/space/silence
//! interface for anything that drives tone transmission, plus two
//! concrete sinks — an in-memory sample buffer and a WAV file writer.

use std::io;

use hound::{WavSpec, WavWriter};

use crate::error::{RadlibError, RadlibResult};

/// A generic FSK transmit sink, driven by an encoder a symbol at a time.
pub trait FskModulator {
    fn send_silence(&mut self, duration_us: u32);
    fn send_mark(&mut self, duration_us: u32);
    fn send_space(&mut self, duration_us: u32);
}

/// Accumulates continuous-phase tone samples into memory, for tests and
/// for feeding straight back into a demodulator loopback without
/// touching the filesystem.
pub struct MemoryModulator {
    sample_rate: u32,
    mark_freq_hz: f32,
    space_freq_hz: f32,
    phi: f32,
    samples: Vec<i16>,
}

const AMPLITUDE: f32 = 32760.0;

impl MemoryModulator {
    pub fn new(sample_rate: u32, mark_freq_hz: f32, space_freq_hz: f32) -> Self {
        MemoryModulator {
            sample_rate,
            mark_freq_hz,
            space_freq_hz,
            phi: 0.0,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    fn send_tone(&mut self, freq_hz: f32, duration_us: u32) {
        let n = (duration_us as u64 * self.sample_rate as u64 / 1_000_000) as u32;
        let omega = 2.0 * std::f32::consts::PI * freq_hz / self.sample_rate as f32;
        for _ in 0..n {
            self.samples.push((self.phi.cos() * AMPLITUDE) as i16);
            self.phi += omega;
        }
    }
}

impl FskModulator for MemoryModulator {
    fn send_silence(&mut self, duration_us: u32) {
        let n = (duration_us as u64 * self.sample_rate as u64 / 1_000_000) as u32;
        self.samples.extend(std::iter::repeat(0i16).take(n as usize));
    }

    fn send_mark(&mut self, duration_us: u32) {
        let freq = self.mark_freq_hz;
        self.send_tone(freq, duration_us);
    }

    fn send_space(&mut self, duration_us: u32) {
        let freq = self.space_freq_hz;
        self.send_tone(freq, duration_us);
    }
}

/// Streams the same continuous-phase tones straight to a WAV file via
/// [`hound`], for producing audio a real receiver (or this crate's own
/// demodulator, fed back through [`hound::WavReader`]) can consume.
pub struct WavModulator<W: io::Write + io::Seek> {
    writer: WavWriter<W>,
    sample_rate: u32,
    mark_freq_hz: f32,
    space_freq_hz: f32,
    phi: f32,
}

impl<W: io::Write + io::Seek> WavModulator<W> {
    pub fn new(sink: W, sample_rate: u32, mark_freq_hz: f32, space_freq_hz: f32) -> RadlibResult<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = WavWriter::new(sink, spec).map_err(|e| RadlibError::Wav(e.to_string()))?;
        Ok(WavModulator {
            writer,
            sample_rate,
            mark_freq_hz,
            space_freq_hz,
            phi: 0.0,
        })
    }

    pub fn finalize(self) -> RadlibResult<()> {
        self.writer.finalize().map_err(|e| RadlibError::Wav(e.to_string()))
    }

    fn send_tone(&mut self, freq_hz: f32, duration_us: u32) -> RadlibResult<()> {
        let n = (duration_us as u64 * self.sample_rate as u64 / 1_000_000) as u32;
        let omega = 2.0 * std::f32::consts::PI * freq_hz / self.sample_rate as f32;
        for _ in 0..n {
            let sample = (self.phi.cos() * AMPLITUDE) as i16;
            self.writer.write_sample(sample).map_err(|e| RadlibError::Wav(e.to_string()))?;
            self.phi += omega;
        }
        Ok(())
    }

    pub fn try_send_silence(&mut self, duration_us: u32) -> RadlibResult<()> {
        let n = (duration_us as u64 * self.sample_rate as u64 / 1_000_000) as u32;
        for _ in 0..n {
            self.writer.write_sample(0i16).map_err(|e| RadlibError::Wav(e.to_string()))?;
        }
        Ok(())
    }

    pub fn try_send_mark(&mut self, duration_us: u32) -> RadlibResult<()> {
        let freq = self.mark_freq_hz;
        self.send_tone(freq, duration_us)
    }

    pub fn try_send_space(&mut self, duration_us: u32) -> RadlibResult<()> {
        let freq = self.space_freq_hz;
        self.send_tone(freq, duration_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_modulator_produces_expected_sample_count() {
        let mut m = MemoryModulator::new(8000, 1100.0, 1300.0);
        m.send_mark(10_000);
        assert_eq!(m.samples().len(), 80);
    }

    #[test]
    fn silence_is_all_zero() {
        let mut m = MemoryModulator::new(8000, 1100.0, 1300.0);
        m.send_silence(5_000);
        assert!(m.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn mark_tone_has_plausible_peak_amplitude() {
        let mut m = MemoryModulator::new(8000, 1000.0, 1000.0);
        m.send_mark(50_000);
        let peak = m.samples().iter().map(|&s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 30000, "peak {peak} lower than expected for a full-amplitude tone");
    }
}
