//! The FSK demodulator core (component C7): spectral mark-frequency
//! acquisition plus a two-tone matched-filter symbol slicer, driven one
//! sample at a time. Where the original splits this into an abstract
//! base class with protocol subclasses overriding `_processSymbol`, this
//! port has `process_sample` simply return the demodulated symbol (or
//! `None` while unlocked) so SCAMP/RTTY decoders drive it by composition
//! instead of inheritance.

use crate::fixed::complex::{f32_to_q15, wrap_index};
use crate::fixed::fft::FixedFft;
use crate::fixed::q15::{self, Q15};
use crate::fixed::signal::{blackman_lowpass_fir, corr_real_complex_2, make_complex_tone, max_idx_2, mean_q15};
use crate::fixed::ComplexQ15;
use crate::listener::DemodulatorListener;

const SYMBOL_COUNT: usize = 2;
const DEMODULATOR_TONE_N: usize = 16;
const MAX_BIN_HISTORY_SIZE: usize = 64;
const MAX_CORR_HISTORY_N: usize = 16;
const EDGE_RISE_SAMPLE_LIMIT: u8 = 3;

/// Per-symbol correlation history length and low-pass smoothing width.
const SYMBOL_CORR_HISTORY_SIZE: usize = 64;
const SYMBOL_CORR_FIR_TAPS: usize = 47;
const SYMBOL_CORR_FIR_CUTOFF_HZ: f32 = 33.0;

pub struct Demodulator {
    sample_freq: u16,
    fft_n: u16,
    log2_fft_n: u16,
    first_bin: u16,
    fft_window: Vec<Q15>,
    fft_result: Vec<ComplexQ15>,
    fft: FixedFft,
    buffer: Vec<Q15>,
    buffer_ptr: u16,

    block_size: u16,
    samples_per_symbol: u32,
    long_mark_blocks: u16,

    auto_lock_enabled: bool,
    symbol_spread_hz: f32,

    sample_count: u32,
    last_dc_power: f32,

    max_bin_history: [u16; MAX_BIN_HISTORY_SIZE],
    bin_power_threshold: f32,

    frequency_locked: bool,
    locked_mark_freq: f32,

    block_count: u16,
    active_symbol: u8,

    demodulator_tone: [[ComplexQ15; DEMODULATOR_TONE_N]; SYMBOL_COUNT],

    symbol_corr: [f32; SYMBOL_COUNT],
    symbol_corr_history: [[f32; SYMBOL_CORR_HISTORY_SIZE]; SYMBOL_COUNT],
    symbol_corr_history_ptr: usize,
    symbol_corr_fir: [f32; SYMBOL_CORR_FIR_TAPS],
    filtered_symbol_corr: [f32; SYMBOL_COUNT],
    max_corr_history: [f32; MAX_CORR_HISTORY_N],
    max_corr_history_ptr: usize,
    last_corr_diff: f32,
    edge_rise_sample_counter: u8,

    detection_correlation_threshold: f32,

    max_sample_n: u16,
    max_sample_ctr: u16,
    max_sample_acc: Q15,
    max_sample: Q15,
    pos_count_acc: i16,
    pos_count: i16,
}

impl Demodulator {
    /// `log2_fft_n` sizes the spectral-acquisition FFT; `lowest_freq_hz`
    /// sets the first bin considered (to ignore DC/hum). `max_sample_n`
    /// controls the window used for the receiver-gain diagnostics.
    pub fn new(sample_freq: u16, lowest_freq_hz: u16, log2_fft_n: u16, max_sample_n: u16) -> Self {
        let fft_n = 1u16 << log2_fft_n;
        let first_bin = (fft_n as u32 * lowest_freq_hz as u32 / sample_freq as u32) as u16;

        let mut fft_window = vec![0 as Q15; fft_n as usize];
        for (i, slot) in fft_window.iter_mut().enumerate() {
            let hann = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_n as f32).cos());
            *slot = f32_to_q15(hann);
        }

        let block_size = 32u16;
        let samples_per_symbol = 60u32;
        let block_duration = block_size as f32 / sample_freq as f32;
        let symbol_duration = samples_per_symbol as f32 / sample_freq as f32;
        let long_mark_duration = 24.0 * symbol_duration;
        let long_mark_blocks = ((long_mark_duration / block_duration) * 0.70) as u16;

        let fir = blackman_lowpass_fir(SYMBOL_CORR_FIR_TAPS, SYMBOL_CORR_FIR_CUTOFF_HZ, sample_freq as f32);
        let mut symbol_corr_fir = [0.0f32; SYMBOL_CORR_FIR_TAPS];
        symbol_corr_fir.copy_from_slice(&fir);

        Demodulator {
            sample_freq,
            fft_n,
            log2_fft_n,
            first_bin,
            fft_window,
            fft_result: vec![ComplexQ15::ZERO; fft_n as usize],
            fft: FixedFft::new(fft_n),
            buffer: vec![0 as Q15; fft_n as usize],
            buffer_ptr: 0,

            block_size,
            samples_per_symbol,
            long_mark_blocks,

            auto_lock_enabled: true,
            symbol_spread_hz: 66.666_666,

            sample_count: 0,
            last_dc_power: 0.0,

            max_bin_history: [0; MAX_BIN_HISTORY_SIZE],
            bin_power_threshold: 5.0e-4,

            frequency_locked: false,
            locked_mark_freq: 0.0,

            block_count: 0,
            active_symbol: 0,

            demodulator_tone: [[ComplexQ15::ZERO; DEMODULATOR_TONE_N]; SYMBOL_COUNT],

            symbol_corr: [0.0; SYMBOL_COUNT],
            symbol_corr_history: [[0.0; SYMBOL_CORR_HISTORY_SIZE]; SYMBOL_COUNT],
            symbol_corr_history_ptr: 0,
            symbol_corr_fir,
            filtered_symbol_corr: [0.0; SYMBOL_COUNT],
            max_corr_history: [0.0; MAX_CORR_HISTORY_N],
            max_corr_history_ptr: 0,
            last_corr_diff: 0.0,
            edge_rise_sample_counter: 0,

            detection_correlation_threshold: 0.0,

            max_sample_n,
            max_sample_ctr: 0,
            max_sample_acc: 0,
            max_sample: 0,
            pos_count_acc: 0,
            pos_count: 0,
        }
    }

    pub fn set_symbol_spread(&mut self, spread_hz: f32) {
        self.symbol_spread_hz = spread_hz;
    }

    pub fn set_auto_lock_enabled(&mut self, en: bool) {
        self.auto_lock_enabled = en;
    }

    pub fn set_detection_correlation_threshold(&mut self, t: f32) {
        self.detection_correlation_threshold = t;
    }

    pub fn is_frequency_locked(&self) -> bool {
        self.frequency_locked
    }

    pub fn mark_freq_hz(&self) -> f32 {
        self.locked_mark_freq
    }

    pub fn last_dc_power(&self) -> f32 {
        self.last_dc_power
    }

    pub fn max_sample(&self) -> Q15 {
        self.max_sample
    }

    pub fn pos_count(&self) -> i16 {
        self.pos_count
    }

    pub fn reset(&mut self) {
        self.frequency_locked = false;
        self.edge_rise_sample_counter = 0;
    }

    pub fn set_frequency_lock(&mut self, mark_freq_hz: f32, listener: &mut dyn DemodulatorListener) {
        self.frequency_locked = true;
        self.locked_mark_freq = mark_freq_hz;

        make_complex_tone(
            &mut self.demodulator_tone[0],
            mark_freq_hz - self.symbol_spread_hz,
            self.sample_freq as f32,
            0.5,
            0.0,
        );
        make_complex_tone(&mut self.demodulator_tone[1], mark_freq_hz, self.sample_freq as f32, 0.5, 0.0);

        listener.frequency_locked(mark_freq_hz, mark_freq_hz - self.symbol_spread_hz);
    }

    /// Feeds one new sample at the configured sample rate. Returns the
    /// demodulated symbol once frequency-locked, `None` otherwise.
    pub fn process_sample(&mut self, sample: Q15, listener: &mut dyn DemodulatorListener) -> Option<bool> {
        self.update_gain_diagnostics(sample);

        self.buffer[self.buffer_ptr as usize] = sample;
        let read_buffer_ptr = self.buffer_ptr;
        self.buffer_ptr = (self.buffer_ptr + 1) % self.fft_n;
        self.sample_count += 1;

        if self.buffer_ptr % self.block_size == 0 {
            self.run_spectral_block(read_buffer_ptr, listener);
        }

        if !self.frequency_locked {
            return None;
        }

        let demod_start = if read_buffer_ptr as usize >= DEMODULATOR_TONE_N {
            read_buffer_ptr as usize - DEMODULATOR_TONE_N
        } else {
            self.fft_n as usize - (DEMODULATOR_TONE_N - read_buffer_ptr as usize)
        };

        for s in 0..SYMBOL_COUNT {
            self.symbol_corr[s] = corr_real_complex_2(&self.buffer, demod_start, &self.demodulator_tone[s]);
            self.symbol_corr_history[s][self.symbol_corr_history_ptr] = self.symbol_corr[s];
        }
        self.symbol_corr_history_ptr = (self.symbol_corr_history_ptr + 1) % SYMBOL_CORR_HISTORY_SIZE;

        let mut max_corr = 0.0f32;
        for s in 0..SYMBOL_COUNT {
            self.filtered_symbol_corr[s] = self.filter_symbol_corr_history(s);
            max_corr = max_corr.max(self.filtered_symbol_corr[s]);
        }

        self.max_corr_history[self.max_corr_history_ptr] = max_corr;
        self.max_corr_history_ptr = (self.max_corr_history_ptr + 1) % MAX_CORR_HISTORY_N;

        let threshold_corr: f32 =
            self.max_corr_history.iter().sum::<f32>() / (3.0 * MAX_CORR_HISTORY_N as f32);

        let corr_diff = if self.active_symbol == 0 {
            self.filtered_symbol_corr[1] - self.filtered_symbol_corr[0]
        } else {
            self.filtered_symbol_corr[0] - self.filtered_symbol_corr[1]
        };

        let mut any_symbol_present = false;
        if corr_diff > threshold_corr {
            any_symbol_present = true;
            if corr_diff > self.last_corr_diff && self.edge_rise_sample_counter < EDGE_RISE_SAMPLE_LIMIT {
                self.edge_rise_sample_counter += 1;
            } else {
                self.active_symbol = 1 - self.active_symbol;
                self.edge_rise_sample_counter = 0;
                listener.bit_transition_detected();
            }
        }
        self.last_corr_diff = corr_diff;

        listener.sample_metrics(sample, self.active_symbol, &self.filtered_symbol_corr, any_symbol_present);

        Some(self.active_symbol != 0)
    }

    /// Convolves symbol `s`'s 64-entry correlation history with the
    /// 47-tap Blackman low-pass FIR, newest sample first.
    fn filter_symbol_corr_history(&self, s: usize) -> f32 {
        let history = &self.symbol_corr_history[s];
        let mut acc = 0.0f32;
        for (k, &coeff) in self.symbol_corr_fir.iter().enumerate() {
            let idx = (self.symbol_corr_history_ptr + SYMBOL_CORR_HISTORY_SIZE - 1 - k) % SYMBOL_CORR_HISTORY_SIZE;
            acc += coeff * history[idx];
        }
        acc
    }

    fn update_gain_diagnostics(&mut self, sample: Q15) {
        self.max_sample_acc = self.max_sample_acc.max(q15::abs(sample));
        if sample > 0 {
            self.pos_count_acc += 1;
        }
        self.max_sample_ctr += 1;
        if self.max_sample_ctr >= self.max_sample_n {
            self.max_sample = self.max_sample_acc;
            self.pos_count = self.pos_count_acc;
            self.max_sample_acc = 0;
            self.pos_count_acc = 0;
            self.max_sample_ctr = 0;
        }
    }

    fn run_spectral_block(&mut self, read_buffer_ptr: u16, listener: &mut dyn DemodulatorListener) {
        self.block_count += 1;

        let avg = mean_q15(&self.buffer, self.log2_fft_n);

        for i in 0..self.fft_n as usize {
            let raw = self.buffer[wrap_index(read_buffer_ptr as usize, i, self.fft_n as usize)];
            let centered = q15::sub(raw, avg);
            self.fft_result[i].r = q15::mult(centered, self.fft_window[i]);
            self.fft_result[i].i = 0;
        }

        self.fft.transform(&mut self.fft_result);

        let half = self.fft_n as usize / 2;
        let max_bin = max_idx_2(&self.fft_result[..half], self.first_bin as usize) as u16;

        self.last_dc_power = self.fft_result[0].mag_f32_squared();

        if self.frequency_locked || !self.auto_lock_enabled {
            return;
        }

        let mut total_power = 0.0f32;
        for bin in self.fft_result[self.first_bin as usize..half].iter() {
            total_power += bin.mag_f32_squared();
        }

        let mut max_bin_power = self.fft_result[max_bin as usize].mag_f32_squared();
        if max_bin > 1 {
            max_bin_power += self.fft_result[max_bin as usize - 1].mag_f32_squared();
        }
        if (max_bin as usize) < half - 1 {
            max_bin_power += self.fft_result[max_bin as usize + 1].mag_f32_squared();
        }
        let max_bin_power_fract = max_bin_power / total_power;

        for i in 0..MAX_BIN_HISTORY_SIZE - 1 {
            self.max_bin_history[i] = self.max_bin_history[i + 1];
        }
        self.max_bin_history[MAX_BIN_HISTORY_SIZE - 1] = max_bin;

        let (bin_history_start, bin_history_length) = if self.long_mark_blocks as usize > MAX_BIN_HISTORY_SIZE {
            (0, MAX_BIN_HISTORY_SIZE)
        } else {
            (MAX_BIN_HISTORY_SIZE - self.long_mark_blocks as usize, self.long_mark_blocks as usize)
        };

        if (self.block_count as usize) < bin_history_length {
            return;
        }

        let mut hit_count = 0u16;
        for &bin in &self.max_bin_history[bin_history_start..MAX_BIN_HISTORY_SIZE] {
            if bin.wrapping_add(1) >= max_bin && bin <= max_bin + 1 {
                hit_count += 1;
            }
        }
        let hit_pct = hit_count as f32 / bin_history_length as f32;

        if max_bin_power > self.bin_power_threshold && hit_pct > 0.75 && max_bin_power_fract > 0.20 {
            let locked_mark_hz = max_bin as f32 * self.sample_freq as f32 / self.fft_n as f32;
            self.set_frequency_lock(locked_mark_hz, listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::signal::make_real_tone;
    use crate::listener::NullListener;

    #[test]
    fn auto_locks_onto_a_steady_tone() {
        let mut demod = Demodulator::new(2000, 300, 9, 256);
        let mut listener = NullListener;

        let mut samples = vec![0i16; 4000];
        make_real_tone(&mut samples, 667.0, 2000.0, 0.4, 0.0);

        for &s in &samples {
            demod.process_sample(s, &mut listener);
        }

        assert!(demod.is_frequency_locked(), "demodulator failed to auto-lock");
        assert!((demod.mark_freq_hz() - 667.0).abs() < 60.0, "locked frequency {} far off", demod.mark_freq_hz());
    }

    #[test]
    fn reset_clears_frequency_lock() {
        let mut demod = Demodulator::new(2000, 300, 9, 256);
        let mut listener = NullListener;
        let mut samples = vec![0i16; 4000];
        make_real_tone(&mut samples, 667.0, 2000.0, 0.4, 0.0);
        for &s in &samples {
            demod.process_sample(s, &mut listener);
        }
        demod.reset();
        assert!(!demod.is_frequency_locked());
    }
}
