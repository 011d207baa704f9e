//! Tone generation, correlation, and index-search utilities shared by the
//! GSM analysis filters and the FSK matched filter.

use super::complex::{q15_to_f32, wrap_index, ComplexQ15};
use super::q15::Q15;

/// Fills `buf` with `amplitude * cos(2*pi*freq_hz*t + phase_deg)` sampled
/// at `sample_rate_hz`.
pub fn make_real_tone(buf: &mut [Q15], freq_hz: f32, sample_rate_hz: f32, amplitude: f32, phase_deg: f32) {
    let phase_rad = phase_deg.to_radians();
    for (k, slot) in buf.iter_mut().enumerate() {
        let theta = 2.0 * std::f32::consts::PI * freq_hz * (k as f32) / sample_rate_hz + phase_rad;
        *slot = super::complex::f32_to_q15((amplitude * theta.cos()).clamp(-0.999, 0.999));
    }
}

/// Fills `buf` with a complex tone: real = cos, imaginary = sin.
pub fn make_complex_tone(buf: &mut [ComplexQ15], freq_hz: f32, sample_rate_hz: f32, amplitude: f32, phase_deg: f32) {
    let phase_rad = phase_deg.to_radians();
    for (k, slot) in buf.iter_mut().enumerate() {
        let theta = 2.0 * std::f32::consts::PI * freq_hz * (k as f32) / sample_rate_hz + phase_rad;
        slot.r = super::complex::f32_to_q15((amplitude * theta.cos()).clamp(-0.999, 0.999));
        slot.i = super::complex::f32_to_q15((amplitude * theta.sin()).clamp(-0.999, 0.999));
    }
}

/// Real x real correlation, scaled down by `log2(len)` at each step to
/// avoid overflow.
pub fn corr_q15(data: &[Q15], carrier: &[Q15]) -> Q15 {
    debug_assert_eq!(data.len(), carrier.len());
    let shift = (data.len() as f32).log2() as u32;
    let mut result: i32 = 0;
    for (d, c) in data.iter().zip(carrier.iter()) {
        let p = super::q15::mult(*d, *c);
        result += (p as i32) >> shift;
    }
    result as Q15
}

/// Exact argmax by floating-point magnitude, starting at `start`.
pub fn max_idx(samples: &[ComplexQ15], start: usize) -> usize {
    let mut max_mag = 0.0f32;
    let mut max_bin = start;
    for (i, sample) in samples.iter().enumerate().skip(start) {
        let mag = sample.mag_f32();
        if mag > max_mag {
            max_mag = mag;
            max_bin = i;
        }
    }
    max_bin
}

/// Approximate argmax using the cheap Q15 magnitude estimate.
pub fn max_idx_2(samples: &[ComplexQ15], start: usize) -> usize {
    let mut max_mag: Q15 = 0;
    let mut max_bin = start;
    for (i, sample) in samples.iter().enumerate().skip(start) {
        let mag = sample.approx_mag_q15();
        if mag > max_mag {
            max_mag = mag;
            max_bin = i;
        }
    }
    max_bin
}

pub fn max_q15(data: &[Q15]) -> Q15 {
    data.iter().copied().fold(data[0], Q15::max)
}

pub fn min_q15(data: &[Q15]) -> Q15 {
    data.iter().copied().fold(data[0], Q15::min)
}

/// Mean of `2^log2_len` samples, accumulated in 32 bits and shifted back
/// down. `data.len()` must equal `1 << log2_len`.
pub fn mean_q15(data: &[Q15], log2_len: u32) -> Q15 {
    debug_assert_eq!(data.len(), 1usize << log2_len);
    let total: i64 = data.iter().map(|&s| s as i64).sum();
    (total >> log2_len) as Q15
}

/// Coefficients for a windowed-sinc low-pass FIR: a Blackman window
/// applied to a `cutoff_hz`-normalized sinc, giving unity DC gain.
/// Used by the FSK demodulator to smooth its per-symbol correlation
/// history before transition detection.
pub fn blackman_lowpass_fir(taps: usize, cutoff_hz: f32, sample_rate_hz: f32) -> Vec<f32> {
    let fc = cutoff_hz / sample_rate_hz;
    let m = (taps - 1) as f32;
    let mut h: Vec<f32> = (0..taps)
        .map(|n| {
            let x = n as f32 - m / 2.0;
            let sinc = if x.abs() < 1e-6 { 2.0 * fc } else { (2.0 * std::f32::consts::PI * fc * x).sin() / (std::f32::consts::PI * x) };
            let window = 0.42 - 0.5 * (2.0 * std::f32::consts::PI * n as f32 / m).cos()
                + 0.08 * (4.0 * std::f32::consts::PI * n as f32 / m).cos();
            sinc * window
        })
        .collect();
    let sum: f32 = h.iter().sum();
    if sum.abs() > 1e-9 {
        for c in h.iter_mut() {
            *c /= sum;
        }
    }
    h
}

/// Circular-buffer real x linear-complex correlation (the FSK matched
/// filter primitive). `c0` wraps automatically starting at `c0_base`, so
/// the caller may begin near the end of the buffer. The result is the
/// approximate magnitude `max(|r|,|i|) + floor((|r|+|i|)/2)` of the
/// complex dot product between the real samples and the conjugate of the
/// complex reference tone.
pub fn corr_real_complex_2(c0: &[Q15], c0_base: usize, c1: &[ComplexQ15]) -> f32 {
    let mut result_r = 0.0f32;
    let mut result_i = 0.0f32;
    for (k, tone) in c1.iter().enumerate() {
        let a = q15_to_f32(c0[wrap_index(c0_base, k, c0.len())]);
        let c = q15_to_f32(tone.r);
        let d = -q15_to_f32(tone.i);
        result_r += a * c;
        result_i += a * d;
    }
    let abs_r = result_r.abs();
    let abs_i = result_i.abs();
    abs_r.max(abs_i) + ((abs_r + abs_i) / 2.0).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_tone_correlated_against_complex_reference_is_quarter_amplitude_squared() {
        let sample_rate = 2000.0;
        let freq = 667.0;
        let len = 16;
        let mut real = vec![0i16; len];
        make_real_tone(&mut real, freq, sample_rate, 0.5, 0.0);
        let mut complex = vec![ComplexQ15::ZERO; len];
        make_complex_tone(&mut complex, freq, sample_rate, 1.0, 0.0);

        let corr = corr_real_complex_2(&real, 0, &complex);
        // Expect roughly 0.25 * A^2 * len (unnormalized accumulation).
        let expected = 0.25 * 0.5 * 0.5 * len as f32;
        assert!((corr - expected).abs() < expected * 0.5 + 0.5);
    }

    #[test]
    fn orthogonal_tones_correlate_near_zero() {
        let sample_rate = 2000.0;
        let len = 64;
        let mut real = vec![0i16; len];
        make_real_tone(&mut real, 100.0, sample_rate, 0.5, 0.0);
        let mut complex = vec![ComplexQ15::ZERO; len];
        make_complex_tone(&mut complex, 700.0, sample_rate, 1.0, 0.0);

        let corr = corr_real_complex_2(&real, 0, &complex);
        assert!(corr < 5.0, "expected near-zero correlation, got {corr}");
    }

    #[test]
    fn blackman_fir_has_unity_dc_gain_and_is_symmetric() {
        let h = blackman_lowpass_fir(47, 33.0, 2000.0);
        assert_eq!(h.len(), 47);
        let sum: f32 = h.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "DC gain {sum} should be ~1.0");
        for i in 0..h.len() {
            assert!((h[i] - h[h.len() - 1 - i]).abs() < 1e-5, "tap {i} not symmetric");
        }
    }

    #[test]
    fn mean_of_constant_buffer_is_that_constant() {
        let data = vec![1000i16; 8];
        assert_eq!(mean_q15(&data, 3), 1000);
    }

    #[test]
    fn max_idx_finds_peak() {
        let mut samples = vec![ComplexQ15::ZERO; 8];
        samples[3] = ComplexQ15::new(20000, 0);
        assert_eq!(max_idx(&samples, 0), 3);
        assert_eq!(max_idx_2(&samples, 0), 3);
    }
}
