//! Complex Q15 sample pair and the correlation primitives built on it.

use super::q15::{self, Q15};

/// A complex Q15 sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexQ15 {
    pub r: Q15,
    pub i: Q15,
}

impl ComplexQ15 {
    pub const ZERO: ComplexQ15 = ComplexQ15 { r: 0, i: 0 };

    pub fn new(r: Q15, i: Q15) -> Self {
        Self { r, i }
    }

    /// Exact magnitude in floating point, for diagnostics only.
    pub fn mag_f32(&self) -> f32 {
        let r = q15_to_f32(self.r);
        let i = q15_to_f32(self.i);
        (r * r + i * i).sqrt()
    }

    pub fn mag_f32_squared(&self) -> f32 {
        let r = q15_to_f32(self.r);
        let i = q15_to_f32(self.i);
        r * r + i * i
    }

    /// Cheap magnitude approximation used in the hot path:
    /// `max(|r|,|i|) + (|r|+|i|)/2`.
    pub fn approx_mag_q15(&self) -> Q15 {
        let abs_r = q15::abs(self.r);
        let abs_i = q15::abs(self.i);
        abs_r.max(abs_i) + ((abs_r as i32 + abs_i as i32) >> 1) as Q15
    }

    pub fn accumulate(&mut self, other: ComplexQ15) {
        self.r = self.r.wrapping_add(other.r);
        self.i = self.i.wrapping_add(other.i);
    }

    /// Complex multiply using the 3-multiply (Karatsuba-style) trick.
    pub fn mult(a: ComplexQ15, b: ComplexQ15) -> ComplexQ15 {
        let ac = q15::mult(a.r, b.r);
        let bd = q15::mult(a.i, b.i);
        let a_plus_b = q15::add(a.r, a.i);
        let c_plus_d = q15::add(b.r, b.i);
        let p0 = q15::mult(a_plus_b, c_plus_d);
        ComplexQ15 {
            r: q15::sub(ac, bd),
            i: q15::sub(q15::sub(p0, ac), bd),
        }
    }
}

pub fn q15_to_f32(a: Q15) -> f32 {
    a as f32 / 32768.0
}

pub fn f32_to_q15(a: f32) -> Q15 {
    (a * 32768.0) as Q15
}

/// Wraps `base + displacement` into `[0, size)`.
pub fn wrap_index(base: usize, displacement: usize, size: usize) -> usize {
    (base + displacement) % size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_mag_is_close_to_exact() {
        let c = ComplexQ15::new(f32_to_q15(0.6), f32_to_q15(0.8));
        let exact = c.mag_f32();
        let approx = q15_to_f32(c.approx_mag_q15());
        assert!((exact - approx).abs() < 0.2);
    }

    #[test]
    fn wrap_index_wraps() {
        assert_eq!(wrap_index(510, 5, 512), 3);
        assert_eq!(wrap_index(0, 0, 512), 0);
    }
}
