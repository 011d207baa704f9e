//! GSM 06.10 RPE-LTP encoder (component C4): 160 samples of 13-bit linear
//! PCM in, a 76-parameter [`Parameters`] frame out. Ported section by
//! section from ETSI EN 300 961 §5.2; variable names follow the draft
//! where it helps cross-reference the spec rather than house style.

use super::parameters::{Parameters, SubSegParameters};
use super::reflection::decode_reflection_coefficients;
use super::tables::{k_to_zone, A, B, DLB, FAC, H, MAC, MIC, NRFAC, QLB};
use crate::fixed::q15::{self, Q15, Q31};

const SEGMENT_SAMPLES: usize = 160;

pub struct Encoder {
    z1: Q15,
    l_z2: Q31,
    mp: Q15,
    lar_pp_last: [Q15; 9],
    u: [Q15; 8],
    /// LTP history of the reconstructed short-term residual, `dp[-120..-1]`
    /// stored as indices `0..119` (index `i` holds `dp[-120+i]`).
    dp: [Q15; 120],
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        let mut enc = Encoder {
            z1: 0,
            l_z2: 0,
            mp: 0,
            lar_pp_last: [0; 9],
            u: [0; 8],
            dp: [0; 120],
        };
        enc.reset();
        enc
    }

    pub fn reset(&mut self) {
        self.z1 = 0;
        self.l_z2 = 0;
        self.mp = 0;
        self.lar_pp_last = [0; 9];
        self.u = [0; 8];
        self.dp = [0; 120];
    }

    /// Encodes 160 samples (20 ms at 8 kHz) of linear PCM into a single
    /// frame. The low 3 bits of each sample are treated as don't-care.
    pub fn encode(&mut self, sop: &[i16; SEGMENT_SAMPLES]) -> Parameters {
        let s = self.prefilter(sop);
        let (lar_c, lar) = self.compute_lar_c(&s);
        let rp = decode_reflection_coefficients(&lar_c, &mut self.lar_pp_last);
        let _ = lar; // retained for readability of the pipeline; not needed downstream
        let d = self.short_term_analysis(&s, &rp);

        let mut sub_segs = [SubSegParameters::default(); 4];
        for j in 0..4 {
            sub_segs[j] = self.encode_subsegment(&d, j);
        }

        Parameters { lar_c, sub_segs }
    }

    /// §5.2.1 scaling, §5.2.2 offset compensation, §5.2.3 pre-emphasis.
    fn prefilter(&mut self, sop: &[i16; SEGMENT_SAMPLES]) -> [Q15; SEGMENT_SAMPLES] {
        let mut so = [0i16; SEGMENT_SAMPLES];
        for k in 0..SEGMENT_SAMPLES {
            so[k] = (sop[k] >> 3) << 2;
        }

        let mut sof = [0i16; SEGMENT_SAMPLES];
        for k in 0..SEGMENT_SAMPLES {
            let s1 = q15::sub(so[k], self.z1);
            self.z1 = so[k];

            let mut l_s2: Q31 = (s1 as Q31) << 15;
            let msp = (self.l_z2 >> 15) as Q15;
            let lsp = q15::l_sub(self.l_z2, (msp as Q31) << 15) as Q15;
            let temp = q15::mult_r(lsp, 32735);
            l_s2 = q15::l_add(l_s2, temp as Q31);
            self.l_z2 = q15::l_add(q15::l_mult(msp, 32735) >> 1, l_s2);

            sof[k] = (q15::l_add(self.l_z2, 16384) >> 15) as Q15;
        }

        let mut s = [0i16; SEGMENT_SAMPLES];
        for k in 0..SEGMENT_SAMPLES {
            s[k] = q15::add(sof[k], q15::mult_r(self.mp, -28180));
            self.mp = sof[k];
        }
        s
    }

    /// §5.2.4 autocorrelation, §5.2.5 Schur recursion, §5.2.6 LAR
    /// transform, §5.2.7 LAR coding. Returns the coded `LARc[0..7]` and
    /// the intermediate `LAR[1..8]` (right-shifted by one per the draft).
    fn compute_lar_c(&self, s_in: &[Q15; SEGMENT_SAMPLES]) -> ([u8; 8], [Q15; 9]) {
        let mut s = *s_in;

        let mut smax: Q15 = 0;
        for &v in s.iter() {
            let t = q15::abs(v);
            if t > smax {
                smax = t;
            }
        }

        let scalauto: i16 = if smax == 0 {
            0
        } else {
            q15::sub(4, q15::norm((smax as Q31) << 16))
        };

        if scalauto > 0 {
            let temp = 16384i16 >> q15::sub(scalauto, 1);
            for v in s.iter_mut() {
                *v = q15::mult_r(*v, temp);
            }
        }

        let mut l_acf = [0i32; 9];
        for k in 0..=8usize {
            let mut acc: Q31 = 0;
            for i in k..SEGMENT_SAMPLES {
                acc = q15::l_add(acc, q15::l_mult(s[i], s[i - k]));
            }
            l_acf[k] = acc;
        }

        if scalauto > 0 {
            for v in s.iter_mut() {
                *v <<= scalauto;
            }
        }

        let mut r = [0i16; 9];
        if l_acf[0] != 0 {
            let norm_shift = q15::norm(l_acf[0]);
            let mut acf = [0i16; 9];
            for k in 0..=8 {
                acf[k] = ((l_acf[k] << norm_shift) >> 16) as Q15;
            }

            let mut k_arr = [0i16; 9];
            for i in 1..=7 {
                k_arr[9 - i] = acf[i];
            }
            let mut p = acf;

            for n in 1..=8usize {
                if p[0] < q15::abs(p[1]) {
                    for i in n..=8 {
                        r[i] = 0;
                    }
                    break;
                }
                r[n] = q15::div(q15::abs(p[1]), p[0]);
                if p[1] > 0 {
                    r[n] = q15::sub(0, r[n]);
                }
                if n == 8 {
                    break;
                }
                p[0] = q15::add(p[0], q15::mult_r(p[1], r[n]));
                for m in 1..=(8 - n) {
                    let new_p_m = q15::add(p[m + 1], q15::mult_r(k_arr[9 - m], r[n]));
                    k_arr[9 - m] = q15::add(k_arr[9 - m], q15::mult_r(p[m + 1], r[n]));
                    p[m] = new_p_m;
                }
            }
        }

        let mut lar = [0i16; 9];
        for i in 1..=8usize {
            let mut temp = q15::abs(r[i]);
            if temp < 22118 {
                temp >>= 1;
            } else if temp < 31130 {
                temp = q15::sub(temp, 11059);
            } else {
                temp = q15::sub(temp, 26112) << 2;
            }
            if r[i] < 0 {
                temp = q15::sub(0, temp);
            }
            lar[i] = temp;
        }

        let mut lar_c = [0u8; 8];
        for i in 1..=8usize {
            let mut temp = q15::mult(A[i], lar[i]);
            temp = q15::add(temp, B[i]);
            temp = q15::add(temp, 256);
            let mut coded = temp >> 9;
            if coded > MAC[i] {
                coded = MAC[i];
            }
            if coded < MIC[i] {
                coded = MIC[i];
            }
            coded = q15::sub(coded, MIC[i]);
            lar_c[i - 1] = coded as u8;
        }

        (lar_c, lar)
    }

    /// §5.2.10 short-term analysis filtering: an 8-section lattice filter
    /// driven by `s[]`, selecting `rp[zone]` per output index.
    fn short_term_analysis(&mut self, s: &[Q15; SEGMENT_SAMPLES], rp: &[[Q15; 9]; 4]) -> [Q15; SEGMENT_SAMPLES] {
        let mut d = [0i16; SEGMENT_SAMPLES];
        for k in 0..SEGMENT_SAMPLES {
            let zone = k_to_zone(k);
            let mut di = s[k];
            let mut sav = di;
            for i in 1..=8usize {
                let temp = q15::add(self.u[i - 1], q15::mult_r(rp[zone][i], di));
                di = q15::add(di, q15::mult_r(rp[zone][i], self.u[i - 1]));
                self.u[i - 1] = sav;
                sav = temp;
            }
            d[k] = di;
        }
        d
    }

    /// LTP + RPE encoding for sub-segment `j` (§5.2.11-5.2.18).
    fn encode_subsegment(&mut self, d: &[Q15; SEGMENT_SAMPLES], j: usize) -> SubSegParameters {
        let kj = j * 40;
        let mut out = SubSegParameters::default();

        // §5.2.11 - LTP lag and gain.
        let mut dmax: Q15 = 0;
        for k in 0..40 {
            let t = q15::abs(d[kj + k]);
            if t > dmax {
                dmax = t;
            }
        }
        let scal: i16 = if dmax == 0 {
            0
        } else {
            let temp = q15::norm((dmax as Q31) << 16);
            if temp > 6 {
                0
            } else {
                q15::sub(6, temp)
            }
        };

        let mut wt = [0i16; 50];
        for k in 0..40 {
            wt[k] = d[kj + k] >> scal;
        }

        let mut l_max: Q31 = 0;
        out.nc = 40;
        for lambda in 40..=120usize {
            let mut l_result: Q31 = 0;
            for k in 0..40usize {
                let hist_idx = (k as i64 - lambda as i64 + 120) as usize;
                l_result = q15::l_add(l_result, q15::l_mult(wt[k], self.dp[hist_idx]));
            }
            if l_result > l_max {
                out.nc = lambda as u8;
                l_max = l_result;
            }
        }
        l_max >>= q15::sub(6, scal);

        for k in 0..40usize {
            let hist_idx = (k as i64 - out.nc as i64 + 120) as usize;
            wt[k] = self.dp[hist_idx] >> 3;
        }

        let mut l_power: Q31 = 0;
        for k in 0..40usize {
            l_power = q15::l_add(l_power, q15::l_mult(wt[k], wt[k]));
        }

        out.bc = if l_max <= 0 {
            0
        } else if l_max >= l_power {
            3
        } else {
            let temp = q15::norm(l_power);
            let r_val = ((l_max << temp) >> 16) as Q15;
            let s_val = ((l_power << temp) >> 16) as Q15;
            if r_val <= q15::mult(s_val, DLB[0]) {
                0
            } else if r_val <= q15::mult(s_val, DLB[1]) {
                1
            } else if r_val <= q15::mult(s_val, DLB[2]) {
                2
            } else {
                3
            }
        };

        // §5.2.12 - Long term analysis filtering.
        let bp = QLB[out.bc as usize];
        let mut e = [0i16; 40];
        let mut dpp = [0i16; 40];
        for k in 0..40usize {
            let hist_idx = (k as i64 - out.nc as i64 + 120) as usize;
            dpp[k] = q15::mult_r(bp, self.dp[hist_idx]);
            e[k] = q15::sub(d[kj + k], dpp[k]);
        }

        // §5.2.13 - Weighting filter.
        let mut wt50 = [0i16; 50];
        for k in 5..45 {
            wt50[k] = e[k - 5];
        }
        let mut x = [0i16; 40];
        for k in 0..40usize {
            let mut l_result: Q31 = 8192;
            for i in 0..=10usize {
                l_result = q15::l_add(l_result, q15::l_mult(wt50[k + i], H[i]));
            }
            l_result = q15::l_add(l_result, l_result);
            l_result = q15::l_add(l_result, l_result);
            x[k] = (l_result >> 16) as Q15;
        }

        // §5.2.14 - RPE grid selection.
        let mut em: Q31 = 0;
        out.mc = 0;
        for m in 0..4usize {
            let mut l_result: Q31 = 0;
            for i in 0..=12usize {
                let temp1 = x[m + 3 * i] >> 2;
                l_result = q15::l_add(l_result, q15::l_mult(temp1, temp1));
            }
            if l_result > em {
                out.mc = m as u8;
                em = l_result;
            }
        }

        let mut x_m = [0i16; 13];
        for i in 0..=12usize {
            x_m[i] = x[out.mc as usize + 3 * i];
        }

        // §5.2.15 - APCM quantization of xmax.
        let mut xmax: Q15 = 0;
        for &v in x_m.iter() {
            let t = q15::abs(v);
            if t > xmax {
                xmax = t;
            }
        }

        let mut exp: i16 = 0;
        let mut temp = xmax >> 9;
        let mut itest = 0;
        for _ in 0..=5 {
            if temp <= 0 {
                itest = 1;
            }
            temp >>= 1;
            if itest == 0 {
                exp = q15::add(exp, 1);
            }
        }
        let shift_total = q15::add(exp, 5);
        out.xmaxc = q15::add(xmax >> shift_total, exp << 3) as u8;

        // §5.2.16 - APCM quantization of xM[].
        let mut exp2: i16 = 0;
        if out.xmaxc > 15 {
            exp2 = q15::sub((out.xmaxc as i16) >> 3, 1);
        }
        let mut mant = q15::sub(out.xmaxc as i16, exp2 << 3);
        if mant == 0 {
            exp2 = -4;
            mant = 15;
        } else {
            let mut itest2 = 0;
            for _ in 0..=2 {
                if mant > 7 {
                    itest2 = 1;
                }
                if itest2 == 0 {
                    mant = q15::add(mant << 1, 1);
                }
                if itest2 == 0 {
                    exp2 = q15::sub(exp2, 1);
                }
            }
        }
        mant = q15::sub(mant, 8);

        let temp1 = q15::sub(6, exp2);
        let temp2 = NRFAC[mant as usize];
        for i in 0..=12usize {
            let mut t = x_m[i] << temp1;
            t = q15::mult(t, temp2);
            out.x_mc[i] = q15::add(t >> 12, 4) as u8;
        }

        // §5.2.16 (cont.) - APCM inverse quantization to get xMp[] for
        // use in the history update below.
        let temp1 = FAC[mant as usize];
        let temp2 = q15::sub(6, exp2);
        let temp3 = 1i16 << q15::sub(temp2, 1);
        let mut x_mp = [0i16; 13];
        for i in 0..=12usize {
            let mut t = q15::sub((out.x_mc[i] as i16) << 1, 7);
            t <<= 12;
            t = q15::mult_r(temp1, t);
            t = q15::add(t, temp3);
            x_mp[i] = t >> temp2;
        }

        // §5.2.17 - RPE grid positioning.
        let mut ep = [0i16; 40];
        for i in 0..=12usize {
            ep[out.mc as usize + 3 * i] = x_mp[i];
        }

        // §5.2.18 - Update of the reconstructed short-term residual
        // history: slide 80 entries down, fill the new tail.
        for k in 0..80 {
            self.dp[k] = self.dp[k + 40];
        }
        for k in 0..40 {
            self.dp[80 + k] = q15::add(ep[k], dpp[k]);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_silence_produces_zeroed_lar_c() {
        let mut enc = Encoder::new();
        let silence = [0i16; SEGMENT_SAMPLES];
        let params = enc.encode(&silence);
        assert_eq!(params.lar_c, [0u8; 8]);
        for seg in &params.sub_segs {
            assert_eq!(seg.xmaxc, 0);
        }
    }

    #[test]
    fn encoder_state_is_fully_cleared_by_reset() {
        let mut enc = Encoder::new();
        let mut tone = [0i16; SEGMENT_SAMPLES];
        for (k, s) in tone.iter_mut().enumerate() {
            *s = ((4000.0 * (2.0 * std::f32::consts::PI * 400.0 * k as f32 / 8000.0).sin()) as i32) as i16;
        }
        let _ = enc.encode(&tone);
        enc.reset();
        assert_eq!(enc.z1, 0);
        assert_eq!(enc.l_z2, 0);
        assert_eq!(enc.mp, 0);
        assert_eq!(enc.u, [0; 8]);
        assert_eq!(enc.dp, [0; 120]);
    }

    #[test]
    fn encoding_a_tone_produces_plausible_ltp_lag() {
        let mut enc = Encoder::new();
        let mut tone = [0i16; SEGMENT_SAMPLES];
        for (k, s) in tone.iter_mut().enumerate() {
            *s = ((4000.0 * (2.0 * std::f32::consts::PI * 200.0 * k as f32 / 8000.0).sin()) as i32) as i16;
        }
        // Feed a few frames so the LTP history has settled.
        let mut params = enc.encode(&tone);
        for _ in 0..3 {
            params = enc.encode(&tone);
        }
        for seg in &params.sub_segs {
            assert!((40..=120).contains(&seg.nc), "Nc out of range: {}", seg.nc);
        }
    }
}
