//! GSM 06.10 RPE-LTP decoder (component C5): inverse of [`super::encoder`],
//! turning a [`Parameters`] frame back into 160 samples of linear PCM.
//! Ported from ETSI EN 300 961 §5.3.

use super::parameters::{Parameters, SubSegParameters};
use super::reflection::decode_reflection_coefficients;
use super::tables::{k_to_zone, FAC, QLB};
use crate::fixed::q15::{self, Q15};

const SEGMENT_SAMPLES: usize = 160;

pub struct Decoder {
    /// LTP lag carried across subsegments purely as a diagnostic; the
    /// filter itself re-reads `Nc` from each subsegment's parameters.
    nrp: Q15,
    /// Reconstructed short-term residual history: `drp[0..120]` is the
    /// last three subsegments, `drp[120..160]` the one being filled.
    drp: [Q15; 160],
    lar_pp_last: [Q15; 9],
    v: [Q15; 9],
    msr: Q15,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        let mut dec = Decoder {
            nrp: 40,
            drp: [0; 160],
            lar_pp_last: [0; 9],
            v: [0; 9],
            msr: 0,
        };
        dec.reset();
        dec
    }

    pub fn reset(&mut self) {
        self.nrp = 40;
        self.drp = [0; 160];
        self.lar_pp_last = [0; 9];
        self.v = [0; 9];
        self.msr = 0;
    }

    /// Decodes one frame back into 160 PCM samples.
    pub fn decode(&mut self, params: &Parameters) -> [i16; SEGMENT_SAMPLES] {
        let rp = decode_reflection_coefficients(&params.lar_c, &mut self.lar_pp_last);

        let mut sr = [0i16; SEGMENT_SAMPLES];
        for (j, seg) in params.sub_segs.iter().enumerate() {
            let kj = j * 40;
            let erp = Self::rpe_decode(seg);
            let current = self.long_term_synthesis(seg, &erp);

            for k in 0..40 {
                let zone = k_to_zone(kj + k);
                sr[kj + k] = self.short_term_synthesis_sample(current[k], &rp[zone]);
            }

            for k in 0..120 {
                self.drp[k] = self.drp[k + 40];
            }
        }

        self.de_emphasize_and_scale(&sr)
    }

    /// §5.3.1 - APCM decoding of `xMc[]` back to the excitation pulses
    /// `erp[]` (zero everywhere but the `Mc`-offset grid positions).
    fn rpe_decode(seg: &SubSegParameters) -> [Q15; 40] {
        let mut exp: i16 = 0;
        if seg.xmaxc > 15 {
            exp = q15::sub((seg.xmaxc as i16) >> 3, 1);
        }
        let mut mant = q15::sub(seg.xmaxc as i16, exp << 3);
        if mant == 0 {
            exp = -4;
            mant = 15;
        } else {
            let mut itest = 0;
            for _ in 0..=2 {
                if mant > 7 {
                    itest = 1;
                }
                if itest == 0 {
                    mant = q15::add(mant << 1, 1);
                }
                if itest == 0 {
                    exp = q15::sub(exp, 1);
                }
            }
        }
        mant = q15::sub(mant, 8);

        let temp1 = FAC[mant as usize];
        let temp2 = q15::sub(6, exp);
        let temp3 = 1i16 << q15::sub(temp2, 1);

        let mut erp = [0i16; 40];
        for i in 0..=12usize {
            let mut t = q15::sub((seg.x_mc[i] as i16) << 1, 7);
            t <<= 12;
            t = q15::mult_r(temp1, t);
            t = q15::add(t, temp3);
            erp[seg.mc as usize + 3 * i] = t >> temp2;
        }
        erp
    }

    /// §5.3.2 - Long-term synthesis filtering: reconstructs the current
    /// subsegment's short-term residual `drp[120..160]` from the
    /// excitation and the lag/gain-filtered history.
    fn long_term_synthesis(&mut self, seg: &SubSegParameters, erp: &[Q15; 40]) -> [Q15; 40] {
        if (40..=120).contains(&seg.nc) {
            self.nrp = seg.nc as i16;
        }
        let nc = self.nrp;
        let brp = QLB[seg.bc as usize];
        let mut current = [0i16; 40];
        for k in 0..40usize {
            let hist_idx = (k as i64 + 120 - nc as i64) as usize;
            let drpp = q15::mult_r(brp, self.drp[hist_idx]);
            let v = q15::add(erp[k], drpp);
            self.drp[120 + k] = v;
            current[k] = v;
        }
        current
    }

    /// §5.3.3/§5.3.4 - Short-term synthesis filtering: an 8-section
    /// lattice inverse to the encoder's analysis filter, driven by the
    /// reconstructed residual and this zone's reflection coefficients.
    fn short_term_synthesis_sample(&mut self, drp_k: Q15, rp_zone: &[Q15; 9]) -> Q15 {
        let mut sri = drp_k;
        for i in (1..=8).rev() {
            sri = q15::sub(sri, q15::mult_r(rp_zone[i], self.v[i - 1]));
        }
        for i in (2..=8).rev() {
            self.v[i - 1] = q15::add(self.v[i - 2], q15::mult_r(rp_zone[i - 1], sri));
        }
        self.v[0] = sri;
        sri
    }

    /// §5.3.6 de-emphasis and §5.3.7 upscaling back to 16-bit PCM range.
    fn de_emphasize_and_scale(&mut self, sr: &[Q15; SEGMENT_SAMPLES]) -> [i16; SEGMENT_SAMPLES] {
        let mut out = [0i16; SEGMENT_SAMPLES];
        for k in 0..SEGMENT_SAMPLES {
            let sro = q15::add(sr[k], q15::mult_r(self.msr, 28180));
            self.msr = sro;
            out[k] = (q15::add(sro, sro) >> 3) << 3;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsm::encoder::Encoder;

    #[test]
    fn decoding_a_default_frame_does_not_panic_and_stays_in_range() {
        let mut dec = Decoder::new();
        let params = Parameters::default();
        let pcm = dec.decode(&params);
        assert_eq!(pcm.len(), SEGMENT_SAMPLES);
    }

    #[test]
    fn decoder_reset_clears_carried_state() {
        let mut dec = Decoder::new();
        let params = Parameters::default();
        let _ = dec.decode(&params);
        dec.reset();
        assert_eq!(dec.nrp, 40);
        assert_eq!(dec.drp, [0; 160]);
        assert_eq!(dec.v, [0; 9]);
        assert_eq!(dec.msr, 0);
    }

    #[test]
    fn encode_then_decode_a_tone_stays_bounded_and_roughly_periodic() {
        let mut enc = Encoder::new();
        let mut dec = Decoder::new();
        let mut tone = [0i16; SEGMENT_SAMPLES];
        for (k, s) in tone.iter_mut().enumerate() {
            *s = ((4000.0 * (2.0 * std::f32::consts::PI * 300.0 * k as f32 / 8000.0).sin()) as i32) as i16;
        }

        let mut last_pcm = [0i16; SEGMENT_SAMPLES];
        for _ in 0..5 {
            let params = enc.encode(&tone);
            last_pcm = dec.decode(&params);
        }

        for &sample in last_pcm.iter() {
            assert!(sample.unsigned_abs() < 30000, "decoded sample out of plausible range: {sample}");
        }
    }
}
