//! Reflection-coefficient reconstruction shared by the encoder (which
//! needs it to drive the short-term analysis filter, §5.2.8-5.2.9) and
//! the decoder (§5.3.3), since both must derive the same four-zone `rp[]`
//! from a frame's `LARc` and the previous frame's `LARpp`.

use super::tables::{B, INVA, MIC};
use crate::fixed::q15::{self, Q15};

/// Reconstructs the four interpolation zones' reflection coefficients
/// (`rp[zone][1..8]`, index 0 unused) from a frame's coded log area
/// ratios. `lar_pp_last` holds the previous frame's decoded LARpp and is
/// updated in place with this frame's LARpp for the next call, mirroring
/// the encoder's and decoder's own carried `LARpp_last` state.
pub fn decode_reflection_coefficients(lar_c: &[u8; 8], lar_pp_last: &mut [Q15; 9]) -> [[Q15; 9]; 4] {
    let mut lar_pp = [0i16; 9];

    for i in 1..=8 {
        let coded = lar_c[i - 1] as i16;
        // Restore the sign lost when LARc[] was made non-negative by
        // subtracting MIC[i] at encode time, then back out B[i].
        let mut temp = q15::add(coded, MIC[i]) << 10;
        temp = q15::sub(temp, B[i] << 1);
        temp = q15::mult_r(INVA[i], temp);
        lar_pp[i] = q15::add(temp, temp);
    }

    let mut rp = [[0i16; 9]; 4];
    for i in 1..=8 {
        let mut lar_p = [0i16; 4];

        let temp = q15::add(lar_pp_last[i] >> 2, lar_pp[i] >> 2);
        lar_p[0] = q15::add(temp, lar_pp_last[i] >> 1);
        lar_p[1] = q15::add(lar_pp_last[i] >> 1, lar_pp[i] >> 1);
        let temp = q15::add(lar_pp_last[i] >> 2, lar_pp[i] >> 2);
        lar_p[2] = q15::add(temp, lar_pp[i] >> 1);
        lar_p[3] = lar_pp[i];

        for (zone, &lp) in lar_p.iter().enumerate() {
            let mut temp = q15::abs(lp);
            if temp < 11059 {
                temp <<= 1;
            } else if temp < 20070 {
                temp = q15::add(temp, 11059);
            } else {
                temp = q15::add(temp >> 2, 26112);
            }
            rp[zone][i] = if lp < 0 { q15::sub(0, temp) } else { temp };
        }

        lar_pp_last[i] = lar_pp[i];
    }

    rp
}
