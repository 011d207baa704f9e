//! ETSI EN 300 961 constant tables (section 5, tables 5.1-5.6), plus the
//! k-to-zone mapping (table 3.2). These are process-wide immutable data;
//! there is no initialization-order concern since they are literals.

use crate::fixed::Q15;

/// Table 5.1: LAR quantization scale factor, index 1..8 (index 0 unused).
/// Pre-scaled down by 32.
pub const A: [Q15; 9] = [0, 20480, 20480, 20480, 20480, 13964, 15360, 8534, 9036];

/// Table 5.1: LAR quantization offset, index 1..8. Pre-scaled down by 64.
pub const B: [Q15; 9] = [0, 0, 0, 2048, -2560, 94, -1792, -341, -1144];

/// Table 5.1: minimum coded LAR value per index.
pub const MIC: [Q15; 9] = [0, -32, -32, -16, -16, -8, -8, -4, -4];

/// Table 5.1: maximum coded LAR value per index.
pub const MAC: [Q15; 9] = [0, 31, 31, 15, 15, 7, 7, 3, 3];

/// Table 5.2: inverse of [`A`], used to decode `LARc` back to `LARpp`.
pub const INVA: [Q15; 9] = [0, 13107, 13107, 13107, 13107, 19223, 17476, 31454, 29708];

/// Table 5.3a: LTP gain quantizer decision levels.
pub const DLB: [Q15; 4] = [6554, 16384, 26214, 32767];

/// Table 5.3b: LTP gain quantizer reconstruction levels.
pub const QLB: [Q15; 4] = [3277, 11469, 21299, 32767];

/// Table 5.4: weighting filter coefficients (11-tap FIR).
pub const H: [Q15; 11] = [-134, -374, 0, 2054, 5741, 8192, 5741, 2054, 0, -374, -134];

/// Table 5.5: normalized inverse mantissa, used to compute `xMc` from `xM`.
pub const NRFAC: [Q15; 8] = [29128, 26215, 23832, 21846, 20165, 18725, 17476, 16384];

/// Table 5.6: normalized direct mantissa, used to reconstruct `xMp`.
pub const FAC: [Q15; 8] = [18431, 20479, 22527, 24575, 26623, 28671, 30719, 32767];

/// Table 3.2: maps a short-term residual sample index `k` in `[0, 159]` to
/// its interpolation zone `[0, 3]`.
pub fn k_to_zone(k: usize) -> usize {
    if k <= 12 {
        0
    } else if k <= 26 {
        1
    } else if k <= 39 {
        2
    } else {
        3
    }
}
