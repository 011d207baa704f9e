//! Run-time configuration for the CLI demo harness.
//!
//! The DSP core types are constructed directly with their own parameters;
//! this struct exists for the CLI binary, which needs one place to hold
//! sample rates and protocol constants that would otherwise be scattered
//! across argument flags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sample rate used for SCAMP and RTTY demodulation, in Hz.
    #[serde(default = "default_fsk_sample_rate")]
    pub fsk_sample_rate: u32,

    /// SCAMP mark tone, in Hz.
    #[serde(default = "default_scamp_mark_hz")]
    pub scamp_mark_hz: f32,

    /// SCAMP mark/space tone spread, in Hz.
    #[serde(default = "default_scamp_spread_hz")]
    pub scamp_spread_hz: f32,

    /// RTTY mark tone, in Hz.
    #[serde(default = "default_rtty_mark_hz")]
    pub rtty_mark_hz: f32,

    /// RTTY mark/space shift, in Hz.
    #[serde(default = "default_rtty_shift_hz")]
    pub rtty_shift_hz: f32,

    /// RTTY baud rate, ×100 (e.g. 4545 for 45.45 baud).
    #[serde(default = "default_rtty_baud_times100")]
    pub rtty_baud_times100: u16,
}

fn default_fsk_sample_rate() -> u32 {
    2000
}

fn default_scamp_mark_hz() -> f32 {
    667.0
}

fn default_scamp_spread_hz() -> f32 {
    66.666_666
}

fn default_rtty_mark_hz() -> f32 {
    1000.0
}

fn default_rtty_shift_hz() -> f32 {
    170.0
}

fn default_rtty_baud_times100() -> u16 {
    4545
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fsk_sample_rate: default_fsk_sample_rate(),
            scamp_mark_hz: default_scamp_mark_hz(),
            scamp_spread_hz: default_scamp_spread_hz(),
            rtty_mark_hz: default_rtty_mark_hz(),
            rtty_shift_hz: default_rtty_shift_hz(),
            rtty_baud_times100: default_rtty_baud_times100(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.fsk_sample_rate, 2000);
        assert!(cfg.scamp_mark_hz > 0.0);
        assert!(cfg.rtty_baud_times100 > 0);
    }

    #[test]
    fn configuration_serializes_to_json() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: Config = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.fsk_sample_rate, cfg.fsk_sample_rate);
    }
}
