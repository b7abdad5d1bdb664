//! Phase estimation from two back-EMF-proxy samples.
//!
//! The third axis is reconstructed from the first two, each axis is shifted
//! by roughly ±1/48 of a cycle, and a fixed cascade of comparisons between
//! the shifted values and [`NEUTRAL`] picks one of 24 electrical steps.
//!
//! All arithmetic is on `u8` with explicit wrapping, and all comparisons are
//! unsigned.

use crate::{Phase, RawSamplePair, NEUTRAL};

/// Offset applied to the halved samples so the working range is 64..=191.
const CENTER_OFFSET: u8 = 64;

/// Working values of the three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveformTriple {
    pub wave_u: u8,
    pub wave_v: u8,
    pub wave_w: u8,
}

impl WaveformTriple {
    /// Halve both samples and derive the third axis.
    ///
    /// `255 - u/2 - v/2` is already centred on 128 for a balanced set, so
    /// only the two sampled axes receive [`CENTER_OFFSET`].
    pub fn from_samples(samples: RawSamplePair) -> Self {
        let wave_u = samples.u_sense >> 1;
        let wave_v = samples.v_sense >> 1;
        let wave_w = 255u8.wrapping_sub(wave_u).wrapping_sub(wave_v);
        Self {
            wave_u: wave_u.wrapping_add(CENTER_OFFSET),
            wave_v: wave_v.wrapping_add(CENTER_OFFSET),
            wave_w,
        }
    }
}

/// Each axis approximated 1/48 cycle ahead (`adv`) and behind (`del`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftedEstimates {
    pub u_adv: u8,
    pub u_del: u8,
    pub v_adv: u8,
    pub v_del: u8,
    pub w_adv: u8,
    pub w_del: u8,
}

/// `x/4 - x/16`, the share of one axis that is mixed into its neighbours.
const fn shift_component(x: u8) -> u8 {
    let quarter = x >> 2;
    quarter.wrapping_sub(quarter >> 2)
}

impl ShiftedEstimates {
    pub fn from_waveform(wave: WaveformTriple) -> Self {
        let from_v = shift_component(wave.wave_v);
        let from_w = shift_component(wave.wave_w);
        let from_u = shift_component(wave.wave_u);
        Self {
            u_del: wave.wave_u.wrapping_sub(from_v),
            w_adv: wave.wave_w.wrapping_sub(from_v),
            v_del: wave.wave_v.wrapping_sub(from_w),
            u_adv: wave.wave_u.wrapping_sub(from_w),
            w_del: wave.wave_w.wrapping_sub(from_u),
            v_adv: wave.wave_v.wrapping_sub(from_u),
        }
    }
}

/// One entry of the decision cascade.
pub struct Rule {
    pub phase: Phase,
    pub matches: fn(&ShiftedEstimates) -> bool,
}

const N: u8 = NEUTRAL;

/// The decision cascade, in evaluation order.
///
/// Several rules can match the same input. The last matching rule decides,
/// so the order here is part of the behaviour.
pub static RULES: [Rule; 24] = [
    // u
    Rule { phase: Phase::new(12), matches: |e| N < e.u_del && e.u_adv <= N },
    Rule { phase: Phase::new(1), matches: |e| N < e.u_del && e.u_adv < e.v_adv },
    Rule { phase: Phase::new(0), matches: |e| e.u_del <= N && N < e.u_adv },
    Rule { phase: Phase::new(13), matches: |e| e.u_del <= N && e.v_adv <= e.u_adv },
    // v
    Rule { phase: Phase::new(4), matches: |e| N < e.v_del && e.v_adv <= N },
    Rule { phase: Phase::new(17), matches: |e| N < e.v_del && e.v_adv < e.w_adv },
    Rule { phase: Phase::new(16), matches: |e| e.v_del <= N && N < e.v_adv },
    Rule { phase: Phase::new(5), matches: |e| e.v_del <= N && e.w_adv <= e.v_adv },
    // w
    Rule { phase: Phase::new(20), matches: |e| N < e.w_del && e.w_adv <= N },
    Rule { phase: Phase::new(9), matches: |e| N < e.w_del && e.w_adv < e.u_adv },
    Rule { phase: Phase::new(8), matches: |e| e.w_del <= N && N < e.w_adv },
    Rule { phase: Phase::new(21), matches: |e| e.w_del <= N && e.u_adv <= e.w_adv },
    // u against w
    Rule { phase: Phase::new(11), matches: |e| e.u_del < e.w_del && N < e.u_adv },
    Rule { phase: Phase::new(22), matches: |e| e.u_del < e.w_del && e.w_adv < e.u_adv },
    Rule { phase: Phase::new(23), matches: |e| e.w_del <= e.u_del && e.u_adv <= N },
    Rule { phase: Phase::new(10), matches: |e| e.w_del <= e.u_del && e.u_adv <= e.w_adv },
    // v against u
    Rule { phase: Phase::new(3), matches: |e| e.v_del < e.u_del && N < e.v_adv },
    Rule { phase: Phase::new(14), matches: |e| e.v_del < e.u_del && e.u_adv < e.v_adv },
    Rule { phase: Phase::new(15), matches: |e| e.u_del <= e.v_del && e.v_adv <= N },
    Rule { phase: Phase::new(2), matches: |e| e.u_del <= e.v_del && e.v_adv <= e.u_adv },
    // w against v
    Rule { phase: Phase::new(19), matches: |e| e.w_del < e.v_del && N < e.w_adv },
    Rule { phase: Phase::new(6), matches: |e| e.w_del < e.v_del && e.v_adv < e.w_adv },
    Rule { phase: Phase::new(7), matches: |e| e.v_del <= e.w_del && e.w_adv <= N },
    Rule { phase: Phase::new(18), matches: |e| e.v_del <= e.w_del && e.w_adv <= e.v_adv },
];

/// Run the cascade. `None` if no rule matched.
pub fn classify(estimates: &ShiftedEstimates) -> Option<Phase> {
    RULES
        .iter()
        .rev()
        .find(|rule| (rule.matches)(estimates))
        .map(|rule| rule.phase)
}

/// Estimate the electrical step from one pair of samples.
///
/// Falls back to step 0 in the (unobserved) case where no rule matches.
pub fn estimate(samples: RawSamplePair) -> Phase {
    let estimates = ShiftedEstimates::from_waveform(WaveformTriple::from_samples(samples));
    classify(&estimates).unwrap_or_else(|| {
        warn!(
            "no phase rule matched u={} v={}",
            samples.u_sense,
            samples.v_sense
        );
        Phase::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Samples taken at the center of each step from an ideal sensor with
    /// amplitude 127.
    const CENTERS: [(u8, u8); 24] = [
        (128, 238),
        (161, 218),
        (192, 192),
        (218, 161),
        (238, 128),
        (251, 95),
        (255, 65),
        (251, 38),
        (238, 18),
        (218, 5),
        (192, 1),
        (161, 5),
        (128, 18),
        (95, 38),
        (64, 65),
        (38, 95),
        (18, 128),
        (5, 161),
        (1, 191),
        (5, 218),
        (18, 238),
        (38, 251),
        (64, 255),
        (95, 251),
    ];

    #[test]
    fn waveform_reconstruction() {
        let wave = WaveformTriple::from_samples(RawSamplePair::new(128, 128));
        assert_eq!(
            wave,
            WaveformTriple {
                wave_u: 128,
                wave_v: 128,
                wave_w: 127
            }
        );

        let wave = WaveformTriple::from_samples(RawSamplePair::new(0, 0));
        assert_eq!((wave.wave_u, wave.wave_v, wave.wave_w), (64, 64, 255));
    }

    #[test]
    fn shifted_estimates_at_rest() {
        let wave = WaveformTriple::from_samples(RawSamplePair::new(128, 128));
        let e = ShiftedEstimates::from_waveform(wave);
        assert_eq!((e.u_adv, e.u_del), (104, 104));
        assert_eq!((e.v_adv, e.v_del), (104, 104));
        assert_eq!((e.w_adv, e.w_del), (103, 103));
    }

    #[test]
    fn shifted_estimates_wrap() {
        // wave_w = 1 and the shift taken from u is 36, so w wraps below zero.
        let wave = WaveformTriple::from_samples(RawSamplePair::new(255, 255));
        assert_eq!((wave.wave_u, wave.wave_v, wave.wave_w), (191, 191, 1));
        let e = ShiftedEstimates::from_waveform(wave);
        assert_eq!(e.w_del, 221);
        assert_eq!(e.w_adv, 221);
    }

    #[test]
    fn every_step_center_is_recognised() {
        for (step, &(u, v)) in CENTERS.iter().enumerate() {
            assert_eq!(
                estimate(RawSamplePair::new(u, v)).get() as usize,
                step,
                "samples ({u}, {v})"
            );
        }
    }

    #[test]
    fn later_rules_overwrite_earlier_ones() {
        let samples = RawSamplePair::new(255, 255);
        let e = ShiftedEstimates::from_waveform(WaveformTriple::from_samples(samples));
        let mut matched = RULES.iter().filter(|r| (r.matches)(&e)).map(|r| r.phase.get());
        assert_eq!(matched.next(), Some(17));
        assert_eq!(matched.next(), Some(11));
        assert_eq!(matched.next(), Some(2));
        assert_eq!(matched.next(), None);
        assert_eq!(estimate(samples), Phase::new(2));
    }

    #[test]
    fn some_rule_always_matches() {
        for u in 0..=u8::MAX {
            for v in 0..=u8::MAX {
                let e = ShiftedEstimates::from_waveform(WaveformTriple::from_samples(
                    RawSamplePair::new(u, v),
                ));
                assert!(classify(&e).is_some(), "samples ({u}, {v})");
            }
        }
    }

    #[test]
    fn each_step_has_exactly_one_rule() {
        for step in Phase::all() {
            assert_eq!(RULES.iter().filter(|r| r.phase == step).count(), 1);
        }
    }

    #[test]
    fn estimate_is_pure() {
        let samples = RawSamplePair::new(200, 40);
        let first = estimate(samples);
        for (u, v) in CENTERS {
            estimate(RawSamplePair::new(u, v));
        }
        assert_eq!(estimate(samples), first);
    }
}
