//! Duty cycle synthesis from the constant step tables.
//!
//! For a given amplitude and electrical step, each of the three outputs is
//! the 50% center plus or minus one magnitude from [`tables::STEP_TABLE`].
//! Over the 24 steps the outputs trace three flat-topped waves 120° apart.

use crate::{
    tables::{self, Descriptor},
    Amplitude, Phase, DUTY_CENTER,
};

/// The three PWM compare values for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyTriple {
    pub u: u8,
    pub v: u8,
    pub w: u8,
}

impl DutyTriple {
    /// All outputs at 50%.
    pub const NEUTRAL: DutyTriple = DutyTriple {
        u: DUTY_CENTER,
        v: DUTY_CENTER,
        w: DUTY_CENTER,
    };

    pub const fn to_array(self) -> [u8; 3] {
        [self.u, self.v, self.w]
    }

    /// Sum of the signed offsets of the three outputs from the center.
    pub fn common_mode(self) -> i16 {
        self.to_array()
            .iter()
            .map(|&duty| i16::from(duty) - i16::from(DUTY_CENTER))
            .sum()
    }
}

impl Default for DutyTriple {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn channel(amplitude: Amplitude, descriptor: Descriptor) -> u8 {
    let magnitude = tables::magnitude(amplitude, descriptor);
    if descriptor.is_negated() {
        DUTY_CENTER - magnitude
    } else {
        DUTY_CENTER + magnitude
    }
}

/// Compute the duty values for `amplitude` at electrical `step`.
pub fn synthesize(amplitude: Amplitude, step: Phase) -> DutyTriple {
    let [u, v, w] = tables::descriptors(step);
    DutyTriple {
        u: channel(amplitude, u),
        v: channel(amplitude, v),
        w: channel(amplitude, w),
    }
}

/// [`synthesize`] for unchecked inputs. Amplitude is clamped to 0..=61 and
/// step to 0..=23.
pub fn synthesize_raw(amplitude: u8, step: u8) -> DutyTriple {
    synthesize(Amplitude::new(amplitude), Phase::new(step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::STEP_TABLE;

    #[test]
    fn full_amplitude_pattern() {
        let expected: [[u8; 3]; 24] = [
            [221, 221, 1],
            [246, 180, 1],
            [255, 128, 1],
            [255, 76, 10],
            [255, 35, 35],
            [255, 10, 76],
            [255, 1, 128],
            [246, 1, 180],
            [221, 1, 221],
            [180, 1, 246],
            [128, 1, 255],
            [76, 10, 255],
            [35, 35, 255],
            [10, 76, 255],
            [1, 128, 255],
            [1, 180, 246],
            [1, 221, 221],
            [1, 246, 180],
            [1, 255, 128],
            [10, 255, 76],
            [35, 255, 35],
            [76, 255, 10],
            [128, 255, 1],
            [180, 246, 1],
        ];
        for (step, duty) in Phase::all().zip(expected) {
            assert_eq!(synthesize(Amplitude::MAX, step).to_array(), duty, "step {}", step.get());
        }
    }

    #[test]
    fn mid_amplitude_sample() {
        assert_eq!(
            synthesize(Amplitude::new(30), Phase::new(5)),
            DutyTriple {
                u: 194,
                v: 67,
                w: 101
            }
        );
    }

    #[test]
    fn outputs_stay_in_range() {
        for amplitude in Amplitude::all() {
            for step in Phase::all() {
                let duty = synthesize(amplitude, step);
                assert!(duty.to_array().iter().all(|&d| d >= 1), "{duty:?}");
            }
        }
    }

    #[test]
    fn zero_amplitude_is_neutral() {
        for step in Phase::all() {
            assert_eq!(synthesize(Amplitude::ZERO, step), DutyTriple::NEUTRAL);
        }
    }

    #[test]
    fn common_mode_is_bounded() {
        for amplitude in Amplitude::all() {
            let tolerance = i16::from(STEP_TABLE[amplitude.get() as usize][3] / 2);
            for step in Phase::all() {
                let duty = synthesize(amplitude, step);
                assert!(
                    duty.common_mode().abs() <= tolerance,
                    "amplitude {} step {}: {duty:?}",
                    amplitude.get(),
                    step.get()
                );
            }
        }
    }

    #[test]
    fn channels_are_120_degrees_apart() {
        for amplitude in Amplitude::all() {
            for step in Phase::all() {
                let duty = synthesize(amplitude, step);
                let ahead = |n: u8| synthesize(amplitude, Phase::wrapping(step.get() + n)).u;
                assert_eq!(duty.v, ahead(8));
                assert_eq!(duty.w, ahead(16));
            }
        }
    }

    #[test]
    fn half_turn_mirrors_around_center() {
        for amplitude in Amplitude::all() {
            for step in Phase::all() {
                let now = synthesize(amplitude, step).to_array();
                let opposite = synthesize(amplitude, Phase::wrapping(step.get() + 12)).to_array();
                for (a, b) in now.iter().zip(opposite) {
                    assert_eq!(u16::from(*a) + u16::from(b), 256);
                }
            }
        }
    }

    #[test]
    fn raw_inputs_are_clamped() {
        assert_eq!(synthesize_raw(200, 3), synthesize(Amplitude::MAX, Phase::new(3)));
        assert_eq!(synthesize_raw(61, 99), synthesize(Amplitude::MAX, Phase::MAX));
    }

    #[test]
    fn synthesize_is_pure() {
        let first = synthesize(Amplitude::new(17), Phase::new(9));
        for step in Phase::all() {
            synthesize(Amplitude::MAX, step);
        }
        assert_eq!(synthesize(Amplitude::new(17), Phase::new(9)), first);
    }
}
