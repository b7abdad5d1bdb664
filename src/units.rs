use core::fmt;

use crate::{AMPLITUDE_MAX, STEP_COUNT};

/// One electrical step, 0 to 23 inclusive.
///
/// Used both for the phase detected from the sensors and for the step
/// commanded to the duty synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phase(u8);

impl Phase {
    pub const ZERO: Phase = Phase(0);
    pub const MAX: Phase = Phase(STEP_COUNT - 1);

    /// Create a phase, clamping values above 23.
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Phase(value)
        }
    }

    /// Create a phase from any integer, wrapping modulo 24.
    pub const fn wrapping(value: u8) -> Self {
        Phase(value % STEP_COUNT)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Forward distance from `self` to `to`, modulo 24.
    pub const fn forward_distance(self, to: Phase) -> u8 {
        if to.0 < self.0 {
            to.0 + STEP_COUNT - self.0
        } else {
            to.0 - self.0
        }
    }

    /// The next step, wrapping 23 back to 0.
    pub const fn next(self) -> Phase {
        Phase::wrapping(self.0 + 1)
    }

    /// Iterate over all 24 phases in order.
    pub fn all() -> impl Iterator<Item = Phase> {
        (0..STEP_COUNT).map(Phase)
    }
}

impl TryFrom<u8> for Phase {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < STEP_COUNT {
            Ok(Phase(value))
        } else {
            Err(OutOfRange {
                value,
                max: Self::MAX.0,
            })
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> u8 {
        phase.0
    }
}

/// Row index into the step table, 0 to 61 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Amplitude(u8);

impl Amplitude {
    pub const ZERO: Amplitude = Amplitude(0);
    pub const MAX: Amplitude = Amplitude(AMPLITUDE_MAX);

    /// Create an amplitude, clamping values above 61.
    pub const fn new(value: u8) -> Self {
        if value > AMPLITUDE_MAX {
            Self::MAX
        } else {
            Amplitude(value)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Amplitude> {
        (0..=AMPLITUDE_MAX).map(Amplitude)
    }
}

impl TryFrom<u8> for Amplitude {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= AMPLITUDE_MAX {
            Ok(Amplitude(value))
        } else {
            Err(OutOfRange {
                value,
                max: AMPLITUDE_MAX,
            })
        }
    }
}

impl From<Amplitude> for u8 {
    fn from(amplitude: Amplitude) -> u8 {
        amplitude.0
    }
}

/// A value was above the largest accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    pub value: u8,
    pub max: u8,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value {} out of range 0..={}", self.value, self.max)
    }
}

/// The two analog samples taken once per control cycle.
///
/// The third axis is not sampled, it is derived assuming the three
/// phases sum to a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSamplePair {
    pub u_sense: u8,
    pub v_sense: u8,
}

impl RawSamplePair {
    pub const fn new(u_sense: u8, v_sense: u8) -> Self {
        Self { u_sense, v_sense }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_clamps_and_wraps() {
        assert_eq!(Phase::new(5).get(), 5);
        assert_eq!(Phase::new(23).get(), 23);
        assert_eq!(Phase::new(24).get(), 23);
        assert_eq!(Phase::new(255).get(), 23);
        assert_eq!(Phase::wrapping(24).get(), 0);
        assert_eq!(Phase::wrapping(50).get(), 2);
        assert_eq!(Phase::MAX.next(), Phase::ZERO);
    }

    #[test]
    fn phase_try_from() {
        assert_eq!(Phase::try_from(23), Ok(Phase::MAX));
        assert_eq!(
            Phase::try_from(24),
            Err(OutOfRange {
                value: 24,
                max: 23
            })
        );
    }

    #[test]
    fn forward_distance() {
        assert_eq!(Phase::new(3).forward_distance(Phase::new(3)), 0);
        assert_eq!(Phase::new(3).forward_distance(Phase::new(7)), 4);
        assert_eq!(Phase::new(23).forward_distance(Phase::new(0)), 1);
        assert_eq!(Phase::new(0).forward_distance(Phase::new(23)), 23);
        assert_eq!(Phase::new(20).forward_distance(Phase::new(2)), 6);
    }

    #[test]
    fn amplitude_clamps() {
        assert_eq!(Amplitude::new(0), Amplitude::ZERO);
        assert_eq!(Amplitude::new(61), Amplitude::MAX);
        assert_eq!(Amplitude::new(62), Amplitude::MAX);
        assert_eq!(Amplitude::try_from(40).map(u8::from), Ok(40));
        assert!(Amplitude::try_from(62).is_err());
        assert_eq!(Amplitude::all().count(), 62);
    }
}
