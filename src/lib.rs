//! A 24-step commutation engine for three-phase motors.
//!
//! Rotor position is estimated from two analog back-EMF-proxy channels and
//! quantised into 24 electrical steps of 15° each. The crate provides:
//!
//! * [`estimator`]: raw sample pair to detected [`Phase`].
//! * [`tracker`]: position and velocity integration shared between the
//!   control loop and a periodic timer interrupt.
//! * [`duty`]: table-driven synthesis of three PWM compare values.
//! * [`control`]: the control loop tying the above to the hardware through
//!   the [`control::SampleSource`] and [`control::DutySink`] traits.
//! * [`waveform`]: an ideal sensor model and fixed-point angle helpers.
#![no_std]
#![forbid(unsafe_code)]

#[macro_use]
mod fmt;

pub mod control;
pub mod duty;
pub mod estimator;
pub mod tables;
pub mod tracker;
pub mod waveform;

mod units;

pub use units::{Amplitude, OutOfRange, Phase, RawSamplePair};

/// Number of electrical steps in one electrical revolution.
pub const STEP_COUNT: u8 = 24;

/// Largest amplitude row of the step table.
pub const AMPLITUDE_MAX: u8 = 61;

/// Decision threshold of the phase estimator.
///
/// The shifted estimates are centred slightly below 128 because of the
/// 8-bit encoding, so the comparisons use this instead of the midpoint.
pub const NEUTRAL: u8 = 103;

/// Duty value for a 50% duty cycle.
pub const DUTY_CENTER: u8 = 128;

/// Forward distances of this many steps or more are rejected by the tracker.
pub const JUMP_REJECT_THRESHOLD: u8 = STEP_COUNT / 2;
