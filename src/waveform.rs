//! Ideal sensor model and electrical angle helpers.
//!
//! The model produces the samples a balanced machine would present on the
//! two sensing channels: `u = 128 + A·sin θ` and `v = 128 + A·sin(θ + 120°)`.
//! Step `n` is centred on `θ = n · 15°` under this model.

use fixed::types::{I16F16, U16F16};

use crate::{Phase, RawSamplePair, STEP_COUNT};

fn tau() -> I16F16 {
    I16F16::from_num(core::f64::consts::TAU)
}

/// Wrap an angle in radians into `0 <= angle < 2*pi`.
pub fn normalize(angle: I16F16) -> I16F16 {
    angle.rem_euclid(tau())
}

/// Electrical angle in radians at the center of `phase`.
pub fn phase_angle(phase: Phase) -> I16F16 {
    tau() / I16F16::from_num(STEP_COUNT) * I16F16::from_num(phase.get())
}

/// The step whose 15° window contains `angle`.
pub fn angle_phase(angle: I16F16) -> Phase {
    let half_step = tau() / I16F16::from_num(2 * STEP_COUNT);
    let steps = (normalize(angle + half_step) / tau()).saturating_mul_int(i32::from(STEP_COUNT));
    Phase::wrapping(steps.saturating_to_num::<u8>())
}

fn sample(sin: I16F16, amplitude: u8) -> u8 {
    (I16F16::from_num(128) + sin * I16F16::from_num(amplitude))
        .round()
        .saturating_to_num::<u8>()
}

/// Sensor samples at electrical angle `angle` (radians) with peak deviation
/// `amplitude` counts around 128.
pub fn sensor_samples(angle: I16F16, amplitude: u8) -> RawSamplePair {
    let (sin_u, _) = cordic::sin_cos(normalize(angle));
    let (sin_v, _) = cordic::sin_cos(normalize(angle + tau() / 3));
    RawSamplePair::new(sample(sin_u, amplitude), sample(sin_v, amplitude))
}

/// Convert a velocity snapshot (steps per sampling period) into electrical
/// revolutions per second, given the sampling rate of the velocity tick.
pub fn electrical_hz(velocity: u16, tick_hz: U16F16) -> U16F16 {
    (U16F16::from_num(velocity) / U16F16::from_num(STEP_COUNT)).saturating_mul(tick_hz)
}
