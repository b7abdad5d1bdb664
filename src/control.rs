//! The per-cycle control loop.
//!
//! Each cycle acquires one sample pair, estimates and tracks the rotor
//! phase, synthesises the duty values for the commanded step and hands them
//! to the PWM hardware. The commanded step comes from a free-running
//! [`StepSequencer`] and is deliberately independent of the detected phase.

use crate::{
    duty::{synthesize, DutyTriple},
    estimator::estimate,
    tracker::SharedPhaseState,
    Amplitude, Phase, RawSamplePair,
};

/// Where the control loop gets its samples from.
pub trait SampleSource {
    /// Start a conversion of both channels and block until it completes.
    fn acquire(&mut self) -> RawSamplePair;
}

/// Where the control loop puts its duty values.
pub trait DutySink {
    fn write(&mut self, duty: DutyTriple);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    /// Amplitude row used for every cycle.
    pub amplitude: Amplitude,
    /// Control cycles spent on each commanded step.
    pub hold_cycles: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            amplitude: Amplitude::MAX,
            hold_cycles: 200,
        }
    }
}

/// Advances the commanded step by one every `hold_cycles` calls to
/// [`advance`](Self::advance).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepSequencer {
    step: Phase,
    count: u16,
    hold_cycles: u16,
}

impl StepSequencer {
    /// A hold of 0 behaves like 1.
    pub const fn new(hold_cycles: u16) -> Self {
        Self {
            step: Phase::ZERO,
            count: 0,
            hold_cycles: if hold_cycles == 0 { 1 } else { hold_cycles },
        }
    }

    pub const fn step(&self) -> Phase {
        self.step
    }

    pub fn advance(&mut self) {
        self.count += 1;
        if self.count >= self.hold_cycles {
            self.count = 0;
            self.step = self.step.next();
        }
    }
}

/// What happened during one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub samples: RawSamplePair,
    pub detected: Phase,
    /// Progress added to the accumulator, 0 if the move was rejected.
    pub accepted: u8,
    pub step: Phase,
    pub duty: DutyTriple,
}

pub struct ControlLoop<S, D> {
    source: S,
    sink: D,
    amplitude: Amplitude,
    sequencer: StepSequencer,
}

impl<S: SampleSource, D: DutySink> ControlLoop<S, D> {
    pub fn new(source: S, sink: D, config: ControlConfig) -> Self {
        Self {
            source,
            sink,
            amplitude: config.amplitude,
            sequencer: StepSequencer::new(config.hold_cycles),
        }
    }

    pub fn set_amplitude(&mut self, amplitude: Amplitude) {
        self.amplitude = amplitude;
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_parts(self) -> (S, D) {
        (self.source, self.sink)
    }

    /// Run one control cycle.
    pub fn cycle(&mut self, state: &SharedPhaseState) -> CycleReport {
        let samples = self.source.acquire();
        let detected = estimate(samples);
        let accepted = state.track(detected);

        let step = self.sequencer.step();
        let duty = synthesize(self.amplitude, step);
        self.sink.write(duty);
        self.sequencer.advance();

        CycleReport {
            samples,
            detected,
            accepted,
            step,
            duty,
        }
    }

    /// Run control cycles forever.
    pub fn run(&mut self, state: &SharedPhaseState) -> ! {
        loop {
            self.cycle(state);
        }
    }
}
