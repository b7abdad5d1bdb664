//! Position tracking and velocity sampling.
//!
//! The control loop feeds every detected phase into [`PhaseState::track`],
//! which integrates forward progress into an accumulator. A periodic timer
//! interrupt calls [`PhaseState::sample_velocity`] to latch the accumulated
//! progress as the velocity and start over.
//!
//! Both contexts touch the same accumulator, so on target the state lives in
//! a [`SharedPhaseState`] which serialises them with a critical section.

use core::cell::Cell;

use critical_section::Mutex;

use crate::{Phase, JUMP_REJECT_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseState {
    current_phase: Phase,
    phase_accumulator: u16,
    velocity_snapshot: u16,
}

impl PhaseState {
    pub const fn new() -> Self {
        Self {
            current_phase: Phase::ZERO,
            phase_accumulator: 0,
            velocity_snapshot: 0,
        }
    }

    /// Step the tracker to a newly detected phase.
    ///
    /// Forward moves of less than half a revolution are added to the
    /// accumulator. Anything larger (including every backwards move) is
    /// treated as a glitch and contributes nothing, but the current phase
    /// still follows the detection. Returns the accepted contribution.
    pub fn track(&mut self, detected: Phase) -> u8 {
        let diff = self.current_phase.forward_distance(detected);
        let accepted = if diff >= JUMP_REJECT_THRESHOLD {
            warn!(
                "rejected phase jump {} -> {}",
                self.current_phase.get(),
                detected.get()
            );
            0
        } else {
            diff
        };
        self.phase_accumulator = self.phase_accumulator.saturating_add(u16::from(accepted));
        self.current_phase = detected;
        accepted
    }

    /// Latch the accumulated progress as the velocity and reset it.
    pub fn sample_velocity(&mut self) -> u16 {
        self.velocity_snapshot = self.phase_accumulator;
        self.phase_accumulator = 0;
        trace!("velocity {}", self.velocity_snapshot);
        self.velocity_snapshot
    }

    pub const fn current_phase(&self) -> Phase {
        self.current_phase
    }

    pub const fn phase_accumulator(&self) -> u16 {
        self.phase_accumulator
    }

    /// Steps advanced during the last complete sampling period.
    pub const fn velocity(&self) -> u16 {
        self.velocity_snapshot
    }
}

/// [`PhaseState`] shared between the control loop and the velocity tick.
///
/// ```
/// use step24::{tracker::SharedPhaseState, Phase};
///
/// static PHASE: SharedPhaseState = SharedPhaseState::new();
///
/// // control loop
/// PHASE.track(Phase::new(1));
/// PHASE.track(Phase::new(2));
///
/// // timer interrupt
/// assert_eq!(PHASE.sample_velocity(), 2);
/// assert_eq!(PHASE.velocity(), 2);
/// ```
pub struct SharedPhaseState {
    inner: Mutex<Cell<PhaseState>>,
}

impl SharedPhaseState {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(PhaseState::new())),
        }
    }

    /// Run `f` on the state with interrupts masked.
    pub fn update<R>(&self, f: impl FnOnce(&mut PhaseState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    pub fn track(&self, detected: Phase) -> u8 {
        self.update(|state| state.track(detected))
    }

    pub fn sample_velocity(&self) -> u16 {
        self.update(PhaseState::sample_velocity)
    }

    /// A consistent copy of the whole state.
    pub fn snapshot(&self) -> PhaseState {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    pub fn current_phase(&self) -> Phase {
        self.snapshot().current_phase()
    }

    pub fn velocity(&self) -> u16 {
        self.snapshot().velocity()
    }
}

impl Default for SharedPhaseState {
    fn default() -> Self {
        Self::new()
    }
}
