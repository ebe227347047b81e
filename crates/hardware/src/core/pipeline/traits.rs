//! Clocked component interfaces.
//!
//! This module defines the two-phase discipline every modelled component follows. It provides:
//! 1. **Shadow Registers:** `Registers<T>` keeps the current (`r`) and next (`v`) copies of a
//!    component's state; combinational logic reads `r` and writes `v`.
//! 2. **Stage Interface:** `ClockedStage` separates the combinational evaluation from the
//!    clock-edge commit so a scheduler can settle signals before any register changes.
//! 3. **Reset Discipline:** Synchronous reset takes effect at the next edge; asynchronous reset
//!    is applied immediately through `ClockedStage::reset`.

use serde::Deserialize;

/// When an asserted reset takes effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResetMode {
    /// Registers return to their reset values at the next clock edge.
    #[default]
    Sync,
    /// Registers return to their reset values as soon as reset is asserted.
    Async,
}

/// Current and next copies of a component's registered state.
///
/// The reset value of `T` is its `Default`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers<T> {
    r: T,
    v: T,
}

impl<T: Clone + Default> Registers<T> {
    /// Creates a register set holding the reset value.
    pub fn new() -> Self {
        Self {
            r: T::default(),
            v: T::default(),
        }
    }

    /// Registered (current) state.
    #[inline]
    pub const fn r(&self) -> &T {
        &self.r
    }

    /// Next state being computed this cycle.
    #[inline]
    pub const fn v(&self) -> &T {
        &self.v
    }

    /// Starts a combinational evaluation: the next state defaults to the current state.
    ///
    /// Returns the next-state copy for modification.
    #[inline]
    pub fn begin(&mut self) -> &mut T {
        self.v.clone_from(&self.r);
        &mut self.v
    }

    /// Next state, for updates decided at the clock edge itself.
    #[inline]
    pub const fn v_mut(&mut self) -> &mut T {
        &mut self.v
    }

    /// Clock edge: latches the next state, or the reset value while reset is held.
    pub fn commit(&mut self, reset: bool) {
        if reset {
            self.reset();
        } else {
            self.r.clone_from(&self.v);
        }
    }

    /// Forces both copies to the reset value.
    pub fn reset(&mut self) {
        self.r = T::default();
        self.v = T::default();
    }
}

/// A component evaluated in two phases per clock.
///
/// `comb` must be a pure function of the registered state and `input`; it may be called
/// several times per cycle while the scheduler iterates to a fixed point. `clock` is called
/// exactly once per cycle after every component has settled.
pub trait ClockedStage {
    /// Input signals sampled this cycle.
    type Input;
    /// Output signals driven this cycle.
    type Output;

    /// Computes outputs and next state from registered state and inputs.
    fn comb(&mut self, input: &Self::Input) -> Self::Output;

    /// Commits the next state on the clock edge. `reset` holds the reset line level.
    fn clock(&mut self, reset: bool);

    /// Applies reset immediately.
    fn reset(&mut self);
}
