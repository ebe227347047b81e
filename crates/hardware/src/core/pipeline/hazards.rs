//! Load-use hazard tracking.
//!
//! Execute records the destination of every load it pushes into the Memory-Access queue,
//! together with the write-back tag the load will return with. An instruction whose sources or
//! destination match a pending entry must wait. Entries leave the tracker in one of two ways:
//! 1. **Commit:** Memory-Access writes the value back; the entry with the matching address and
//!    tag is cleared. A mismatched tag leaves the entry alone, so a stale write cannot release a
//!    newer producer of the same register.
//! 2. **Flush:** A trap squashes every queued load; all entries are dropped.

use crate::common::constants::{HAZARD_DEPTH, REG_TAG_WIDTH};
use crate::common::bits::mask;

/// A pending load destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingWrite {
    /// Unified destination index.
    pub addr: u8,
    /// Write-back tag.
    pub tag: u8,
}

/// Bounded list of pending load destinations, oldest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardTracker {
    entries: [PendingWrite; HAZARD_DEPTH],
    depth: usize,
}

impl HazardTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending entries.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// True when no load is pending.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// True when another load cannot be tracked.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.depth == HAZARD_DEPTH
    }

    /// Most recently issued pending destination.
    pub fn latest(&self) -> Option<u8> {
        self.depth.checked_sub(1).map(|i| self.entries[i].addr)
    }

    /// Pending entries, oldest first.
    pub fn pending(&self) -> &[PendingWrite] {
        &self.entries[..self.depth]
    }

    /// Records a load destination. Returns `false` when the tracker is full or `addr` is x0.
    pub fn issue(&mut self, addr: u8, tag: u8) -> bool {
        if addr == 0 || self.is_full() {
            return false;
        }
        self.entries[self.depth] = PendingWrite {
            addr,
            tag: tag & mask(REG_TAG_WIDTH) as u8,
        };
        self.depth += 1;
        true
    }

    /// Clears the entry matching both `addr` and `tag`. Returns whether one was found.
    pub fn commit(&mut self, addr: u8, tag: u8) -> bool {
        let Some(pos) = self
            .pending()
            .iter()
            .position(|e| e.addr == addr && e.tag == tag)
        else {
            return false;
        };
        self.entries.copy_within(pos + 1..self.depth, pos);
        self.depth -= 1;
        self.entries[self.depth] = PendingWrite::default();
        true
    }

    /// True when `reg` has a pending load.
    pub fn is_pending(&self, reg: u8) -> bool {
        reg != 0 && self.pending().iter().any(|e| e.addr == reg)
    }

    /// True when any of `regs` has a pending load.
    pub fn conflicts(&self, regs: &[Option<u8>]) -> bool {
        regs.iter().flatten().any(|&r| self.is_pending(r))
    }

    /// Drops every pending entry.
    pub fn flush(&mut self) {
        *self = Self::default();
    }
}
