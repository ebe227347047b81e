//! Memory-operation FIFO between Execute and Memory-Access.
//!
//! Entries are formatted for the data bus at push time: the store value is replicated across
//! the 8-byte lane and the byte strobes select the addressed bytes. The queue provides:
//! 1. **Push:** Append at the tail when not full.
//! 2. **Pop:** Remove the oldest entry.
//! 3. **Flush:** Mark every queued entry as squashed. Squashed entries still drain to memory
//!    but never write back.

use crate::common::constants::MEMACCESS_QUEUE_DEPTH;
use crate::core::pipeline::latches::MemopRequest;
use crate::core::pipeline::signals::MemopSize;

/// A queued memory operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemQueueEntry {
    /// Squashed by a trap: the access completes but its result is discarded.
    pub flushed: bool,
    /// Write-back tag.
    pub wtag: u8,
    /// Lane-replicated store data.
    pub wdata: u64,
    /// Byte strobes within the 8-byte lane.
    pub wstrb: u8,
    /// Sign-extend the loaded value.
    pub sign_ext: bool,
    /// Destination register, 0 for stores.
    pub waddr: u8,
    /// Raw instruction word.
    pub instr: u32,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Access size.
    pub size: MemopSize,
    /// Store (`true`) or load (`false`).
    pub store: bool,
    /// Effective address.
    pub addr: u64,
}

impl MemQueueEntry {
    /// Builds a bus-formatted entry from an Execute request.
    pub fn from_request(req: &MemopRequest) -> Self {
        Self {
            flushed: false,
            wtag: req.wtag,
            wdata: replicate(req.wdata, req.size),
            wstrb: strobes(req.addr, req.size),
            sign_ext: req.sign_ext,
            waddr: if req.store { 0 } else { req.waddr },
            instr: req.instr,
            pc: req.pc,
            size: req.size,
            store: req.store,
            addr: req.addr,
        }
    }
}

/// Replicates the low `size` bytes of `data` across all 8 byte lanes.
pub const fn replicate(data: u64, size: MemopSize) -> u64 {
    match size {
        MemopSize::Byte => (data & 0xFF) * 0x0101_0101_0101_0101,
        MemopSize::Half => (data & 0xFFFF) * 0x0001_0001_0001_0001,
        MemopSize::Word => (data & 0xFFFF_FFFF) * 0x0000_0001_0000_0001,
        MemopSize::Double => data,
    }
}

/// Byte strobes for an access of `size` at `addr` within its 8-byte lane.
pub const fn strobes(addr: u64, size: MemopSize) -> u8 {
    let ones: u16 = (1 << size.bytes() as u32) - 1;
    ((ones << (addr & 7) as u32) & 0xFF) as u8
}

/// Fixed-capacity FIFO of memory operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemQueue {
    entries: [MemQueueEntry; MEMACCESS_QUEUE_DEPTH],
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of valid entries.
    count: usize,
}

impl MemQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        MEMACCESS_QUEUE_DEPTH
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the queue is full.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == MEMACCESS_QUEUE_DEPTH
    }

    /// Appends an entry. Returns `false` if the queue is full.
    pub fn push(&mut self, entry: MemQueueEntry) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries[self.tail] = entry;
        self.tail = (self.tail + 1) % MEMACCESS_QUEUE_DEPTH;
        self.count += 1;
        true
    }

    /// Oldest entry without removing it.
    pub fn peek(&self) -> Option<&MemQueueEntry> {
        (!self.is_empty()).then(|| &self.entries[self.head])
    }

    /// Removes and returns the oldest entry.
    pub fn pop(&mut self) -> Option<MemQueueEntry> {
        if self.is_empty() {
            return None;
        }
        let entry = std::mem::take(&mut self.entries[self.head]);
        self.head = (self.head + 1) % MEMACCESS_QUEUE_DEPTH;
        self.count -= 1;
        Some(entry)
    }

    /// Marks every queued entry as squashed.
    pub fn flush(&mut self) {
        let mut idx = self.head;
        for _ in 0..self.count {
            self.entries[idx].flushed = true;
            idx = (idx + 1) % MEMACCESS_QUEUE_DEPTH;
        }
    }

    /// Iterates over queued entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MemQueueEntry> + '_ {
        (0..self.count).map(move |i| &self.entries[(self.head + i) % MEMACCESS_QUEUE_DEPTH])
    }
}
