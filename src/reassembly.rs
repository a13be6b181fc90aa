//! Per-subframe reassembly buffers.
//!
//! A `CollectedSubframe` is a grow-only byte buffer plus a per-packet
//! received-flags array. Buffers are never shrunk: if a later frame needs
//! more room the buffer is replaced with a bigger one; otherwise the
//! existing allocation is reused and its bookkeeping reset in place.

use crate::codec::{PACKET_MAX_PAYLOAD, REASSEMBLY_PADDING};

/// What happened when a packet was offered to a `CollectedSubframe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The packet was new and has been copied into the buffer.
    Accepted,
    /// This `packet_index` was already received; the packet was dropped.
    Duplicate,
    /// The index or length disagreed with the slot's reserved capacity.
    OutOfBounds,
}

/// Reassembly state for one subframe slot.
#[derive(Debug, Default)]
pub struct CollectedSubframe {
    buffer: Vec<u8>,
    received: Vec<bool>,
    packets: u16,
    collected_packets: u16,
    actual_size: u32,
}

impl CollectedSubframe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserved capacity in bytes for the current `packets` count, per
    /// §4.3's bounds-check formula. This is independent of the buffer's
    /// physical length, which may be larger because it was never shrunk
    /// after a previous, larger frame.
    fn reserved_capacity(&self) -> usize {
        self.packets as usize * PACKET_MAX_PAYLOAD
    }

    /// (Re)prepares this slot to receive `packets` packets belonging to a
    /// fresh (frame, subframe) pair. Grows the buffer and flags array only
    /// if the current ones are too small; otherwise reuses them in place.
    pub fn prepare(&mut self, packets: u16) {
        let needed = packets as usize * PACKET_MAX_PAYLOAD;
        if self.buffer.len() < needed {
            self.buffer = vec![0u8; needed + REASSEMBLY_PADDING];
        }
        if self.received.len() < packets as usize {
            self.received = vec![false; packets as usize];
        } else {
            for flag in self.received.iter_mut().take(packets as usize) {
                *flag = false;
            }
        }
        self.collected_packets = 0;
        self.actual_size = 0;
        self.packets = packets;
    }

    /// Clears this slot's progress without releasing its buffers, as done
    /// when the receiver switches to assembling a new frame.
    pub fn reset_progress(&mut self) {
        for flag in self.received.iter_mut() {
            *flag = false;
        }
        self.collected_packets = 0;
        self.actual_size = 0;
        self.packets = 0;
    }

    /// True once every packet this slot expects has been deposited.
    pub fn has_incomplete_progress(&self) -> bool {
        self.collected_packets > 0 && self.collected_packets != self.packets
    }

    /// Packets deposited so far toward the current `packets` count. Exposed
    /// for diagnostics only.
    pub fn collected_packets_for_diagnostics(&self) -> u16 {
        self.collected_packets
    }

    /// The `packets` count this slot was last prepared for. Exposed for
    /// diagnostics only.
    pub fn expected_packets_for_diagnostics(&self) -> u16 {
        self.packets
    }

    /// Whether this slot is prepared for a different packet count than
    /// `packets`, i.e. whether `prepare` must run before depositing.
    pub fn needs_prepare_for(&self, packets: u16) -> bool {
        self.packets != packets
    }

    /// Deposits `bytes` at `packet_index`, leaving all state unchanged on
    /// rejection.
    pub fn deposit(&mut self, packet_index: u16, bytes: &[u8]) -> DepositOutcome {
        let idx = packet_index as usize;
        if idx >= self.received.len() {
            return DepositOutcome::OutOfBounds;
        }
        if self.received[idx] {
            return DepositOutcome::Duplicate;
        }
        let offset = idx * PACKET_MAX_PAYLOAD;
        if offset + bytes.len() > self.reserved_capacity() {
            return DepositOutcome::OutOfBounds;
        }

        self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.received[idx] = true;
        self.collected_packets += 1;
        self.actual_size += bytes.len() as u32;
        DepositOutcome::Accepted
    }

    pub fn is_complete(&self) -> bool {
        self.packets != 0 && self.collected_packets == self.packets
    }

    pub fn actual_size(&self) -> u32 {
        self.actual_size
    }

    /// The deposited bytes collected so far, in packet order. Valid to call
    /// at any point; only meaningful once `is_complete()`.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.actual_size as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every non-terminal packet must be exactly `PACKET_MAX_PAYLOAD` bytes —
    // `deposit` writes at a fixed `index * PACKET_MAX_PAYLOAD` offset, and
    // relies on the sender's own fragmentation to keep the buffer
    // contiguous. Only the final packet of a subframe may be shorter.

    #[test]
    fn prepare_then_deposit_in_order() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(2);
        let first = vec![1u8; PACKET_MAX_PAYLOAD];
        assert_eq!(slot.deposit(0, &first), DepositOutcome::Accepted);
        assert!(!slot.is_complete());
        assert_eq!(slot.deposit(1, &[4, 5]), DepositOutcome::Accepted);
        assert!(slot.is_complete());
        let mut expected = first;
        expected.extend_from_slice(&[4, 5]);
        assert_eq!(slot.payload(), expected.as_slice());
    }

    #[test]
    fn reorder_is_tolerated() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(3);
        let first = vec![1u8; PACKET_MAX_PAYLOAD];
        let second = vec![2u8; PACKET_MAX_PAYLOAD];
        assert_eq!(slot.deposit(2, &[9, 9]), DepositOutcome::Accepted);
        assert_eq!(slot.deposit(0, &first), DepositOutcome::Accepted);
        assert_eq!(slot.deposit(1, &second), DepositOutcome::Accepted);
        assert!(slot.is_complete());
        let mut expected = first;
        expected.extend_from_slice(&second);
        expected.extend_from_slice(&[9, 9]);
        assert_eq!(slot.payload(), expected.as_slice());
    }

    #[test]
    fn duplicate_deposit_is_rejected() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(2);
        assert_eq!(slot.deposit(0, &[1, 2, 3]), DepositOutcome::Accepted);
        assert_eq!(slot.deposit(0, &[9, 9, 9]), DepositOutcome::Duplicate);
        assert_eq!(slot.payload(), &[1, 2, 3]);
    }

    #[test]
    fn out_of_bounds_index_is_rejected() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(2);
        assert_eq!(slot.deposit(5, &[1]), DepositOutcome::OutOfBounds);
    }

    #[test]
    fn buffer_only_grows_across_prepares() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(5);
        slot.deposit(0, &[1; PACKET_MAX_PAYLOAD]);
        let grown_capacity = slot.reserved_capacity();

        slot.prepare(1);
        assert!(slot.reserved_capacity() < grown_capacity);
        // physical buffer is retained even though reserved_capacity shrank
        assert!(slot.buffer.len() >= grown_capacity);
    }

    #[test]
    fn reset_progress_clears_flags_but_keeps_buffer() {
        let mut slot = CollectedSubframe::new();
        slot.prepare(2);
        slot.deposit(0, &[1, 2]);
        let buffer_ptr_before = slot.buffer.as_ptr();

        slot.reset_progress();
        assert_eq!(slot.actual_size(), 0);
        assert!(!slot.is_complete());
        assert_eq!(slot.buffer.as_ptr(), buffer_ptr_before);
    }
}
