//! Wire header encode/decode and the sender-side fragmentation arithmetic.
//!
//! The wire header is 8 bytes, little-endian, with no network-byte-order
//! swap: `framenumber: u16, subframes: u8, subframe: u8, packets: u16,
//! packet: u16`. Payload size is implicit — `datagram_length - HEADER_SIZE`.

use crate::error::FramecastError;

/// Maximum number of subframes a logical frame may carry.
pub const MAX_SUBFRAMES: usize = 3;

/// Maximum payload bytes carried by a single wire packet, chosen to stay
/// inside a typical IPv4 MTU without IP-level fragmentation.
pub const PACKET_MAX_PAYLOAD: usize = 1400;

/// Size in bytes of the fixed wire header.
pub const HEADER_SIZE: usize = 8;

/// Extra bytes appended past the end of a reassembly buffer's logical
/// payload, so a downstream decoder may overread by a bounded amount
/// without copying.
pub const REASSEMBLY_PADDING: usize = 32;

/// Largest subframe size `packet_count` can represent: the packet count is
/// carried on the wire as a `u16`, so a subframe fragmenting into more than
/// `u16::MAX` packets cannot be sent. Callers must reject oversized
/// subframes before they reach `packet_count`; see `LogicalFrame::new`.
pub const MAX_SUBFRAME_SIZE: usize = u16::MAX as usize * PACKET_MAX_PAYLOAD;

/// A decoded (and validated) wire packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub framenumber: u16,
    pub subframes: u8,
    pub subframe: u8,
    pub packets: u16,
    pub packet: u16,
}

impl PacketHeader {
    /// Writes this header into `out[..HEADER_SIZE]`.
    ///
    /// Panics if `out` is shorter than `HEADER_SIZE`; callers always pass a
    /// `PACKET_MAX_PAYLOAD`-sized scratch buffer so this cannot happen in
    /// practice.
    pub fn encode(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.framenumber.to_le_bytes());
        out[2] = self.subframes;
        out[3] = self.subframe;
        out[4..6].copy_from_slice(&self.packets.to_le_bytes());
        out[6..8].copy_from_slice(&self.packet.to_le_bytes());
    }

    /// Decodes and validates a header from a full datagram, returning the
    /// header and the remaining payload slice.
    ///
    /// Fails with `MalformedPacket` when the datagram is too short, the
    /// payload would exceed `PACKET_MAX_PAYLOAD`, or any of the header's
    /// internal cross-field invariants (`subframe < subframes <=
    /// MAX_SUBFRAMES`, `packet < packets`) do not hold.
    pub fn decode(datagram: &[u8]) -> Result<(PacketHeader, &[u8]), FramecastError> {
        if datagram.len() < HEADER_SIZE {
            return Err(FramecastError::MalformedPacket);
        }

        let framenumber = u16::from_le_bytes([datagram[0], datagram[1]]);
        let subframes = datagram[2];
        let subframe = datagram[3];
        let packets = u16::from_le_bytes([datagram[4], datagram[5]]);
        let packet = u16::from_le_bytes([datagram[6], datagram[7]]);
        let payload = &datagram[HEADER_SIZE..];

        if subframes == 0
            || subframes as usize > MAX_SUBFRAMES
            || subframe >= subframes
            || packets == 0
            || packet >= packets
            || payload.len() > PACKET_MAX_PAYLOAD
        {
            return Err(FramecastError::MalformedPacket);
        }

        Ok((
            PacketHeader {
                framenumber,
                subframes,
                subframe,
                packets,
                packet,
            },
            payload,
        ))
    }
}

/// Number of wire packets a subframe of `size` bytes fragments into.
///
/// A zero-length subframe still fragments into exactly one (empty) packet,
/// so that its existence registers at the receiver.
///
/// Precondition: `size <= MAX_SUBFRAME_SIZE`. Callers reject oversized
/// subframes before this point (`LogicalFrame::new`) rather than here, so
/// this never truncates a valid-on-construction frame silently.
pub fn packet_count(size: usize) -> u16 {
    if size == 0 {
        return 1;
    }
    let count = size.div_ceil(PACKET_MAX_PAYLOAD);
    debug_assert!(count <= u16::MAX as usize, "frame too large to fragment");
    count as u16
}

/// Payload length carried by packet `packet` of `packets` total, for a
/// subframe of `size` bytes. Every packet but the last carries a full
/// `PACKET_MAX_PAYLOAD`; the last carries the remainder.
pub fn packet_payload_len(size: usize, packets: u16, packet: u16) -> usize {
    if packet + 1 == packets {
        size - (packets as usize - 1) * PACKET_MAX_PAYLOAD
    } else {
        PACKET_MAX_PAYLOAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_count_zero_length_is_one_packet() {
        assert_eq!(packet_count(0), 1);
    }

    #[test]
    fn packet_count_exact_multiple() {
        assert_eq!(packet_count(PACKET_MAX_PAYLOAD * 3), 3);
    }

    #[test]
    fn packet_count_one_byte_over_a_multiple() {
        assert_eq!(packet_count(PACKET_MAX_PAYLOAD * 2 + 1), 3);
    }

    #[test]
    fn packet_count_at_the_max_subframe_size_fits_in_u16() {
        assert_eq!(packet_count(MAX_SUBFRAME_SIZE), u16::MAX);
    }

    #[test]
    fn packet_payload_len_terminal_is_remainder() {
        let size = 3500;
        let packets = packet_count(size);
        assert_eq!(packets, 3);
        assert_eq!(packet_payload_len(size, packets, 0), PACKET_MAX_PAYLOAD);
        assert_eq!(packet_payload_len(size, packets, 1), PACKET_MAX_PAYLOAD);
        assert_eq!(packet_payload_len(size, packets, 2), 700);
    }

    #[test]
    fn encode_decode_round_trip() {
        let header = PacketHeader {
            framenumber: 42,
            subframes: 2,
            subframe: 1,
            packets: 5,
            packet: 3,
        };
        let mut datagram = [0u8; HEADER_SIZE + 10];
        header.encode(&mut datagram[..HEADER_SIZE]);
        datagram[HEADER_SIZE..].copy_from_slice(&[7u8; 10]);

        let (decoded, payload) = PacketHeader::decode(&datagram).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(payload, &[7u8; 10]);
    }

    #[test]
    fn decode_rejects_short_datagram() {
        let short = [0u8; HEADER_SIZE - 1];
        assert!(matches!(
            PacketHeader::decode(&short),
            Err(FramecastError::MalformedPacket)
        ));
    }

    #[test]
    fn decode_rejects_oversized_payload() {
        let mut datagram = vec![0u8; HEADER_SIZE + PACKET_MAX_PAYLOAD + 1];
        let header = PacketHeader {
            framenumber: 1,
            subframes: 1,
            subframe: 0,
            packets: 1,
            packet: 0,
        };
        header.encode(&mut datagram[..HEADER_SIZE]);
        assert!(matches!(
            PacketHeader::decode(&datagram),
            Err(FramecastError::MalformedPacket)
        ));
    }

    #[test]
    fn decode_rejects_subframe_out_of_range() {
        let mut datagram = [0u8; HEADER_SIZE];
        let header = PacketHeader {
            framenumber: 1,
            subframes: 2,
            subframe: 2, // must be < subframes
            packets: 1,
            packet: 0,
        };
        header.encode(&mut datagram);
        assert!(matches!(
            PacketHeader::decode(&datagram),
            Err(FramecastError::MalformedPacket)
        ));
    }

    #[test]
    fn decode_rejects_packet_out_of_range() {
        let mut datagram = [0u8; HEADER_SIZE];
        let header = PacketHeader {
            framenumber: 1,
            subframes: 1,
            subframe: 0,
            packets: 2,
            packet: 2, // must be < packets
        };
        header.encode(&mut datagram);
        assert!(matches!(
            PacketHeader::decode(&datagram),
            Err(FramecastError::MalformedPacket)
        ));
    }

    #[test]
    fn decode_rejects_too_many_subframes() {
        let mut datagram = [0u8; HEADER_SIZE];
        let header = PacketHeader {
            framenumber: 1,
            subframes: (MAX_SUBFRAMES + 1) as u8,
            subframe: 0,
            packets: 1,
            packet: 0,
        };
        header.encode(&mut datagram);
        assert!(matches!(
            PacketHeader::decode(&datagram),
            Err(FramecastError::MalformedPacket)
        ));
    }
}
