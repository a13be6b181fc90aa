//! The sender-side fragmenter.

use std::net::UdpSocket;

use crate::codec::{packet_count, packet_payload_len, PacketHeader, HEADER_SIZE, PACKET_MAX_PAYLOAD};
use crate::error::Result;
use crate::frame::LogicalFrame;

/// Socket and scratch buffer owned by a sender-role endpoint.
#[derive(Debug)]
pub(crate) struct SenderState {
    socket: UdpSocket,
    scratch: [u8; HEADER_SIZE + PACKET_MAX_PAYLOAD],
}

impl SenderState {
    pub(crate) fn new(socket: UdpSocket) -> Self {
        SenderState {
            socket,
            scratch: [0u8; HEADER_SIZE + PACKET_MAX_PAYLOAD],
        }
    }

    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// Fragments and transmits `frame`, one subframe at a time, in order.
    ///
    /// Any `sendto` failure aborts the call immediately; packets already
    /// sent for this frame are not retracted — the receiver silently
    /// discards the incomplete frame once a later one begins.
    pub(crate) fn send(&mut self, frame: &LogicalFrame<'_>) -> Result<()> {
        for (subframe_index, subframe) in frame.subframes().enumerate() {
            let packets = packet_count(subframe.len());
            for packet in 0..packets {
                let payload_len = packet_payload_len(subframe.len(), packets, packet);
                let offset = packet as usize * PACKET_MAX_PAYLOAD;

                let header = PacketHeader {
                    framenumber: frame.framenumber(),
                    subframes: frame.subframe_count() as u8,
                    subframe: subframe_index as u8,
                    packets,
                    packet,
                };
                header.encode(&mut self.scratch[..HEADER_SIZE]);
                self.scratch[HEADER_SIZE..HEADER_SIZE + payload_len]
                    .copy_from_slice(&subframe[offset..offset + payload_len]);

                send_all(&self.socket, &self.scratch[..HEADER_SIZE + payload_len])?;
            }
        }
        Ok(())
    }
}

/// Loops `send` until the whole datagram is drained. A single UDP `sendto`
/// should never return a partial write in practice, but the loop tolerates
/// it rather than assuming it cannot happen.
fn send_all(socket: &UdpSocket, datagram: &[u8]) -> Result<()> {
    let mut sent = 0;
    while sent < datagram.len() {
        let n = socket.send(&datagram[sent..])?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "sendto wrote 0 bytes",
            )
            .into());
        }
        sent += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_SUBFRAMES;

    fn connected_pair() -> (UdpSocket, UdpSocket) {
        let a = UdpSocket::bind("127.0.0.1:0").unwrap();
        let b = UdpSocket::bind("127.0.0.1:0").unwrap();
        a.connect(b.local_addr().unwrap()).unwrap();
        b.connect(a.local_addr().unwrap()).unwrap();
        (a, b)
    }

    #[test]
    fn send_emits_one_packet_per_fragment() {
        let (tx, rx) = connected_pair();
        let mut sender = SenderState::new(tx);

        let data = vec![0xABu8; 3500];
        let frame = LogicalFrame::new(1, &[data.as_slice()]).unwrap();
        sender.send(&frame).unwrap();

        let mut received_lengths = Vec::new();
        let mut buf = [0u8; HEADER_SIZE + PACKET_MAX_PAYLOAD];
        rx.set_read_timeout(Some(std::time::Duration::from_millis(200)))
            .unwrap();
        for _ in 0..3 {
            let n = rx.recv(&mut buf).unwrap();
            received_lengths.push(n - HEADER_SIZE);
        }
        assert_eq!(received_lengths, vec![1400, 1400, 700]);
    }

    #[test]
    fn send_covers_every_subframe() {
        let (tx, rx) = connected_pair();
        let mut sender = SenderState::new(tx);

        let a: &[u8] = &[1u8; 10];
        let b: &[u8] = &[2u8; 20];
        let c: &[u8] = &[3u8; 30];
        let frame = LogicalFrame::new(7, &[a, b, c]).unwrap();
        sender.send(&frame).unwrap();

        rx.set_read_timeout(Some(std::time::Duration::from_millis(200)))
            .unwrap();
        let mut buf = [0u8; HEADER_SIZE + PACKET_MAX_PAYLOAD];
        let mut seen_subframes = [false; MAX_SUBFRAMES];
        for _ in 0..3 {
            let n = rx.recv(&mut buf).unwrap();
            let (header, _) = PacketHeader::decode(&buf[..n]).unwrap();
            seen_subframes[header.subframe as usize] = true;
        }
        assert_eq!(seen_subframes, [true, true, true]);
    }
}
