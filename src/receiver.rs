//! The receiver-side reassembly state machine.

use std::net::UdpSocket;
use std::time::Duration;

use crate::codec::{PacketHeader, HEADER_SIZE, MAX_SUBFRAMES, PACKET_MAX_PAYLOAD};
use crate::diagnostics::{self, DiagnosticEvent, Observer};
use crate::error::Result;
use crate::frame::FrameView;
use crate::reassembly::{CollectedSubframe, DepositOutcome};

/// What a single call to `Endpoint::receive` observed.
pub enum ReceiveEvent<'a> {
    /// A frame completed assembly and is ready for the caller.
    Frame(FrameView<'a>),
    /// No datagram arrived before the configured receive timeout fired.
    Timeout,
}

/// Per-endpoint reassembly bookkeeping: the framenumber currently under
/// assembly, which subframes have completed, and each subframe's buffer.
struct ReassemblyState {
    framenumber: u16,
    received_subframes: [bool; MAX_SUBFRAMES],
    subframes: [CollectedSubframe; MAX_SUBFRAMES],
}

impl ReassemblyState {
    fn new() -> Self {
        ReassemblyState {
            framenumber: 0,
            received_subframes: [false; MAX_SUBFRAMES],
            subframes: [
                CollectedSubframe::new(),
                CollectedSubframe::new(),
                CollectedSubframe::new(),
            ],
        }
    }

    /// Resets to the pre-first-packet state. Buffers are retained.
    fn reset(&mut self) {
        self.framenumber = 0;
        self.received_subframes = [false; MAX_SUBFRAMES];
        for slot in self.subframes.iter_mut() {
            slot.reset_progress();
        }
    }

    /// Advances assembly to `framenumber`, logging and discarding whatever
    /// partial progress the previous frame had.
    fn advance(&mut self, framenumber: u16, observer: Option<&Observer>) {
        for (index, slot) in self.subframes.iter().enumerate() {
            if slot.has_incomplete_progress() {
                diagnostics::report(
                    observer,
                    DiagnosticEvent::IncompleteSubframeDiscarded {
                        framenumber: self.framenumber,
                        subframe: index as u8,
                        collected_packets: slot.collected_packets_for_diagnostics(),
                        expected_packets: slot.expected_packets_for_diagnostics(),
                    },
                );
            }
        }

        self.received_subframes = [false; MAX_SUBFRAMES];
        for slot in self.subframes.iter_mut() {
            slot.reset_progress();
        }
        self.framenumber = framenumber;
    }
}

/// Socket, scratch buffer, and reassembly state owned by a receiver-role
/// endpoint.
pub(crate) struct ReceiverState {
    socket: UdpSocket,
    scratch: [u8; HEADER_SIZE + PACKET_MAX_PAYLOAD],
    assembly: ReassemblyState,
    observer: Option<Observer>,
}

impl ReceiverState {
    pub(crate) fn new(socket: UdpSocket) -> Self {
        ReceiverState {
            socket,
            scratch: [0u8; HEADER_SIZE + PACKET_MAX_PAYLOAD],
            assembly: ReassemblyState::new(),
            observer: None,
        }
    }

    pub(crate) fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    pub(crate) fn reset(&mut self) {
        self.assembly.reset();
    }

    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the receive loop: reads datagrams until one completes a frame,
    /// the socket times out, or a fatal I/O error occurs.
    pub(crate) fn receive(&mut self) -> Result<ReceiveEvent<'_>> {
        loop {
            let n = match self.socket.recv(&mut self.scratch) {
                Ok(n) => n,
                Err(e) if is_timeout(&e) => return Ok(ReceiveEvent::Timeout),
                Err(e) => return Err(e.into()),
            };
            let datagram_len = n;

            let (header, payload_len) = {
                let datagram = &self.scratch[..datagram_len];
                match PacketHeader::decode(datagram) {
                    Ok((header, payload)) => (header, payload.len()),
                    Err(_) => {
                        diagnostics::report(self.observer.as_ref(), DiagnosticEvent::MalformedPacket);
                        continue;
                    }
                }
            };

            if header.framenumber < self.assembly.framenumber {
                diagnostics::report(
                    self.observer.as_ref(),
                    DiagnosticEvent::StalePacket {
                        framenumber: header.framenumber,
                    },
                );
                continue;
            }

            if header.framenumber > self.assembly.framenumber {
                self.assembly.advance(header.framenumber, self.observer.as_ref());
            }

            let slot = &mut self.assembly.subframes[header.subframe as usize];
            if slot.needs_prepare_for(header.packets) {
                slot.prepare(header.packets);
            }

            let payload_offset = HEADER_SIZE;
            let outcome = slot.deposit(
                header.packet,
                &self.scratch[payload_offset..payload_offset + payload_len],
            );
            match outcome {
                DepositOutcome::Accepted => {}
                DepositOutcome::Duplicate => {
                    diagnostics::report(
                        self.observer.as_ref(),
                        DiagnosticEvent::DuplicatePacket {
                            framenumber: header.framenumber,
                            subframe: header.subframe,
                            packet: header.packet,
                        },
                    );
                    continue;
                }
                DepositOutcome::OutOfBounds => {
                    diagnostics::report(
                        self.observer.as_ref(),
                        DiagnosticEvent::BoundsViolation {
                            framenumber: header.framenumber,
                            subframe: header.subframe,
                            packet: header.packet,
                        },
                    );
                    continue;
                }
            }

            if slot.is_complete() {
                self.assembly.received_subframes[header.subframe as usize] = true;
            }

            let subframes_expected = header.subframes as usize;
            let completed = self.assembly.received_subframes[..subframes_expected]
                .iter()
                .all(|&done| done);

            if completed {
                let mut views: [&[u8]; MAX_SUBFRAMES] = [&[]; MAX_SUBFRAMES];
                for i in 0..subframes_expected {
                    views[i] = self.assembly.subframes[i].payload();
                }
                return Ok(ReceiveEvent::Frame(FrameView::new(
                    self.assembly.framenumber,
                    views,
                    subframes_expected,
                )));
            }
        }
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

/// Installs (or clears, with `None`) a receive timeout on `socket`.
pub(crate) fn apply_timeout(socket: &UdpSocket, timeout_ms: u32) -> std::io::Result<()> {
    let timeout = if timeout_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(timeout_ms as u64))
    };
    socket.set_read_timeout(timeout)
}
