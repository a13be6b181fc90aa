//! Structured diagnostics for transient per-packet faults.
//!
//! These events are purely informational: emitting one never changes
//! endpoint state, and nothing in the receive loop branches on whether an
//! observer is installed. They exist for operators who want visibility into
//! drops, duplicates, and frame switches without treating them as errors.

use std::fmt;
use std::sync::Arc;

/// A structured diagnostic emitted for a transient, non-fatal condition
/// encountered while assembling frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A datagram failed header validation and was dropped.
    MalformedPacket,
    /// A packet belonging to an already-superseded frame arrived.
    StalePacket { framenumber: u16 },
    /// A duplicate packet was dropped.
    DuplicatePacket {
        framenumber: u16,
        subframe: u8,
        packet: u16,
    },
    /// A packet disagreed with its slot's reserved capacity and was
    /// dropped.
    BoundsViolation {
        framenumber: u16,
        subframe: u8,
        packet: u16,
    },
    /// The receiver advanced past an earlier frame that never completed.
    IncompleteSubframeDiscarded {
        framenumber: u16,
        subframe: u8,
        collected_packets: u16,
        expected_packets: u16,
    },
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticEvent::MalformedPacket => write!(f, "dropped malformed packet"),
            DiagnosticEvent::StalePacket { framenumber } => {
                write!(f, "dropped stale packet for frame {framenumber}")
            }
            DiagnosticEvent::DuplicatePacket {
                framenumber,
                subframe,
                packet,
            } => write!(
                f,
                "dropped duplicate packet {packet} of subframe {subframe} in frame {framenumber}"
            ),
            DiagnosticEvent::BoundsViolation {
                framenumber,
                subframe,
                packet,
            } => write!(
                f,
                "dropped out-of-bounds packet {packet} of subframe {subframe} in frame {framenumber}"
            ),
            DiagnosticEvent::IncompleteSubframeDiscarded {
                framenumber,
                subframe,
                collected_packets,
                expected_packets,
            } => write!(
                f,
                "discarded incomplete subframe {subframe} of frame {framenumber} ({collected_packets}/{expected_packets} packets)"
            ),
        }
    }
}

/// An observer callback a caller may install on a receiver endpoint.
pub type Observer = Arc<dyn Fn(DiagnosticEvent) + Send + Sync>;

/// Logs `event` through `tracing` and forwards it to `observer`, if any.
pub(crate) fn report(observer: Option<&Observer>, event: DiagnosticEvent) {
    match &event {
        DiagnosticEvent::MalformedPacket => tracing::debug!(%event, "malformed packet"),
        DiagnosticEvent::StalePacket { framenumber } => {
            tracing::debug!(framenumber, %event, "stale packet")
        }
        DiagnosticEvent::DuplicatePacket {
            framenumber,
            subframe,
            packet,
        } => tracing::debug!(framenumber, subframe, packet, %event, "duplicate packet"),
        DiagnosticEvent::BoundsViolation {
            framenumber,
            subframe,
            packet,
        } => tracing::warn!(framenumber, subframe, packet, %event, "bounds violation"),
        DiagnosticEvent::IncompleteSubframeDiscarded {
            framenumber,
            subframe,
            ..
        } => tracing::debug!(framenumber, subframe, %event, "incomplete subframe discarded"),
    }

    if let Some(observer) = observer {
        observer(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn observer_receives_forwarded_events() {
        let seen: Arc<Mutex<Vec<DiagnosticEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let observer: Observer = Arc::new(move |event| seen_clone.lock().unwrap().push(event));

        report(
            Some(&observer),
            DiagnosticEvent::StalePacket { framenumber: 4 },
        );

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[DiagnosticEvent::StalePacket { framenumber: 4 }]
        );
    }

    #[test]
    fn no_observer_does_not_panic() {
        report(None, DiagnosticEvent::MalformedPacket);
    }
}
