//! A minimal-latency datagram streaming protocol: packetization and
//! reassembly of frame-structured payloads over UDP.
//!
//! A logical frame carries up to [`codec::MAX_SUBFRAMES`] uninterpreted
//! subframes and is identified by a 16-bit framenumber. A single frame may
//! be too large for one UDP datagram, so the sender fragments it into a
//! sequence of fixed-size packets and the receiver reassembles them,
//! tolerating reordering within a frame but never buffering more than one
//! frame's worth of state. There is no retransmission, no acknowledgement,
//! and no congestion control — see the crate's design notes for the full
//! list of non-goals.
//!
//! ```no_run
//! use framecast::{Config, Endpoint, LogicalFrame, ReceiveEvent};
//!
//! # fn main() -> Result<(), framecast::FramecastError> {
//! let receiver_config = Config::new(9000).with_timeout_ms(1000);
//! let mut receiver = Endpoint::init_receiver(&receiver_config)?;
//!
//! let sender_config = Config::new(9000).with_ip("127.0.0.1");
//! let mut sender = Endpoint::init_sender(&sender_config)?;
//!
//! let payload: &[u8] = b"hello";
//! let frame = LogicalFrame::new(1, &[payload])?;
//! sender.send(&frame)?;
//!
//! match receiver.receive()? {
//!     ReceiveEvent::Frame(view) => println!("got frame {}", view.framenumber()),
//!     ReceiveEvent::Timeout => println!("no frame arrived in time"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod diagnostics;
mod endpoint;
mod frame;
mod reassembly;
mod receiver;
mod sender;

mod error;

pub use config::Config;
pub use diagnostics::DiagnosticEvent;
pub use endpoint::Endpoint;
pub use error::{FramecastError, Result};
pub use frame::{FrameView, LogicalFrame};
pub use receiver::ReceiveEvent;
