use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FramecastError>;

/// Errors surfaced by the endpoint façade.
///
/// Transient per-packet faults (malformed headers, duplicates, stale
/// framenumbers, bounds violations) never reach this enum at the call
/// boundary — they are logged and dropped inside `Endpoint::receive`. The
/// `MalformedPacket` variant exists purely as the internal plumbing between
/// the codec and the receive loop.
#[derive(Error, Debug)]
pub enum FramecastError {
    #[error("sender endpoint requires a non-empty remote address")]
    MissingRemoteAddress,

    #[error("could not resolve address {0:?}: {1}")]
    InvalidAddress(String, std::io::Error),

    #[error("subframe count {requested} exceeds the maximum of {max}")]
    TooManySubframes { requested: usize, max: usize },

    #[error("subframe count must be at least 1")]
    EmptyFrame,

    #[error("subframe {index} has size {size} bytes, which exceeds the maximum of {max} bytes encodable as a u16 packet count")]
    SubframeTooLarge {
        index: usize,
        size: usize,
        max: usize,
    },

    #[error("operation attempted on a sender endpoint, which has no receiver state")]
    NotAReceiver,

    #[error("operation attempted on a receiver endpoint, which has no sender state")]
    NotASender,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Internal only: a datagram failed header validation. `receive` maps
    /// this to "drop and continue awaiting the next datagram" and never
    /// returns it to a caller.
    #[error("malformed packet header")]
    MalformedPacket,
}
