//! The public endpoint façade: role selection, lifecycle, and the public
//! operations (`send`, `receive`, `receive_reset`, `set_observer`).

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::config::Config;
use crate::diagnostics::Observer;
use crate::error::{FramecastError, Result};
use crate::frame::LogicalFrame;
use crate::receiver::{self, ReceiveEvent, ReceiverState};
use crate::sender::SenderState;

enum Role {
    Sender(SenderState),
    Receiver(ReceiverState),
}

/// A protocol endpoint: either a sender bound to a remote address, or a
/// receiver bound to a local address with its own reassembly state.
///
/// An `Endpoint` is single-threaded by contract — nothing here is `Sync`,
/// and no operation performs cross-thread synchronization. Dropping an
/// `Endpoint` closes its socket; there is no separate explicit close call.
pub struct Endpoint {
    role: Role,
}

impl Endpoint {
    /// Builds a sender bound to `config.ip:config.port`. `config.ip` is
    /// required for a sender.
    pub fn init_sender(config: &Config) -> Result<Endpoint> {
        config.validate()?;

        let address = config
            .ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .ok_or(FramecastError::MissingRemoteAddress)?;
        let remote = resolve(address, config.port)?;

        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(remote)?;

        Ok(Endpoint {
            role: Role::Sender(SenderState::new(socket)),
        })
    }

    /// Builds a receiver bound to `config.ip:config.port` (or all
    /// interfaces, if `config.ip` is empty or absent). Installs a receive
    /// timeout when `config.timeout_ms > 0`.
    pub fn init_receiver(config: &Config) -> Result<Endpoint> {
        config.validate()?;

        let bind_ip = config.ip.as_deref().filter(|ip| !ip.is_empty()).unwrap_or("0.0.0.0");
        let local = resolve(bind_ip, config.port)?;

        let socket = UdpSocket::bind(local)?;
        receiver::apply_timeout(&socket, config.timeout_ms)?;

        Ok(Endpoint {
            role: Role::Receiver(ReceiverState::new(socket)),
        })
    }

    /// Installs an observer callback that receives every transient
    /// per-packet diagnostic this endpoint's receive loop encounters. A
    /// no-op on a sender endpoint.
    pub fn set_observer(&mut self, observer: impl Fn(crate::diagnostics::DiagnosticEvent) + Send + Sync + 'static) {
        self.set_observer_arc(std::sync::Arc::new(observer));
    }

    fn set_observer_arc(&mut self, observer: Observer) {
        if let Role::Receiver(receiver) = &mut self.role {
            receiver.set_observer(observer);
        }
    }

    /// Fragments and transmits `frame`. Only valid on a sender endpoint.
    pub fn send(&mut self, frame: &LogicalFrame<'_>) -> Result<()> {
        match &mut self.role {
            Role::Sender(sender) => sender.send(frame),
            Role::Receiver(_) => Err(FramecastError::NotASender),
        }
    }

    /// Blocks until a frame completes assembly, the receive timeout fires,
    /// or a fatal socket error occurs. Only valid on a receiver endpoint.
    pub fn receive(&mut self) -> Result<ReceiveEvent<'_>> {
        match &mut self.role {
            Role::Receiver(receiver) => receiver.receive(),
            Role::Sender(_) => Err(FramecastError::NotAReceiver),
        }
    }

    /// Returns assembly to the pre-first-packet state, retaining buffers.
    /// The expected response to a `Timeout`. Only valid on a receiver
    /// endpoint.
    pub fn receive_reset(&mut self) -> Result<()> {
        match &mut self.role {
            Role::Receiver(receiver) => {
                receiver.reset();
                Ok(())
            }
            Role::Sender(_) => Err(FramecastError::NotAReceiver),
        }
    }

    /// The endpoint's local socket address, useful for discovering which
    /// port the kernel assigned when a receiver is bound with `port: 0`.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let addr = match &self.role {
            Role::Sender(sender) => sender.local_addr()?,
            Role::Receiver(receiver) => receiver.local_addr()?,
        };
        Ok(addr)
    }
}

fn resolve(ip: &str, port: u16) -> Result<SocketAddr> {
    (ip, port)
        .to_socket_addrs()
        .map_err(|e| FramecastError::InvalidAddress(format!("{ip}:{port}"), e))?
        .next()
        .ok_or_else(|| {
            FramecastError::InvalidAddress(
                format!("{ip}:{port}"),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no addresses resolved"),
            )
        })
}
