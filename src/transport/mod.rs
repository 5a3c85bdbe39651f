//! Datagram links to the bridge.

pub mod record;
pub mod transport;
#[cfg(feature = "udp_transport")]
pub mod udp;

pub use transport::{
    add_transport, find, open, transport_descriptions, transport_names, Connector, OpenError,
    OpenParams, SendResult, Transport, TransportInfo,
};

/// Register the built in transports
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    #[cfg(feature = "udp_transport")]
    add_transport(udp::transport_info());
    add_transport(record::transport_info());
    Ok(())
}
