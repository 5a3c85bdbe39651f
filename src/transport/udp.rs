use crate::error::{DynFuture, DynFutureStatic};
use crate::transport::transport::{
    OpenError, OpenParams, OpenResult, SendResult, Transport, TransportInfo, DEFAULT_PORT,
};
use log::{debug, warn};
use std::io::ErrorKind;
use std::str::FromStr;
use tokio::net::UdpSocket;

/// Unencrypted datagrams. Useful with bridge emulators and local proxies,
/// a real bridge will only accept DTLS.
pub struct UdpTransport {
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    pub async fn connect(addr: &str, port: u16) -> std::io::Result<UdpTransport> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((addr, port)).await?;
        debug!("UDP transport connected to {}:{}", addr, port);
        Ok(UdpTransport {
            socket: Some(socket),
        })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, frame: &[u8]) -> SendResult {
        let Some(socket) = &self.socket else {
            return SendResult::Closed("Socket closed".to_string());
        };
        match socket.try_send(frame) {
            Ok(_) => SendResult::Ok,
            // Nobody listening right now or the buffer is full, the next
            // frame will carry the same state anyway
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::ConnectionRefused) => {
                SendResult::Dropped
            }
            Err(e) => {
                warn!("UDP send failed: {}", e);
                SendResult::Closed(e.to_string())
            }
        }
    }

    fn close(&mut self) -> DynFuture<'_, ()> {
        self.socket.take();
        Box::pin(std::future::ready(()))
    }
}

async fn udp_open(params: OpenParams) -> OpenResult {
    let port = match params.params.get("port") {
        None => DEFAULT_PORT,
        Some(s) => u16::from_str(s)
            .map_err(|_| OpenError::ParameterError("port has invalid value".to_string()))?,
    };
    if params.address.is_empty() {
        return Err(OpenError::ParameterError("No address".to_string()));
    }
    let t = UdpTransport::connect(&params.address, port).await?;
    Ok(Box::new(t))
}

fn transport_open(params: OpenParams) -> DynFutureStatic<OpenResult> {
    Box::pin(udp_open(params))
}

pub fn transport_info() -> TransportInfo {
    TransportInfo {
        name: "UDP".to_string(),
        description: "Plain UDP datagrams without encryption".to_string(),
        open: transport_open,
    }
}
