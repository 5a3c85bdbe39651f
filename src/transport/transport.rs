use crate::error::{DynError, DynFuture, DynFutureStatic};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

/// Default port of the bridge's streaming endpoint
pub const DEFAULT_PORT: u16 = 2100;

#[derive(Debug)]
pub enum SendResult {
    Ok,
    /// The datagram was not sent, try again with the next frame
    Dropped,
    /// The link is gone and won't come back
    Closed(String),
}

impl fmt::Display for SendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendResult::Ok => write!(f, "OK"),
            SendResult::Dropped => write!(f, "Dropped"),
            SendResult::Closed(reason) => write!(f, "Closed: {}", reason),
        }
    }
}

/// An open datagram link to the bridge.
pub trait Transport: Send {
    /// Send a frame without waiting for it to leave.
    fn send(&mut self, frame: &[u8]) -> SendResult;

    fn close(&mut self) -> DynFuture<'_, ()>;
}

/// Everything needed to establish a link
#[derive(Clone, Debug, Default)]
pub struct OpenParams {
    /// Host name or IP address of the bridge
    pub address: String,
    /// Pre-shared key
    pub psk: Vec<u8>,
    /// PSK identity
    pub identity: String,
    /// Transport specific options
    pub params: HashMap<String, String>,
}

#[derive(Debug)]
pub enum OpenError {
    NotFound,
    ParameterError(String),
    TransportError(DynError),
}

impl Error for OpenError {}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::NotFound => write!(f, "Transport not found"),
            OpenError::ParameterError(reason) => write!(f, "Invalid parameter: {}", reason),
            OpenError::TransportError(err) => write!(f, "{}", err),
        }
    }
}

impl From<std::io::Error> for OpenError {
    fn from(err: std::io::Error) -> OpenError {
        OpenError::TransportError(Box::new(err))
    }
}

pub type OpenResult = Result<Box<dyn Transport>, OpenError>;

/// Something that can establish links
pub trait Connector: Send + Sync {
    fn open(&self, params: OpenParams) -> DynFutureStatic<OpenResult>;
}

pub type OpenFn = fn(OpenParams) -> DynFutureStatic<OpenResult>;

#[derive(Clone)]
pub struct TransportInfo {
    pub name: String,
    pub description: String,
    pub open: OpenFn,
}

impl Connector for TransportInfo {
    fn open(&self, params: OpenParams) -> DynFutureStatic<OpenResult> {
        (self.open)(params)
    }
}

lazy_static! {
    static ref TRANSPORTS: Mutex<Vec<TransportInfo>> = Mutex::new(Vec::new());
}

fn transports() -> std::sync::MutexGuard<'static, Vec<TransportInfo>> {
    TRANSPORTS.lock().unwrap_or_else(|e| e.into_inner())
}

/// Register a transport. A later registration with the same name replaces
/// the earlier one.
pub fn add_transport(info: TransportInfo) {
    let mut list = transports();
    list.retain(|t| t.name != info.name);
    list.push(info);
}

pub fn transport_names() -> Vec<String> {
    transports().iter().map(|t| t.name.clone()).collect()
}

pub fn transport_descriptions() -> Vec<(String, String)> {
    transports()
        .iter()
        .map(|t| (t.name.clone(), t.description.clone()))
        .collect()
}

/// Find a registered transport. "default" selects the first one.
pub fn find(name: &str) -> Result<TransportInfo, OpenError> {
    let list = transports();
    let found = if name == "default" {
        list.first()
    } else {
        list.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    };
    found.cloned().ok_or(OpenError::NotFound)
}

pub fn open(name: &str, params: OpenParams) -> DynFutureStatic<OpenResult> {
    match find(name) {
        Ok(info) => info.open(params),
        Err(e) => Box::pin(std::future::ready(Err(e))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn open_nothing(_params: OpenParams) -> DynFutureStatic<OpenResult> {
        Box::pin(std::future::ready(Err(OpenError::ParameterError(
            "nothing".to_string(),
        ))))
    }

    #[test]
    fn registry() {
        add_transport(TransportInfo {
            name: "NOTHING".to_string(),
            description: "Always fails".to_string(),
            open: open_nothing,
        });
        assert!(transport_names().contains(&"NOTHING".to_string()));
        assert!(find("nothing").is_ok());
        assert!(matches!(find("no such transport"), Err(OpenError::NotFound)));
        let res = futures::executor::block_on(open("NOTHING", OpenParams::default()));
        assert!(matches!(res, Err(OpenError::ParameterError(_))));
        let res = futures::executor::block_on(open("missing", OpenParams::default()));
        assert!(matches!(res, Err(OpenError::NotFound)));
    }
}
