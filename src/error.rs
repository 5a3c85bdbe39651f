use crate::transport::transport::OpenError;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub type DynError = Box<dyn std::error::Error + Send + Sync>;
pub type DynResult<T> = Result<T, DynError>;

/// Boxed future, used where traits need async methods
pub type DynFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type DynFutureStatic<T> = DynFuture<'static, T>;

/// Failures while establishing or using the streaming connection.
#[derive(Debug)]
pub enum ConnectionError {
    /// A required credential was not supplied. Contains the credential name.
    MissingCredential(&'static str),
    /// The pre-shared key could not be decoded.
    InvalidKey(String),
    /// The transport could not be opened.
    Open(OpenError),
    NotConnected,
    AlreadyConnected,
}

impl Error for ConnectionError {}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::MissingCredential(name) => write!(f, "Missing credential: {}", name),
            ConnectionError::InvalidKey(reason) => write!(f, "Invalid pre-shared key: {}", reason),
            ConnectionError::Open(err) => write!(f, "Failed to open transport: {}", err),
            ConnectionError::NotConnected => write!(f, "Not connected"),
            ConnectionError::AlreadyConnected => write!(f, "Already connected"),
        }
    }
}

impl From<OpenError> for ConnectionError {
    fn from(err: OpenError) -> ConnectionError {
        ConnectionError::Open(err)
    }
}

/// Failures reported by the provisioning side (area activation and listing).
#[derive(Debug)]
pub enum ControlPlaneError {
    /// The bridge refused the request.
    Rejected(String),
    /// No area has been started.
    NoActiveArea,
    /// The bridge has no entertainment areas configured.
    NoAreas,
    /// The response could not be understood.
    InvalidResponse(String),
}

impl Error for ControlPlaneError {}

impl fmt::Display for ControlPlaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlPlaneError::Rejected(reason) => write!(f, "Request rejected: {}", reason),
            ControlPlaneError::NoActiveArea => write!(f, "No area set"),
            ControlPlaneError::NoAreas => write!(f, "No areas found"),
            ControlPlaneError::InvalidResponse(reason) => {
                write!(f, "Invalid response: {}", reason)
            }
        }
    }
}

impl From<serde_json::Error> for ControlPlaneError {
    fn from(err: serde_json::Error) -> ControlPlaneError {
        ControlPlaneError::InvalidResponse(err.to_string())
    }
}

#[derive(Debug)]
pub enum SessionError {
    Connection(ConnectionError),
    ControlPlane(ControlPlaneError),
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Connection(err) => Some(err),
            SessionError::ControlPlane(err) => Some(err),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Connection(err) => write!(f, "{}", err),
            SessionError::ControlPlane(err) => write!(f, "{}", err),
        }
    }
}

impl From<ConnectionError> for SessionError {
    fn from(err: ConnectionError) -> SessionError {
        SessionError::Connection(err)
    }
}

impl From<ControlPlaneError> for SessionError {
    fn from(err: ControlPlaneError) -> SessionError {
        SessionError::ControlPlane(err)
    }
}

impl From<OpenError> for SessionError {
    fn from(err: OpenError) -> SessionError {
        SessionError::Connection(ConnectionError::Open(err))
    }
}
