//! Connection lifecycle and streaming.

pub mod credentials;
pub mod driver;
pub mod session;

pub use credentials::Credentials;
pub use driver::{spawn_driver, DriverHandle};
pub use session::{SessionConfig, SessionState, StreamingSession};
