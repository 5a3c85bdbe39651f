pub mod error;

pub mod color;
pub mod protocol;
pub mod animation;

pub mod transport;
pub mod control;
pub mod config;
pub mod session;
