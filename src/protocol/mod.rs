//! HueStream version 2 wire format.

pub mod message;

pub use message::{encode_frame, ColorMode, Frame, FrameError, AREA_ID_LEN};
