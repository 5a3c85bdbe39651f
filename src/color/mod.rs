//! Conversion from display colors to the bridge's xy + brightness format.

pub mod gamut;
pub mod rgb;
pub mod xy_brightness;

pub use gamut::{Gamut, Point};
pub use rgb::Rgb;
pub use xy_brightness::DeviceColor;
