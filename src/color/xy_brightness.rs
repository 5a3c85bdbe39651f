use super::gamut::{Gamut, Point};
use super::rgb::Rgb;

/// Color as understood by the bridge: CIE 1931 coordinate and brightness,
/// all in the range 0.0 - 1.0.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct DeviceColor {
    pub x: f64,
    pub y: f64,
    pub brightness: f64,
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

impl DeviceColor {
    pub fn new(x: f64, y: f64, brightness: f64) -> DeviceColor {
        DeviceColor { x, y, brightness }
    }

    /// Map a display color into the gamut of the lamp.
    ///
    /// If `brightness` is given it replaces the luminance of the color.
    /// Black has no chromaticity and is mapped to x = 0, y = 0.
    pub fn from_rgb(rgb: &Rgb, gamut: &Gamut, brightness: Option<f64>) -> DeviceColor {
        let xyz = rgb.to_xyz();
        let brightness = unit(brightness.unwrap_or(xyz.y));
        let sum = xyz.sum();
        if !(sum > 0.0) {
            return DeviceColor {
                x: 0.0,
                y: 0.0,
                brightness,
            };
        }
        let p = gamut.clamp(Point::new(xyz.x / sum, xyz.y / sum));
        DeviceColor {
            x: unit(p.x),
            y: unit(p.y),
            brightness,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
