use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Gamma encoded display color. Components are in the range 0.0 - 1.0.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// Tristimulus values in the CIE 1931 XYZ color space
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub fn sum(&self) -> f64 {
        self.x + self.y + self.z
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

// sRGB transfer function
fn gamma_decode(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / (1.0 + 0.055)).powf(2.4)
    } else {
        c / 12.92
    }
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub fn new(red: f64, green: f64, blue: f64) -> Rgb {
        Rgb {
            red: clamp_unit(red),
            green: clamp_unit(green),
            blue: clamp_unit(blue),
        }
    }

    pub fn from_u8(red: u8, green: u8, blue: u8) -> Rgb {
        Rgb {
            red: red as f64 / 255.0,
            green: green as f64 / 255.0,
            blue: blue as f64 / 255.0,
        }
    }

    pub fn is_black(&self) -> bool {
        self.red <= 0.0 && self.green <= 0.0 && self.blue <= 0.0
    }

    /// Convert to XYZ using the wide gamut D65 conversion matrix.
    pub fn to_xyz(&self) -> Xyz {
        let red = gamma_decode(self.red);
        let green = gamma_decode(self.green);
        let blue = gamma_decode(self.blue);
        Xyz {
            x: red * 0.649926 + green * 0.103455 + blue * 0.197109,
            y: red * 0.234327 + green * 0.743075 + blue * 0.022598,
            z: red * 0.0000000 + green * 0.053077 + blue * 1.035763,
        }
    }

    /// Relative luminance, the Y component of the XYZ conversion
    pub fn luminance(&self) -> f64 {
        clamp_unit(self.to_xyz().y)
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseRgbError {
    InvalidLength(usize),
    InvalidDigit,
}

impl Error for ParseRgbError {}

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseRgbError::InvalidLength(l) => {
                write!(f, "Expected 6 hex digits, got {} characters", l)
            }
            ParseRgbError::InvalidDigit => write!(f, "Invalid hex digit in color"),
        }
    }
}

/// Parses colors written as "FF8000" or "#ff8000"
impl FromStr for Rgb {
    type Err = ParseRgbError;
    fn from_str(s: &str) -> Result<Rgb, ParseRgbError> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ParseRgbError::InvalidLength(hex.len()));
        }
        let mut bytes = [0u8; 3];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = hex
                .get(i * 2..i * 2 + 2)
                .and_then(|d| u8::from_str_radix(d, 16).ok())
                .ok_or(ParseRgbError::InvalidDigit)?;
        }
        Ok(Rgb::from_u8(bytes[0], bytes[1], bytes[2]))
    }
}

#[cfg(test)]
mod test {
    use super::{ParseRgbError, Rgb};

    #[test]
    fn parse_hex() {
        assert_eq!("FF0000".parse::<Rgb>(), Ok(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!("#00ff00".parse::<Rgb>(), Ok(Rgb::new(0.0, 1.0, 0.0)));
        assert_eq!(
            "0000F".parse::<Rgb>(),
            Err(ParseRgbError::InvalidLength(5))
        );
        assert_eq!("00x000".parse::<Rgb>(), Err(ParseRgbError::InvalidDigit));
    }

    #[test]
    fn clamped_components() {
        let c = Rgb::new(1.5, -0.2, f64::NAN);
        assert_eq!(c, Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn white_luminance() {
        let y = Rgb::new(1.0, 1.0, 1.0).luminance();
        assert!((y - 1.0).abs() < 1e-6, "Y = {}", y);
        assert_eq!(Rgb::BLACK.luminance(), 0.0);
        assert!(Rgb::BLACK.is_black());
    }
}
