use crate::color::{DeviceColor, Rgb};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

pub const PROTOCOL_TAG: &[u8; 9] = b"HueStream";
pub const VERSION: [u8; 2] = [0x02, 0x00];
/// The bridge ignores the sequence number
pub const SEQUENCE: u8 = 0x01;
pub const HEADER_LEN: usize = 16;
pub const RECORD_LEN: usize = 7;
/// Length of an area id written as a textual UUID
pub const AREA_ID_LEN: usize = 36;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ColorMode {
    Rgb = 0x00,
    XyBrightness = 0x01,
}

impl TryFrom<u8> for ColorMode {
    type Error = FrameError;
    fn try_from(b: u8) -> Result<ColorMode, FrameError> {
        match b {
            0x00 => Ok(ColorMode::Rgb),
            0x01 => Ok(ColorMode::XyBrightness),
            b => Err(FrameError::UnknownColorMode(b)),
        }
    }
}

/// One channel's values. The meaning of the components depends on the
/// color mode of the frame.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ChannelRecord {
    pub channel: u8,
    pub values: [f64; 3],
}

#[derive(PartialEq, Clone, Debug)]
pub struct Frame {
    pub area_id: String,
    pub color_mode: ColorMode,
    pub channels: Vec<ChannelRecord>,
}

#[derive(Debug, PartialEq)]
pub enum FrameError {
    Truncated,
    InvalidTag,
    UnsupportedVersion(u8, u8),
    UnknownColorMode(u8),
    InvalidAreaId,
    /// The channel section isn't a whole number of records
    PartialRecord(usize),
}

impl Error for FrameError {}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated => write!(f, "Frame too short"),
            FrameError::InvalidTag => write!(f, "Not a HueStream frame"),
            FrameError::UnsupportedVersion(major, minor) => {
                write!(f, "Unsupported protocol version {}.{}", major, minor)
            }
            FrameError::UnknownColorMode(m) => write!(f, "Unknown color mode {}", m),
            FrameError::InvalidAreaId => write!(f, "Area id is not valid UTF-8"),
            FrameError::PartialRecord(len) => {
                write!(f, "{} trailing bytes after last channel record", len)
            }
        }
    }
}

/// Scale a 0.0 - 1.0 value to 16 bits. NaN becomes 0.
pub fn scale_u16(v: f64) -> u16 {
    if v.is_nan() {
        0
    } else {
        (v * 65535.0).round().clamp(0.0, 65535.0) as u16
    }
}

pub fn unscale_u16(v: u16) -> f64 {
    v as f64 / 65535.0
}

impl Frame {
    /// Frame with one xy + brightness record per channel, in channel order.
    pub fn xy_brightness(area_id: &str, channels: &BTreeMap<u8, DeviceColor>) -> Frame {
        Frame {
            area_id: area_id.to_string(),
            color_mode: ColorMode::XyBrightness,
            channels: channels
                .iter()
                .map(|(id, c)| ChannelRecord {
                    channel: *id,
                    values: [c.x, c.y, c.brightness],
                })
                .collect(),
        }
    }

    pub fn rgb(area_id: &str, channels: &BTreeMap<u8, Rgb>) -> Frame {
        Frame {
            area_id: area_id.to_string(),
            color_mode: ColorMode::Rgb,
            channels: channels
                .iter()
                .map(|(id, c)| ChannelRecord {
                    channel: *id,
                    values: [c.red, c.green, c.blue],
                })
                .collect(),
        }
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.area_id.len() + RECORD_LEN * self.channels.len()
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.encoded_len());
        buf.extend_from_slice(PROTOCOL_TAG);
        buf.extend_from_slice(&VERSION);
        buf.push(SEQUENCE);
        // Reserved
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.push(self.color_mode as u8);
        // Reserved
        buf.push(0x00);
        buf.extend_from_slice(self.area_id.as_bytes());
        for record in &self.channels {
            buf.push(record.channel);
            for v in record.values {
                buf.extend_from_slice(&scale_u16(v).to_be_bytes());
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buf);
        buf
    }

    /// Decode a frame. The area id has no terminator so its length must be
    /// known in advance.
    pub fn parse(bytes: &[u8], area_id_len: usize) -> Result<Frame, FrameError> {
        let area_end = HEADER_LEN
            .checked_add(area_id_len)
            .ok_or(FrameError::Truncated)?;
        if bytes.len() < area_end {
            return Err(FrameError::Truncated);
        }
        if &bytes[0..9] != PROTOCOL_TAG {
            return Err(FrameError::InvalidTag);
        }
        if bytes[9..11] != VERSION {
            return Err(FrameError::UnsupportedVersion(bytes[9], bytes[10]));
        }
        let color_mode = ColorMode::try_from(bytes[14])?;
        let area_id = std::str::from_utf8(&bytes[HEADER_LEN..area_end])
            .map_err(|_| FrameError::InvalidAreaId)?
            .to_string();
        let records = &bytes[area_end..];
        if records.len() % RECORD_LEN != 0 {
            return Err(FrameError::PartialRecord(records.len() % RECORD_LEN));
        }
        let channels = records
            .chunks_exact(RECORD_LEN)
            .map(|r| ChannelRecord {
                channel: r[0],
                values: [
                    unscale_u16(u16::from_be_bytes([r[1], r[2]])),
                    unscale_u16(u16::from_be_bytes([r[3], r[4]])),
                    unscale_u16(u16::from_be_bytes([r[5], r[6]])),
                ],
            })
            .collect();
        Ok(Frame {
            area_id,
            color_mode,
            channels,
        })
    }
}

/// Encode a frame addressing the given channels of an area.
pub fn encode_frame(area_id: &str, channels: &BTreeMap<u8, DeviceColor>) -> Vec<u8> {
    Frame::xy_brightness(area_id, channels).to_bytes()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_frame() {
        let mut channels = BTreeMap::new();
        channels.insert(0u8, DeviceColor::new(0.0, 0.0, 0.0));
        let bytes = encode_frame("abc", &channels);
        let mut expected = b"HueStream".to_vec();
        expected.extend_from_slice(&[0x02, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]);
        expected.extend_from_slice("abc".as_bytes());
        expected.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn scaling() {
        assert_eq!(scale_u16(0.0), 0);
        assert_eq!(scale_u16(1.0), 0xffff);
        assert_eq!(scale_u16(0.5), 32768);
        assert_eq!(scale_u16(f64::NAN), 0);
        assert_eq!(scale_u16(-0.3), 0);
        assert_eq!(scale_u16(7.0), 0xffff);
    }

    #[test]
    fn big_endian_record() {
        let mut channels = BTreeMap::new();
        channels.insert(5u8, DeviceColor::new(1.0, 0.5, f64::NAN));
        let bytes = encode_frame("x", &channels);
        assert_eq!(bytes.len(), HEADER_LEN + 1 + RECORD_LEN);
        assert_eq!(&bytes[17..], &[5, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn decode_records() {
        let area = "0123456789abcdef0123456789abcdef0123";
        let mut channels = BTreeMap::new();
        channels.insert(0u8, DeviceColor::new(0.3127, 0.329, 1.0));
        channels.insert(7u8, DeviceColor::new(0.692, 0.308, 0.25));
        channels.insert(255u8, DeviceColor::new(0.153, 0.048, 0.0001));
        let bytes = encode_frame(area, &channels);
        let frame = Frame::parse(&bytes, AREA_ID_LEN).unwrap();
        assert_eq!(frame.area_id, area);
        assert_eq!(frame.color_mode, ColorMode::XyBrightness);
        assert_eq!(frame.channels.len(), 3);
        for (record, (id, color)) in frame.channels.iter().zip(&channels) {
            assert_eq!(record.channel, *id);
            let orig = [color.x, color.y, color.brightness];
            for (decoded, v) in record.values.iter().zip(orig) {
                assert!((decoded - v).abs() <= 1.0 / 65535.0);
            }
        }
    }

    #[test]
    fn ascending_channel_order() {
        let mut channels = BTreeMap::new();
        for id in [9u8, 2, 4] {
            channels.insert(id, DeviceColor::new(0.1, 0.1, 0.1));
        }
        let frame = Frame::xy_brightness("a", &channels);
        let ids: Vec<u8> = frame.channels.iter().map(|r| r.channel).collect();
        assert_eq!(ids, vec![2, 4, 9]);
    }

    #[test]
    fn rgb_mode() {
        let mut channels = BTreeMap::new();
        channels.insert(1u8, Rgb::new(1.0, 0.0, 1.0));
        let bytes = Frame::rgb("ab", &channels).to_bytes();
        assert_eq!(bytes[14], 0x00);
        assert_eq!(&bytes[18..], &[1, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Frame::parse(b"Hue", 0), Err(FrameError::Truncated));
        let mut bytes = encode_frame("ab", &BTreeMap::new());
        assert_eq!(Frame::parse(&bytes, 2).map(|f| f.channels.len()), Ok(0));
        bytes.push(1);
        assert_eq!(Frame::parse(&bytes, 2), Err(FrameError::PartialRecord(1)));
        bytes[0] = b'h';
        assert_eq!(Frame::parse(&bytes, 2), Err(FrameError::InvalidTag));
        let mut bytes = encode_frame("ab", &BTreeMap::new());
        bytes[9] = 1;
        assert_eq!(
            Frame::parse(&bytes, 2),
            Err(FrameError::UnsupportedVersion(1, 0))
        );
        let mut bytes = encode_frame("ab", &BTreeMap::new());
        bytes[14] = 7;
        assert_eq!(Frame::parse(&bytes, 2), Err(FrameError::UnknownColorMode(7)));
    }

    #[test]
    fn huge_area_id_len() {
        let bytes = encode_frame("ab", &BTreeMap::new());
        assert_eq!(Frame::parse(&bytes, usize::MAX), Err(FrameError::Truncated));
        assert_eq!(
            Frame::parse(&bytes, usize::MAX - HEADER_LEN),
            Err(FrameError::Truncated)
        );
    }
}
