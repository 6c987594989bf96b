//! GfxTablet datagram layout (protocol version 2).
//!
//! All integers are big-endian:
//!
//! ```text
//! "GfxTablet" (9 bytes) | version u16 | type u8 | x u16 | y u16 | pressure u16
//! button events only:   | button i8 | down u8
//! ```

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::CodecError;
use crate::input::{EventKind, PointerEvent};

pub const SIGNATURE: &[u8; 9] = b"GfxTablet";
pub const PROTOCOL_VERSION: u16 = 2;

/// Length of a motion datagram.
pub const MOTION_LEN: usize = 18;
/// Length of a button datagram.
pub const BUTTON_LEN: usize = 20;

/// Button id carried by events that have none.
pub const NO_BUTTON: i8 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEventType {
    Motion = 0,
    Button = 1,
}

/// One event record as queued for the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetEvent {
    pub event_type: NetEventType,
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
    pub button: i8,
    pub button_down: bool,
}

impl NetEvent {
    pub fn motion(x: u16, y: u16, pressure: u16) -> Self {
        Self {
            event_type: NetEventType::Motion,
            x,
            y,
            pressure,
            button: NO_BUTTON,
            button_down: false,
        }
    }

    pub fn button(x: u16, y: u16, pressure: u16, button: i8, down: bool) -> Self {
        Self {
            event_type: NetEventType::Button,
            x,
            y,
            pressure,
            button,
            button_down: down,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self.event_type {
            NetEventType::Motion => MOTION_LEN,
            NetEventType::Button => BUTTON_LEN,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_slice(SIGNATURE);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u8(self.event_type as u8);
        buf.put_u16(self.x);
        buf.put_u16(self.y);
        buf.put_u16(self.pressure);
        if self.event_type == NetEventType::Button {
            buf.put_i8(self.button);
            buf.put_u8(u8::from(self.button_down));
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let truncated = |_| CodecError::Truncated(data.len());
        let mut cursor = Cursor::new(data);

        let mut signature = [0u8; 9];
        cursor.read_exact(&mut signature).map_err(truncated)?;
        if &signature != SIGNATURE {
            return Err(CodecError::BadSignature);
        }
        let version = cursor.read_u16::<BigEndian>().map_err(truncated)?;
        if version != PROTOCOL_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let event_type = match cursor.read_u8().map_err(truncated)? {
            0 => NetEventType::Motion,
            1 => NetEventType::Button,
            other => return Err(CodecError::UnknownType(other)),
        };
        let x = cursor.read_u16::<BigEndian>().map_err(truncated)?;
        let y = cursor.read_u16::<BigEndian>().map_err(truncated)?;
        let pressure = cursor.read_u16::<BigEndian>().map_err(truncated)?;

        Ok(match event_type {
            NetEventType::Motion => Self::motion(x, y, pressure),
            NetEventType::Button => {
                let button = cursor.read_i8().map_err(truncated)?;
                let down = cursor.read_u8().map_err(truncated)? != 0;
                Self::button(x, y, pressure, button, down)
            }
        })
    }
}

impl From<&PointerEvent> for NetEvent {
    fn from(event: &PointerEvent) -> Self {
        let point = event.point();
        match event.kind() {
            EventKind::Motion => NetEvent::motion(point.x, point.y, point.pressure),
            EventKind::Button { button, down } => {
                NetEvent::button(point.x, point.y, point.pressure, button.wire_id(), down)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, CanvasGeometry, PointerCoords};

    #[test]
    fn motion_layout() {
        let bytes = NetEvent::motion(0x0102, 0x0304, 0x0506).to_bytes();
        assert_eq!(bytes.len(), MOTION_LEN);
        assert_eq!(&bytes[..9], b"GfxTablet");
        assert_eq!(&bytes[9..], &[0, 2, 0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn button_layout() {
        let bytes = NetEvent::button(1, 2, 0, -1, true).to_bytes();
        assert_eq!(bytes.len(), BUTTON_LEN);
        assert_eq!(&bytes[11..], &[1, 0, 1, 0, 2, 0, 0, 0xff, 1]);
    }

    #[test]
    fn decode_reads_button_event() {
        let event = NetEvent::button(65534, 12, 32767, 0, false);
        assert_eq!(NetEvent::decode(&event.to_bytes()), Ok(event));
    }

    #[test]
    fn decode_rejects_malformed_datagrams() {
        let good = NetEvent::button(1, 2, 3, 0, true).to_bytes();
        assert_eq!(
            NetEvent::decode(&good[..BUTTON_LEN - 1]),
            Err(CodecError::Truncated(BUTTON_LEN - 1))
        );

        let mut bad = good.to_vec();
        bad[0] = b'X';
        assert_eq!(NetEvent::decode(&bad), Err(CodecError::BadSignature));

        let mut bad = good.to_vec();
        bad[10] = 3;
        assert_eq!(NetEvent::decode(&bad), Err(CodecError::UnsupportedVersion(3)));

        let mut bad = good.to_vec();
        bad[11] = 7;
        assert_eq!(NetEvent::decode(&bad), Err(CodecError::UnknownType(7)));
    }

    #[test]
    fn from_pointer_event() {
        let geometry = CanvasGeometry::new(100, 100).unwrap();
        let coords = PointerCoords::new(50.0, 100.0, 1.0);

        let motion = NetEvent::from(&PointerEvent::motion(&coords, &geometry));
        assert_eq!(motion, NetEvent::motion(32767, 65534, 32767));

        let range = NetEvent::from(&PointerEvent::proximity(false, &coords, &geometry));
        assert_eq!(range, NetEvent::button(32767, 65534, 0, -1, false));

        let draw = NetEvent::from(&PointerEvent::button(Button::Draw, true, &coords, &geometry));
        assert_eq!(draw.button, 0);
        assert!(draw.button_down);
    }
}
