//! Discrete pointer events built from raw samples.

use super::normalize::{normalize_coordinate, normalize_pressure};
use super::sample::{CanvasGeometry, PointerCoords};

/// Logical buttons of the tablet protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Pen/finger contact.
    Draw,
    /// Stylus proximity pseudo-button: down while the tool hovers in range.
    Range,
}

impl Button {
    /// Button id as carried in a tablet datagram.
    pub fn wire_id(self) -> i8 {
        match self {
            Button::Draw => 0,
            Button::Range => -1,
        }
    }

    pub fn from_wire_id(id: i8) -> Option<Self> {
        match id {
            0 => Some(Button::Draw),
            -1 => Some(Button::Range),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Motion,
    Button { button: Button, down: bool },
}

/// Coordinates and pressure in the tablet's 16-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizedPoint {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

/// One pointer event, ready for either output strategy.
///
/// Carries both the absolute canvas position (used when applying the event
/// to an emulated mouse) and the normalized point (used on the wire).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    kind: EventKind,
    canvas_x: f32,
    canvas_y: f32,
    point: NormalizedPoint,
}

impl PointerEvent {
    /// Places `coords` on the remote image and normalizes them.
    pub fn build(kind: EventKind, coords: &PointerCoords, geometry: &CanvasGeometry) -> Self {
        let (canvas_x, canvas_y) = geometry.to_canvas(coords.x, coords.y);
        Self {
            kind,
            canvas_x,
            canvas_y,
            point: NormalizedPoint {
                x: normalize_coordinate(canvas_x, geometry.image_width()),
                y: normalize_coordinate(canvas_y, geometry.image_height()),
                pressure: normalize_pressure(coords.pressure),
            },
        }
    }

    pub fn motion(coords: &PointerCoords, geometry: &CanvasGeometry) -> Self {
        Self::build(EventKind::Motion, coords, geometry)
    }

    pub fn button(
        button: Button,
        down: bool,
        coords: &PointerCoords,
        geometry: &CanvasGeometry,
    ) -> Self {
        Self::build(EventKind::Button { button, down }, coords, geometry)
    }

    /// Synthetic proximity transition; carries no pressure.
    pub fn proximity(down: bool, coords: &PointerCoords, geometry: &CanvasGeometry) -> Self {
        Self::button(Button::Range, down, coords, geometry).with_pressure(0)
    }

    pub fn with_pressure(mut self, pressure: u16) -> Self {
        self.point.pressure = pressure;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// `(button, down)` for button events.
    pub fn button_edge(&self) -> Option<(Button, bool)> {
        match self.kind {
            EventKind::Button { button, down } => Some((button, down)),
            EventKind::Motion => None,
        }
    }

    pub fn point(&self) -> NormalizedPoint {
        self.point
    }

    /// Absolute canvas position, truncated like the remote pointer expects.
    pub fn canvas_position(&self) -> (i32, i32) {
        (self.canvas_x as i32, self.canvas_y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> CanvasGeometry {
        CanvasGeometry::new(1000, 500).unwrap()
    }

    #[test]
    fn build_normalizes_position_and_pressure() {
        let coords = PointerCoords::new(500.0, 250.0, 0.5);
        let event = PointerEvent::motion(&coords, &geometry());
        assert_eq!(event.kind(), EventKind::Motion);
        assert_eq!(
            event.point(),
            NormalizedPoint {
                x: 32767,
                y: 32767,
                pressure: 16383,
            }
        );
        assert_eq!(event.canvas_position(), (500, 250));
        assert_eq!(event.button_edge(), None);
    }

    #[test]
    fn build_uses_pan_and_zoom() {
        let geometry = geometry().with_pan(250.0, 0.0).with_zoom(2.0).unwrap();
        let coords = PointerCoords::new(500.0, 1000.0, 1.0);
        let event = PointerEvent::button(Button::Draw, true, &coords, &geometry);
        assert_eq!(event.canvas_position(), (500, 500));
        assert_eq!(event.point().x, 32767);
        assert_eq!(event.point().y, 65534);
        assert_eq!(event.button_edge(), Some((Button::Draw, true)));
    }

    #[test]
    fn proximity_has_zero_pressure() {
        let coords = PointerCoords::new(1.0, 1.0, 0.9);
        let event = PointerEvent::proximity(true, &coords, &geometry());
        assert_eq!(event.point().pressure, 0);
        assert_eq!(event.button_edge(), Some((Button::Range, true)));
    }

    #[test]
    fn wire_ids() {
        assert_eq!(Button::Draw.wire_id(), 0);
        assert_eq!(Button::Range.wire_id(), -1);
        assert_eq!(Button::from_wire_id(-1), Some(Button::Range));
        assert_eq!(Button::from_wire_id(3), None);
    }
}
