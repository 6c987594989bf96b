//! Direct output: apply resolved events to an emulated remote mouse.

use log::debug;

use super::emit::OutputSink;
use super::event::{Button, EventKind, PointerEvent};

/// Scroll step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Remote-session pointer abstraction. Coordinates are absolute canvas
/// pixels; `meta` is the platform meta-key state.
pub trait RemotePointer {
    fn left_button_down(&mut self, x: i32, y: i32, meta: i32);
    fn right_button_down(&mut self, x: i32, y: i32, meta: i32);
    fn middle_button_down(&mut self, x: i32, y: i32, meta: i32);
    fn release_button(&mut self, x: i32, y: i32, meta: i32);
    fn move_mouse_button_down(&mut self, x: i32, y: i32, meta: i32);
    fn move_mouse_button_up(&mut self, x: i32, y: i32, meta: i32);
    fn scroll(&mut self, direction: ScrollDirection, x: i32, y: i32, meta: i32);

    /// Pans the local view so the pointer stays visible after a press.
    fn pan_to_pointer(&mut self) {}
}

/// Applies each event synchronously, in order.
///
/// Proximity transitions have no mouse equivalent and are skipped.
#[derive(Debug)]
pub struct DirectPointerSink<P> {
    pointer: P,
    meta: i32,
    draw_down: bool,
}

impl<P: RemotePointer> DirectPointerSink<P> {
    pub fn new(pointer: P) -> Self {
        Self {
            pointer,
            meta: 0,
            draw_down: false,
        }
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    fn apply(&mut self, event: &PointerEvent) {
        let (x, y) = event.canvas_position();
        match event.kind() {
            EventKind::Motion if self.draw_down => {
                self.pointer.move_mouse_button_down(x, y, self.meta)
            }
            EventKind::Motion => self.pointer.move_mouse_button_up(x, y, self.meta),
            EventKind::Button {
                button: Button::Draw,
                down: true,
            } => {
                self.draw_down = true;
                self.pointer.left_button_down(x, y, self.meta);
                self.pointer.pan_to_pointer();
            }
            EventKind::Button {
                button: Button::Draw,
                down: false,
            } => {
                self.draw_down = false;
                self.pointer.release_button(x, y, self.meta);
            }
            EventKind::Button {
                button: Button::Range,
                down,
            } => debug!("Skipping proximity event (down={}) in direct mode", down),
        }
    }
}

impl<P: RemotePointer> OutputSink for DirectPointerSink<P> {
    fn deliver(&mut self, events: &[PointerEvent]) {
        for event in events {
            self.apply(event);
        }
    }

    fn set_meta(&mut self, meta: i32) {
        self.meta = meta;
    }
}
