//! Tentative event buffer.
//!
//! Events of a one-finger gesture are held here until the disambiguator
//! knows whether the user is drawing (flush) or starting a pinch (discard).

use super::event::PointerEvent;

#[derive(Debug, Default)]
pub struct EventHistory {
    events: Vec<PointerEvent>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Removes every buffered event, returning them in arrival order.
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drops every buffered event. Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::sample::{CanvasGeometry, PointerCoords};

    fn motion(x: f32) -> PointerEvent {
        let geometry = CanvasGeometry::new(100, 100).unwrap();
        PointerEvent::motion(&PointerCoords::new(x, 0.0, 1.0), &geometry)
    }

    #[test]
    fn drain_keeps_order_and_empties() {
        let mut history = EventHistory::new();
        for x in [1.0, 2.0, 3.0] {
            history.push(motion(x));
        }
        let drained = history.drain();
        assert!(history.is_empty());
        let xs: Vec<i32> = drained.iter().map(|e| e.canvas_position().0).collect();
        assert_eq!(xs, vec![1, 2, 3]);
    }

    #[test]
    fn discard_empties_without_returning() {
        let mut history = EventHistory::new();
        history.push(motion(1.0));
        history.push(motion(2.0));
        assert_eq!(history.discard(), 2);
        assert_eq!(history.len(), 0);
        assert!(history.drain().is_empty());
    }
}
