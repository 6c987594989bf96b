//! Output sink contract and the de-duplicating emission path in front of it.

use log::debug;

use super::event::{Button, PointerEvent};

/// Destination of resolved pointer events.
///
/// Implementations either hand events to the network transport or apply them
/// directly to a remote pointer. `deliver` receives one ordered batch and
/// must preserve that order.
pub trait OutputSink {
    fn deliver(&mut self, events: &[PointerEvent]);

    /// Keyboard meta state held while the events are applied. Only sinks
    /// driving a remote mouse use it.
    fn set_meta(&mut self, _meta: i32) {}
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn deliver(&mut self, events: &[PointerEvent]) {
        (**self).deliver(events)
    }

    fn set_meta(&mut self, meta: i32) {
        (**self).set_meta(meta)
    }
}

/// Wraps a sink and drops button transitions identical to the last one sent.
///
/// Some input sources deliver the same button edge twice (for instance a
/// draw-up when the last finger of a pinch lifts). Only `(button, down)` is
/// compared; motion events always pass. The remote pen starts lifted, so the
/// initial edge is a draw-up.
#[derive(Debug)]
pub struct Emitter<S> {
    sink: S,
    latest_button_edge: Option<(Button, bool)>,
}

impl<S: OutputSink> Emitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            latest_button_edge: Some((Button::Draw, false)),
        }
    }

    pub fn emit(&mut self, event: PointerEvent) {
        if self.accept(&event) {
            self.sink.deliver(&[event]);
        }
    }

    /// Emits a batch, filtering each event, as one delivery.
    pub fn emit_all(&mut self, events: Vec<PointerEvent>) {
        let accepted: Vec<PointerEvent> = events
            .into_iter()
            .filter(|event| self.accept(event))
            .collect();
        if !accepted.is_empty() {
            self.sink.deliver(&accepted);
        }
    }

    pub fn latest_button_edge(&self) -> Option<(Button, bool)> {
        self.latest_button_edge
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn accept(&mut self, event: &PointerEvent) -> bool {
        let Some(edge) = event.button_edge() else {
            return true;
        };
        if self.latest_button_edge == Some(edge) {
            debug!("Ignoring repeated button event {:?} down={}", edge.0, edge.1);
            return false;
        }
        self.latest_button_edge = Some(edge);
        true
    }
}

/// Sink that keeps every delivery, for tests and diagnostics.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub batches: Vec<Vec<PointerEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PointerEvent> {
        self.batches.iter().flatten().copied().collect()
    }
}

impl OutputSink for RecordingSink {
    fn deliver(&mut self, events: &[PointerEvent]) {
        self.batches.push(events.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::sample::{CanvasGeometry, PointerCoords};

    fn coords() -> PointerCoords {
        PointerCoords::new(10.0, 10.0, 1.0)
    }

    fn geometry() -> CanvasGeometry {
        CanvasGeometry::new(100, 100).unwrap()
    }

    #[test]
    fn repeated_button_edge_is_delivered_once() {
        let mut emitter = Emitter::new(RecordingSink::default());
        let down = PointerEvent::button(Button::Draw, true, &coords(), &geometry());
        emitter.emit(down);
        emitter.emit(down);
        assert_eq!(emitter.sink().events(), vec![down]);
        assert_eq!(emitter.latest_button_edge(), Some((Button::Draw, true)));
    }

    #[test]
    fn initial_draw_up_is_suppressed() {
        let mut emitter = Emitter::new(RecordingSink::default());
        emitter.emit(PointerEvent::button(Button::Draw, false, &coords(), &geometry()));
        assert!(emitter.sink().batches.is_empty());
    }

    #[test]
    fn dedup_ignores_coordinates() {
        let mut emitter = Emitter::new(RecordingSink::default());
        let first = PointerEvent::button(Button::Draw, true, &coords(), &geometry());
        let moved = PointerEvent::button(
            Button::Draw,
            true,
            &PointerCoords::new(80.0, 80.0, 1.0),
            &geometry(),
        );
        emitter.emit(first);
        emitter.emit(moved);
        assert_eq!(emitter.sink().events().len(), 1);
    }

    #[test]
    fn motion_is_never_deduplicated() {
        let mut emitter = Emitter::new(RecordingSink::default());
        let motion = PointerEvent::motion(&coords(), &geometry());
        emitter.emit(motion);
        emitter.emit(motion);
        assert_eq!(emitter.sink().events().len(), 2);
        assert_eq!(emitter.latest_button_edge(), Some((Button::Draw, false)));
    }

    #[test]
    fn different_buttons_alternate_freely() {
        let mut emitter = Emitter::new(RecordingSink::default());
        let range = PointerEvent::proximity(true, &coords(), &geometry());
        let draw = PointerEvent::button(Button::Draw, true, &coords(), &geometry());
        emitter.emit_all(vec![range, draw, draw]);
        assert_eq!(emitter.sink().batches, vec![vec![range, draw]]);
    }

    #[test]
    fn empty_batches_are_not_delivered() {
        let mut emitter = Emitter::new(RecordingSink::default());
        emitter.emit_all(Vec::new());
        assert!(emitter.sink().batches.is_empty());
    }
}
