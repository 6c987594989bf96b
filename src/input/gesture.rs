//! Gesture disambiguation between one-finger drawing and two-finger pinch.
//!
//! A single finger touching the screen may be the start of a stroke or the
//! first finger of a pinch. The session buffers the stroke's events for a
//! short tap window (`T_tap`) and then resolves:
//!
//! - **second finger inside the window**: the buffered events are discarded,
//!   nothing of the first finger reaches the remote side, and every further
//!   multi-finger event goes to the two-finger detector.
//! - **window elapses**: the buffer is flushed as one batch and later events
//!   pass straight through.
//! - **finger lifts inside the window**: the tap is flushed on lift.
//!
//! # States
//!
//! ```text
//! Nothing --down--> FirstPointer --(same call)--> WaitSecondPointer
//! WaitSecondPointer --elapsed > T_tap--> TapTimedOut
//! WaitSecondPointer | TapTimedOut | Nothing --2 fingers--> Zooming
//! Zooming --back to 1 finger--> FirstPointer
//! any --up/cancel--> Nothing
//! ```
//!
//! The timeout is checked when the next event arrives; there is no timer.
//! A session is driven from one input thread and is not `Sync`-shared.

use std::time::{Duration, Instant};

use log::{debug, trace};

use super::emit::{Emitter, OutputSink};
use super::event::{Button, PointerEvent};
use super::history::EventHistory;
use super::sample::{CanvasGeometry, MotionAction, MotionSample, PointerCoords};
use crate::config::TabletConfig;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Capabilities the session needs from the surrounding UI.
pub trait InputHost {
    /// Current pan/zoom and remote image size.
    fn canvas(&self) -> CanvasGeometry;

    /// Called on touch-down and touch-move.
    fn show_toolbar(&mut self) {}

    /// Hands a multi-finger event to the scale/pan recognizer.
    fn delegate_two_finger(&mut self, sample: &MotionSample);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStatus {
    Nothing,
    FirstPointer,
    WaitSecondPointer,
    TapTimedOut,
    Zooming,
}

/// Stylus proximity as seen by the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InRangeStatus {
    OutOfRange,
    InRange,
    /// Proximity synthesized for a touch-down that had no hover-enter. Cleared
    /// only by the matching touch-up.
    FakeInRange,
}

/// What happened to a touch callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Held back while the tap window is open.
    Buffered,
    /// Sent to the output sink together with anything pending.
    Flushed,
    /// Routed to the two-finger recognizer.
    Delegated,
}

pub struct GestureSession<S, H, C = SystemClock> {
    emitter: Emitter<S>,
    host: H,
    clock: C,
    history: EventHistory,
    gesture: GestureStatus,
    in_range: InRangeStatus,
    first_pointer_at: Option<Instant>,
    last_coords: PointerCoords,
    tap_timeout: Duration,
}

impl<S: OutputSink, H: InputHost> GestureSession<S, H, SystemClock> {
    pub fn new(sink: S, host: H, config: &TabletConfig) -> Self {
        Self::with_clock(sink, host, SystemClock, config.tap_timeout)
    }
}

impl<S: OutputSink, H: InputHost, C: Clock> GestureSession<S, H, C> {
    pub fn with_clock(sink: S, host: H, clock: C, tap_timeout: Duration) -> Self {
        Self {
            emitter: Emitter::new(sink),
            host,
            clock,
            history: EventHistory::new(),
            gesture: GestureStatus::Nothing,
            in_range: InRangeStatus::OutOfRange,
            first_pointer_at: None,
            last_coords: PointerCoords::default(),
            tap_timeout,
        }
    }

    pub fn gesture_status(&self) -> GestureStatus {
        self.gesture
    }

    pub fn in_range_status(&self) -> InRangeStatus {
        self.in_range
    }

    /// Number of events waiting for a flush-or-discard decision.
    pub fn pending(&self) -> usize {
        self.history.len()
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.emitter.sink_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Processes one touch callback.
    pub fn handle_touch(&mut self, sample: &MotionSample) -> TouchOutcome {
        if sample.action.is_hover() {
            self.handle_hover(sample);
            return TouchOutcome::Flushed;
        }

        if sample.pointer_count >= 2 {
            self.enter_zoom(sample);
            self.host.delegate_two_finger(sample);
            return TouchOutcome::Delegated;
        }

        if self.gesture == GestureStatus::Zooming {
            // one finger of the pinch lifted, the rest may still be a stroke
            self.set_gesture(GestureStatus::FirstPointer);
        }

        let geometry = self.host.canvas();
        self.push_sample(sample, &geometry);

        match self.gesture {
            GestureStatus::FirstPointer => {
                self.first_pointer_at = Some(self.clock.now());
                self.set_gesture(GestureStatus::WaitSecondPointer);
                TouchOutcome::Buffered
            }
            GestureStatus::WaitSecondPointer => {
                if self.tap_window_elapsed() {
                    self.set_gesture(GestureStatus::TapTimedOut);
                    self.flush();
                    TouchOutcome::Flushed
                } else {
                    TouchOutcome::Buffered
                }
            }
            _ => {
                self.flush();
                TouchOutcome::Flushed
            }
        }
    }

    /// Processes a hover callback. Hover events bypass the tap window.
    pub fn handle_hover(&mut self, sample: &MotionSample) {
        let geometry = self.host.canvas();
        let coords = &sample.current;
        match sample.action {
            MotionAction::HoverMove => {
                let mut events: Vec<PointerEvent> = sample
                    .history
                    .iter()
                    .map(|h| PointerEvent::motion(h, &geometry))
                    .collect();
                events.push(PointerEvent::motion(coords, &geometry));
                self.emitter.emit_all(events);
            }
            MotionAction::HoverEnter => {
                if self.in_range == InRangeStatus::FakeInRange {
                    debug!("Hover enter during synthetic proximity, ignored");
                    return;
                }
                self.in_range = InRangeStatus::InRange;
                self.emitter
                    .emit(PointerEvent::button(Button::Range, true, coords, &geometry));
            }
            MotionAction::HoverExit => {
                if self.in_range == InRangeStatus::FakeInRange {
                    debug!("Hover exit during synthetic proximity, ignored");
                    return;
                }
                self.in_range = InRangeStatus::OutOfRange;
                self.emitter
                    .emit(PointerEvent::button(Button::Range, false, coords, &geometry));
            }
            other => trace!("Not a hover action: {:?}", other),
        }
    }

    /// Drops unflushed events and forgets the current gesture.
    ///
    /// A stroke already flushed to the remote side is closed with a draw-up
    /// (and proximity-up if synthetic), so the next stroke starts lifted.
    pub fn reset(&mut self) {
        let dropped = self.history.discard();
        if dropped > 0 {
            debug!("Session reset, discarded {} pending events", dropped);
        }

        if self.emitter.latest_button_edge() == Some((Button::Draw, true)) {
            let geometry = self.host.canvas();
            let coords = self.last_coords;
            self.push_pointer_up(&coords, &geometry);
            self.flush();
        } else if self.in_range == InRangeStatus::FakeInRange {
            // the synthetic proximity-down was in the discarded buffer
            self.in_range = InRangeStatus::OutOfRange;
        }

        self.set_gesture(GestureStatus::Nothing);
        self.first_pointer_at = None;
    }

    fn enter_zoom(&mut self, sample: &MotionSample) {
        match self.gesture {
            GestureStatus::Zooming => return,
            GestureStatus::WaitSecondPointer => {
                let dropped = self.history.discard();
                debug!("Second finger inside tap window, discarded {} events", dropped);
                if self.in_range == InRangeStatus::FakeInRange {
                    // the synthetic proximity-down went out with the buffer
                    self.in_range = InRangeStatus::OutOfRange;
                }
            }
            _ => {
                // a stroke was already under way: lift the pen before zooming
                let geometry = self.host.canvas();
                self.push_pointer_up(&sample.current, &geometry);
                self.flush();
            }
        }
        self.first_pointer_at = None;
        self.set_gesture(GestureStatus::Zooming);
    }

    fn push_sample(&mut self, sample: &MotionSample, geometry: &CanvasGeometry) {
        let action = sample.action;
        if matches!(
            action,
            MotionAction::Move | MotionAction::Up | MotionAction::Cancel
        ) {
            for coords in &sample.history {
                self.history.push(PointerEvent::motion(coords, geometry));
            }
        }

        let coords = &sample.current;
        self.last_coords = *coords;
        match action {
            MotionAction::Move => {
                self.history.push(PointerEvent::motion(coords, geometry));
                self.host.show_toolbar();
            }
            MotionAction::Down => {
                if self.in_range == InRangeStatus::OutOfRange {
                    self.in_range = InRangeStatus::FakeInRange;
                    self.history.push(PointerEvent::proximity(true, coords, geometry));
                }
                self.history
                    .push(PointerEvent::button(Button::Draw, true, coords, geometry));
                self.set_gesture(GestureStatus::FirstPointer);
                self.host.show_toolbar();
            }
            MotionAction::Up | MotionAction::Cancel => {
                self.push_pointer_up(coords, geometry);
                self.set_gesture(GestureStatus::Nothing);
            }
            _ => trace!("Ignoring single-finger action {:?}", action),
        }
    }

    fn push_pointer_up(&mut self, coords: &PointerCoords, geometry: &CanvasGeometry) {
        self.history
            .push(PointerEvent::button(Button::Draw, false, coords, geometry));
        if self.in_range == InRangeStatus::FakeInRange {
            self.in_range = InRangeStatus::OutOfRange;
            self.history.push(PointerEvent::proximity(false, coords, geometry));
        }
    }

    fn tap_window_elapsed(&self) -> bool {
        let now = self.clock.now();
        self.first_pointer_at
            .is_some_and(|t0| now.saturating_duration_since(t0) > self.tap_timeout)
    }

    fn flush(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let events = self.history.drain();
        trace!("Flushing {} events", events.len());
        self.emitter.emit_all(events);
    }

    fn set_gesture(&mut self, next: GestureStatus) {
        if self.gesture != next {
            trace!("Gesture {:?} -> {:?}", self.gesture, next);
            self.gesture = next;
        }
    }
}
