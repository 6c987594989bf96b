//! Touch and stylus input handling for the remote canvas.
//!
//! # Architecture
//!
//! Input flows leaves-first through these modules:
//!
//! - **`normalize`**: canvas coordinates and pressure into the 16-bit tablet range
//! - **`sample`**: raw platform callbacks and the canvas geometry they map onto
//! - **`event`**: discrete motion/button events built from samples
//! - **`history`**: the tentative buffer holding a stroke's first events
//! - **`gesture`**: the session deciding between stroke and pinch
//! - **`emit`**: output sink contract and button de-duplication
//! - **`direct`**: sink applying events to an emulated remote mouse
//! - **`pinch`**: zoom/pan reaction once a pinch is recognized
//!
//! The network sink lives in [`crate::net`].
//!
//! # Example Flow
//!
//! ```ignore
//! let mut session = GestureSession::new(sink, host, &config);
//! match session.handle_touch(&sample) {
//!     TouchOutcome::Delegated => scale_detector.on_touch_event(event),
//!     _ => {}
//! }
//! ```

pub mod direct;
pub mod emit;
pub mod event;
pub mod gesture;
pub mod history;
pub mod normalize;
pub mod pinch;
pub mod sample;

pub use direct::{DirectPointerSink, RemotePointer, ScrollDirection};
pub use emit::{Emitter, OutputSink, RecordingSink};
pub use event::{Button, EventKind, NormalizedPoint, PointerEvent};
pub use gesture::{
    Clock, GestureSession, GestureStatus, InRangeStatus, InputHost, SystemClock, TouchOutcome,
};
pub use pinch::{PinchZoom, Zoomer};
pub use sample::{CanvasGeometry, MotionAction, MotionSample, PointerCoords, ToolType};
