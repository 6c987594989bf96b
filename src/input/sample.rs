//! Raw input as delivered by the platform, and the canvas geometry needed to
//! place it on the remote image.

use crate::error::ConfigError;

/// Masked action code of a platform motion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
    PointerDown,
    PointerUp,
    HoverEnter,
    HoverMove,
    HoverExit,
}

impl MotionAction {
    /// Maps an Android `MotionEvent.getActionMasked()` code.
    pub fn from_android(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            2 => Some(Self::Move),
            3 => Some(Self::Cancel),
            5 => Some(Self::PointerDown),
            6 => Some(Self::PointerUp),
            7 => Some(Self::HoverMove),
            9 => Some(Self::HoverEnter),
            10 => Some(Self::HoverExit),
            _ => None,
        }
    }

    pub fn is_hover(self) -> bool {
        matches!(self, Self::HoverEnter | Self::HoverMove | Self::HoverExit)
    }
}

/// Kind of tool that produced a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolType {
    #[default]
    Unknown,
    Finger,
    Stylus,
    Mouse,
    Eraser,
}

impl ToolType {
    /// Maps an Android `MotionEvent.TOOL_TYPE_*` code.
    pub fn from_android(code: i32) -> Self {
        match code {
            1 => Self::Finger,
            2 => Self::Stylus,
            3 => Self::Mouse,
            4 => Self::Eraser,
            _ => Self::Unknown,
        }
    }
}

/// One position/pressure reading of the primary pointer, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerCoords {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub tool: ToolType,
}

impl PointerCoords {
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure,
            tool: ToolType::Finger,
        }
    }
}

/// One input callback: the current reading plus the batched backlog of
/// intermediate readings, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSample {
    pub action: MotionAction,
    pub pointer_count: usize,
    pub current: PointerCoords,
    pub history: Vec<PointerCoords>,
}

impl MotionSample {
    pub fn new(action: MotionAction, pointer_count: usize, current: PointerCoords) -> Self {
        Self {
            action,
            pointer_count,
            current,
            history: Vec::new(),
        }
    }

    /// Single-finger sample at `(x, y)` with unit pressure.
    pub fn single(action: MotionAction, x: f32, y: f32) -> Self {
        Self::new(action, 1, PointerCoords::new(x, y, 1.0))
    }

    pub fn with_history(mut self, history: Vec<PointerCoords>) -> Self {
        self.history = history;
        self
    }
}

/// Limits applied to the remote image size, as for framebuffers.
pub const MIN_DIMENSION: i32 = 1;
pub const MAX_DIMENSION: i32 = 8192;

/// Pan/zoom state of the local canvas and the size of the remote image.
///
/// Read-only while an event is processed. Construction validates the size so
/// normalization never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    abs_x: f32,
    abs_y: f32,
    top: f32,
    zoom: f32,
    image_width: u16,
    image_height: u16,
}

impl CanvasGeometry {
    pub fn new(image_width: i32, image_height: i32) -> Result<Self, ConfigError> {
        let valid = MIN_DIMENSION..=MAX_DIMENSION;
        if !valid.contains(&image_width) || !valid.contains(&image_height) {
            return Err(ConfigError::InvalidDimensions {
                width: image_width,
                height: image_height,
                min: MIN_DIMENSION,
                max: MAX_DIMENSION,
            });
        }
        Ok(Self {
            abs_x: 0.0,
            abs_y: 0.0,
            top: 0.0,
            zoom: 1.0,
            image_width: image_width as u16,
            image_height: image_height as u16,
        })
    }

    /// Sets the pan offset (canvas coordinates of the view's top-left corner).
    pub fn with_pan(mut self, abs_x: f32, abs_y: f32) -> Self {
        self.abs_x = abs_x;
        self.abs_y = abs_y;
        self
    }

    /// Vertical offset of the canvas view inside the window.
    pub fn with_top(mut self, top: f32) -> Self {
        self.top = top;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Result<Self, ConfigError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ConfigError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(self)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn image_width(&self) -> u16 {
        self.image_width
    }

    pub fn image_height(&self) -> u16 {
        self.image_height
    }

    /// Maps view coordinates to absolute canvas coordinates.
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.abs_x + x / self.zoom,
            self.abs_y + (y - self.top) / self.zoom,
        )
    }
}
