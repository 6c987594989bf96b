//! Reaction to the platform's two-finger recognizer: zoom and pan the local
//! canvas once a pinch is under way.

use log::trace;

use crate::config::DEFAULT_MIN_SCALE_FACTOR;

/// Local canvas zoom/pan controls.
pub trait Zoomer {
    fn zoom_factor(&self) -> f32;
    fn change_zoom(&mut self, scale_factor: f32, focus_x: f32, focus_y: f32);
    fn relative_pan(&mut self, dx: i32, dy: i32);
    fn show_toolbar(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct PinchZoom {
    min_scale_factor: f32,
    in_scaling: bool,
    scaling_just_finished: bool,
    focus: (f32, f32),
}

impl Default for PinchZoom {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCALE_FACTOR)
    }
}

impl PinchZoom {
    pub fn new(min_scale_factor: f32) -> Self {
        Self {
            min_scale_factor,
            in_scaling: false,
            scaling_just_finished: false,
            focus: (0.0, 0.0),
        }
    }

    pub fn in_scaling(&self) -> bool {
        self.in_scaling
    }

    pub fn scaling_just_finished(&self) -> bool {
        self.scaling_just_finished
    }

    pub fn on_scale_begin(&mut self) -> bool {
        self.in_scaling = false;
        self.scaling_just_finished = false;
        true
    }

    /// Returns whether the scale step was consumed.
    ///
    /// Until scaling has started, factors within `min_scale_factor` of 1.0 are
    /// treated as jitter and left unconsumed so the recognizer keeps
    /// accumulating.
    pub fn on_scale<Z: Zoomer>(
        &mut self,
        zoomer: &mut Z,
        scale_factor: f32,
        focus_x: f32,
        focus_y: f32,
    ) -> bool {
        self.focus = (focus_x, focus_y);
        if !self.in_scaling && (1.0 - scale_factor).abs() < self.min_scale_factor {
            trace!("Not scaling due to small scale factor {}", scale_factor);
            return false;
        }
        self.in_scaling = true;
        zoomer.change_zoom(scale_factor, focus_x, focus_y);
        true
    }

    pub fn on_scale_end(&mut self) {
        self.in_scaling = false;
        self.scaling_just_finished = true;
    }

    /// Pans the canvas by the scroll distance scaled to the zoom factor.
    ///
    /// One-finger scrolls belong to the stroke and are ignored.
    pub fn on_scroll<Z: Zoomer>(
        &mut self,
        zoomer: &mut Z,
        distance_x: f32,
        distance_y: f32,
        pointer_count: usize,
    ) -> bool {
        if !self.in_scaling && pointer_count < 2 {
            return true;
        }
        let scale = zoomer.zoom_factor();
        zoomer.show_toolbar();
        zoomer.relative_pan((distance_x * scale) as i32, (distance_y * scale) as i32);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Canvas {
        zoom: f32,
        zoom_calls: Vec<f32>,
        pans: Vec<(i32, i32)>,
        toolbar: usize,
    }

    impl Zoomer for Canvas {
        fn zoom_factor(&self) -> f32 {
            self.zoom
        }
        fn change_zoom(&mut self, scale_factor: f32, _focus_x: f32, _focus_y: f32) {
            self.zoom *= scale_factor;
            self.zoom_calls.push(scale_factor);
        }
        fn relative_pan(&mut self, dx: i32, dy: i32) {
            self.pans.push((dx, dy));
        }
        fn show_toolbar(&mut self) {
            self.toolbar += 1;
        }
    }

    fn canvas() -> Canvas {
        Canvas {
            zoom: 2.0,
            ..Canvas::default()
        }
    }

    #[test]
    fn small_factors_wait_for_threshold() {
        let mut pinch = PinchZoom::default();
        let mut canvas = canvas();
        pinch.on_scale_begin();
        assert!(!pinch.on_scale(&mut canvas, 1.1, 10.0, 10.0));
        assert!(canvas.zoom_calls.is_empty());
        assert!(pinch.on_scale(&mut canvas, 1.3, 10.0, 10.0));
        // once scaling, small steps apply too
        assert!(pinch.on_scale(&mut canvas, 1.05, 10.0, 10.0));
        assert_eq!(canvas.zoom_calls, vec![1.3, 1.05]);
        pinch.on_scale_end();
        assert!(!pinch.in_scaling());
        assert!(pinch.scaling_just_finished());
    }

    #[test]
    fn two_finger_scroll_pans_scaled() {
        let mut pinch = PinchZoom::default();
        let mut canvas = canvas();
        pinch.on_scroll(&mut canvas, 5.0, -3.0, 2);
        assert_eq!(canvas.pans, vec![(10, -6)]);
        assert_eq!(canvas.toolbar, 1);
    }

    #[test]
    fn one_finger_scroll_is_ignored() {
        let mut pinch = PinchZoom::default();
        let mut canvas = canvas();
        assert!(pinch.on_scroll(&mut canvas, 5.0, 5.0, 1));
        assert!(canvas.pans.is_empty());
    }
}
