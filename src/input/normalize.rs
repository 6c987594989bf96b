//! Conversion of canvas coordinates and stylus pressure into the tablet's
//! fixed 16-bit range.
//!
//! Coordinates span `0..=2 * i16::MAX` across the remote image, pressure spans
//! `0..=i16::MAX` for the nominal `[0, 1]` input and saturates at twice that.
//! All conversions saturate; nothing wraps.

/// Upper bound of a normalized coordinate.
pub const COORDINATE_MAX: u16 = 2 * i16::MAX as u16;

/// Largest accepted raw pressure (some digitizers report above 1.0).
pub const PRESSURE_CLAMP: f32 = 2.0;

/// Scales `value` in `[0, max]` onto `[0, COORDINATE_MAX]`.
///
/// `max` must be non-zero; `CanvasGeometry` guarantees that for every caller
/// inside this crate.
pub fn normalize_coordinate(value: f32, max: u16) -> u16 {
    debug_assert!(max > 0, "canvas dimension must be positive");
    let max = f64::from(max);
    let clamped = f64::from(value).clamp(0.0, max);
    // NaN survives clamp and casts to 0
    (clamped * f64::from(COORDINATE_MAX) / max) as u16
}

/// Scales a pressure reading by `i16::MAX` after clamping to `[0, 2.0]`.
pub fn normalize_pressure(pressure: f32) -> u16 {
    (f64::from(pressure.clamp(0.0, PRESSURE_CLAMP)) * f64::from(i16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_endpoints() {
        assert_eq!(normalize_coordinate(0.0, 1920), 0);
        assert_eq!(normalize_coordinate(1920.0, 1920), COORDINATE_MAX);
        assert_eq!(normalize_coordinate(960.0, 1920), i16::MAX as u16);
    }

    #[test]
    fn coordinate_saturates_outside_canvas() {
        assert_eq!(normalize_coordinate(-250.0, 800), 0);
        assert_eq!(normalize_coordinate(10_000.0, 800), COORDINATE_MAX);
        assert_eq!(normalize_coordinate(f32::INFINITY, 800), COORDINATE_MAX);
        assert_eq!(normalize_coordinate(f32::NAN, 800), 0);
    }

    #[test]
    fn coordinate_is_monotonic() {
        for max in [1u16, 7, 600, 1080, 8192] {
            let mut previous = 0;
            let steps = 4 * u32::from(max) + 8;
            for i in 0..=steps {
                let value = i as f32 * 0.25 - 1.0;
                let n = normalize_coordinate(value, max);
                assert!(n >= previous, "max={max} value={value}");
                assert!(n <= COORDINATE_MAX);
                previous = n;
            }
        }
    }

    #[test]
    fn pressure_range() {
        assert_eq!(normalize_pressure(0.0), 0);
        assert_eq!(normalize_pressure(-3.0), 0);
        assert_eq!(normalize_pressure(1.0), i16::MAX as u16);
        assert_eq!(normalize_pressure(2.0), COORDINATE_MAX);
        assert_eq!(normalize_pressure(9.0), COORDINATE_MAX);
        assert_eq!(normalize_pressure(f32::NAN), 0);
        for i in 0..=100 {
            let p = i as f32 / 100.0;
            assert!(normalize_pressure(p) <= i16::MAX as u16);
        }
    }
}
