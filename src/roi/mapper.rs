//! Display-space to native-space pointer mapping.
//!
//! The surface is laid out at whatever size the window gives it while the
//! pixels underneath stay at the media's native resolution. Both sizes are
//! passed in on every call so a resize between two pointer events is picked
//! up immediately.

use crate::roi::geometry::{Point, SurfaceSize};

/// Map a pointer position, relative to the surface's top-left corner, into
/// native pixel space.
///
/// Returns `None` while the surface has no laid-out size; such events must be
/// dropped by the caller.
pub fn map_to_native(local: Point, displayed: SurfaceSize, native: SurfaceSize) -> Option<Point> {
    if displayed.width <= 0.0 || displayed.height <= 0.0 {
        return None;
    }
    Some(Point {
        x: local.x * (native.width / displayed.width),
        y: local.y * (native.height / displayed.height),
    })
}

/// Inverse of [`map_to_native`], used to paint native-space geometry onto the
/// scaled surface.
pub fn map_to_display(native_point: Point, displayed: SurfaceSize, native: SurfaceSize) -> Option<Point> {
    if native.width <= 0.0 || native.height <= 0.0 {
        return None;
    }
    Some(Point {
        x: native_point.x * (displayed.width / native.width),
        y: native_point.y * (displayed.height / native.height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn scales_each_axis_independently() {
        let displayed = SurfaceSize::new(320.0, 240.0);
        let native = SurfaceSize::new(640.0, 360.0);
        let mapped = map_to_native(Point::new(160.0, 120.0), displayed, native).unwrap();
        assert!(close(mapped, Point::new(320.0, 180.0)));
    }

    #[test]
    fn unlaid_out_surface_yields_none() {
        let native = SurfaceSize::new(640.0, 360.0);
        assert_eq!(
            map_to_native(Point::new(1.0, 1.0), SurfaceSize::new(0.0, 240.0), native),
            None
        );
        assert_eq!(
            map_to_native(Point::new(1.0, 1.0), SurfaceSize::new(320.0, 0.0), native),
            None
        );
    }

    #[test]
    fn round_trip_reproduces_display_point() {
        let native = SurfaceSize::new(1920.0, 1080.0);
        for displayed in [
            SurfaceSize::new(640.0, 360.0),
            SurfaceSize::new(1000.0, 563.0),
            SurfaceSize::new(2880.0, 1620.0),
            SurfaceSize::new(333.0, 777.0),
        ] {
            for local in [
                Point::new(0.0, 0.0),
                Point::new(12.5, 300.25),
                Point::new(displayed.width, displayed.height),
            ] {
                let there = map_to_native(local, displayed, native).unwrap();
                let back = map_to_display(there, displayed, native).unwrap();
                assert!(close(local, back), "{local:?} -> {there:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn resize_between_events_is_honoured() {
        let native = SurfaceSize::new(640.0, 360.0);
        let p = Point::new(100.0, 100.0);
        let small = map_to_native(p, SurfaceSize::new(320.0, 180.0), native).unwrap();
        let large = map_to_native(p, SurfaceSize::new(1280.0, 720.0), native).unwrap();
        assert!(close(small, Point::new(200.0, 200.0)));
        assert!(close(large, Point::new(50.0, 50.0)));
    }
}
