use crate::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    Dot { center: Point },
    Segment { from: Point, to: Point },
}

#[derive(Debug, Default)]
pub struct StrokeCapture {
    last: Option<Point>,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    pub fn begin(&mut self, point: Point) -> Option<DrawOp> {
        let point = point.finite()?;
        self.last = Some(point);
        Some(DrawOp::Dot { center: point })
    }

    pub fn extend(&mut self, point: Point) -> Option<DrawOp> {
        let point = point.finite()?;
        let from = self.last?;
        self.last = Some(point);
        Some(DrawOp::Segment { from, to: point })
    }

    pub fn end(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Raster;

    #[test]
    fn moves_without_a_gesture_draw_nothing() {
        let mut capture = StrokeCapture::new();
        assert_eq!(capture.extend(Point::new(1.0, 1.0)), None);
        assert!(!capture.is_drawing());
    }

    #[test]
    fn hovering_leaves_the_canvas_blank() {
        let mut capture = StrokeCapture::new();
        let mut raster = Raster::blank(280, 280);
        for point in [Point::new(30.0, 30.0), Point::new(200.0, 200.0)] {
            if let Some(op) = capture.extend(point) {
                raster.apply(&op);
            }
        }
        assert!(!capture.is_drawing());
        assert!(crate::normalize(&raster).is_err());
    }

    #[test]
    fn gesture_emits_dot_then_connected_segments() {
        let mut capture = StrokeCapture::new();
        let a = Point::new(10.0, 10.0);
        let b = Point::new(20.0, 15.0);
        let c = Point::new(30.0, 40.0);
        assert_eq!(capture.begin(a), Some(DrawOp::Dot { center: a }));
        assert_eq!(capture.extend(b), Some(DrawOp::Segment { from: a, to: b }));
        assert_eq!(capture.extend(c), Some(DrawOp::Segment { from: b, to: c }));
        capture.end();
        assert!(!capture.is_drawing());
        assert_eq!(capture.extend(a), None);
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let mut capture = StrokeCapture::new();
        assert_eq!(capture.begin(Point::new(f32::INFINITY, 0.0)), None);
        assert!(!capture.is_drawing());
        let a = Point::new(5.0, 5.0);
        capture.begin(a);
        assert_eq!(capture.extend(Point::new(f32::NAN, 1.0)), None);
        let b = Point::new(6.0, 6.0);
        assert_eq!(capture.extend(b), Some(DrawOp::Segment { from: a, to: b }));
    }

    #[test]
    fn a_tap_leaves_ink() {
        let mut capture = StrokeCapture::new();
        let mut raster = Raster::blank(280, 280);
        if let Some(op) = capture.begin(Point::new(140.0, 140.0)) {
            raster.apply(&op);
        }
        capture.end();
        assert!(raster.is_ink(140, 140));
    }
}
