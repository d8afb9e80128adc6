use thiserror::Error;

use crate::capture::DrawOp;
use crate::{Point, STROKE_WIDTH};

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const INK: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn blank(width: u32, height: u32) -> Self {
        let data = WHITE.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let at = self.offset(x, y);
        [
            self.data[at],
            self.data[at + 1],
            self.data[at + 2],
            self.data[at + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let at = self.offset(x, y);
        self.data[at..at + 4].copy_from_slice(&rgba);
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        let [r, g, b, _] = self.pixel(x, y);
        r < 255 || g < 255 || b < 255
    }

    pub fn clear(&mut self) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&WHITE);
        }
    }

    pub fn to_luma(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .map(|pixel| ((pixel[0] as u16 + pixel[1] as u16 + pixel[2] as u16) / 3) as u8)
            .collect()
    }

    /// Stamps a draw op with solid ink. A pixel is covered when its center
    /// lies within half the stroke width of the op's geometry, which gives
    /// segments round caps.
    pub fn apply(&mut self, op: &DrawOp) {
        let radius = STROKE_WIDTH / 2.0;
        let (from, to) = match *op {
            DrawOp::Dot { center } => (center, center),
            DrawOp::Segment { from, to } => (from, to),
        };
        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64).min(self.width as i64);
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64).min(self.height as i64);
        if max_x <= 0 || max_y <= 0 {
            return;
        }
        for y in min_y..max_y as u32 {
            for x in min_x..max_x as u32 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.set_pixel(x, y, INK);
                }
            }
        }
    }
}

pub fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq < f32::EPSILON {
        return point.distance_sq(from).sqrt();
    }
    let t = ((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);
    let projected = Point::new(from.x + t * dx, from.y + t * dy);
    point.distance_sq(projected).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_length() {
        let err = Raster::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            RasterError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
        assert!(Raster::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn dot_covers_a_disc() {
        let mut raster = Raster::blank(100, 100);
        raster.apply(&DrawOp::Dot {
            center: Point::new(50.0, 50.0),
        });
        assert!(raster.is_ink(50, 50));
        assert!(raster.is_ink(42, 50));
        assert!(!raster.is_ink(62, 50));
        assert!(!raster.is_ink(58, 58));
    }

    #[test]
    fn segment_has_round_caps() {
        let mut raster = Raster::blank(100, 100);
        raster.apply(&DrawOp::Segment {
            from: Point::new(20.0, 50.0),
            to: Point::new(80.0, 50.0),
        });
        assert!(raster.is_ink(50, 50));
        // Past the endpoint, inside the cap.
        assert!(raster.is_ink(86, 50));
        assert!(!raster.is_ink(91, 50));
        // Caps are round, so the corner of a square cap stays white.
        assert!(!raster.is_ink(88, 58));
    }

    #[test]
    fn ops_outside_the_surface_are_clipped() {
        let mut raster = Raster::blank(10, 10);
        raster.apply(&DrawOp::Dot {
            center: Point::new(-50.0, -50.0),
        });
        assert_eq!(raster, Raster::blank(10, 10));
        raster.apply(&DrawOp::Dot {
            center: Point::new(0.0, 0.0),
        });
        assert!(raster.is_ink(0, 0));
    }

    #[test]
    fn clear_restores_white() {
        let mut raster = Raster::blank(30, 30);
        raster.apply(&DrawOp::Dot {
            center: Point::new(15.0, 15.0),
        });
        raster.clear();
        assert_eq!(raster, Raster::blank(30, 30));
    }
}
