use thiserror::Error;

use crate::raster::Raster;
use crate::{FIT_SIZE, MARGIN, MODEL_SIZE};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("nothing has been drawn")]
    Blank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn side(&self) -> u32 {
        self.width.max(self.height)
    }
}

pub fn bounding_box(raster: &Raster) -> Option<BoundingBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            if !raster.is_ink(x, y) {
                continue;
            }
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x == u32::MAX {
        return None;
    }
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Copies `bounds` into the top-left corner of a white square whose side is
/// the larger of the two dimensions. The padding therefore only ever lands on
/// the right or bottom edge.
pub fn crop_square(raster: &Raster, bounds: BoundingBox) -> Raster {
    let side = bounds.side();
    let mut square = Raster::blank(side, side);
    for y in 0..bounds.height {
        for x in 0..bounds.width {
            square.set_pixel(x, y, raster.pixel(bounds.x + x, bounds.y + y));
        }
    }
    square
}

pub fn downscale(raster: &Raster, size: u32) -> Raster {
    let mut out = Raster::blank(size, size);
    if raster.width() == 0 || raster.height() == 0 || size == 0 {
        return out;
    }
    let scale_x = raster.width() as f32 / size as f32;
    let scale_y = raster.height() as f32 / size as f32;
    for oy in 0..size {
        let y0 = oy as f32 * scale_y;
        let y1 = (oy + 1) as f32 * scale_y;
        for ox in 0..size {
            let x0 = ox as f32 * scale_x;
            let x1 = (ox + 1) as f32 * scale_x;
            let mut acc = [0.0f32; 4];
            let mut total = 0.0f32;
            let mut sy = y0.floor() as u32;
            while (sy as f32) < y1 && sy < raster.height() {
                let wy = y1.min(sy as f32 + 1.0) - y0.max(sy as f32);
                let mut sx = x0.floor() as u32;
                while (sx as f32) < x1 && sx < raster.width() {
                    let wx = x1.min(sx as f32 + 1.0) - x0.max(sx as f32);
                    let weight = wx * wy;
                    if weight > 0.0 {
                        let pixel = raster.pixel(sx, sy);
                        for (slot, channel) in acc.iter_mut().zip(pixel) {
                            *slot += channel as f32 * weight;
                        }
                        total += weight;
                    }
                    sx += 1;
                }
                sy += 1;
            }
            if total > 0.0 {
                let pixel = acc.map(|value| (value / total).round().clamp(0.0, 255.0) as u8);
                out.set_pixel(ox, oy, pixel);
            }
        }
    }
    out
}

pub fn invert(raster: &mut Raster) {
    for pixel in raster.as_rgba_mut().chunks_exact_mut(4) {
        pixel[0] = 255 - pixel[0];
        pixel[1] = 255 - pixel[1];
        pixel[2] = 255 - pixel[2];
    }
}

fn paste(target: &mut Raster, source: &Raster, at_x: u32, at_y: u32) {
    for y in 0..source.height() {
        for x in 0..source.width() {
            target.set_pixel(at_x + x, at_y + y, source.pixel(x, y));
        }
    }
}

pub fn normalize(raster: &Raster) -> Result<Raster, NormalizeError> {
    let bounds = bounding_box(raster).ok_or(NormalizeError::Blank)?;
    let square = crop_square(raster, bounds);
    let fitted = downscale(&square, FIT_SIZE);
    let mut framed = Raster::blank(MODEL_SIZE, MODEL_SIZE);
    paste(&mut framed, &fitted, MARGIN, MARGIN);
    invert(&mut framed);
    Ok(framed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::INK;
    use crate::{DrawOp, Point, CANVAS_SIZE};

    fn canvas() -> Raster {
        Raster::blank(CANVAS_SIZE, CANVAS_SIZE)
    }

    #[test]
    fn blank_canvas_is_rejected() {
        assert_eq!(normalize(&canvas()), Err(NormalizeError::Blank));
        assert_eq!(bounding_box(&canvas()), None);
    }

    #[test]
    fn near_white_counts_as_ink() {
        let mut raster = canvas();
        raster.set_pixel(3, 9, [255, 254, 255, 255]);
        assert_eq!(
            bounding_box(&raster),
            Some(BoundingBox {
                x: 3,
                y: 9,
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn single_center_pixel_lands_in_the_frame_center() {
        let mut raster = canvas();
        raster.set_pixel(140, 140, INK);
        let bounds = bounding_box(&raster).unwrap();
        assert_eq!((bounds.width, bounds.height), (1, 1));

        let bitmap = normalize(&raster).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (MODEL_SIZE, MODEL_SIZE));
        let luma = bitmap.to_luma();
        // Margin is background, fitted region is ink.
        assert_eq!(luma[0], 0);
        assert_eq!(luma[(MARGIN * MODEL_SIZE + MARGIN) as usize], 255);
        assert_eq!(luma[(14 * MODEL_SIZE + 14) as usize], 255);
        assert_eq!(luma[(3 * MODEL_SIZE + 14) as usize], 0);

        let (mut sum, mut sx, mut sy) = (0.0f64, 0.0f64, 0.0f64);
        for (index, value) in luma.iter().enumerate() {
            let weight = *value as f64;
            sum += weight;
            sx += weight * (index as u32 % MODEL_SIZE) as f64;
            sy += weight * (index as u32 / MODEL_SIZE) as f64;
        }
        let center = (MODEL_SIZE as f64 - 1.0) / 2.0;
        assert!((sx / sum - center).abs() < 0.01);
        assert!((sy / sum - center).abs() < 0.01);
    }

    #[test]
    fn invert_is_involutive() {
        let mut raster = canvas();
        raster.apply(&DrawOp::Segment {
            from: Point::new(30.0, 30.0),
            to: Point::new(200.0, 90.0),
        });
        raster.set_pixel(1, 1, [12, 200, 77, 128]);
        let original = raster.clone();
        invert(&mut raster);
        assert_ne!(raster, original);
        assert_eq!(raster.pixel(1, 1), [243, 55, 178, 128]);
        invert(&mut raster);
        assert_eq!(raster, original);
    }

    #[test]
    fn wide_boxes_are_padded_below() {
        let mut raster = canvas();
        for y in 100..120 {
            for x in 50..90 {
                raster.set_pixel(x, y, INK);
            }
        }
        let bounds = bounding_box(&raster).unwrap();
        assert_eq!(bounds.side(), 40);
        let square = crop_square(&raster, bounds);
        assert!(square.is_ink(39, 19));
        assert!(!square.is_ink(0, 20));

        let luma = normalize(&raster).unwrap().to_luma();
        let at = |x: u32, y: u32| luma[(y * MODEL_SIZE + x) as usize];
        // Top half of the fitted region holds the ink, bottom half the padding.
        assert_eq!(at(10, MARGIN), 255);
        assert_eq!(at(10, MARGIN + 9), 255);
        assert_eq!(at(10, MARGIN + 10), 0);
        assert_eq!(at(10, MARGIN + 19), 0);
    }

    #[test]
    fn downscale_averages_covered_area() {
        let mut raster = Raster::blank(4, 4);
        raster.set_pixel(0, 0, INK);
        raster.set_pixel(1, 0, INK);
        let small = downscale(&raster, 2);
        // Half of the top-left 2x2 block is ink.
        assert_eq!(small.pixel(0, 0), [128, 128, 128, 255]);
        assert_eq!(small.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn output_is_deterministic() {
        let mut raster = canvas();
        raster.apply(&DrawOp::Segment {
            from: Point::new(120.0, 40.0),
            to: Point::new(150.0, 240.0),
        });
        assert_eq!(normalize(&raster), normalize(&raster));
    }
}
