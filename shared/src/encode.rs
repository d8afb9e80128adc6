use png::{BitDepth, ColorType, Encoder};
use thiserror::Error;

use crate::raster::Raster;

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("empty bitmap")]
    Empty,
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, EncodeError> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(EncodeError::Empty);
    }
    let mut bytes = Vec::new();
    {
        let mut encoder = Encoder::new(&mut bytes, raster.width(), raster.height());
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(raster.as_rgba())?;
        writer.finish()?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::INK;
    use crate::{normalize, MODEL_SIZE};

    #[test]
    fn normalized_bitmap_encodes_as_28x28_rgba() {
        let mut raster = Raster::blank(280, 280);
        raster.set_pixel(10, 10, INK);
        let bitmap = normalize(&raster).unwrap();
        let bytes = encode_png(&bitmap).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (MODEL_SIZE, MODEL_SIZE));
        assert_eq!(info.color_type, ColorType::Rgba);
        assert_eq!(&buf[..info.buffer_size()], bitmap.as_rgba());
    }

    #[test]
    fn zero_sized_bitmap_is_an_error() {
        let raster = Raster::blank(0, 0);
        assert!(matches!(encode_png(&raster), Err(EncodeError::Empty)));
    }
}
