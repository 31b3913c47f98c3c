use crate::error::ClassifierError;
use crate::models::region::Rect;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Input edge length the classifier model was trained on
pub const CLASSIFIER_INPUT: u32 = 96;

/// Cut a region out of the frame
///
/// The rect is clipped to the frame first; a rect entirely outside the
/// frame is an error.
pub fn crop_region(frame: &RgbaImage, rect: &Rect) -> Result<RgbaImage, ClassifierError> {
    let (width, height) = frame.dimensions();
    let clamped = rect.clamped(width, height).ok_or_else(|| {
        ClassifierError::OutOfFrame(format!("{:?} in {}x{} frame", rect, width, height))
    })?;

    Ok(imageops::crop_imm(
        frame,
        clamped.x as u32,
        clamped.y as u32,
        clamped.width,
        clamped.height,
    )
    .to_image())
}

/// Scale a crop to the square classifier input
pub fn to_classifier_input(crop: &RgbaImage) -> RgbaImage {
    imageops::resize(
        crop,
        CLASSIFIER_INPUT,
        CLASSIFIER_INPUT,
        FilterType::CatmullRom,
    )
}

/// PNG-encode an image for transport
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ClassifierError> {
    let mut buffer = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| ClassifierError::Encoding(format!("PNG encode failed: {}", e)))?;
    Ok(buffer)
}

/// Crop, scale, and encode one region for the model server
pub fn region_to_png(frame: &RgbaImage, rect: &Rect) -> Result<Vec<u8>, ClassifierError> {
    let crop = crop_region(frame, rect)?;
    encode_png(&to_classifier_input(&crop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frame() -> RgbaImage {
        RgbaImage::from_fn(200, 100, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 40, 255])
        })
    }

    #[test]
    fn test_crop_dimensions() {
        let crop = crop_region(&frame(), &Rect::new(10, 20, 64, 32)).unwrap();
        assert_eq!(crop.dimensions(), (64, 32));
        // Top-left pixel of the crop comes from (10, 20)
        assert_eq!(crop.get_pixel(0, 0), &Rgba([10, 20, 40, 255]));
    }

    #[test]
    fn test_crop_clips_to_frame() {
        let crop = crop_region(&frame(), &Rect::new(180, 80, 64, 64)).unwrap();
        assert_eq!(crop.dimensions(), (20, 20));
    }

    #[test]
    fn test_crop_outside_frame_fails() {
        let result = crop_region(&frame(), &Rect::new(500, 500, 32, 32));
        assert!(matches!(result, Err(ClassifierError::OutOfFrame(_))));
    }

    #[test]
    fn test_classifier_input_is_square() {
        let crop = crop_region(&frame(), &Rect::new(0, 0, 64, 32)).unwrap();
        let input = to_classifier_input(&crop);
        assert_eq!(input.dimensions(), (CLASSIFIER_INPUT, CLASSIFIER_INPUT));
    }

    #[test]
    fn test_encode_png_magic_bytes() {
        let png = region_to_png(&frame(), &Rect::new(0, 0, 32, 32)).unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
