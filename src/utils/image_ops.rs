// Result payload validation

use crate::core::errors::PayloadError;

/// Check that a byte payload is a plausible image before it is rendered or
/// offered for download. URL references skip this entirely; only raw byte
/// payloads are sniffed.
pub fn validate_image_payload(bytes: &[u8]) -> Result<(), PayloadError> {
    if bytes.is_empty() {
        return Err(PayloadError::Empty);
    }
    image::load_from_memory(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([12, 34, 56, 255]));
        let mut cursor = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn accepts_a_valid_png() {
        assert!(validate_image_payload(&tiny_png()).is_ok());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(
            validate_image_payload(&[]),
            Err(PayloadError::Empty)
        ));
    }

    #[test]
    fn rejects_undecodable_bytes() {
        assert!(matches!(
            validate_image_payload(b"definitely not an image"),
            Err(PayloadError::Undecodable(_))
        ));
    }
}
