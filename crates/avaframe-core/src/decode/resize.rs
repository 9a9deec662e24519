//! Image resizing used to bring supersampled renders down to output size.
//!
//! Filtering runs on premultiplied alpha, so fully transparent pixels never
//! bleed their (meaningless) color into visible neighbors. Returns a new
//! `PixelBuffer` without modifying the input.

use super::{DecodeError, FilterType, PixelBuffer};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for zero target dimensions and
/// `DecodeError::CorruptedFile` if the source buffer does not match its
/// declared size.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    if !image.is_consistent() {
        return Err(DecodeError::CorruptedFile(
            "Failed to create Rgba32FImage".to_string(),
        ));
    }

    // Filter premultiplied values so transparent pixels carry no color
    let premultiplied: Vec<f32> = image
        .pixels
        .chunks_exact(4)
        .flat_map(|p| {
            let a = f32::from(p[3]) / 255.0;
            [
                f32::from(p[0]) / 255.0 * a,
                f32::from(p[1]) / 255.0 * a,
                f32::from(p[2]) / 255.0 * a,
                a,
            ]
        })
        .collect();
    let source = image::Rgba32FImage::from_raw(image.width, image.height, premultiplied)
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create Rgba32FImage".to_string()))?;

    let resized = image::imageops::resize(&source, width, height, filter.to_image_filter());

    let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for p in resized.pixels() {
        let [r, g, b, a] = p.0;
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha == 0 {
            pixels.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let a = a.clamp(0.0, 1.0);
        let unpremultiply = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        pixels.extend_from_slice(&[unpremultiply(r), unpremultiply(g), unpremultiply(b), alpha]);
    }

    Ok(PixelBuffer::new(width, height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
                pixels.push(255); // A
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_resize_downscale() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_same_dimensions_is_exact() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50, FilterType::Lanczos3).unwrap();
        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_upscale() {
        let img = create_test_image(50, 25);
        let resized = resize(&img, 100, 50, FilterType::Lanczos3).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_inconsistent_buffer_error() {
        let img = PixelBuffer {
            width: 10,
            height: 10,
            pixels: vec![0u8; 12],
        };
        assert!(matches!(
            resize(&img, 5, 5, FilterType::Bilinear),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_resize_transparent_neighbors_do_not_darken_edges() {
        // Opaque white block next to transparent black
        let mut img = PixelBuffer::transparent(8, 8);
        for y in 0..8 {
            for x in 0..4 {
                img.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }

        for filter in [FilterType::Bilinear, FilterType::Lanczos3] {
            let resized = resize(&img, 3, 3, filter).unwrap();
            let edge = resized.pixel(1, 1);
            assert!(edge[3] > 0 && edge[3] < 255, "{:?} edge alpha {}", filter, edge[3]);
            for p in resized.pixels.chunks_exact(4).filter(|p| p[3] > 0) {
                assert!(p[0] >= 250 && p[1] >= 250 && p[2] >= 250, "{:?} darkened {:?}", filter, p);
            }
        }
    }

    #[test]
    fn test_resize_uniform_color_preserved() {
        let img = PixelBuffer::filled(40, 40, [12, 34, 56, 255]);
        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&img, 20, 20, filter).unwrap();
            assert!(
                resized.pixels.chunks_exact(4).all(|p| p == [12, 34, 56, 255]),
                "{:?} changed a flat color",
                filter
            );
        }
    }
}
