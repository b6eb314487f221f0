//! Image preprocessing ahead of OCR.

use image::{DynamicImage, GrayImage};

/// 3x3 sharpening kernel; `filter3x3` normalizes by the kernel sum (16).
const SHARPEN_KERNEL: [f32; 9] = [
    -2.0, -2.0, -2.0, //
    -2.0, 32.0, -2.0, //
    -2.0, -2.0, -2.0,
];

/// Convert to single-channel grayscale and sharpen.
///
/// Handwriting and low-contrast scans recognize noticeably better after this.
/// The output has the same dimensions as the input; alpha is dropped.
/// Border pixels pass through unsharpened.
pub fn preprocess_image(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let mut sharpened = DynamicImage::ImageLuma8(gray.clone())
        .filter3x3(&SHARPEN_KERNEL)
        .to_luma8();
    copy_border(&gray, &mut sharpened);
    DynamicImage::ImageLuma8(sharpened)
}

/// `filter3x3` leaves the outermost ring at zero; restore it from `src`.
fn copy_border(src: &GrayImage, dst: &mut GrayImage) {
    let (width, height) = src.dimensions();
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                dst.put_pixel(x, y, *src.get_pixel(x, y));
            }
        }
    }
}
