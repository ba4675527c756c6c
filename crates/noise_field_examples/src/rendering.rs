use std::path::Path;

use image::{GrayImage, Luma};
use noise_field::prelude::FieldBuffer;

/// Writes a field as an 8-bit grayscale PNG, mapping `[0, 1]` to `[0, 255]`.
///
/// Values outside `[0, 1]` are clamped; call [`FieldBuffer::normalize`]
/// first when the field carries raw distances.
pub fn render_field_to_png(buffer: &FieldBuffer, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let (width, height) = (buffer.width() as u32, buffer.height() as u32);
    let mut image = GrayImage::new(width, height);
    for x in 0..width {
        for y in 0..height {
            let v = buffer.get(x as i32, y as i32).clamp(0.0, 1.0);
            image.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    image.save(path.as_ref())?;
    Ok(())
}

/// Writes several fields of identical height into one PNG, left to right
/// with a one-pixel separator column, for quick visual comparison.
pub fn render_fields_side_by_side(
    buffers: &[&FieldBuffer],
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let Some(first) = buffers.first() else {
        anyhow::bail!("nothing to render");
    };
    let height = first.height();
    if buffers.iter().any(|b| b.height() != height) {
        anyhow::bail!("all fields must share a height");
    }

    let total_width: usize =
        buffers.iter().map(|b| b.width()).sum::<usize>() + buffers.len() - 1;
    let mut image = GrayImage::new(total_width as u32, height as u32);

    let mut offset = 0u32;
    for buffer in buffers {
        for x in 0..buffer.width() as u32 {
            for y in 0..height as u32 {
                let v = buffer.get(x as i32, y as i32).clamp(0.0, 1.0);
                image.put_pixel(offset + x, y, Luma([(v * 255.0).round() as u8]));
            }
        }
        offset += buffer.width() as u32 + 1;
    }
    image.save(path.as_ref())?;
    Ok(())
}
