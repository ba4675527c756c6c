use noise_field::prelude::*;
use noise_field_examples::render_fields_side_by_side;

/// Warps a gradient-noise signal by a fractal value-noise field, comparing
/// the undistorted signal against increasing warp amplitudes.
fn main() -> anyhow::Result<()> {
    let size = 360;
    let pool = WorkPool::new(4)?;

    let mut plain = GradientNoise::with_seed(24, 7)?;
    let mut reference = FieldBuffer::new(size, size);
    plain.fill_parallel(&mut reference, &pool)?;

    let mut panels = vec![reference];
    for amplitude in [8.0, 24.0, 64.0] {
        let base = GradientNoise::with_seed(24, 7)?;
        let warp = FractalFilter::new(Box::new(ValueNoise::with_seed(99)), 3, 7, 0.5)?;
        let mut filter = DistortionFilter::new(
            Box::new(base),
            Box::new(warp),
            amplitude,
            Box::new(OffsetBoth),
        )?;
        let mut buffer = FieldBuffer::new(size, size);
        filter.fill_parallel(&mut buffer, &pool)?;
        panels.push(buffer);
    }

    let views: Vec<&FieldBuffer> = panels.iter().collect();
    render_fields_side_by_side(&views, "fields-warped-gradient.png")?;

    Ok(())
}
