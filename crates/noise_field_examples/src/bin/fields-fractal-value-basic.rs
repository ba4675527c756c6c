use noise_field::prelude::*;
use noise_field_examples::render_field_to_png;

/// Renders a single value-noise octave next to a fractal blend of octaves
/// 2..=8, showing how the blend layers detail onto the coarse signal.
fn main() -> anyhow::Result<()> {
    let size = 512;
    let pool = WorkPool::new(4)?;

    let mut single = ValueNoise::with_seed(42);
    single.set_periods(64, 64)?;
    let mut coarse = FieldBuffer::new(size, size);
    single.fill_parallel(&mut coarse, &pool)?;

    let mut fractal = FractalFilter::new(Box::new(ValueNoise::with_seed(42)), 2, 8, 0.5)?;
    let mut blended = FieldBuffer::new(size, size);
    fractal.fill_parallel(&mut blended, &pool)?;

    render_field_to_png(&coarse, "fields-value-single-octave.png")?;
    render_field_to_png(&blended, "fields-fractal-value-basic.png")?;

    Ok(())
}
