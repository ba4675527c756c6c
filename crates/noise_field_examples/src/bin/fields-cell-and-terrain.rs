use noise_field::prelude::*;
use noise_field_examples::render_fields_side_by_side;

/// Renders organic cell noise next to diamond-square terrain, the two
/// generators that do not sample a smooth lattice.
fn main() -> anyhow::Result<()> {
    let size = 320;
    let pool = WorkPool::new(4)?;

    let mut cells = CellNoise::with_strategies(
        40,
        5,
        Box::new(SquaredEuclidean),
        Box::new(F2MinusF1),
    )?;
    let mut cell_buffer = FieldBuffer::new(size, size);
    cells.fill_parallel(&mut cell_buffer, &pool)?;

    let mut terrain = MidpointDisplacement::with_seed(5).with_amplitude(0.6)?;
    let mut terrain_buffer = FieldBuffer::new(size, size);
    terrain.fill(&mut terrain_buffer)?;

    render_fields_side_by_side(
        &[&cell_buffer, &terrain_buffer],
        "fields-cell-and-terrain.png",
    )?;

    Ok(())
}
