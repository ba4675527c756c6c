use glam::Vec2;
use noise_field::prelude::*;
use noise_field_examples::render_fields_side_by_side;

/// Fills distance fields over a point, a circle and a segment with two
/// combine strategies: plain nearest distance and the F2 - F1 crease field
/// that highlights borders between the shapes' regions.
fn main() -> anyhow::Result<()> {
    let size = 400;
    let pool = WorkPool::new(4)?;

    let shapes = || -> anyhow::Result<Vec<Box<dyn VoronoiShape>>> {
        Ok(vec![
            Box::new(PointSite::new(Vec2::new(90.0, 110.0))),
            Box::new(Circle::new(Vec2::new(280.0, 140.0), 50.0)?),
            Box::new(Segment::new(Vec2::new(60.0, 320.0), Vec2::new(340.0, 280.0))?),
        ])
    };

    let mut nearest = DistanceField::new(shapes()?)?;
    let mut nearest_buffer = FieldBuffer::new(size, size);
    nearest.fill_parallel(&mut nearest_buffer, &pool)?;
    nearest_buffer.normalize();

    let mut creases = DistanceField::with_strategies(
        shapes()?,
        Box::new(SquaredEuclidean),
        Box::new(F2MinusF1),
    )?;
    let mut crease_buffer = FieldBuffer::new(size, size);
    creases.fill_parallel(&mut crease_buffer, &pool)?;
    crease_buffer.normalize();

    render_fields_side_by_side(
        &[&nearest_buffer, &crease_buffer],
        "fields-distance-shapes.png",
    )?;

    Ok(())
}
