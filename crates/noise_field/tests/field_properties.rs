//! Cross-module properties of composed fields: determinism, tiling,
//! fractal range preservation, and distance-field behavior.
use glam::Vec2;
use noise_field::prelude::*;

fn approx_eq(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-3, "{a} != {b}");
}

fn fractal_over_value_noise() -> FractalFilter {
    FractalFilter::new(Box::new(ValueNoise::new()), 1, 6, 0.5).unwrap()
}

#[test]
fn fills_are_deterministic_across_thread_counts() {
    let mut reference = FieldBuffer::new(64, 48);
    fractal_over_value_noise().fill(&mut reference).unwrap();

    for threads in [1, 2, 8] {
        let pool = WorkPool::new(threads).unwrap();
        let mut buffer = FieldBuffer::new(64, 48);
        fractal_over_value_noise()
            .fill_parallel(&mut buffer, &pool)
            .unwrap();
        assert_eq!(buffer, reference, "thread count {threads} diverged");
    }

    // Repeated runs with the same pool are also byte-identical.
    let pool = WorkPool::new(4).unwrap();
    let mut first = FieldBuffer::new(64, 48);
    let mut second = FieldBuffer::new(64, 48);
    fractal_over_value_noise()
        .fill_parallel(&mut first, &pool)
        .unwrap();
    fractal_over_value_noise()
        .fill_parallel(&mut second, &pool)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn periodic_generators_tile_exactly() {
    let mut value = ValueNoise::with_seed(11);
    value.set_periods(8, 4).unwrap();
    let mut gradient = GradientNoise::with_seed(4, 11).unwrap();
    gradient.set_periods(16, 8).unwrap();

    for k in 1..4 {
        for x in 0..8 {
            for y in 0..4 {
                assert_eq!(value.value_at(x, y), value.value_at(x + 8 * k, y));
                assert_eq!(value.value_at(x, y), value.value_at(x, y + 4 * k));
            }
        }
        for x in 0..16 {
            for y in 0..8 {
                assert_eq!(gradient.value_at(x, y), gradient.value_at(x + 16 * k, y));
                assert_eq!(gradient.value_at(x, y), gradient.value_at(x, y + 8 * k));
            }
        }
    }
}

#[test]
fn fractal_blend_preserves_input_range() {
    for persistence in [0.25, 0.5, 1.0] {
        for (min_octave, max_octave) in [(1, 1), (1, 4), (3, 8)] {
            let mut filter = FractalFilter::new(
                Box::new(ValueNoise::new()),
                min_octave,
                max_octave,
                persistence,
            )
            .unwrap();
            let mut buffer = FieldBuffer::new(48, 48);
            filter.fill(&mut buffer).unwrap();
            assert!(
                buffer.data().iter().all(|v| (0.0..=1.0).contains(v)),
                "range drift at persistence {persistence}, octaves {min_octave}..={max_octave}"
            );
        }
    }
}

#[test]
fn nearest_combine_always_reports_the_closer_shape() {
    let a = PointSite::new(Vec2::new(6.0, 10.0));
    let b = PointSite::new(Vec2::new(26.0, 10.0));
    let mut field = DistanceField::new(vec![Box::new(a), Box::new(b)]).unwrap();
    let mut buffer = FieldBuffer::new(32, 20);
    field.fill(&mut buffer).unwrap();

    for x in 0..32i32 {
        for y in 0..20i32 {
            let p = Vec2::new(x as f32, y as f32);
            let da = (p - Vec2::new(6.0, 10.0)).length();
            let db = (p - Vec2::new(26.0, 10.0)).length();
            approx_eq(buffer.get(x, y), da.min(db));
        }
    }
}

#[test]
fn unbounded_field_saturates_every_pixel() {
    let circle = Circle::new(Vec2::new(10.0, 10.0), 5.0).unwrap();
    let mut field = DistanceField::with_strategies(
        vec![
            Box::new(circle),
            Box::new(PointSite::new(Vec2::new(40.0, 40.0))),
        ],
        Box::new(SquaredEuclidean),
        Box::new(SecondNearest),
    )
    .unwrap();
    let mut buffer = FieldBuffer::new(48, 48);
    field.fill(&mut buffer).unwrap();
    // k = 2 and two shapes with in-bounds seeds: no sentinel leakage.
    assert!(buffer.data().iter().all(|v| v.is_finite()));
}

#[test]
fn cutoff_value_is_observable_and_finite() {
    let cutoff = 6.0;
    let mut field = DistanceField::new(vec![Box::new(PointSite::new(Vec2::new(2.0, 2.0)))])
        .unwrap()
        .with_max_distance(cutoff)
        .unwrap();
    let mut buffer = FieldBuffer::new(40, 40);
    field.fill(&mut buffer).unwrap();

    for x in 0..40i32 {
        for y in 0..40i32 {
            let d = Vec2::new(x as f32 - 2.0, y as f32 - 2.0).length();
            let v = buffer.get(x, y);
            if d > cutoff {
                assert_eq!(v, cutoff, "pixel ({x}, {y}) must carry the sentinel");
            } else {
                approx_eq(v, d);
            }
        }
    }
}

#[test]
fn circle_scenario_from_the_contract() {
    let circle = Circle::new(Vec2::new(10.0, 10.0), 5.0).unwrap();
    let mut field = DistanceField::new(vec![Box::new(circle)]).unwrap();
    let mut buffer = FieldBuffer::new(32, 32);
    field.fill(&mut buffer).unwrap();
    approx_eq(buffer.get(10, 10), 0.0);
    approx_eq(buffer.get(10, 20), 5.0);
}

#[test]
fn tied_distances_are_stable_across_thread_counts() {
    let make = || {
        DistanceField::with_strategies(
            vec![
                Box::new(PointSite::new(Vec2::new(8.0, 12.0))) as Box<dyn VoronoiShape>,
                Box::new(PointSite::new(Vec2::new(16.0, 12.0))),
            ],
            Box::new(SquaredEuclidean),
            Box::new(F2MinusF1),
        )
        .unwrap()
    };

    let mut reference = FieldBuffer::new(24, 24);
    make().fill(&mut reference).unwrap();
    for threads in [1, 3, 8] {
        let pool = WorkPool::new(threads).unwrap();
        let mut buffer = FieldBuffer::new(24, 24);
        make().fill_parallel(&mut buffer, &pool).unwrap();
        assert_eq!(buffer, reference);
    }
    // Column x = 12 is exactly equidistant; F2 - F1 vanishes there.
    for y in 0..24 {
        approx_eq(reference.get(12, y), 0.0);
    }
}

#[test]
fn composed_pipeline_is_deterministic() {
    let make = || {
        let base = FractalFilter::new(Box::new(ValueNoise::new()), 2, 5, 0.5).unwrap();
        let warp = ValueNoise::with_seed(3);
        DistortionFilter::new(Box::new(base), Box::new(warp), 3.0, Box::new(OffsetBoth))
            .unwrap()
    };
    let pool = WorkPool::new(4).unwrap();
    let mut serial = FieldBuffer::new(40, 40);
    let mut parallel = FieldBuffer::new(40, 40);
    make().fill(&mut serial).unwrap();
    make().fill_parallel(&mut parallel, &pool).unwrap();
    assert_eq!(serial, parallel);
}
