//! Criterion benchmark: one simulation tick on a built-up city.
//!
//! Run with: cargo bench -p simulation --bench full_tick_bench --features bench

use bevy::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use simulation::config::{WORLD_H, WORLD_W};
use simulation::speed::SimSpeed;
use simulation::test_harness::TestCity;
use simulation::tools::Tool;

/// A flat city covered by a road grid with zones in every block and a
/// wired coal plant. With `generated`, the same layout is drawn over
/// generated terrain and whatever does not fit is skipped.
fn create_benchmark_city(generated: bool) -> TestCity {
    let mut city = if generated {
        TestCity::generated(9)
    } else {
        TestCity::new()
    }
    .with_funds(10_000_000)
    .with_disasters(false);

    let (w, h) = (WORLD_W as i32, WORLD_H as i32);
    for y in (4..h - 4).step_by(8) {
        for x in 4..w - 4 {
            city.apply_tool(Tool::Road, x, y);
        }
    }
    for x in (4..w - 4).step_by(8) {
        for y in 4..h - 4 {
            city.apply_tool(Tool::Road, x, y);
        }
    }

    let zones = [Tool::Residential, Tool::Commercial, Tool::Industrial];
    let mut i = 0;
    for by in (4..h - 12).step_by(8) {
        for bx in (4..w - 12).step_by(8) {
            city.apply_tool(zones[i % zones.len()], bx + 3, by + 3);
            city.apply_tool(Tool::Wire, bx + 5, by + 3);
            city.apply_tool(Tool::Wire, bx + 6, by + 3);
            i += 1;
        }
    }
    city.apply_tool(Tool::CoalPower, 2, 2);

    // Let zones develop and the power scan settle before measuring.
    city.tick(2_000);
    city
}

fn bench_full_sim_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_sim_tick");
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(20);

    for generated in [false, true] {
        let mut city = create_benchmark_city(generated);
        let label = if generated { "generated" } else { "flat" };

        group.bench_with_input(BenchmarkId::new("fixed_update", label), &label, |b, _| {
            b.iter(|| {
                city.world_mut().run_schedule(FixedUpdate);
            });
        });
    }

    // One tick at the fastest speed runs several simulation steps.
    let mut city = create_benchmark_city(false).with_speed(SimSpeed::SuperFast);
    group.bench_function("fixed_update/super_fast", |b| {
        b.iter(|| {
            city.world_mut().run_schedule(FixedUpdate);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_full_sim_tick);
criterion_main!(benches);
