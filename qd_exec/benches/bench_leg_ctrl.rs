//! # Leg Control Benchmark

use comms_if::eqpt::leg::Legs;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;
use qd_lib::leg_ctrl::Robot;

fn leg_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build the robot ----

    let root_offsets_m_rb = Legs {
        front_right: Vector3::new(0.08, 0.12, 0.0),
        front_left: Vector3::new(-0.08, 0.12, 0.0),
        back_right: Vector3::new(0.08, -0.12, 0.0),
        back_left: Vector3::new(-0.08, -0.12, 0.0),
    };

    let mut robot = Robot::new(0.05, 0.1, 0.1, &root_offsets_m_rb).unwrap();

    let targets_m_rb = root_offsets_m_rb.map(|_, r| r + Vector3::new(0.0, 0.15, -0.1));

    // Bench a full solve of all four legs
    c.bench_function("Robot::update", |b| {
        b.iter(|| {
            robot.set_ik_targets(black_box(&targets_m_rb));
            robot.update();
            black_box(robot.angles())
        })
    });
}

criterion_group!(benches, leg_ctrl_benchmark);
criterion_main!(benches);
