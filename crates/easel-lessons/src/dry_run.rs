use anyhow::{Context, Result};
use rand::rngs::StdRng;

use easel_engine::gpu::headless::{GpuCall, HeadlessCanvas, HeadlessGpu};
use easel_engine::interaction::{Axis, InteractionBridge};
use easel_engine::lesson::{Lesson, LessonOptions};

/// Builds `lesson` on a recording backend, renders it once and, for the
/// translation lesson, replays two slider moves. Every GPU call is logged.
pub fn run(lesson: Lesson, options: &LessonOptions, mut rng: StdRng, canvas: (f64, f64, f64)) -> Result<()> {
    let (width, height, density) = canvas;
    let mut gpu = HeadlessGpu::new(HeadlessCanvas::new(width, height, density));

    let (mut scene, mut state) = lesson
        .build(&mut gpu, options, &mut rng)
        .with_context(|| format!("failed to build lesson {lesson}"))?;
    report("setup", &mut gpu);

    scene.render(&mut gpu, &state);
    report("first frame", &mut gpu);

    if scene.config().drives_translation {
        let mut bridge = InteractionBridge::new(&mut gpu, &mut scene, &mut state);
        bridge.on_axis_change(Axis::X, 120.0);
        bridge.on_axis_change(Axis::Y, 60.0);
        report("after moving to (120, 60)", &mut gpu);
    }

    Ok(())
}

fn report(stage: &str, gpu: &mut HeadlessGpu) {
    let draw = gpu.last_draw();
    let calls: Vec<GpuCall> = gpu.take_calls();

    log::info!("{stage}: {} GPU calls", calls.len());
    for call in &calls {
        log::info!("  {call:?}");
    }
    if let Some((primitive, first, count)) = draw {
        log::info!("{stage}: drew {count} vertices from {first} as {primitive:?}");
    }
}
