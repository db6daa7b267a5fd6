use anyhow::Context;
use rand::rngs::StdRng;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use easel_engine::core::{App, AppControl, FrameCtx};
use easel_engine::gpu::GpuApi;
use easel_engine::interaction::{Axis, InteractionBridge, axis_range};
use easel_engine::lesson::{Lesson, LessonOptions};
use easel_engine::scene::{RenderState, Scene};
use easel_engine::window::CursorIcon;

/// Arrow-key step in backing pixels; held shift multiplies it by ten.
const KEY_STEP: f32 = 1.0;

/// One lesson hosted in a window.
///
/// Dragging with the left button or pressing the arrow keys moves the
/// translation lesson's shape; the other lessons only redraw on exposure.
pub struct LessonApp {
    lesson: Lesson,
    options: LessonOptions,
    rng: StdRng,

    scene: Option<(Scene, RenderState)>,
    dragging: bool,
    shift: bool,
}

impl LessonApp {
    pub fn new(lesson: Lesson, options: LessonOptions, rng: StdRng) -> Self {
        Self {
            lesson,
            options,
            rng,
            scene: None,
            dragging: false,
            shift: false,
        }
    }

    /// Moves the shape along `axis`, clamped to the canvas, and redraws.
    fn set_axis(ctx: &mut FrameCtx<'_, '_>, scene: &mut Scene, state: &mut RenderState, axis: Axis, value: f32) {
        let (min, max) = axis_range(ctx.gpu.canvas(), axis);
        let value = value.clamp(min, max);
        let current = match axis {
            Axis::X => state.translation.x,
            Axis::Y => state.translation.y,
        };
        if value != current {
            InteractionBridge::new(&mut *ctx.gpu, scene, state).on_axis_change(axis, value);
        }
    }

    fn key_step(&self, code: KeyCode) -> Option<(Axis, f32)> {
        let step = if self.shift { KEY_STEP * 10.0 } else { KEY_STEP };
        match code {
            KeyCode::ArrowLeft => Some((Axis::X, -step)),
            KeyCode::ArrowRight => Some((Axis::X, step)),
            KeyCode::ArrowUp => Some((Axis::Y, -step)),
            KeyCode::ArrowDown => Some((Axis::Y, step)),
            _ => None,
        }
    }
}

impl App for LessonApp {
    fn init(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()> {
        let built = self
            .lesson
            .build(&mut *ctx.gpu, &self.options, &mut self.rng)
            .with_context(|| format!("failed to build lesson {}", self.lesson))?;

        log::info!(
            "lesson {} ready; backend {:?}, surface {:?}",
            self.lesson,
            ctx.gpu.adapter_info().backend,
            ctx.gpu.surface_format()
        );
        self.scene = Some(built);
        Ok(())
    }

    fn on_window_event(&mut self, ctx: &mut FrameCtx<'_, '_>, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::ModifiersChanged(m) => self.shift = m.state().shift_key(),

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return AppControl::Continue;
                };
                if code == KeyCode::Escape {
                    return AppControl::Exit;
                }

                let step = self.key_step(code);
                if let (Some((axis, delta)), Some((scene, state))) = (step, self.scene.as_mut()) {
                    if scene.config().drives_translation {
                        let current = match axis {
                            Axis::X => state.translation.x,
                            Axis::Y => state.translation.y,
                        };
                        Self::set_axis(ctx, scene, state, axis, current + delta);
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *button_state == ElementState::Pressed;
                let cursor = if self.dragging { CursorIcon::Grabbing } else { CursorIcon::Default };
                ctx.window.set_cursor(cursor);
            }

            WindowEvent::CursorMoved { position, .. } if self.dragging => {
                let p = ctx.window.cursor_to_backing(*position);
                if let Some((scene, state)) = self.scene.as_mut() {
                    if scene.config().drives_translation {
                        Self::set_axis(ctx, scene, state, Axis::X, p.x);
                        Self::set_axis(ctx, scene, state, Axis::Y, p.y);
                    }
                }
            }

            _ => {}
        }

        AppControl::Continue
    }

    fn on_redraw(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some((scene, state)) = self.scene.as_mut() {
            scene.render(&mut *ctx.gpu, state);
        }
        AppControl::Continue
    }
}
