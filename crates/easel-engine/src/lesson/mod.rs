//! The three instructional scenes: flat color, per-vertex color and
//! uniform-driven translation.
//!
//! They share one [`Scene`] implementation and differ only in shader pair,
//! geometry, clear color and which uniforms are driven.

mod shapes;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

use crate::coords::ColorRgba;
use crate::error::SetupError;
use crate::geometry::GeometryBuffer;
use crate::gpu::{GpuApi, Primitive};
use crate::layout::{AttributeSlot, VertexLayout};
use crate::program::ProgramBuilder;
use crate::scene::{RenderState, Scene, SceneConfig};
use crate::shader::ShaderStage;

pub use shapes::{letter_f, rectangle};

const POSITION_VS: &str = include_str!("shaders/position.vert.wgsl");
const COLOR_VS: &str = include_str!("shaders/color.vert.wgsl");
const TRANSLATE_VS: &str = include_str!("shaders/translate.vert.wgsl");
const UNIFORM_FS: &str = include_str!("shaders/uniform.frag.wgsl");
const VARYING_FS: &str = include_str!("shaders/varying.frag.wgsl");

const A_POSITION: &str = "a_position";
const A_COLOR: &str = "a_color";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Lesson {
    /// One rectangle in a random uniform color.
    #[default]
    FlatColor,
    /// One rectangle whose two triangles get a random color each.
    VertexColor,
    /// The letter F, moved by the translation uniform.
    Translation,
}

impl Lesson {
    pub const ALL: [Lesson; 3] = [Lesson::FlatColor, Lesson::VertexColor, Lesson::Translation];

    pub fn name(self) -> &'static str {
        match self {
            Lesson::FlatColor => "flat-color",
            Lesson::VertexColor => "vertex-color",
            Lesson::Translation => "translation",
        }
    }

    pub fn vertex_stage(self) -> ShaderStage {
        ShaderStage::vertex(match self {
            Lesson::FlatColor => POSITION_VS,
            Lesson::VertexColor => COLOR_VS,
            Lesson::Translation => TRANSLATE_VS,
        })
    }

    pub fn fragment_stage(self) -> ShaderStage {
        ShaderStage::fragment(match self {
            Lesson::FlatColor | Lesson::Translation => UNIFORM_FS,
            Lesson::VertexColor => VARYING_FS,
        })
    }

    /// Pixel-space triangle list.
    pub fn positions(self) -> Vec<f32> {
        match self {
            Lesson::FlatColor | Lesson::VertexColor => rectangle().to_vec(),
            Lesson::Translation => letter_f().to_vec(),
        }
    }

    pub fn scene_config(self) -> SceneConfig {
        match self {
            Lesson::FlatColor => SceneConfig::default(),
            Lesson::VertexColor => SceneConfig {
                drives_color: false,
                ..SceneConfig::default()
            },
            Lesson::Translation => SceneConfig {
                clear_color: ColorRgba::white(),
                primitive: Primitive::Triangles,
                drives_color: true,
                drives_translation: true,
            },
        }
    }

    /// Compiles, uploads and binds everything the lesson draws.
    ///
    /// Nothing is drawn here; the caller renders the returned scene with the
    /// returned initial state.
    pub fn build<G: GpuApi, R: Rng>(
        self,
        gpu: &mut G,
        options: &LessonOptions,
        rng: &mut R,
    ) -> Result<(Scene, RenderState), SetupError> {
        log::info!("building lesson {self}");

        let program = ProgramBuilder::new(self.name()).build(gpu, &self.vertex_stage(), &self.fragment_stage())?;
        let positions = GeometryBuffer::with_data(gpu, 2, &self.positions());
        let position_slot = AttributeSlot::float32(A_POSITION, 2);

        let (layout, colors) = match self {
            Lesson::VertexColor => {
                let first = ColorRgba::random_opaque(rng);
                let second = ColorRgba::random_opaque(rng);
                let (slot, buffer) = options.color_encoding.upload(gpu, &two_tone(first, second));
                let layout = VertexLayout::new(position_slot, &positions)
                    .attribute(slot, &buffer)
                    .bind(gpu, &program)?;
                (layout, Some(buffer))
            }
            Lesson::FlatColor | Lesson::Translation => {
                let layout = VertexLayout::new(position_slot, &positions).bind(gpu, &program)?;
                (layout, None)
            }
        };

        let mut scene = Scene::new(gpu, self.scene_config(), program, positions, layout)?;
        if let Some(colors) = colors {
            scene = scene.with_buffer(colors);
        }

        let state = RenderState::with_random_color(rng);
        Ok((scene, state))
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} `{got}`, expected one of: {expected}")]
pub struct ParseNameError {
    what: &'static str,
    got: String,
    expected: &'static str,
}

impl FromStr for Lesson {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat-color" | "1" => Ok(Lesson::FlatColor),
            "vertex-color" | "2" => Ok(Lesson::VertexColor),
            "translation" | "3" => Ok(Lesson::Translation),
            _ => Err(ParseNameError {
                what: "lesson",
                got: s.to_string(),
                expected: "flat-color, vertex-color, translation",
            }),
        }
    }
}

/// How per-vertex colors are stored in their buffer.
///
/// Colors are always produced as `f32` in `[0, 1]`; `Unorm8` only changes
/// the upload to one byte per channel, decoded back by the vertex fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ColorEncoding {
    #[default]
    Float,
    Unorm8,
}

impl ColorEncoding {
    fn upload<G: GpuApi>(self, gpu: &mut G, colors: &[ColorRgba]) -> (AttributeSlot, GeometryBuffer) {
        match self {
            ColorEncoding::Float => {
                let data: Vec<f32> = colors.iter().flat_map(|c| c.to_array()).collect();
                (AttributeSlot::float32(A_COLOR, 4), GeometryBuffer::with_data(gpu, 4, &data))
            }
            ColorEncoding::Unorm8 => {
                let data: Vec<u8> = colors.iter().flat_map(|c| c.to_unorm8()).collect();
                (AttributeSlot::unorm8(A_COLOR, 4), GeometryBuffer::with_data(gpu, 4, &data))
            }
        }
    }
}

impl FromStr for ColorEncoding {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(ColorEncoding::Float),
            "unorm8" => Ok(ColorEncoding::Unorm8),
            _ => Err(ParseNameError {
                what: "color encoding",
                got: s.to_string(),
                expected: "float, unorm8",
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct LessonOptions {
    pub color_encoding: ColorEncoding,
}

/// Three vertices of `first` followed by three of `second`.
fn two_tone(first: ColorRgba, second: ColorRgba) -> [ColorRgba; 6] {
    [first, first, first, second, second, second]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::gpu::headless::{GpuCall, HeadlessCanvas, HeadlessGpu};
    use crate::gpu::{NumericType, UniformKind};

    fn gpu() -> HeadlessGpu {
        HeadlessGpu::new(HeadlessCanvas::new(300.0, 150.0, 1.0))
    }

    #[test]
    fn every_lesson_builds_and_draws() {
        let mut rng = StdRng::seed_from_u64(7);
        let expected = [(Lesson::FlatColor, 6), (Lesson::VertexColor, 6), (Lesson::Translation, 18)];

        for (lesson, count) in expected {
            let mut gpu = gpu();
            let (mut scene, state) = lesson.build(&mut gpu, &LessonOptions::default(), &mut rng).unwrap();

            scene.render(&mut gpu, &state);
            assert_eq!(gpu.last_draw(), Some((Primitive::Triangles, 0, count)), "{lesson}");
        }
    }

    #[test]
    fn vertex_color_binds_color_attribute() {
        let mut rng = StdRng::seed_from_u64(1);
        for encoding in [ColorEncoding::Float, ColorEncoding::Unorm8] {
            let mut gpu = gpu();
            let options = LessonOptions { color_encoding: encoding };
            let (scene, _) = Lesson::VertexColor.build(&mut gpu, &options, &mut rng).unwrap();

            let color = &scene.layout().bound()[1];
            assert_eq!(color.name, A_COLOR);

            let pointer = gpu.calls().iter().find_map(|c| match c {
                GpuCall::VertexAttribPointer { location, pointer, .. } if *location == color.location => Some(*pointer),
                _ => None,
            });
            let pointer = pointer.unwrap();
            match encoding {
                ColorEncoding::Float => assert_eq!(pointer.numeric_type, NumericType::Float32),
                ColorEncoding::Unorm8 => {
                    assert_eq!(pointer.numeric_type, NumericType::Uint8);
                    assert!(pointer.normalize);
                }
            }
        }
    }

    #[test]
    fn vertex_color_does_not_push_uniform_color() {
        let mut gpu = gpu();
        let mut rng = StdRng::seed_from_u64(3);
        let (mut scene, state) = Lesson::VertexColor
            .build(&mut gpu, &LessonOptions::default(), &mut rng)
            .unwrap();
        scene.render(&mut gpu, &state);

        assert!(!gpu.calls().iter().any(|c| matches!(c, GpuCall::Uniform4f { .. })));
    }

    #[test]
    fn translation_lesson_clears_to_white_and_drives_translation() {
        let mut gpu = gpu();
        let mut rng = StdRng::seed_from_u64(5);
        let (mut scene, state) = Lesson::Translation
            .build(&mut gpu, &LessonOptions::default(), &mut rng)
            .unwrap();
        scene.render(&mut gpu, &state);

        assert!(gpu.calls().contains(&GpuCall::ClearColor { color: ColorRgba::white() }));
        let translation = gpu.uniform_location(scene.program().id(), "u_translation").unwrap();
        assert_eq!(translation.kind, UniformKind::Vec2);
        assert_eq!(gpu.uniform_value(translation), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn names_parse_back() {
        for lesson in Lesson::ALL {
            assert_eq!(lesson.name().parse::<Lesson>(), Ok(lesson));
        }
        assert_eq!("2".parse::<Lesson>(), Ok(Lesson::VertexColor));
        assert!("lesson4".parse::<Lesson>().is_err());
        assert_eq!("unorm8".parse::<ColorEncoding>(), Ok(ColorEncoding::Unorm8));
    }
}
