use std::collections::HashMap;
use std::rc::Rc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::canvas::CanvasSurface;
use crate::coords::ColorRgba;
use crate::error::SetupError;
use crate::gpu::{
    AttribPointer, BufferId, BufferUsage, ClearMask, GpuApi, ObjectTable, Primitive, ProgramId,
    ScalarClass, ShaderId, ShaderKind, UniformLocation, VertexArrayId,
};

use super::frame::{self, Frame, Viewport};
use super::pipeline::{LinkedProgram, VertexBufferPlan, plan_vertex_buffers};
use super::{GpuInit, SurfaceErrorAction, WindowCanvas, surface};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramId,
    vao: VertexArrayId,
    primitive: Primitive,
    format: wgpu::TextureFormat,
}

struct CachedPipeline {
    pipeline: wgpu::RenderPipeline,
    plans: Vec<VertexBufferPlan>,
}

/// [`GpuApi`] over a wgpu device presenting into a window.
///
/// Stage compilation and linking share the naga-based reflection of the
/// headless backend; on success the stages become shader modules and the
/// program gets one uniform buffer per declared uniform. Pipelines are built
/// on first draw for each (program, vertex array, primitive, format) and
/// dropped when the vertex array's pointers change.
///
/// Every draw is encoded and submitted on its own, so uniform writes made
/// between draws are seen by the right one.
pub struct WgpuGpu<'w> {
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    canvas: WindowCanvas<'w>,

    objects: ObjectTable,
    modules: HashMap<ShaderId, Rc<wgpu::ShaderModule>>,
    linked: HashMap<ProgramId, LinkedProgram>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    pipelines: HashMap<PipelineKey, CachedPipeline>,

    current_program: Option<ProgramId>,
    current_vao: Option<VertexArrayId>,
    viewport: Option<Viewport>,
    clear_color: ColorRgba,
    pending_clear: Option<wgpu::Color>,
    frame: Option<Frame>,
    lost: bool,
}

impl<'w> WgpuGpu<'w> {
    /// Creates a device presenting into `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. Anything that
    /// prevents presenting into the window is a
    /// [`SetupError::MissingCapability`].
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, SetupError> {
        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SetupError::MissingCapability(format!("cannot create a surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::MissingCapability(format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("easel-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SetupError::MissingCapability(format!("cannot open the GPU device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .ok_or_else(|| SetupError::MissingCapability("surface supports no texture format".into()))?;

        let canvas = WindowCanvas::new(window);
        let (width, height) = canvas.backing_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        log::info!("GPU: {} ({:?}), surface format {format:?}", info.name, info.backend);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            canvas,
            objects: ObjectTable::default(),
            modules: HashMap::new(),
            linked: HashMap::new(),
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            current_program: None,
            current_vao: None,
            viewport: None,
            clear_color: ColorRgba::transparent(),
            pending_clear: None,
            frame: None,
            lost: false,
        })
    }

    /// Name, backend and driver of the adapter in use.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Format the surface is configured with.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// The window this device presents into.
    pub fn window(&self) -> &'w Window {
        self.canvas.window()
    }

    /// `true` once frame acquisition failed fatally; nothing will be drawn again.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Makes sure a swapchain image is held, applying a pending resize first.
    ///
    /// Returns `false` when this frame cannot be drawn (zero-sized canvas or
    /// surface error).
    fn acquire_frame(&mut self) -> bool {
        if self.frame.is_some() {
            return true;
        }
        if self.lost {
            return false;
        }

        if self.canvas.resize_pending() {
            let (width, height) = self.canvas.backing_size();
            if !surface::apply_resize(&self.surface, &self.device, &mut self.config, width, height) {
                return false;
            }
            self.canvas.resize_applied();
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                self.frame = Some(Frame::new(surface_texture));
                true
            }
            Err(err) => {
                match surface::map_surface_error(&self.surface, &self.device, &self.config, err.clone()) {
                    SurfaceErrorAction::Reconfigured => log::debug!("surface reconfigured after {err:?}"),
                    SurfaceErrorAction::SkipFrame => log::warn!("frame skipped: {err}"),
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost for good: {err}");
                        self.lost = true;
                    }
                }
                false
            }
        }
    }

    fn build_pipeline(&self, key: PipelineKey) -> Result<CachedPipeline, String> {
        let program = self.linked.get(&key.program).ok_or("program is not linked")?;
        let vao = self
            .objects
            .vertex_array(key.vao)
            .ok_or("vertex array does not exist")?;

        program.check_inputs(vao.active_attributes())?;
        let plans = plan_vertex_buffers(vao.active_attributes())?;

        log::debug!("building pipeline for {key:?}");
        let pipeline = program.build_pipeline(&self.device, &plans, key.primitive, key.format);
        Ok(CachedPipeline { pipeline, plans })
    }

    fn forget_pipelines(&mut self, keep: impl Fn(&PipelineKey) -> bool) {
        self.pipelines.retain(|key, _| keep(key));
    }

    fn target_viewport(&self) -> Option<[f32; 4]> {
        let (width, height) = (self.config.width, self.config.height);
        self.viewport
            .unwrap_or(Viewport::full(width, height))
            .to_target(width, height)
    }

    fn encode_draw(&mut self, key: PipelineKey, first: u32, count: u32) {
        let Some([x, y, w, h]) = self.target_viewport() else {
            log::trace!("draw skipped: empty viewport");
            return;
        };

        let (Some(frame), Some(cached), Some(program)) = (
            self.frame.as_ref(),
            self.pipelines.get(&key),
            self.linked.get(&key.program),
        ) else {
            return;
        };

        let mut slots = Vec::with_capacity(cached.plans.len());
        for plan in &cached.plans {
            let (Some(buffer), Some(len)) = (self.buffers.get(&plan.buffer), self.objects.buffer_len(plan.buffer)) else {
                log::error!("draw skipped: {:?} has no data", plan.buffer);
                return;
            };
            let capacity = plan.vertex_capacity(len as u64);
            if u64::from(first) + u64::from(count) > capacity {
                log::error!(
                    "draw skipped: {count} vertices from {first} exceed the {capacity} held by {:?}",
                    plan.buffer
                );
                return;
            }
            slots.push(buffer.slice(plan.base_offset..));
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("easel draw encoder"),
        });
        {
            let mut pass = frame.begin_pass(&mut encoder, self.pending_clear.take());
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_pipeline(&cached.pipeline);
            if let Some(bind_group) = program.bind_group() {
                pass.set_bind_group(0, bind_group, &[]);
            }
            for (slot, range) in slots.into_iter().enumerate() {
                pass.set_vertex_buffer(slot as u32, range);
            }
            pass.draw(first..first + count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn encode_clear(&mut self) {
        let (Some(frame), Some(color)) = (self.frame.as_ref(), self.pending_clear.take()) else {
            return;
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("easel clear encoder"),
        });
        drop(frame.begin_pass(&mut encoder, Some(color)));
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl<'w> GpuApi for WgpuGpu<'w> {
    type Canvas = WindowCanvas<'w>;

    fn canvas(&self) -> &WindowCanvas<'w> {
        &self.canvas
    }

    fn canvas_mut(&mut self) -> &mut WindowCanvas<'w> {
        &mut self.canvas
    }

    fn create_shader(&mut self, kind: ShaderKind) -> ShaderId {
        self.objects.create_shader(kind)
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) {
        self.modules.remove(&shader);
        if !self.objects.compile_shader(shader, source) {
            return;
        }

        let label = format!("easel shader {}", shader.raw());
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.insert(shader, Rc::new(module));
    }

    fn shader_compiled(&self, shader: ShaderId) -> bool {
        self.objects.shader_compiled(shader)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.objects.shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.objects.delete_shader(shader);
        self.modules.remove(&shader);
    }

    fn create_program(&mut self) -> ProgramId {
        self.objects.create_program()
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        self.objects.attach_shader(program, shader);
    }

    fn link_program(&mut self, program: ProgramId) {
        self.linked.remove(&program);
        self.forget_pipelines(|k| k.program != program);

        if !self.objects.link_program(program) {
            return;
        }

        let stages = self.objects.linked_stages(program).and_then(|(vs, fs)| {
            Some((self.modules.get(&vs)?.clone(), self.modules.get(&fs)?.clone()))
        });
        let (Some((vertex, fragment)), Some(reflection)) = (stages, self.objects.linked(program)) else {
            log::error!("{program:?} linked without compiled shader modules");
            return;
        };

        let linked = LinkedProgram::new(&self.device, vertex, fragment, reflection);
        self.linked.insert(program, linked);
    }

    fn program_linked(&self, program: ProgramId) -> bool {
        self.linked.contains_key(&program)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.objects.program_info_log(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.objects.delete_program(program);
        self.linked.remove(&program);
        self.forget_pipelines(|k| k.program != program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.objects.attrib_location(program, name)
    }

    fn attrib_scalar(&self, program: ProgramId, name: &str) -> Option<ScalarClass> {
        self.objects.attrib_scalar(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.objects.uniform_location(program, name)
    }

    fn uniform_declared(&self, program: ProgramId, name: &str) -> bool {
        self.objects.uniform_declared(program, name)
    }

    fn uniform2f(&mut self, location: UniformLocation, value: [f32; 2]) {
        if let Some(program) = self.linked.get(&location.program) {
            program.write_uniform(&self.queue, location.index, bytemuck::cast_slice(&value));
        }
    }

    fn uniform4f(&mut self, location: UniformLocation, value: [f32; 4]) {
        if let Some(program) = self.linked.get(&location.program) {
            program.write_uniform(&self.queue, location.index, bytemuck::cast_slice(&value));
        }
    }

    fn create_buffer(&mut self) -> BufferId {
        self.objects.create_buffer()
    }

    fn buffer_data(&mut self, buffer: BufferId, bytes: &[u8], usage: BufferUsage) {
        if !self.objects.set_buffer_len(buffer, bytes.len()) {
            return;
        }
        if bytes.is_empty() {
            self.buffers.remove(&buffer);
            return;
        }

        let usage = match usage {
            BufferUsage::Static => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        };
        let label = format!("easel vertex buffer {}", buffer.raw());
        let gpu_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label.as_str()),
            contents: bytes,
            usage,
        });
        self.buffers.insert(buffer, gpu_buffer);
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        self.objects.create_vertex_array()
    }

    fn bind_vertex_array(&mut self, vao: VertexArrayId) {
        self.current_vao = Some(vao);
    }

    fn enable_vertex_attrib(&mut self, vao: VertexArrayId, location: u32) {
        if self.objects.enable_vertex_attrib(vao, location) {
            self.forget_pipelines(|k| k.vao != vao);
        }
    }

    fn vertex_attrib_pointer(&mut self, vao: VertexArrayId, location: u32, buffer: BufferId, pointer: AttribPointer) {
        if self.objects.vertex_attrib_pointer(vao, location, buffer, pointer) {
            self.forget_pipelines(|k| k.vao != vao);
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Some(Viewport { x, y, width, height });
    }

    fn clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
    }

    fn clear(&mut self, mask: ClearMask) {
        // No depth attachment exists; only the color part applies.
        if mask.color {
            self.pending_clear = Some(frame::clear_color(self.clear_color));
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        if count == 0 {
            return;
        }
        let (Some(program), Some(vao)) = (self.current_program, self.current_vao) else {
            log::warn!("draw_arrays with no program or vertex array bound");
            return;
        };

        let key = PipelineKey {
            program,
            vao,
            primitive,
            format: self.config.format,
        };
        if !self.pipelines.contains_key(&key) {
            match self.build_pipeline(key) {
                Ok(cached) => {
                    self.pipelines.insert(key, cached);
                }
                Err(msg) => {
                    log::error!("draw skipped: {msg}");
                    return;
                }
            }
        }

        if self.acquire_frame() {
            self.encode_draw(key, first, count);
        }
    }

    fn present(&mut self) {
        if self.pending_clear.is_some() && self.acquire_frame() {
            self.encode_clear();
        }

        let Some(frame) = self.frame.take() else {
            return;
        };
        self.canvas.window().pre_present_notify();
        frame.surface_texture.present();
    }
}
