//! 星系渲染器
//!
//! 持有 wgpu 表面与设备，负责：
//! - 把点云上传为 [`GpuPointCloud`]（实现 [`SceneGraph`]）
//! - 每帧绘制当前挂载的星系与 egui 界面

use super::points::{instance_layouts, CameraUniform, GpuPointCloud};
use crate::config::WindowConfig;
use crate::core::error::{RenderError, RenderResult};
use crate::galaxy::{GalaxyResult, PointCloud, SceneGraph};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const POINT_SHADER: &str = r#"
struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    viewport: vec2<f32>,
    pixel_ratio: f32,
    _pad: f32,
};
@group(0) @binding(0) var<uniform> camera: Camera;

struct Material {
    size: f32,
    attenuate: u32,
    _pad: vec2<f32>,
};
@group(1) @binding(0) var<uniform> material: Material;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vid: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VsOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vid];

    let view_pos = camera.view * camera.model * vec4<f32>(position, 1.0);
    var size_px = material.size * camera.pixel_ratio;
    if (material.attenuate != 0u) {
        size_px = size_px * (camera.viewport.y * 0.5) / max(-view_pos.z, 0.0001);
    }
    size_px = max(size_px, 1.0);

    let clip = camera.proj * view_pos;
    let offset = corner * (size_px / camera.viewport) * clip.w;

    var out: VsOut;
    out.clip = vec4<f32>(clip.xy + offset, clip.zw);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

/// 加法混合（源 alpha × 源 + 目标）
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// 场景中已挂载的资源 id
#[derive(Debug, Default, Clone)]
pub struct SceneNodes {
    attached: Vec<u64>,
}

impl SceneNodes {
    /// 挂载；已存在时返回 false
    pub fn attach(&mut self, id: u64) -> bool {
        if self.attached.contains(&id) {
            return false;
        }
        self.attached.push(id);
        true
    }

    /// 移除；不存在时返回 false
    pub fn detach(&mut self, id: u64) -> bool {
        match self.attached.iter().position(|&a| a == id) {
            Some(index) => {
                self.attached.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.attached.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

/// 一帧的 egui 绘制数据
pub struct UiPaint<'a> {
    pub renderer: &'a mut egui_wgpu::Renderer,
    pub primitives: &'a [egui::ClippedPrimitive],
    pub textures_delta: &'a egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// 优先选择非 sRGB 格式（egui 在伽马空间输出）
pub fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

pub struct GalaxyRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    clear_color: wgpu::Color,
    nodes: SceneNodes,
    next_id: u64,
}

impl GalaxyRenderer {
    pub async fn new(window: Arc<Window>, window_config: &WindowConfig) -> RenderResult<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Galaxy Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::DeviceRequest(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats).ok_or_else(|| {
            RenderError::SurfaceCreation("surface reports no supported formats".to_string())
        })?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(window_config.vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        tracing::info!(
            target: "render",
            "Using adapter {} ({:?}), surface format {:?}",
            info.name,
            info.backend,
            format
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Galaxy Points Shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform"),
            contents: bytemuck::bytes_of(&CameraUniform::new(
                glam::Mat4::IDENTITY,
                glam::Mat4::IDENTITY,
                glam::Mat4::IDENTITY,
                [config.width as f32, config.height as f32],
                1.0,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera BGL"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX)],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BG"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Galaxy Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let buffers = instance_layouts();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Galaxy Points Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(ADDITIVE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            // 不写深度：粒子之间只做加法混合
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let [r, g, b] = window_config.clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            material_layout,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            nodes: SceneNodes::default(),
            next_id: 1,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// 表面尺寸（物理像素）
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn nodes(&self) -> &SceneNodes {
        &self.nodes
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            tracing::debug!(target: "render", width, height, "Surface resized");
        }
    }

    /// 绘制一帧
    ///
    /// 只有挂载在场景中且未释放的星系会被绘制。表面丢失或过期时重新配置并跳过本帧。
    pub fn render_frame(
        &mut self,
        galaxy: Option<&GpuPointCloud>,
        camera: &CameraUniform,
        ui: Option<UiPaint<'_>>,
    ) -> RenderResult<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!(target: "render", "Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Galaxy Frame"),
            });

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: ui.as_ref().map_or(1.0, |u| u.pixels_per_point),
        };
        let mut ui = ui;
        let mut ui_commands = Vec::new();
        if let Some(paint) = ui.as_mut() {
            for (id, delta) in &paint.textures_delta.set {
                paint
                    .renderer
                    .update_texture(&self.device, &self.queue, *id, delta);
            }
            ui_commands = paint.renderer.update_buffers(
                &self.device,
                &self.queue,
                &mut encoder,
                paint.primitives,
                &screen,
            );
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Galaxy Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(cloud) = galaxy.filter(|c| self.nodes.contains(c.id()) && !c.is_disposed()) {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                cloud.draw(&mut pass);
            }

            if let Some(paint) = ui.as_ref() {
                paint.renderer.render(&mut pass, paint.primitives, &screen);
            }
        }

        self.queue
            .submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();

        if let Some(paint) = ui.as_mut() {
            for id in &paint.textures_delta.free {
                paint.renderer.free_texture(id);
            }
        }
        Ok(())
    }
}

impl SceneGraph for GalaxyRenderer {
    type Resource = GpuPointCloud;

    fn create_resource(&mut self, cloud: PointCloud) -> GalaxyResult<GpuPointCloud> {
        let id = self.next_id;
        self.next_id += 1;
        GpuPointCloud::upload(&self.device, &self.material_layout, id, &cloud)
    }

    fn add(&mut self, resource: &GpuPointCloud) {
        if !self.nodes.attach(resource.id()) {
            tracing::warn!(target: "render", id = resource.id(), "Galaxy already attached");
        }
        tracing::debug!(target: "render", id = resource.id(), nodes = self.nodes.len(), "Galaxy attached");
    }

    fn remove(&mut self, resource: &GpuPointCloud) {
        if !self.nodes.detach(resource.id()) {
            tracing::warn!(target: "render", id = resource.id(), "Galaxy was not attached");
        }
        tracing::debug!(target: "render", id = resource.id(), nodes = self.nodes.len(), "Galaxy detached");
    }
}

fn uniform_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_nodes_attach_detach() {
        let mut nodes = SceneNodes::default();
        assert!(nodes.is_empty());
        assert!(nodes.attach(1));
        assert!(!nodes.attach(1));
        assert!(nodes.attach(2));
        assert_eq!(nodes.len(), 2);
        assert!(nodes.detach(1));
        assert!(!nodes.detach(1));
        assert!(!nodes.contains(1));
        assert!(nodes.contains(2));
    }

    #[test]
    fn test_choose_surface_format_prefers_linear() {
        use wgpu::TextureFormat::*;
        assert_eq!(
            choose_surface_format(&[Bgra8UnormSrgb, Bgra8Unorm]),
            Some(Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&[Rgba8UnormSrgb]), Some(Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn test_present_mode() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn test_additive_blend() {
        assert_eq!(ADDITIVE_BLEND.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(ADDITIVE_BLEND.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn test_shader_entry_points_present() {
        assert!(POINT_SHADER.contains("fn vs_main"));
        assert!(POINT_SHADER.contains("fn fs_main"));
    }
}
