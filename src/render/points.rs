//! GPU 点云资源
//!
//! 每个粒子作为一个实例绘制成面向屏幕的方形，位置与颜色各占一个实例缓冲区。

use crate::galaxy::lifecycle::ensure_not_disposed;
use crate::galaxy::{Disposable, GalaxyError, GalaxyResult, PointCloud, PointMaterial};
use wgpu::util::DeviceExt;

/// 每个粒子方形的顶点数（两个三角形）
pub const VERTICES_PER_POINT: u32 = 6;

/// 每个粒子的顶点数乘实例数
pub fn vertex_count(particles: u32) -> u64 {
    particles as u64 * VERTICES_PER_POINT as u64
}

/// 相机 uniform（与 WGSL 中 `Camera` 对应）
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// 视口尺寸（物理像素）
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    pub _pad: f32,
}

impl CameraUniform {
    pub fn new(
        view: glam::Mat4,
        proj: glam::Mat4,
        model: glam::Mat4,
        viewport: [f32; 2],
        pixel_ratio: f32,
    ) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            viewport,
            pixel_ratio,
            _pad: 0.0,
        }
    }
}

/// 材质 uniform（与 WGSL 中 `Material` 对应）
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub size: f32,
    pub attenuate: u32,
    pub _pad: [f32; 2],
}

impl From<&PointMaterial> for MaterialUniform {
    fn from(material: &PointMaterial) -> Self {
        Self {
            size: material.size,
            attenuate: material.size_attenuation as u32,
            _pad: [0.0; 2],
        }
    }
}

/// 已上传到 GPU 的星系点云
pub struct GpuPointCloud {
    id: u64,
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    material: PointMaterial,
    count: u32,
    disposed: bool,
}

impl GpuPointCloud {
    /// 上传点云
    pub fn upload(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        id: u64,
        cloud: &PointCloud,
    ) -> GalaxyResult<Self> {
        if cloud.is_empty() {
            return Err(GalaxyError::ResourceCreation(
                "point cloud has no particles".to_string(),
            ));
        }
        if cloud.colors.len() != cloud.positions.len() {
            return Err(GalaxyError::ResourceCreation(format!(
                "buffer length mismatch: {} positions, {} colors",
                cloud.positions.len(),
                cloud.colors.len()
            )));
        }
        let count = u32::try_from(cloud.len()).map_err(|_| {
            GalaxyError::ResourceCreation(format!("too many particles: {}", cloud.len()))
        })?;

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Positions"),
            contents: bytemuck::cast_slice(&cloud.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Colors"),
            contents: bytemuck::cast_slice(&cloud.colors),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform = MaterialUniform::from(&cloud.material);
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Material"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Galaxy Material BG"),
            layout: material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        tracing::debug!(
            target: "render",
            id,
            particles = count,
            vertices = vertex_count(count),
            "Uploaded galaxy point cloud ({} KiB)",
            (cloud.positions.len() + cloud.colors.len()) * std::mem::size_of::<f32>() / 1024
        );

        Ok(Self {
            id,
            positions,
            colors,
            material_buffer,
            material_bind_group,
            material: cloud.material,
            count,
            disposed: false,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn material(&self) -> &PointMaterial {
        &self.material
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// 记录绘制命令；已释放的资源不绘制
    pub fn draw<'rp>(&'rp self, pass: &mut wgpu::RenderPass<'rp>) {
        if self.disposed {
            return;
        }
        pass.set_bind_group(1, &self.material_bind_group, &[]);
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.colors.slice(..));
        pass.draw(0..VERTICES_PER_POINT, 0..self.count);
    }
}

impl Disposable for GpuPointCloud {
    fn dispose(&mut self) -> GalaxyResult<()> {
        ensure_not_disposed(self.disposed, &format!("galaxy point cloud #{}", self.id))?;
        self.positions.destroy();
        self.colors.destroy();
        self.material_buffer.destroy();
        self.disposed = true;
        tracing::debug!(target: "render", id = self.id, "Disposed galaxy point cloud");
        Ok(())
    }
}

impl std::fmt::Debug for GpuPointCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuPointCloud")
            .field("id", &self.id)
            .field("count", &self.count)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// 实例缓冲区布局：位置 @location(0)，颜色 @location(1)
pub fn instance_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    const COLOR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    [
        wgpu::VertexBufferLayout {
            array_stride: (3 * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &POSITION,
        },
        wgpu::VertexBufferLayout {
            array_stride: (3 * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR,
        },
    ]
}
