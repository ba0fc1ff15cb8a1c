//! Shader programs with a named-uniform interface.
//!
//! Uniforms are addressed by dot-separated names (`"pointLight.ambient"`) and
//! packed with WGSL uniform-buffer alignment into a staging block. Every draw
//! commits a copy of the block into its own slot of one buffer and binds it
//! with a dynamic offset, so uniforms set before a draw stay attached to it.

use std::num::NonZeroU64;

use glam::{Mat4, Vec3};

use crate::error::{InitError, UniformError};
use crate::utils::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Mat4,
}

impl UniformKind {
    fn align(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec3 | UniformKind::Mat4 => 16,
        }
    }

    fn size(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Mat4 => 64,
        }
    }

    fn name(self) -> &'static str {
        match self {
            UniformKind::Int => "int",
            UniformKind::Float => "float",
            UniformKind::Vec3 => "vec3",
            UniformKind::Mat4 => "mat4",
        }
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

#[derive(Debug, Clone, PartialEq)]
struct UniformField {
    name: String,
    kind: UniformKind,
    offset: usize,
}

/// Field order must match the WGSL struct it describes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    end: usize,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, kind: UniformKind) -> Self {
        let offset = align_up(self.end, kind.align());
        self.end = offset + kind.size();
        self.fields.push(UniformField { name: name.to_string(), kind, offset });
        self
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.offset)
    }

    /// Struct size rounded up to 16 bytes.
    pub fn size(&self) -> usize {
        align_up(self.end.max(1), 16)
    }

    fn lookup(&self, name: &str, kind: UniformKind) -> Result<usize, UniformError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        if field.kind != kind {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: field.kind.name(),
                actual: kind.name(),
            });
        }
        Ok(field.offset)
    }
}

/// CPU side of a program's uniforms: current values plus this frame's committed slots.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    staging: Vec<u8>,
    stride: usize,
    capacity: usize,
    committed: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout, slot_alignment: usize, capacity: usize) -> Self {
        let size = layout.size();
        Self {
            staging: vec![0; size],
            stride: align_up(size, slot_alignment.max(1)),
            capacity: capacity.max(1),
            committed: Vec::new(),
            layout,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn staging(&self) -> &[u8] {
        &self.staging
    }

    pub fn committed(&self) -> &[u8] {
        &self.committed
    }

    pub fn buffer_size(&self) -> u64 {
        (self.stride * self.capacity) as u64
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) -> Result<(), UniformError> {
        let offset = self.layout.lookup(name, kind)?;
        self.staging[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), UniformError> {
        self.write(name, UniformKind::Int, bytemuck::bytes_of(&value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), UniformError> {
        self.write(name, UniformKind::Float, bytemuck::bytes_of(&value))
    }

    pub fn set_vec3(&mut self, name: &str, x: f32, y: f32, z: f32) -> Result<(), UniformError> {
        self.write(name, UniformKind::Vec3, bytemuck::cast_slice(&[x, y, z]))
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) -> Result<(), UniformError> {
        self.write(name, UniformKind::Mat4, bytemuck::cast_slice(&value.to_cols_array()))
    }

    /// Snapshot the current values into the next slot; returns its dynamic offset.
    pub fn commit(&mut self) -> Result<u32, UniformError> {
        let offset = self.committed.len();
        if offset / self.stride >= self.capacity {
            return Err(UniformError::SlotsExhausted { capacity: self.capacity });
        }
        self.committed.extend_from_slice(&self.staging);
        self.committed.resize(offset + self.stride, 0);
        Ok(offset as u32)
    }

    pub fn reset(&mut self) {
        self.committed.clear();
    }
}

/// Pipeline state for building a [`ShaderProgram`].
pub struct ProgramDescriptor<'a> {
    pub label: &'static str,
    pub source: &'a str,
    pub uniforms: UniformLayout,
    /// Bind groups after the uniform group (group 1, 2, ...).
    pub extra_groups: &'a [&'a wgpu::BindGroupLayout],
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub depth_write: bool,
    pub cull_mode: Option<wgpu::Face>,
    pub max_draws: usize,
}

/// Compiled pipeline plus its uniform buffer. GPU objects are released on drop.
pub struct ShaderProgram {
    pub label: &'static str,
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformBlock,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    pub fn new(device: &wgpu::Device, desc: ProgramDescriptor<'_>) -> Result<Self, InitError> {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as usize;
        let uniforms = UniformBlock::new(desc.uniforms, alignment, desc.max_draws);
        let binding_size = NonZeroU64::new(uniforms.layout().size() as u64);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} uniforms", desc.label)),
            size: uniforms.buffer_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} uniform layout", desc.label)),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: binding_size,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} uniform group", desc.label)),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: binding_size,
                }),
            }],
        });

        let mut group_layouts = vec![&uniform_layout];
        group_layouts.extend_from_slice(desc.extra_groups);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", desc.label)),
            bind_group_layouts: &group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: desc.depth_format,
                depth_write_enabled: desc.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(InitError::Shader { label: desc.label, message: err.to_string() });
        }

        tracing::debug!(
            program = desc.label,
            uniform_bytes = uniforms.layout().size(),
            slot_stride = uniforms.stride(),
            "shader program ready"
        );

        Ok(Self { label: desc.label, pipeline, uniforms, buffer, bind_group })
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), UniformError> {
        self.uniforms.set_int(name, value)
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), UniformError> {
        self.uniforms.set_float(name, value)
    }

    pub fn set_vec3(&mut self, name: &str, x: f32, y: f32, z: f32) -> Result<(), UniformError> {
        self.uniforms.set_vec3(name, x, y, z)
    }

    pub fn set_vec3v(&mut self, name: &str, v: Vec3) -> Result<(), UniformError> {
        self.uniforms.set_vec3(name, v.x, v.y, v.z)
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) -> Result<(), UniformError> {
        self.uniforms.set_mat4(name, value)
    }

    /// Drop last frame's slots.
    pub fn begin_frame(&mut self) {
        self.uniforms.reset();
    }

    pub fn commit(&mut self) -> Result<u32, UniformError> {
        self.uniforms.commit()
    }

    /// Upload every slot committed this frame.
    pub fn flush(&self, queue: &wgpu::Queue) {
        let bytes = self.uniforms.committed();
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }

    /// Bind the pipeline and the uniform slot at `offset`.
    pub fn use_program(&self, pass: &mut wgpu::RenderPass<'_>, offset: u32) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[offset]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_layout() -> UniformLayout {
        UniformLayout::new()
            .field("model", UniformKind::Mat4)
            .field("view", UniformKind::Mat4)
            .field("projection", UniformKind::Mat4)
            .field("viewPos", UniformKind::Vec3)
            .field("time", UniformKind::Float)
            .field("material.diffuse", UniformKind::Int)
            .field("material.specular", UniformKind::Int)
            .field("material.shininess", UniformKind::Float)
            .field("pointLight.position", UniformKind::Vec3)
            .field("pointLight.ambient", UniformKind::Vec3)
            .field("pointLight.diffuse", UniformKind::Vec3)
            .field("pointLight.specular", UniformKind::Vec3)
            .field("pointLight.constant", UniformKind::Float)
            .field("pointLight.linear", UniformKind::Float)
            .field("pointLight.quadratic", UniformKind::Float)
    }

    #[test]
    fn offsets_follow_wgsl_alignment() {
        let layout = object_layout();
        assert_eq!(layout.offset_of("viewPos"), Some(192));
        // f32 packs into the tail of a vec3
        assert_eq!(layout.offset_of("time"), Some(204));
        assert_eq!(layout.offset_of("material.shininess"), Some(216));
        assert_eq!(layout.offset_of("pointLight.position"), Some(224));
        assert_eq!(layout.offset_of("pointLight.constant"), Some(284));
        assert_eq!(layout.offset_of("pointLight.quadratic"), Some(292));
        assert_eq!(layout.size(), 304);
    }

    #[test]
    fn unknown_and_mistyped_names_are_rejected() {
        let mut block = UniformBlock::new(object_layout(), 256, 4);
        assert_eq!(
            block.set_float("pointLight.colour", 1.0),
            Err(UniformError::Unknown("pointLight.colour".to_string()))
        );
        assert!(matches!(
            block.set_float("viewPos", 1.0),
            Err(UniformError::TypeMismatch { expected: "vec3", actual: "float", .. })
        ));
    }

    #[test]
    fn values_land_at_their_offsets() {
        let mut block = UniformBlock::new(object_layout(), 256, 4);
        block.set_vec3("pointLight.ambient", 0.1, 0.2, 0.3).unwrap();
        block.set_int("material.specular", 1).unwrap();

        let bytes = block.staging();
        let ambient: [f32; 3] = bytemuck::pod_read_unaligned(&bytes[240..252]);
        assert_eq!(ambient, [0.1, 0.2, 0.3]);
        let unit: i32 = bytemuck::pod_read_unaligned(&bytes[212..216]);
        assert_eq!(unit, 1);
    }

    #[test]
    fn commits_snapshot_into_aligned_slots() {
        let layout = UniformLayout::new().field("model", UniformKind::Mat4);
        let mut block = UniformBlock::new(layout, 256, 3);

        block.set_mat4("model", &Mat4::IDENTITY).unwrap();
        assert_eq!(block.commit(), Ok(0));
        block.set_mat4("model", &Mat4::from_scale(Vec3::splat(2.0))).unwrap();
        assert_eq!(block.commit(), Ok(256));

        let committed = block.committed();
        assert_eq!(committed.len(), 512);
        let first: f32 = bytemuck::pod_read_unaligned(&committed[0..4]);
        let second: f32 = bytemuck::pod_read_unaligned(&committed[256..260]);
        assert_eq!((first, second), (1.0, 2.0));
    }

    #[test]
    fn slots_run_out_and_reset_per_frame() {
        let layout = UniformLayout::new().field("time", UniformKind::Float);
        let mut block = UniformBlock::new(layout, 256, 2);
        block.commit().unwrap();
        block.commit().unwrap();
        assert_eq!(block.commit(), Err(UniformError::SlotsExhausted { capacity: 2 }));
        block.reset();
        assert_eq!(block.commit(), Ok(0));
    }

    #[test]
    fn static_values_survive_commits() {
        let mut block = UniformBlock::new(object_layout(), 256, 4);
        block.set_float("material.shininess", 64.0).unwrap();
        block.commit().unwrap();
        block.set_float("time", 3.0).unwrap();
        let offset = block.commit().unwrap() as usize;
        let shininess: f32 =
            bytemuck::pod_read_unaligned(&block.committed()[offset + 216..offset + 220]);
        assert_eq!(shininess, 64.0);
    }
}
