use crate::error::{InitError, RenderError, UniformError};
use crate::model::{DrawPass, Scene, SceneSubmission};
use crate::ui::Hud;
use crate::utils::{create_cube_mesh, MeshBuffer};
use crate::view::gpu_init::GpuContext;
use crate::view::model_loader::{Model, ModelData};
use crate::view::shader::{ProgramDescriptor, ShaderProgram, UniformKind, UniformLayout};
use crate::view::texture::{
    cubemap_bind_group_layout, material_bind_group_layout, material_sampler, CubemapFaces, CubemapTexture,
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const OBJECT_SHADER: &str = include_str!("shaders/object.wgsl");
const LIGHT_SHADER: &str = include_str!("shaders/light.wgsl");
const SKYBOX_SHADER: &str = include_str!("shaders/skybox.wgsl");

pub fn object_uniforms() -> UniformLayout {
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

pub fn light_uniforms() -> UniformLayout {
    UniformLayout::new()
        .field("model", UniformKind::Mat4)
        .field("view", UniformKind::Mat4)
        .field("projection", UniformKind::Mat4)
}

pub fn skybox_uniforms() -> UniformLayout {
    UniformLayout::new()
        .field("view", UniformKind::Mat4)
        .field("projection", UniformKind::Mat4)
}

fn program(
    gpu: &GpuContext,
    label: &'static str,
    source: &str,
    uniforms: UniformLayout,
    extra_groups: &[&wgpu::BindGroupLayout],
    depth_write: bool,
    max_draws: usize,
) -> Result<ShaderProgram, InitError> {
    ShaderProgram::new(
        &gpu.device,
        ProgramDescriptor {
            label,
            source,
            uniforms,
            extra_groups,
            color_format: gpu.format,
            depth_format: DEPTH_FORMAT,
            depth_write,
            cull_mode: None,
            max_draws,
        },
    )
}

pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Owns every GPU resource the frame needs. Dropping it releases them.
pub struct Renderer {
    object: ShaderProgram,
    light: ShaderProgram,
    skybox: ShaderProgram,
    model: Model,
    sky_mesh: MeshBuffer,
    marker_mesh: MeshBuffer,
    _cubemap: CubemapTexture,
    cubemap_group: wgpu::BindGroup,
    depth: DepthTarget,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub fn new(
        gpu: &GpuContext,
        scene: &Scene,
        model: &ModelData,
        faces: &CubemapFaces,
        clear_color: [f64; 4],
    ) -> Result<Self, InitError> {
        let device = &gpu.device;
        let material_layout = material_bind_group_layout(device);
        let cubemap_layout = cubemap_bind_group_layout(device);

        let object = program(
            gpu,
            "object",
            OBJECT_SHADER,
            object_uniforms(),
            &[&material_layout],
            true,
            scene.instances.len(),
        )?;
        let light = program(gpu, "light", LIGHT_SHADER, light_uniforms(), &[], true, 1)?;
        let skybox = program(gpu, "skybox", SKYBOX_SHADER, skybox_uniforms(), &[&cubemap_layout], false, 1)?;

        let sampler = material_sampler(device);
        let model = Model::upload(device, &gpu.queue, model, &material_layout, &sampler);

        let cube = create_cube_mesh();
        let cubemap = CubemapTexture::upload(device, &gpu.queue, faces);
        let cubemap_group = cubemap.bind_group(device, &cubemap_layout);

        let (width, height) = gpu.size();
        let [r, g, b, a] = clear_color;
        let mut renderer = Self {
            object,
            light,
            skybox,
            model,
            sky_mesh: cube.upload(device, "skybox cube"),
            marker_mesh: cube.upload(device, "light marker cube"),
            _cubemap: cubemap,
            cubemap_group,
            depth: DepthTarget::new(device, width, height),
            clear_color: wgpu::Color { r, g, b, a },
        };
        renderer.set_static_uniforms(scene)?;
        Ok(renderer)
    }

    /// Material and light values stay fixed for the whole run.
    fn set_static_uniforms(&mut self, scene: &Scene) -> Result<(), UniformError> {
        let material = scene.material;
        let light = scene.light;
        let object = &mut self.object;

        object.set_int("material.diffuse", material.diffuse_unit)?;
        object.set_int("material.specular", material.specular_unit)?;
        object.set_float("material.shininess", material.shininess)?;

        object.set_vec3v("pointLight.position", light.position)?;
        object.set_vec3v("pointLight.ambient", light.ambient)?;
        object.set_vec3v("pointLight.diffuse", light.diffuse)?;
        object.set_vec3v("pointLight.specular", light.specular)?;
        object.set_float("pointLight.constant", light.constant)?;
        object.set_float("pointLight.linear", light.linear)?;
        object.set_float("pointLight.quadratic", light.quadratic)?;
        Ok(())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth = DepthTarget::new(device, width, height);
    }

    /// Stage and commit uniforms for every draw, in submission order.
    fn prepare(&mut self, submission: &SceneSubmission) -> Result<Vec<(DrawPass, u32)>, UniformError> {
        self.object.begin_frame();
        self.light.begin_frame();
        self.skybox.begin_frame();

        self.object.set_vec3v("viewPos", submission.view_position)?;
        self.object.set_float("time", submission.time)?;

        let mut slots = Vec::with_capacity(submission.draws.len());
        for draw in &submission.draws {
            let t = &draw.transforms;
            let offset = match draw.pass {
                DrawPass::Scene => {
                    self.object.set_mat4("model", &t.model)?;
                    self.object.set_mat4("view", &t.view)?;
                    self.object.set_mat4("projection", &t.projection)?;
                    self.object.commit()?
                }
                DrawPass::LightMarker => {
                    self.light.set_mat4("model", &t.model)?;
                    self.light.set_mat4("view", &t.view)?;
                    self.light.set_mat4("projection", &t.projection)?;
                    self.light.commit()?
                }
                DrawPass::Skybox => {
                    self.skybox.set_mat4("view", &t.view)?;
                    self.skybox.set_mat4("projection", &t.projection)?;
                    self.skybox.commit()?
                }
            };
            slots.push((draw.pass, offset));
        }
        Ok(slots)
    }

    pub fn render(
        &mut self,
        gpu: &GpuContext,
        submission: &SceneSubmission,
        hud: Option<&mut Hud>,
    ) -> Result<(), RenderError> {
        let slots = self.prepare(submission)?;
        self.object.flush(&gpu.queue);
        self.light.flush(&gpu.queue);
        self.skybox.flush(&gpu.queue);

        let output = gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (pass, offset) in slots {
                match pass {
                    DrawPass::Scene => self.model.draw(&mut render_pass, &self.object, offset),
                    DrawPass::LightMarker => {
                        self.light.use_program(&mut render_pass, offset);
                        self.marker_mesh.draw(&mut render_pass);
                    }
                    DrawPass::Skybox => {
                        self.skybox.use_program(&mut render_pass, offset);
                        render_pass.set_bind_group(1, &self.cubemap_group, &[]);
                        self.sky_mesh.draw(&mut render_pass);
                    }
                }
            }
        }

        if let Some(hud) = hud {
            hud.paint(&gpu.device, &gpu.queue, &mut encoder, &view, gpu.size());
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
