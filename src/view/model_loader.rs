use std::path::Path;

use glam::{Mat3, Mat4, Vec3};

use crate::error::ModelError;
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::shader::ShaderProgram;
use crate::view::texture::Texture2d;

/// Decoded RGBA8 pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Diffuse and specular maps for texture units 0 and 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialData {
    pub name: Option<String>,
    pub diffuse: Option<ImageData>,
    pub specular: Option<ImageData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub mesh: Mesh,
    pub material: Option<usize>,
}

/// CPU side of a model: world-space meshes plus their materials.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub primitives: Vec<Primitive>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let (document, buffers, images) = gltf::import(path).map_err(|source| ModelError::Import {
            path: path.to_path_buf(),
            source,
        })?;

        let images: Vec<Option<ImageData>> = images.iter().map(to_rgba).collect();
        let image_for = |texture: gltf::Texture| images.get(texture.source().index()).cloned().flatten();

        let materials = document
            .materials()
            .map(|material| {
                let pbr = material.pbr_metallic_roughness();
                MaterialData {
                    name: material.name().map(str::to_string),
                    diffuse: pbr.base_color_texture().and_then(|info| image_for(info.texture())),
                    specular: pbr
                        .metallic_roughness_texture()
                        .and_then(|info| image_for(info.texture()))
                        .map(specular_from_roughness),
                }
            })
            .collect();

        let mut model = ModelData { primitives: Vec::new(), materials };
        if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
            for node in scene.nodes() {
                model.visit(&node, &buffers, Mat4::IDENTITY)?;
            }
        }

        if model.primitives.is_empty() {
            return Err(ModelError::Empty(path.to_path_buf()));
        }

        tracing::info!(
            path = %path.display(),
            primitives = model.primitives.len(),
            materials = model.materials.len(),
            vertices = model.vertex_count(),
            "model loaded"
        );
        Ok(model)
    }

    fn visit(&mut self, node: &gltf::Node, buffers: &[gltf::buffer::Data], parent: Mat4) -> Result<(), ModelError> {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            let name = mesh.name().unwrap_or("<unnamed>").to_string();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    tracing::warn!(mesh = %name, mode = ?primitive.mode(), "skipping non-triangle primitive");
                    continue;
                }
                let mesh = read_primitive(&primitive, buffers, world).ok_or_else(|| ModelError::MissingPositions(name.clone()))?;
                if !mesh.is_empty() {
                    self.primitives.push(Primitive { mesh, material: primitive.material().index() });
                }
            }
        }

        for child in node.children() {
            self.visit(&child, buffers, world)?;
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.mesh.vertices.len()).sum()
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data], world: Mat4) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let mut normals = reader.read_normals().map(|n| n.collect::<Vec<_>>()).unwrap_or_default();
    normals.resize(positions.len(), [0.0, 1.0, 0.0]);
    let mut uvs = reader.read_tex_coords(0).map(|t| t.into_f32().collect::<Vec<_>>()).unwrap_or_default();
    uvs.resize(positions.len(), [0.0, 0.0]);

    let vertices = positions
        .iter()
        .zip(normals.iter().zip(uvs.iter()))
        .map(|(&pos, (&normal, &uv))| Vertex {
            pos: world.transform_point3(Vec3::from(pos)).to_array(),
            normal: (normal_matrix * Vec3::from(normal)).normalize_or_zero().to_array(),
            uv,
        })
        .collect();

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Some(Mesh { vertices, indices })
}

fn to_rgba(image: &gltf::image::Data) -> Option<ImageData> {
    use gltf::image::Format;

    let pixels = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image.pixels.chunks(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
        Format::R8G8 => image.pixels.chunks(2).flat_map(|p| [p[0], p[1], 0, 255]).collect(),
        Format::R8 => image.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            tracing::warn!(format = ?other, "unsupported texture format, material falls back to default");
            return None;
        }
    };
    Some(ImageData { width: image.width, height: image.height, pixels })
}

/// Glossy where roughness (green channel) is low.
fn specular_from_roughness(mut image: ImageData) -> ImageData {
    for px in image.pixels.chunks_mut(4) {
        let s = 255 - px[1];
        px[0] = s;
        px[1] = s;
        px[2] = s;
        px[3] = 255;
    }
    image
}

struct GpuPrimitive {
    mesh: MeshBuffer,
    material: usize,
}

/// Uploaded model. The last entry of `materials` is the fallback
/// (white diffuse, black specular) for primitives without one.
pub struct Model {
    primitives: Vec<GpuPrimitive>,
    materials: Vec<wgpu::BindGroup>,
}

impl Model {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &ModelData,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let white = Texture2d::solid(device, queue, "default diffuse", [255; 4], true);
        let black = Texture2d::solid(device, queue, "default specular", [0, 0, 0, 255], false);

        let texture = |image: &Option<ImageData>, label: &str, srgb: bool| {
            image
                .as_ref()
                .map(|img| Texture2d::from_rgba(device, queue, label, img.width, img.height, &img.pixels, srgb))
        };

        let mut materials: Vec<wgpu::BindGroup> = data
            .materials
            .iter()
            .map(|m| {
                let diffuse = texture(&m.diffuse, "material diffuse", true);
                let specular = texture(&m.specular, "material specular", false);
                material_bind_group(
                    device,
                    layout,
                    &diffuse.as_ref().unwrap_or(&white).view,
                    &specular.as_ref().unwrap_or(&black).view,
                    sampler,
                )
            })
            .collect();
        let fallback = materials.len();
        materials.push(material_bind_group(device, layout, &white.view, &black.view, sampler));

        let primitives = data
            .primitives
            .iter()
            .enumerate()
            .map(|(i, p)| GpuPrimitive {
                mesh: p.mesh.upload(device, &format!("model primitive {i}")),
                material: p.material.filter(|&m| m < fallback).unwrap_or(fallback),
            })
            .collect();

        Self { primitives, materials }
    }

    /// Draw every primitive with `program` bound at uniform slot `offset`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, program: &ShaderProgram, offset: u32) {
        program.use_program(pass, offset);
        for primitive in &self.primitives {
            pass.set_bind_group(1, &self.materials[primitive.material], &[]);
            primitive.mesh.draw(pass);
        }
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    diffuse: &wgpu::TextureView,
    specular: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("material bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(diffuse) },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(specular) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
        ],
    })
}
